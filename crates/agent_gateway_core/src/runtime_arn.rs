/// Builds the runtime ARN the AgentCore invoke API expects from its parts.
pub fn agent_runtime_arn(region: &str, account_id: &str, agent_runtime_id: &str) -> String {
    format!("arn:aws:bedrock-agentcore:{region}:{account_id}:runtime/{agent_runtime_id}")
}

/// True when a configured target is already a full ARN rather than a bare
/// runtime id, so deployments can skip the account lookup.
pub fn is_runtime_arn(target: &str) -> bool {
    target.starts_with("arn:")
}
