use agent_gateway_core::contract::{request_id_from_event, JSON_CONTENT_TYPE};
use agent_gateway_core::runtime_arn::{agent_runtime_arn, is_runtime_arn};
use agent_gateway_lambda::adapters::invoke::{AgentInvoker, ChunkResult};
use agent_gateway_lambda::handlers::proxy::{handle_proxy_event, ApiGatewayResponse};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockagentcore::primitives::Blob;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

const DEFAULT_REGION: &str = "us-west-2";

struct BedrockAgentCoreInvoker {
    agent_client: aws_sdk_bedrockagentcore::Client,
    sts_client: aws_sdk_sts::Client,
    region: String,
}

impl BedrockAgentCoreInvoker {
    /// A bare runtime id needs the caller account to become an ARN; a
    /// pre-built ARN in configuration is used as-is.
    fn resolve_runtime_arn(&self, target: &str) -> Result<String, String> {
        if is_runtime_arn(target) {
            return Ok(target.to_string());
        }

        let client = self.sts_client.clone();
        let account_id = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_caller_identity()
                    .send()
                    .await
                    .map_err(|error| format!("failed to resolve caller account: {error}"))?
                    .account()
                    .map(str::to_string)
                    .ok_or_else(|| "caller identity did not include an account id".to_string())
            })
        })?;

        Ok(agent_runtime_arn(&self.region, &account_id, target))
    }
}

impl AgentInvoker for BedrockAgentCoreInvoker {
    fn invoke_agent_runtime(
        &self,
        target: &str,
        payload: &[u8],
        session_id: &str,
    ) -> Result<Box<dyn Iterator<Item = ChunkResult>>, String> {
        let runtime_arn = self.resolve_runtime_arn(target)?;
        let client = self.agent_client.clone();
        let request_payload = payload.to_vec();
        let runtime_session_id = session_id.to_string();

        let chunks = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .invoke_agent_runtime()
                    .agent_runtime_arn(runtime_arn)
                    .payload(Blob::new(request_payload))
                    .content_type(JSON_CONTENT_TYPE)
                    .accept(JSON_CONTENT_TYPE)
                    .runtime_session_id(runtime_session_id)
                    .send()
                    .await
                    .map_err(|error| format!("failed to invoke agent runtime: {error}"))?;

                // Drain here so a mid-stream error surfaces to the handler
                // as a trailing Err chunk rather than being swallowed.
                let mut chunks: Vec<ChunkResult> = Vec::new();
                let mut stream = output.response;
                loop {
                    match stream.try_next().await {
                        Ok(Some(bytes)) => chunks.push(Ok(bytes.to_vec())),
                        Ok(None) => break,
                        Err(error) => {
                            chunks.push(Err(format!("agent response stream failed: {error}")));
                            break;
                        }
                    }
                }

                Ok::<_, String>(chunks)
            })
        })?;

        Ok(Box::new(chunks.into_iter()))
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let region =
        std::env::var("AGENTCORE_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.clone()))
        .load()
        .await;

    let invoker = BedrockAgentCoreInvoker {
        agent_client: aws_sdk_bedrockagentcore::Client::new(&config),
        sts_client: aws_sdk_sts::Client::new(&config),
        region,
    };

    let agent_target = std::env::var("AGENTCORE_AGENT_ID").ok();
    let request_id = request_id_from_event(&event.payload)
        .map(str::to_string)
        .unwrap_or_else(|| event.context.request_id.clone());

    Ok(handle_proxy_event(
        event.payload,
        &request_id,
        agent_target.as_deref(),
        &invoker,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
