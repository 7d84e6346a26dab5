pub type ChunkResult = Result<Vec<u8>, String>;

/// Synchronous seam to the agent runtime.
///
/// The returned iterator is finite and not restartable. Implementations may
/// fail at call time, or yield an `Err` chunk partway through the stream.
pub trait AgentInvoker {
    fn invoke_agent_runtime(
        &self,
        target: &str,
        payload: &[u8],
        session_id: &str,
    ) -> Result<Box<dyn Iterator<Item = ChunkResult>>, String>;
}
