use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const ALLOW_ANY_ORIGIN: &str = "*";
pub const PROMPT_KEY: &str = "prompt";

/// Failure taxonomy for a single proxied request.
///
/// `ClientInput` and `Configuration` are detected before the agent runtime
/// is contacted; `Backend` covers the invocation and stream-drain stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    ClientInput {
        label: &'static str,
        message: String,
    },
    Configuration {
        message: String,
    },
    Backend {
        message: String,
    },
}

impl GatewayError {
    pub fn missing_body() -> Self {
        Self::ClientInput {
            label: "Missing request body",
            message: "Please provide a JSON body with the request".to_string(),
        }
    }

    pub fn invalid_json() -> Self {
        Self::ClientInput {
            label: "Invalid JSON",
            message: "Request body must be valid JSON".to_string(),
        }
    }

    pub fn missing_prompt() -> Self {
        Self::ClientInput {
            label: "Missing prompt",
            message: "Request must include a \"prompt\" field".to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::ClientInput { .. } => 400,
            Self::Configuration { .. } | Self::Backend { .. } => 500,
        }
    }

    pub fn error_label(&self) -> &str {
        match self {
            Self::ClientInput { label, .. } => label,
            Self::Configuration { .. } => "Configuration error",
            Self::Backend { .. } => "Internal server error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ClientInput { message, .. }
            | Self::Configuration { message }
            | Self::Backend { message } => message,
        }
    }

    /// Only backend faults echo the correlation id; validation and
    /// configuration failures answer before one is relevant.
    pub fn echoes_request_id(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_label(), self.message())
    }
}

impl std::error::Error for GatewayError {}

/// Body of a 200 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessBody {
    pub success: bool,
    pub data: Value,
    pub request_id: String,
}

/// Pulls the raw body text out of an API-Gateway-shaped event and decodes it.
///
/// The decoded request must be a JSON object carrying a `"prompt"` key; all
/// other keys pass through to the agent runtime untouched.
pub fn decode_request_body(event: &Value) -> Result<Value, GatewayError> {
    let body = match event.get("body") {
        None | Some(Value::Null) => return Err(GatewayError::missing_body()),
        Some(Value::String(text)) if text.is_empty() => {
            return Err(GatewayError::missing_body())
        }
        Some(Value::String(text)) => text,
        Some(_) => return Err(GatewayError::invalid_json()),
    };

    let decoded: Value = serde_json::from_str(body).map_err(|_| GatewayError::invalid_json())?;

    match &decoded {
        Value::Object(map) if map.contains_key(PROMPT_KEY) => Ok(decoded),
        _ => Err(GatewayError::missing_prompt()),
    }
}

/// Correlation id carried by the inbound event, when API Gateway supplied one.
pub fn request_id_from_event(event: &Value) -> Option<&str> {
    event.get("requestContext")?.get("requestId")?.as_str()
}

/// Reassembles the drained agent output into the result value.
///
/// Output that is not valid JSON is wrapped as `{"message": text}` rather
/// than failing the request; output that is not valid UTF-8 is a fault.
pub fn decode_agent_output(bytes: &[u8]) -> Result<Value, GatewayError> {
    let text = std::str::from_utf8(bytes).map_err(|error| {
        GatewayError::backend(format!("Agent response was not valid UTF-8: {error}"))
    })?;

    Ok(serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_absent_null_and_empty_bodies() {
        for event in [json!({}), json!({ "body": null }), json!({ "body": "" })] {
            let error = decode_request_body(&event).expect_err("body should be rejected");
            assert_eq!(error.status_code(), 400);
            assert_eq!(error.error_label(), "Missing request body");
        }
    }

    #[test]
    fn rejects_malformed_body_text_as_invalid_json() {
        for body in [" ", "not json", "{\"prompt\": "] {
            let error = decode_request_body(&json!({ "body": body }))
                .expect_err("body should be rejected");
            assert_eq!(error.status_code(), 400);
            assert_eq!(error.error_label(), "Invalid JSON");
        }
    }

    #[test]
    fn rejects_non_string_body_as_invalid_json() {
        let error = decode_request_body(&json!({ "body": { "prompt": "hi" } }))
            .expect_err("body should be rejected");
        assert_eq!(error.error_label(), "Invalid JSON");
    }

    #[test]
    fn rejects_bodies_without_a_prompt_key() {
        for body in ["{\"question\": \"hi\"}", "[1, 2, 3]", "\"prompt\"", "42"] {
            let error = decode_request_body(&json!({ "body": body }))
                .expect_err("body should be rejected");
            assert_eq!(error.status_code(), 400);
            assert_eq!(error.error_label(), "Missing prompt");
        }
    }

    #[test]
    fn decodes_prompt_and_preserves_passthrough_keys() {
        let event = json!({
            "body": "{\"prompt\": {\"a\": 1, \"b\": 2}, \"temperature\": 0.2}"
        });

        let decoded = decode_request_body(&event).expect("body should decode");
        assert_eq!(decoded["prompt"], json!({ "a": 1, "b": 2 }));
        assert_eq!(decoded["temperature"], json!(0.2));
    }

    #[test]
    fn reads_request_id_from_request_context() {
        let event = json!({ "requestContext": { "requestId": "req-42" } });
        assert_eq!(request_id_from_event(&event), Some("req-42"));
        assert_eq!(request_id_from_event(&json!({})), None);
        assert_eq!(
            request_id_from_event(&json!({ "requestContext": {} })),
            None
        );
    }

    #[test]
    fn parses_json_agent_output() {
        let output = decode_agent_output(b"{\"result\": 3}").expect("output should decode");
        assert_eq!(output, json!({ "result": 3 }));
    }

    #[test]
    fn wraps_plain_text_agent_output() {
        let output = decode_agent_output(b"plain text").expect("output should decode");
        assert_eq!(output, json!({ "message": "plain text" }));
    }

    #[test]
    fn invalid_utf8_agent_output_is_a_fault() {
        let error = decode_agent_output(&[0xff, 0xfe]).expect_err("output should fail");
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.error_label(), "Internal server error");
    }

    #[test]
    fn only_backend_faults_echo_the_request_id() {
        assert!(GatewayError::backend("stream reset").echoes_request_id());
        assert!(!GatewayError::missing_body().echoes_request_id());
        assert!(!GatewayError::configuration("target unset").echoes_request_id());
    }

    #[test]
    fn error_labels_and_status_codes_match_the_taxonomy() {
        let configuration = GatewayError::configuration("target unset");
        assert_eq!(configuration.status_code(), 500);
        assert_eq!(configuration.error_label(), "Configuration error");

        let backend = GatewayError::backend("stream reset");
        assert_eq!(backend.status_code(), 500);
        assert_eq!(backend.to_string(), "Internal server error: stream reset");
    }
}
