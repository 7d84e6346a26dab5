use agent_gateway_core::contract::{
    decode_agent_output, decode_request_body, GatewayError, SuccessBody, ALLOW_ANY_ORIGIN,
    JSON_CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::invoke::AgentInvoker;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Translates one API-Gateway-shaped event into an agent runtime invocation
/// and back into a response envelope.
///
/// Every outcome, including a fault raised by the invoker, is returned as a
/// well-formed envelope; nothing propagates past this function.
pub fn handle_proxy_event(
    event: Value,
    request_id: &str,
    agent_target: Option<&str>,
    invoker: &dyn AgentInvoker,
) -> ApiGatewayResponse {
    log_proxy_info("request_received", json!({ "request_id": request_id }));

    match invoke_agent(&event, request_id, agent_target, invoker) {
        Ok(data) => {
            log_proxy_info(
                "request_completed",
                json!({ "request_id": request_id, "data": data }),
            );
            success_response(data, request_id)
        }
        Err(error) => {
            log_proxy_error(
                "request_failed",
                json!({
                    "request_id": request_id,
                    "error": error.error_label(),
                    "message": error.message(),
                }),
            );
            failure_response(&error, request_id)
        }
    }
}

fn invoke_agent(
    event: &Value,
    request_id: &str,
    agent_target: Option<&str>,
    invoker: &dyn AgentInvoker,
) -> Result<Value, GatewayError> {
    let decoded = decode_request_body(event)?;

    let target = match agent_target {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            return Err(GatewayError::configuration(
                "AGENTCORE_AGENT_ID environment variable not set",
            ))
        }
    };

    let payload = serde_json::to_vec(&decoded).map_err(|error| {
        GatewayError::backend(format!("Failed to serialize request payload: {error}"))
    })?;

    log_proxy_info(
        "invoking_agent_runtime",
        json!({ "request_id": request_id, "target": target }),
    );

    // The session id doubles as the correlation id echoed back to callers.
    let chunks = invoker
        .invoke_agent_runtime(target, &payload, request_id)
        .map_err(GatewayError::backend)?;

    let mut content = Vec::new();
    for chunk in chunks {
        content.extend(chunk.map_err(GatewayError::backend)?);
    }

    decode_agent_output(&content)
}

fn response_headers() -> Value {
    json!({
        "Content-Type": JSON_CONTENT_TYPE,
        "Access-Control-Allow-Origin": ALLOW_ANY_ORIGIN,
    })
}

fn success_response(data: Value, request_id: &str) -> ApiGatewayResponse {
    let body = SuccessBody {
        success: true,
        data,
        request_id: request_id.to_string(),
    };

    ApiGatewayResponse {
        status_code: 200,
        headers: response_headers(),
        body: serde_json::to_string(&body).expect("response payload should serialize"),
    }
}

fn failure_response(error: &GatewayError, request_id: &str) -> ApiGatewayResponse {
    let mut body = json!({
        "error": error.error_label(),
        "message": error.message(),
    });
    if error.echoes_request_id() {
        body["request_id"] = Value::from(request_id);
    }

    ApiGatewayResponse {
        status_code: error.status_code(),
        headers: response_headers(),
        body: body.to_string(),
    }
}

fn log_proxy_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "proxy_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_proxy_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "proxy_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
