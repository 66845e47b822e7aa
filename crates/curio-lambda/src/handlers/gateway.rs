use std::time::{Duration, SystemTime, UNIX_EPOCH};

use curio_client::CollectionSearch;
use curio_core::error::AppError;
use curio_core::request::ensure_search_method;
use curio_core::SearchCriteria;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const GENERIC_FAILURE: &str = "An error occurred while processing the request.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Handles one API Gateway HTTP API (payload v2) search request.
///
/// Method and body are checked before any upstream call is made.
pub async fn handle_gateway_event(
    event: Value,
    search: &dyn CollectionSearch,
    deadline: Option<Instant>,
) -> ApiGatewayResponse {
    debug!(request = %event, "Incoming request");

    let method = request_method(&event).unwrap_or_default();
    if let Err(error) = ensure_search_method(method) {
        warn!(method, "INCORRECT METHOD : Endpoint called with incorrect request method");
        return text_response(404, &error.to_string());
    }

    let criteria = match parse_criteria(&event) {
        Ok(criteria) => criteria,
        Err(error) => {
            warn!(error = %error, "Rejected malformed search request");
            return validation_error_response(&error);
        }
    };

    let result = match search.search(&criteria, deadline).await {
        Ok(result) => result,
        Err(error) => {
            error!(error = %error, "An error occurred while processing the request");
            return error_response(500, json!({ "error": GENERIC_FAILURE }));
        }
    };

    match serde_json::to_string(&result.items) {
        Ok(body) => {
            info!(items = result.total(), "Search response ready");
            ApiGatewayResponse {
                status_code: 200,
                headers: json!({"Content-Type": "application/json"}),
                body,
            }
        }
        Err(error) => {
            error!(error = %error, "Failed to serialize search response");
            error_response(500, json!({ "error": GENERIC_FAILURE }))
        }
    }
}

/// Converts the invocation deadline (epoch milliseconds) into an `Instant`,
/// leaving `margin` to build the response.
pub fn invocation_deadline(deadline_ms: u64, margin: Duration) -> Option<Instant> {
    if deadline_ms == 0 {
        return None;
    }
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()?
        .as_millis() as u64;
    let remaining = Duration::from_millis(deadline_ms.saturating_sub(now_ms));
    Some(Instant::now() + remaining.saturating_sub(margin))
}

/// Reads the method from a v2 (`requestContext.http.method`) or v1
/// (`httpMethod`) event.
fn request_method(event: &Value) -> Option<&str> {
    event
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str)
        .or_else(|| event.get("httpMethod").and_then(Value::as_str))
}

fn parse_criteria(event: &Value) -> Result<SearchCriteria, AppError> {
    if event
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(AppError::InvalidRequest(
            "Base64-encoded request bodies are not supported".to_string(),
        ));
    }

    match event.get("body") {
        None | Some(Value::Null) => Ok(SearchCriteria::default()),
        Some(Value::String(text)) => SearchCriteria::from_body(text),
        Some(body @ Value::Object(_)) => SearchCriteria::from_value(body),
        Some(_) => Err(AppError::InvalidRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

fn validation_error_response(error: &AppError) -> ApiGatewayResponse {
    let message = match error {
        AppError::InvalidRequest(message) => message.clone(),
        other => other.to_string(),
    };
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

fn text_response(status_code: u16, body: &str) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "text/plain"}),
        body: body.to_string(),
    }
}

fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
