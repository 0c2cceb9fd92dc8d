//! Turns a non-2xx backend response into an [`ApiError`].
//!
//! The backend answers in a few shapes: FastAPI's own validation body
//! `{"detail": [{"loc": [...], "msg": ...}]}`, an `HTTPException` that wraps
//! `{"error", "message", "details"}` in `detail`, the same object at the top
//! level, or plain text from a proxy.

use serde_json::Value;

use crate::types::{ApiError, FieldError};

pub(crate) fn error_from_response(status: u16, body: &[u8]) -> ApiError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let payload = parsed.as_ref();

    if let Some(job_error) = payload.and_then(job_fetch_error) {
        return job_error;
    }

    let message = payload
        .and_then(extract_message)
        .or_else(|| plain_text(body))
        .unwrap_or_else(|| default_message(status).to_string());

    match status {
        422 => {
            let fields = payload.map(extract_fields).unwrap_or_default();
            let message = if fields.is_empty() {
                message
            } else {
                fields
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            ApiError::Validation { message, fields }
        }
        429 => ApiError::Server { status, message },
        status if status >= 500 => ApiError::Server { status, message },
        _ => ApiError::Request { status, message },
    }
}

fn extract_message(payload: &Value) -> Option<String> {
    let detail = payload.get("detail");
    detail
        .and_then(Value::as_str)
        .or_else(|| detail.and_then(|d| d.get("message")).and_then(Value::as_str))
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

fn extract_fields(payload: &Value) -> Vec<FieldError> {
    let detail = payload.get("detail");
    let candidates = [
        detail.filter(|d| d.is_array()),
        payload.get("details").and_then(|d| d.get("errors")),
        detail
            .and_then(|d| d.get("details"))
            .and_then(|d| d.get("errors")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_array)
        .map(|errors| errors.iter().filter_map(field_error).collect())
        .unwrap_or_default()
}

fn field_error(entry: &Value) -> Option<FieldError> {
    let message = entry.get("msg").and_then(Value::as_str)?.to_string();
    let field = entry
        .get("loc")
        .and_then(Value::as_array)
        .map(|loc| {
            loc.iter()
                .filter_map(|part| match part {
                    Value::String(name) if name != "body" => Some(name.clone()),
                    Value::Number(index) => Some(index.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default();
    Some(FieldError { field, message })
}

fn job_fetch_error(payload: &Value) -> Option<ApiError> {
    let body = match payload.get("detail") {
        Some(detail) if detail.get("fallback").is_some() => detail,
        _ => payload,
    };
    let fallback = body.get("fallback").and_then(Value::as_str)?;
    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
    Some(ApiError::JobFetch {
        error: text("error").unwrap_or_else(|| "job_fetch_failed".to_string()),
        message: text("message")
            .unwrap_or_else(|| "Failed to fetch the job description".to_string()),
        details: text("details"),
        fallback: fallback.to_string(),
    })
}

fn plain_text(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        422 => "Request validation failed",
        429 => "Too many requests",
        _ if status >= 500 => "An unexpected server error occurred",
        _ => "Request failed",
    }
}
