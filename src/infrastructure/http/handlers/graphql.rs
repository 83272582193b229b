//! GraphQL endpoint handlers

use std::sync::Arc;
use std::time::Instant;

use async_graphql::http::{receive_body, GraphiQLSource, MultipartOptions};
use bytes::Bytes;
use warp::http::StatusCode;
use warp::Reply;

use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::cookies::SessionCookie;
use crate::infrastructure::http::graphql::{AppSchema, RequestContext};
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

/// Everything the GraphQL handler needs besides the request itself
#[derive(Clone)]
pub struct GraphqlState {
    pub schema: AppSchema,
    pub cookie: Arc<SessionCookie>,
    pub rate_limit: Arc<RateLimitMiddleware>,
    pub monitoring: Arc<MonitoringAdapter>,
    pub security_headers: Arc<SecurityHeadersMiddleware>,
    pub max_upload_size: usize,
}

/// Execute a GraphQL request sent as JSON or as a multipart upload
pub async fn handle_graphql_request(
    content_type: Option<String>,
    session_cookie: Option<String>,
    body: Bytes,
    client_ip: String,
    state: GraphqlState,
) -> Result<warp::reply::Response, warp::Rejection> {
    let started = Instant::now();
    let request_id = LoggingUtils::generate_request_id();

    if let Err(e) = state.rate_limit.check(&client_ip) {
        LoggingUtils::log_rate_limit(&client_ip, "graphql");
        state.monitoring.record_rate_limited_request();
        return Ok(ResponseFormatter::from_app_error(&e, &state.security_headers));
    }

    let options = MultipartOptions::default()
        .max_file_size(state.max_upload_size)
        .max_num_files(1);
    let request = match receive_body(content_type, futures::io::Cursor::new(body), options).await {
        Ok(request) => request,
        Err(e) => {
            let error = AppError::Validation(format!("malformed GraphQL request: {}", e));
            LoggingUtils::log_error(&request_id, "parse", &error.to_string(), started.elapsed().as_millis() as u64);
            return Ok(ResponseFormatter::from_app_error(&error, &state.security_headers));
        }
    };

    let session_token = session_cookie.filter(|token| !token.trim().is_empty());
    let operation = request.operation_name.clone();
    LoggingUtils::log_graphql_request(&request_id, operation.as_deref(), &client_ip, session_token.is_some());

    let request = request.data(RequestContext {
        request_id: request_id.clone(),
        client_ip,
        session_token,
    });
    let response = state.schema.execute(request).await;

    let duration_ms = started.elapsed().as_millis() as u64;
    let operation = operation.as_deref().unwrap_or("anonymous");
    state.monitoring.record_graphql_request(response.is_ok(), duration_ms);
    if response.is_ok() {
        LoggingUtils::log_success(&request_id, operation, duration_ms);
    } else {
        let messages = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        LoggingUtils::log_error(&request_id, operation, &messages, duration_ms);
    }

    let extra_headers = response.http_headers.clone();
    let mut reply = ResponseFormatter::json(&response, StatusCode::OK, &state.security_headers);
    for (name, value) in extra_headers.iter() {
        reply.headers_mut().append(name.clone(), value.clone());
    }
    Ok(reply)
}

/// In-browser IDE pointed at the GraphQL endpoint
pub async fn handle_graphiql() -> Result<impl Reply, warp::Rejection> {
    Ok(warp::reply::html(GraphiQLSource::build().endpoint("/graphql").finish()))
}
