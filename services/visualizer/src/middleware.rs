//! Request logging and CORS

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::config::CorsConfig;

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(&request);

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = duration.as_millis(),
        client_ip = %client_ip,
        "Request processed"
    );

    response
}

fn is_wildcard(items: &[String]) -> bool {
    items.iter().any(|item| item == "*")
}

/// CORS layer factory.
///
/// A `*` entry means any value. Browsers refuse wildcards on credentialed
/// requests, so with credentials enabled a wildcard mirrors the request instead.
pub fn create_cors_layer(cors_config: &CorsConfig) -> CorsLayer {
    let credentials = cors_config.allow_credentials;
    let mut cors = CorsLayer::new()
        .allow_credentials(credentials)
        .max_age(Duration::from_secs(cors_config.max_age_seconds));

    cors = if !is_wildcard(&cors_config.allowed_origins) {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    } else if credentials {
        cors.allow_origin(AllowOrigin::mirror_request())
    } else {
        cors.allow_origin(Any)
    };

    cors = if !is_wildcard(&cors_config.allowed_methods) {
        let methods: Vec<Method> = cors_config
            .allowed_methods
            .iter()
            .filter_map(|method| method.parse().ok())
            .collect();
        cors.allow_methods(methods)
    } else if credentials {
        cors.allow_methods(AllowMethods::mirror_request())
    } else {
        cors.allow_methods(Any)
    };

    if !is_wildcard(&cors_config.allowed_headers) {
        let headers: Vec<HeaderName> = cors_config
            .allowed_headers
            .iter()
            .filter_map(|header| header.parse().ok())
            .collect();
        cors.allow_headers(headers)
    } else if credentials {
        cors.allow_headers(AllowHeaders::mirror_request())
    } else {
        cors.allow_headers(Any)
    }
}

/// Extract client IP from proxy headers
fn get_client_ip(request: &Request) -> String {
    if let Some(forwarded_for) = request.headers().get("X-Forwarded-For")
        && let Ok(forwarded_str) = forwarded_for.to_str()
        && let Some(first_ip) = forwarded_str.split(',').next()
    {
        return first_ip.trim().to_string();
    }

    if let Some(real_ip) = request.headers().get("X-Real-IP")
        && let Ok(real_ip_str) = real_ip.to_str()
    {
        return real_ip_str.to_string();
    }

    "unknown".to_string()
}
