use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;

/// Path segments that identify a resource, collapsed so label cardinality
/// stays bounded.
static PATH_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^/api/grid/nodes/[^/]+$", "/api/grid/nodes/{node_id}"),
        (r"^/api/forecast/prices/(?:[^/]+)$", "/api/forecast/prices/{region}"),
        (
            r"^/api/consumer/recommendations/[^/]+$",
            "/api/consumer/recommendations/{profile_id}",
        ),
        (r"^/api/consumer/savings/[^/]+$", "/api/consumer/savings/{profile_id}"),
        (r"^/api/utility/overview/[^/]+$", "/api/utility/overview/{region}"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Collapse identifiers in a request path into their route template
pub fn normalize_path_for_metrics(path: &str) -> String {
    if path == "/api/forecast/prices/model-info" {
        return path.to_string();
    }
    PATH_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(path))
        .map_or_else(|| path.to_string(), |(_, replacement)| replacement.to_string())
}

/// Metrics middleware that tracks request metrics
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = normalize_path_for_metrics(request.uri().path());
    let start = Instant::now();

    gauge!("http_requests_in_flight").increment(1.0);
    let response = next.run(request).await;
    gauge!("http_requests_in_flight").decrement(1.0);

    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}
