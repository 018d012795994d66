use crate::data::CreatureRepository;
use crate::server::api::{self, ApiError};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(
    method: &str,
    path: &str,
    body: &str,
    repo: &dyn CreatureRepository,
) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    let result = match (method, route) {
        ("GET", "/api/health") => api::health_payload(repo),
        ("GET", "/api/creatures") | ("GET", "/api/creatures/") => api::creatures_payload(repo, path),
        ("GET", route) if route.starts_with("/api/creatures/") => {
            let id = route.trim_start_matches("/api/creatures/").split('/').next().unwrap_or("");
            api::creature_payload(repo, id)
        }
        ("POST", "/api/simulate") => api::simulate_payload(repo, body),
        ("POST", "/api/damage") => api::damage_payload(repo, body),
        ("GET", "/api/compare") => api::compare_payload(repo, path),
        ("POST", "/api/matchup") => api::matchup_payload(repo, body),
        _ => return error_response(404, "Not Found", "Route not found"),
    };

    match result {
        Ok(payload) => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body: payload,
        },
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    let (status_code, status_text) = err.status();
    if status_code >= 500 {
        tracing::error!(%err, "request failed");
    } else {
        tracing::debug!(%err, status_code, "request rejected");
    }
    error_response(status_code, status_text, &err.to_string())
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
