//! Access log format module
//!
//! Supports multiple log formats:
//! - `text` (one line per request plus the response body, if any)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;

/// Variables recognised by custom access log formats
const CUSTOM_VARIABLES: [&str; 8] = [
    "time_local",
    "time_iso8601",
    "request_time",
    "request_method",
    "request_uri",
    "route",
    "status",
    "response_body",
];

/// Access log entry for one dispatched request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// Template of the route that handled the request
    pub route: Option<String>,
    /// Response status code
    pub status: u16,
    /// Last body write of the response
    pub response_body: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(method: String, path: String) -> Self {
        Self {
            time: Local::now(),
            method,
            path,
            query: None,
            route: None,
            status: 200,
            response_body: None,
            request_time_us: 0,
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "text" => self.format_text(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// `[$time_local] $method $uri resolved with status $status (took Nms)`
    fn format_text(&self) -> String {
        let mut line = format!(
            "[{}] {} {} resolved with status {} (took {}ms)",
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.request_uri(),
            self.status,
            self.request_time_us / 1000,
        );
        if let Some(body) = &self.response_body {
            line.push_str("\n\tresponse: ");
            line.push_str(body.trim_end());
        }
        line
    }

    /// JSON structured log format
    fn format_json(&self) -> String {
        serde_json::json!({
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "route": self.route,
            "status": self.status,
            "response": self.response_body,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI with query string
    /// - `$route` - Matched route template, `-` when nothing matched
    /// - `$status` - Response status code
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    /// - `$response_body` - Last body write, `-` when empty
    ///
    /// Substitution is a single pass; inserted values are never re-scanned.
    fn format_custom(&self, pattern: &str) -> String {
        let mut line = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            line.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let variable = CUSTOM_VARIABLES
                .iter()
                .filter(|name| after.starts_with(**name))
                .max_by_key(|name| name.len());
            match variable {
                Some(name) => {
                    line.push_str(&self.variable(name));
                    rest = &after[name.len()..];
                }
                None => {
                    line.push('$');
                    rest = after;
                }
            }
        }
        line.push_str(rest);
        line
    }

    fn variable(&self, name: &str) -> String {
        match name {
            "time_local" => self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = self.request_time_us as f64 / 1_000_000.0;
                format!("{seconds:.3}")
            }
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "route" => self.route.clone().unwrap_or_else(|| "-".to_string()),
            "status" => self.status.to_string(),
            "response_body" => self
                .response_body
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            _ => String::new(),
        }
    }
}
