//! Observability wrapper around the response sink
//!
//! Records what a handler sent (first status, last body write, elapsed time)
//! while forwarding every write untouched. The router turns the record into
//! one access log entry per request.

use hyper::header::HeaderMap;
use hyper::{StatusCode, Uri};
use std::time::{Duration, Instant};

use crate::http::ResponseWriter;
use crate::logger::AccessLogEntry;

/// Response sink decorator that captures the outcome of one request
pub struct ObservedResponse<'w> {
    inner: &'w mut dyn ResponseWriter,
    /// First status written or implied by a body write, 0 until then
    status: u16,
    /// Bytes of the most recent body write
    body: String,
    elapsed: Duration,
    started: Instant,
}

impl<'w> ObservedResponse<'w> {
    /// Wrap `inner`; elapsed time is measured from `started`
    pub fn new(inner: &'w mut dyn ResponseWriter, started: Instant) -> Self {
        Self {
            inner,
            status: 0,
            body: String::new(),
            elapsed: Duration::ZERO,
            started,
        }
    }

    /// Stop the clock
    pub fn finish(&mut self) {
        self.elapsed = self.started.elapsed();
    }

    /// Status the client receives: an unset status goes out as 200
    pub const fn resolved_status(&self) -> u16 {
        if self.status == 0 {
            200
        } else {
            self.status
        }
    }

    /// Describe this request as an access log entry
    ///
    /// `route` is the matched template, `None` for 404 and 405 answers.
    pub fn access_entry(&self, method: &str, uri: &Uri, route: Option<&str>) -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(method.to_string(), uri.path().to_string());
        entry.query = uri.query().map(ToString::to_string);
        entry.route = route.map(ToString::to_string);
        entry.status = self.resolved_status();
        entry.request_time_us = u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX);
        if !self.body.is_empty() {
            entry.response_body = Some(self.body.clone());
        }
        entry
    }
}

impl ResponseWriter for ObservedResponse<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.status == 0 {
            self.status = status.as_u16();
        }
        self.inner.write_header(status);
    }

    fn write(&mut self, body: &[u8]) {
        // a body write commits the status, as it does on the sink
        if self.status == 0 {
            self.status = StatusCode::OK.as_u16();
        }
        self.body = String::from_utf8_lossy(body).into_owned();
        self.inner.write(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::BufferedResponse;

    #[test]
    fn test_captures_first_status_and_last_body() {
        let mut sink = BufferedResponse::new();
        let mut observed = ObservedResponse::new(&mut sink, Instant::now());

        observed.write_header(StatusCode::CREATED);
        observed.write_header(StatusCode::BAD_GATEWAY);
        observed.write(b"first");
        observed.write(b"second");
        observed.finish();

        assert_eq!(observed.status, 201);
        assert_eq!(observed.body, "second");
        drop(observed);

        // the real sink saw every byte, unmodified
        assert_eq!(sink.status(), StatusCode::CREATED);
        assert_eq!(sink.body(), b"firstsecond");
    }

    #[test]
    fn test_headers_pass_through() {
        let mut sink = BufferedResponse::new();
        let mut observed = ObservedResponse::new(&mut sink, Instant::now());
        observed
            .headers_mut()
            .insert("x-trace", hyper::header::HeaderValue::from_static("1"));
        drop(observed);
        assert_eq!(sink.headers()["x-trace"], "1");
    }

    #[test]
    fn test_unset_status_resolves_to_ok() {
        let mut sink = BufferedResponse::new();
        let mut observed = ObservedResponse::new(&mut sink, Instant::now());
        observed.finish();
        assert_eq!(observed.status, 0);
        assert_eq!(observed.resolved_status(), 200);
    }

    #[test]
    fn test_status_after_body_matches_what_client_gets() {
        let mut sink = BufferedResponse::new();
        let mut observed = ObservedResponse::new(&mut sink, Instant::now());
        observed.write(b"hi");
        observed.write_header(StatusCode::NOT_FOUND);
        observed.finish();

        let entry = observed.access_entry("GET", &Uri::from_static("/hi"), Some("/hi"));
        assert_eq!(entry.status, 200);
        drop(observed);
        assert_eq!(sink.status(), StatusCode::OK);
    }

    #[test]
    fn test_access_entry_fields() {
        let mut sink = BufferedResponse::new();
        let mut observed = ObservedResponse::new(&mut sink, Instant::now());
        observed.write_header(StatusCode::NOT_FOUND);
        observed.write(b"Todo Not Found\n");
        observed.finish();

        let uri = Uri::from_static("/todos/9?verbose=1");
        let entry = observed.access_entry("GET", &uri, Some("/todos/:id"));
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/todos/9");
        assert_eq!(entry.query.as_deref(), Some("verbose=1"));
        assert_eq!(entry.route.as_deref(), Some("/todos/:id"));
        assert_eq!(entry.status, 404);
        assert_eq!(entry.response_body.as_deref(), Some("Todo Not Found\n"));
    }

    #[test]
    fn test_empty_last_write_leaves_no_body() {
        let mut sink = BufferedResponse::new();
        let mut observed = ObservedResponse::new(&mut sink, Instant::now());
        observed.write_header(StatusCode::NO_CONTENT);
        observed.write(b"");
        observed.finish();

        let entry = observed.access_entry("DELETE", &Uri::from_static("/todos/1"), None);
        assert_eq!(entry.status, 204);
        assert!(entry.response_body.is_none());
        assert!(entry.query.is_none());
    }
}
