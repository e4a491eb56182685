//! Response-writing surface
//!
//! Handlers write through the [`ResponseWriter`] trait: headers, then a
//! status, then body bytes. [`BufferedResponse`] is the sink the router
//! hands out; it turns into a hyper response once the handler returns.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;

/// Sink a handler writes its response into
///
/// The first `write_header` call fixes the status; later calls are ignored.
/// Writing body bytes before any status implies `200 OK`. Headers should be
/// set before the status is written.
pub trait ResponseWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_header(&mut self, status: StatusCode);

    fn write(&mut self, body: &[u8]);
}

impl dyn ResponseWriter + '_ {
    /// Write a status and a plain body in one go
    pub fn string_response(&mut self, status: StatusCode, body: &str) {
        self.write_header(status);
        self.write(body.as_bytes());
    }

    /// Reply with a plain-text error message
    pub fn error(&mut self, status: StatusCode, message: &str) {
        let headers = self.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert(
            "x-content-type-options",
            HeaderValue::from_static("nosniff"),
        );
        self.write_header(status);
        self.write(format!("{message}\n").as_bytes());
    }

    /// Serialize `value` as the JSON body
    ///
    /// An encoding failure is answered with `400 Bad Request` and the
    /// serializer's message instead.
    pub fn json_response<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.write_header(status);
                self.write(&body);
            }
            Err(e) => {
                crate::logger::log_warning(&format!("Failed to encode JSON response: {e}"));
                self.string_response(StatusCode::BAD_REQUEST, &e.to_string());
            }
        }
    }

    pub fn not_found(&mut self) {
        self.error(StatusCode::NOT_FOUND, "404 page not found");
    }

    /// 405 advertising the methods that do exist for the path
    pub fn method_not_allowed(&mut self, allowed: &[Method]) {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        match HeaderValue::from_str(&allow) {
            Ok(value) => {
                self.headers_mut().insert(ALLOW, value);
            }
            Err(e) => crate::logger::log_error(&format!("Invalid Allow header '{allow}': {e}")),
        }
        self.error(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
    }
}

/// In-memory response sink
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status the response will be sent with
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some(current) = self.status {
            crate::logger::log_debug(&format!(
                "Superfluous write_header({status}), response already has {current}"
            ));
            return;
        }
        self.status = Some(status);
    }

    fn write(&mut self, body: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(body);
    }
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(Full::new(Bytes::from("413 Payload Too Large")))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from(format!("400 Bad Request: {message}"))))
        .unwrap_or_else(|e| {
            log_build_error("400", &e);
            Response::new(Full::new(Bytes::from("400 Bad Request")))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
