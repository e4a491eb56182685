//! Request router
//!
//! Routes are registered at startup as (method, template, handler) and kept
//! in registration order. Dispatch walks them in that order:
//! - the first route whose pattern and method both match handles the request
//! - routes whose pattern matches but method does not feed the `Allow` header
//!   of a 405 when nothing matches fully
//! - with no pattern match at all the answer is 404
//!
//! Registration takes `&mut Router`; once the router is shared as
//! `Arc<Router>` the table is read-only and dispatch needs no locking.
//! Routes cannot be added while traffic is being served.
//!
//! Handler panics are not caught here.

pub mod context;
mod error;
pub mod observe;
mod pattern;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::time::Instant;

use crate::http::{BufferedResponse, ResponseWriter};
use crate::logger::{self, AccessLogEntry};

pub use context::RoutedRequest;
pub use error::RouteError;
pub use observe::ObservedResponse;
pub use pattern::RoutePattern;

/// Boxed request handler
pub type Handler = Box<dyn Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync>;

/// One registered route
pub struct Route {
    method: Method,
    pattern: RoutePattern,
    handler: Handler,
}

impl Route {
    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.pattern.template())
            .finish_non_exhaustive()
    }
}

/// Ordered route table and dispatcher
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and append a route
    ///
    /// Earlier routes take precedence over later ones.
    pub fn add_route<F>(
        &mut self,
        method: Method,
        template: &str,
        handler: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync + 'static,
    {
        let pattern = RoutePattern::compile(template)?;
        logger::log_debug(&format!(
            "[Router] {method} {template} -> params {:?}",
            pattern.param_names()
        ));
        self.routes.push(Route {
            method,
            pattern,
            handler: Box::new(handler),
        });
        Ok(self)
    }

    pub fn get<F>(&mut self, template: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::GET, template, handler)
    }

    pub fn post<F>(&mut self, template: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::POST, template, handler)
    }

    pub fn put<F>(&mut self, template: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::PUT, template, handler)
    }

    pub fn patch<F>(&mut self, template: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::PATCH, template, handler)
    }

    pub fn delete<F>(&mut self, template: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut dyn ResponseWriter, &RoutedRequest<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::DELETE, template, handler)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handle one request into a buffered hyper response
    pub fn serve(&self, req: &Request<Bytes>) -> Response<Full<Bytes>> {
        let mut sink = BufferedResponse::new();
        self.dispatch(req, &mut sink);
        sink.into_response()
    }

    /// Select and run the handler for `req`, writing the outcome into `w`
    ///
    /// Emits exactly one access log line, 404 and 405 answers included.
    pub fn dispatch(&self, req: &Request<Bytes>, w: &mut dyn ResponseWriter) {
        let entry = self.route_request(req, w);
        logger::log_access(&entry);
    }

    fn route_request(&self, req: &Request<Bytes>, w: &mut dyn ResponseWriter) -> AccessLogEntry {
        let started = Instant::now();
        let method = req.method();
        // Matching runs on the raw path; captured values are decoded per segment
        let path = req.uri().path();
        logger::log_debug(&format!("[Router] received {method} {}", req.uri()));

        let mut observed = ObservedResponse::new(w, started);
        let mut allow: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(values) = route.pattern.captures(path) else {
                continue;
            };
            if route.method != *method {
                if !allow.contains(&route.method) {
                    allow.push(route.method.clone());
                }
                continue;
            }

            let template = route.pattern.template();
            let routed = context::build(req, route.pattern.param_names(), values);
            logger::log_debug(&format!(
                "[Router] {template} matched [{}]",
                routed.context()
            ));
            (route.handler)(&mut observed, &routed);
            observed.finish();
            return observed.access_entry(method.as_str(), req.uri(), Some(template));
        }

        {
            let sink: &mut dyn ResponseWriter = &mut observed;
            if allow.is_empty() {
                sink.not_found();
            } else {
                sink.method_not_allowed(&allow);
            }
        }
        observed.finish();
        observed.access_entry(method.as_str(), req.uri(), None)
    }
}
