//! Request-scoped routing context
//!
//! A matched request is handed to its handler as a [`RoutedRequest`]: a view
//! that borrows the original request and carries the path parameters the
//! route extracted. The original request is never modified, so the same
//! value can be dispatched again.
//!
//! Path parameter values arrive percent-decoded, and query parameters are
//! form-decoded (`%xx` and `+`) once when the view is built.

use hyper::body::Bytes;
use hyper::Request;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::ops::Deref;

/// Namespaced key for path parameters
///
/// Parameters live in their own key space so they cannot collide with
/// anything else attached to the request (e.g. typed extensions).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(String);

impl ContextKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path parameters extracted for one request, in template order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    params: Vec<(ContextKey, String)>,
}

impl RequestContext {
    /// Look up a parameter value
    ///
    /// When a template repeats a name the later marker shadows the earlier one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContextKey, &str)> {
        self.params.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// A request together with the path parameters of the route it matched
#[derive(Debug)]
pub struct RoutedRequest<'r> {
    request: &'r Request<Bytes>,
    context: RequestContext,
    query: Vec<(String, String)>,
}

impl<'r> RoutedRequest<'r> {
    /// Path parameter captured for the current request
    ///
    /// Returns `None` if `name` was not part of the matched template.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.context.get(name)
    }

    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    /// The underlying request
    pub const fn request(&self) -> &'r Request<Bytes> {
        self.request
    }

    /// Decoded value of a query string parameter, first occurrence wins
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Deref for RoutedRequest<'_> {
    type Target = Request<Bytes>;

    fn deref(&self) -> &Self::Target {
        self.request
    }
}

/// Attach extracted parameters to a request
///
/// `names` and `values` are zipped positionally and must be the same length.
/// Each value is percent-decoded on its own, so an encoded `/` stays inside
/// its segment.
pub fn build<'r>(
    request: &'r Request<Bytes>,
    names: &[String],
    values: Vec<String>,
) -> RoutedRequest<'r> {
    debug_assert_eq!(names.len(), values.len());
    let params = names
        .iter()
        .map(|name| ContextKey::new(name.as_str()))
        .zip(values.iter().map(|value| decode_segment(value)))
        .collect();

    RoutedRequest {
        request,
        context: RequestContext { params },
        query: parse_query(request.uri().query()),
    }
}

fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    let Some(query) = query else {
        return Vec::new();
    };
    serde_urlencoded::from_str(query).unwrap_or_else(|e| {
        crate::logger::log_debug(&format!("[Router] ignoring malformed query '{query}': {e}"));
        Vec::new()
    })
}
