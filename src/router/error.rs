//! Route registration errors
//!
//! Every variant is a startup-time configuration fault: a router holding a
//! malformed template must never reach the listener.

use thiserror::Error;

/// Errors raised while compiling a route template
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route template is empty")]
    EmptyTemplate,

    #[error("route template '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// A `:` that is not followed by a lowercase parameter name
    #[error("route template '{template}' has a ':' without a parameter name at byte {position}")]
    DanglingMarker { template: String, position: usize },

    #[error("route template '{template}' did not compile: {source}")]
    Matcher {
        template: String,
        #[source]
        source: regex::Error,
    },
}
