//! Route template compilation
//!
//! A template such as `/todos/:id` is turned into an anchored regex
//! (`^/todos/([^/]+)$`) plus the ordered parameter names (`["id"]`).
//! Compilation happens once, at registration.

use regex::Regex;

use super::error::RouteError;

/// Capture group substituted for every `:name` marker
const PARAM_CAPTURE: &str = "([^/]+)";

/// Compiled route template
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    matcher: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a route template
    ///
    /// Literal text is escaped so it matches verbatim. Each `:name` marker
    /// (`name` is one or more of `a-z`) becomes a capture of one or more
    /// non-`/` characters.
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        if template.is_empty() {
            return Err(RouteError::EmptyTemplate);
        }
        if !template.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(template.to_string()));
        }

        let mut source = String::with_capacity(template.len() + 8);
        let mut param_names = Vec::new();
        let mut literal_start = 0;
        let bytes = template.as_bytes();
        let mut i = 0;

        source.push('^');
        while i < bytes.len() {
            if bytes[i] != b':' {
                i += 1;
                continue;
            }

            let name_start = i + 1;
            let name_end = bytes[name_start..]
                .iter()
                .position(|b| !b.is_ascii_lowercase())
                .map_or(bytes.len(), |n| name_start + n);
            if name_end == name_start {
                return Err(RouteError::DanglingMarker {
                    template: template.to_string(),
                    position: i,
                });
            }

            source.push_str(&regex::escape(&template[literal_start..i]));
            source.push_str(PARAM_CAPTURE);
            param_names.push(template[name_start..name_end].to_string());

            literal_start = name_end;
            i = name_end;
        }
        source.push_str(&regex::escape(&template[literal_start..]));
        source.push('$');

        let matcher = Regex::new(&source).map_err(|source| RouteError::Matcher {
            template: template.to_string(),
            source,
        })?;
        debug_assert_eq!(matcher.captures_len() - 1, param_names.len());

        Ok(Self {
            template: template.to_string(),
            matcher,
            param_names,
        })
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in template order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match `path` and return the captured parameter values in group order
    ///
    /// The returned vector always has `param_names().len()` entries.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.matcher.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}
