use std::fmt::Write;

use crate::escape::escape;

/// Accumulates the parts of a url and renders them as
/// `scheme://host[:port][/path[/...]][?name=value&...][#fragment]`.
///
/// Query parameter values are percent-encoded on [`build`](Self::build);
/// path parts are emitted verbatim. Building resets the internal state so
/// one builder can be reused for many urls.
///
/// ```
/// use lift::QueryBuilder;
///
/// let url = QueryBuilder::new()
///     .scheme("http")
///     .hostname("localhost")
///     .port(8080)
///     .append_path_part("api")
///     .append_path_part("v1")
///     .append_query_parameter("page", "2")
///     .build();
///
/// assert_eq!(url, "http://localhost:8080/api/v1?page=2");
/// ```
#[derive(Debug, Default)]
pub struct QueryBuilder {
    scheme: String,
    hostname: String,
    port: u16,
    path_parts: Vec<String>,
    // Query parameters are kept unescaped and escaped in build().
    query_parameters: Vec<(String, String)>,
    fragment: String,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the url scheme, e.g. `http`.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the url hostname. No `www.` prefix is injected, if you want one
    /// make sure it is already there.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Sets the url port. A port of zero is omitted from the built url.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Appends one path part, without any `/` separators. Parts are emitted
    /// in the order they are appended.
    pub fn append_path_part(mut self, path_part: impl Into<String>) -> Self {
        self.path_parts.push(path_part.into());
        self
    }

    /// Appends one query parameter with its unescaped value. Parameters are
    /// not de-duplicated and are emitted in the order they are appended.
    pub fn append_query_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.query_parameters.push((name.into(), value.into()));
        self
    }

    /// Sets the url fragment.
    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = fragment.into();
        self
    }

    /// Renders the url accumulated since the last `build` call and resets
    /// the builder for the next one.
    pub fn build(&mut self) -> String {
        let mut url = String::new();

        if !self.scheme.is_empty() {
            url.push_str(&self.scheme);
        }
        url.push_str("://");
        if !self.hostname.is_empty() {
            url.push_str(&self.hostname);
        }
        if self.port != 0 {
            let _ = write!(url, ":{}", self.port);
        }
        for part in &self.path_parts {
            url.push('/');
            url.push_str(part);
        }
        for (i, (name, value)) in self.query_parameters.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&escape(value));
        }
        if !self.fragment.is_empty() {
            url.push('#');
            url.push_str(&self.fragment);
        }

        self.reset();
        url
    }

    fn reset(&mut self) {
        self.scheme.clear();
        self.hostname.clear();
        self.port = 0;
        self.path_parts.clear();
        self.query_parameters.clear();
        self.fragment.clear();
    }
}
