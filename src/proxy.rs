//! Proxy configuration for a [`Request`](crate::Request).
//!
//! The library only plumbs these options through to the transport; connect
//! and authentication behavior is whatever the transport implements.

/// The kind of proxy to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    /// A plain HTTP proxy.
    Http,
    /// An HTTPS proxy, the connection to the proxy itself is encrypted.
    Https,
}

impl ProxyType {
    /// The url scheme used to reach a proxy of this type.
    pub(crate) fn scheme(&self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
        }
    }
}

/// The authentication methods allowed when talking to a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpAuthType {
    /// Basic HTTP authentication, this is the default value.
    Basic,
    /// All available authentication methods, the transport picks the most
    /// secure one the proxy offers.
    Any,
    /// All available 'secure/safe' authentication methods.
    AnySafe,
}

/// Proxy settings for a single request.
#[derive(Debug, Clone)]
pub struct ProxyData {
    /// The type of proxy to connect to.
    pub proxy_type: ProxyType,
    /// The proxy hostname to connect to.
    pub host: String,
    /// The proxy port to connect to.
    pub port: u16,
    /// The username for authentication with the proxy.
    pub username: Option<String>,
    /// The password for authentication with the proxy.
    pub password: Option<String>,
    /// The authentication method(s) allowed with the proxy; `None` means the
    /// transport's default (basic).
    pub auth_types: Option<Vec<HttpAuthType>>,
}

impl ProxyData {
    /// Creates proxy settings for the given type, host and port without
    /// credentials.
    pub fn new(proxy_type: ProxyType, host: impl Into<String>, port: u16) -> Self {
        Self {
            proxy_type,
            host: host.into(),
            port,
            username: None,
            password: None,
            auth_types: None,
        }
    }

    /// Sets the credentials used to authenticate with the proxy.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the allowed authentication methods.
    pub fn with_auth_types(mut self, auth_types: Vec<HttpAuthType>) -> Self {
        self.auth_types = Some(auth_types);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_fields() {
        let proxy = ProxyData::new(ProxyType::Http, "localhost", 3128)
            .with_credentials("guest", "guest")
            .with_auth_types(vec![HttpAuthType::Basic]);

        assert_eq!(proxy.proxy_type, ProxyType::Http);
        assert_eq!(proxy.host, "localhost");
        assert_eq!(proxy.port, 3128);
        assert_eq!(proxy.username.as_deref(), Some("guest"));
        assert_eq!(proxy.password.as_deref(), Some("guest"));
        assert_eq!(proxy.auth_types.as_deref(), Some(&[HttpAuthType::Basic][..]));
    }

    #[test]
    fn proxy_type_scheme() {
        assert_eq!(ProxyType::Http.scheme(), "http");
        assert_eq!(ProxyType::Https.scheme(), "https");
    }
}
