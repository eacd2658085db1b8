//! Endpoint representation and service-URL composition.
//!
//! Grounded on `gix-serve-core::protocol::ServiceKind` (the service-name
//! enum) and `gix-upload-pack::services::references` (which formats the
//! server's half of discovery; this is its client-side mirror: composing
//! the URL the discovery request is sent to).

use crate::error::{Error, Result};

/// The two Smart HTTP services this driver speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// The fetch/clone service.
    UploadPack,
    /// The push service.
    ReceivePack,
}

impl Service {
    /// The path suffix and `service=` query value for this service.
    pub fn name(self) -> &'static str {
        match self {
            Service::UploadPack => "git-upload-pack",
            Service::ReceivePack => "git-receive-pack",
        }
    }
}

/// URI scheme supported by the Smart HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// A decomposed URI: the pieces the URL composer needs to assemble a
/// discovery or service URL.
#[derive(Debug, Clone)]
pub struct Uri {
    /// `http` or `https`.
    pub scheme: Scheme,
    /// Userinfo (`user[:password]`), preserved but not inspected.
    pub userinfo: Option<String>,
    /// Host, e.g. `example.com`.
    pub host: Option<String>,
    /// Optional explicit port.
    pub port: Option<u16>,
    /// Repository path, without a leading service suffix, e.g. `/repo.git`.
    pub path: String,
}

impl Uri {
    fn authority(&self) -> Result<String> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| Error::InvalidEndpoint("missing host".into()))?;
        let mut authority = String::new();
        if let Some(userinfo) = &self.userinfo {
            authority.push_str(userinfo);
            authority.push('@');
        }
        authority.push_str(host);
        if let Some(port) = self.port {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        Ok(authority)
    }

    fn base(&self) -> Result<String> {
        Ok(format!("{}://{}{}", self.scheme.as_str(), self.authority()?, self.path))
    }
}

/// An HTTP(S) Smart endpoint: a URI plus caller-supplied headers that are
/// merged (never removed) by the [`crate::headers::HeaderBuilder`].
#[derive(Debug, Clone)]
pub struct Endpoint {
    uri: Uri,
    headers: Vec<(String, String)>,
}

impl Endpoint {
    /// Build an endpoint from a decomposed URI and caller headers.
    pub fn new(uri: Uri, headers: Vec<(String, String)>) -> Self {
        Self { uri, headers }
    }

    /// The endpoint's URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The caller-supplied headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Return a new endpoint with `uri` substituted, preserving headers.
    pub fn with_uri(&self, uri: Uri) -> Self {
        Self {
            uri,
            headers: self.headers.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.uri.host.is_none() {
            return Err(Error::InvalidEndpoint("missing host".into()));
        }
        Ok(())
    }

    /// The `GET .../info/refs?service=<svc>` discovery URL.
    pub fn discovery_url(&self, service: Service) -> Result<String> {
        self.validate()?;
        Ok(format!("{}/info/refs?service={}", self.uri.base()?, service.name()))
    }

    /// The `POST .../<svc>` service URL used for negotiation and push.
    pub fn service_url(&self, service: Service) -> Result<String> {
        self.validate()?;
        Ok(format!("{}/{}", self.uri.base()?, service.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Uri {
        Uri {
            scheme: Scheme::Https,
            userinfo: None,
            host: Some("example.com".into()),
            port: None,
            path: path.into(),
        }
    }

    #[test]
    fn discovery_url_has_service_query() {
        let ep = Endpoint::new(uri("/repo.git"), vec![]);
        assert_eq!(
            ep.discovery_url(Service::UploadPack).unwrap(),
            "https://example.com/repo.git/info/refs?service=git-upload-pack"
        );
    }

    #[test]
    fn service_url_has_service_suffix() {
        let ep = Endpoint::new(uri("/repo.git"), vec![]);
        assert_eq!(
            ep.service_url(Service::ReceivePack).unwrap(),
            "https://example.com/repo.git/git-receive-pack"
        );
    }

    #[test]
    fn preserves_userinfo_and_port() {
        let mut u = uri("/repo.git");
        u.userinfo = Some("alice".into());
        u.port = Some(8443);
        let ep = Endpoint::new(u, vec![]);
        assert_eq!(
            ep.service_url(Service::UploadPack).unwrap(),
            "https://alice@example.com:8443/repo.git/git-upload-pack"
        );
    }

    #[test]
    fn missing_host_is_invalid_endpoint() {
        let mut u = uri("/repo.git");
        u.host = None;
        let ep = Endpoint::new(u, vec![]);
        assert!(matches!(ep.discovery_url(Service::UploadPack), Err(Error::InvalidEndpoint(_))));
    }

    #[test]
    fn with_uri_preserves_headers() {
        let ep = Endpoint::new(uri("/repo.git"), vec![("X-Extra".into(), "1".into())]);
        let moved = ep.with_uri(uri("/other.git"));
        assert_eq!(moved.headers(), ep.headers());
    }
}
