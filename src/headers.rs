//! Required header construction for discovery and service requests.
//!
//! Grounded on `gix-upload-pack::types::ServerCapabilities::agent` (the
//! `agent=git/gitoxide-<version>` convention) mirrored here as the
//! `User-Agent` the client sends rather than negotiates, per the design
//! note in spec.md §9: the `Agent` capability is excluded from the
//! negotiated intersection and instead drives this header.

use crate::capabilities::{Capability, CapabilitySet};
use crate::endpoint::{Endpoint, Service};
use crate::error::{Error, Result};

const UPLOAD_PACK_CONTENT_TYPE: &str = "application/x-git-upload-pack-request";
const RECEIVE_PACK_CONTENT_TYPE: &str = "application/x-git-receive-pack-request";

/// Builds the headers required for a negotiation or push POST, merging the
/// endpoint's caller-supplied headers over the computed defaults. Required
/// headers are never removed by caller overrides of the same name; callers
/// may only add to or replace non-required headers.
pub struct HeaderBuilder<'a> {
    endpoint: &'a Endpoint,
    capabilities: &'a CapabilitySet,
    extra_headers: &'a [(String, String)],
}

impl<'a> HeaderBuilder<'a> {
    /// Create a header builder bound to an endpoint, the client's
    /// advertised capability set (used to derive `User-Agent`), and the
    /// caller's configured extra headers (`ClientOptions::extra_headers`).
    pub fn new(endpoint: &'a Endpoint, capabilities: &'a CapabilitySet, extra_headers: &'a [(String, String)]) -> Self {
        Self { endpoint, capabilities, extra_headers }
    }

    fn user_agent(&self) -> Result<String> {
        match self.capabilities.agent() {
            Some(agent) => Ok(agent.to_owned()),
            None => Err(Error::InvalidCapabilities(
                "client capability set is missing an Agent entry required for User-Agent".into(),
            )),
        }
    }

    /// Headers for the discovery `GET`.
    pub fn discovery_headers(&self) -> Result<Vec<(String, String)>> {
        self.merged(vec![("User-Agent".into(), self.user_agent()?)])
    }

    /// Headers for the negotiation POST to `git-upload-pack`.
    pub fn upload_pack_headers(&self) -> Result<Vec<(String, String)>> {
        self.merged(vec![
            ("User-Agent".into(), self.user_agent()?),
            ("Content-Type".into(), content_type_for(Service::UploadPack).into()),
        ])
    }

    /// Headers for the update-request POST to `git-receive-pack`.
    pub fn receive_pack_headers(&self) -> Result<Vec<(String, String)>> {
        self.merged(vec![
            ("User-Agent".into(), self.user_agent()?),
            ("Content-Type".into(), content_type_for(Service::ReceivePack).into()),
        ])
    }

    fn merged(&self, required: Vec<(String, String)>) -> Result<Vec<(String, String)>> {
        let mut headers = required;
        for (name, value) in self.extra_headers.iter().chain(self.endpoint.headers()) {
            if headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                continue;
            }
            headers.push((name.clone(), value.clone()));
        }
        Ok(headers)
    }
}

/// Content-Type expected on the matching service's request body.
pub fn content_type_for(service: Service) -> &'static str {
    match service {
        Service::UploadPack => UPLOAD_PACK_CONTENT_TYPE,
        Service::ReceivePack => RECEIVE_PACK_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Scheme, Uri};

    fn endpoint(headers: Vec<(String, String)>) -> Endpoint {
        Endpoint::new(
            Uri {
                scheme: Scheme::Https,
                userinfo: None,
                host: Some("example.com".into()),
                port: None,
                path: "/repo.git".into(),
            },
            headers,
        )
    }

    #[test]
    fn missing_agent_is_programmer_error() {
        let ep = endpoint(vec![]);
        let caps = CapabilitySet::empty();
        let builder = HeaderBuilder::new(&ep, &caps, &[]);
        assert!(matches!(builder.discovery_headers(), Err(Error::InvalidCapabilities(_))));
    }

    #[test]
    fn caller_headers_cannot_override_required() {
        let ep = endpoint(vec![("Content-Type".into(), "text/plain".into())]);
        let mut caps = CapabilitySet::empty();
        caps.push(Capability::Agent("git/test-1.0".into()));
        let builder = HeaderBuilder::new(&ep, &caps, &[]);
        let headers = builder.upload_pack_headers().unwrap();
        let content_type = headers.iter().find(|(n, _)| n == "Content-Type").unwrap();
        assert_eq!(content_type.1, UPLOAD_PACK_CONTENT_TYPE);
    }

    #[test]
    fn caller_headers_merge_in() {
        let ep = endpoint(vec![("X-Extra".into(), "1".into())]);
        let mut caps = CapabilitySet::empty();
        caps.push(Capability::Agent("git/test-1.0".into()));
        let builder = HeaderBuilder::new(&ep, &caps, &[]);
        let headers = builder.discovery_headers().unwrap();
        assert!(headers.iter().any(|(n, v)| n == "X-Extra" && v == "1"));
    }

    #[test]
    fn extra_headers_from_options_merge_in_but_cannot_override_required() {
        let ep = endpoint(vec![]);
        let mut caps = CapabilitySet::empty();
        caps.push(Capability::Agent("git/test-1.0".into()));
        let extra = vec![("X-Client".into(), "gix-smart-http".into()), ("Content-Type".into(), "text/plain".into())];
        let builder = HeaderBuilder::new(&ep, &caps, &extra);
        let headers = builder.upload_pack_headers().unwrap();
        assert!(headers.iter().any(|(n, v)| n == "X-Client" && v == "gix-smart-http"));
        let content_type = headers.iter().find(|(n, _)| n == "Content-Type").unwrap();
        assert_eq!(content_type.1, UPLOAD_PACK_CONTENT_TYPE);
    }
}
