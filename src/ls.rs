//! The thin Ref Discovery driver: a plain `GET` against either service with
//! no negotiation, used by callers that only want to list refs (`git
//! ls-remote`'s wire-level equivalent).

use crate::config::ClientOptions;
use crate::endpoint::{Endpoint, Service};
use crate::error::Result;
use crate::model::RefAdvertisement;
use crate::transport::HttpClient;

/// List the refs advertised for `service`, performing discovery only.
pub fn ls(client: &dyn HttpClient, endpoint: &Endpoint, options: &ClientOptions, service: Service) -> Result<RefAdvertisement> {
    match service {
        Service::UploadPack => crate::fetch::discover(client, endpoint, options),
        Service::ReceivePack => {
            let headers = crate::headers::HeaderBuilder::new(endpoint, options.capabilities(), options.extra_headers())
                .discovery_headers()?;
            let url = endpoint.discovery_url(Service::ReceivePack)?;
            let response = client.call(crate::transport::HttpRequest {
                method: crate::transport::Method::Get,
                url,
                headers,
                body: None,
                timeout: options.timeout(),
            })?;
            let mut response_body = response.body;
            crate::wire::discovery::decode_advertisement(response_body.as_mut(), Service::ReceivePack)
        }
    }
}
