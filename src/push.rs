//! The Push Driver: discovery against `git-receive-pack`, command selection,
//! pack generation, the update-request POST, and report-status parsing.
//!
//! Grounded on `gix-receive-pack::protocol::commands`'s command encoding and
//! `gix-receive-pack`'s report-status writer, both mirrored client-side.

use crate::capabilities::CapabilityNegotiator;
use crate::config::ClientOptions;
use crate::endpoint::{Endpoint, Service};
use crate::error::Result;
use crate::headers::HeaderBuilder;
use crate::model::{Command, RefAdvertisement, ReportStatus};
use crate::pack_generator::PackGenerator;
use crate::transport::{HttpClient, HttpRequest, Method};
use crate::wire::{discovery, report_status, update_request};

/// Outcome of a push attempt.
#[derive(Debug)]
pub struct PushOutcome {
    pub advertisement: RefAdvertisement,
    pub report: Option<ReportStatus>,
}

/// Run discovery against `git-receive-pack`, then (unless the caller's
/// selection is empty) generate a pack for the selected commands and push.
pub fn push(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    generator: &mut dyn PackGenerator,
    select: impl FnOnce(&RefAdvertisement) -> Vec<Command>,
) -> Result<PushOutcome> {
    let headers =
        HeaderBuilder::new(endpoint, options.capabilities(), options.extra_headers()).discovery_headers()?;
    let url = endpoint.discovery_url(Service::ReceivePack)?;
    let response =
        client.call(HttpRequest { method: Method::Get, url, headers, body: None, timeout: options.timeout() })?;
    let mut response_body = response.body;
    let advertisement = discovery::decode_advertisement(response_body.as_mut(), Service::ReceivePack)?;

    let commands = select(&advertisement);
    if commands.is_empty() {
        return Ok(PushOutcome { advertisement, report: None });
    }

    let (negotiated_caps, side_band, _ack_mode) =
        CapabilityNegotiator::negotiate(options.capabilities(), &advertisement.capabilities);

    let pack_body = generator.generate(&commands, options.pack_generator())?;
    let object_hash = commands
        .iter()
        .find_map(|c| match c {
            Command::Create { new, .. } | Command::Update { new, .. } => Some(new.kind()),
            Command::Delete { old, .. } => Some(old.kind()),
        })
        .unwrap_or(gix_hash::Kind::Sha1);
    let body = update_request::encode(&commands, &negotiated_caps, object_hash, &pack_body);

    let headers =
        HeaderBuilder::new(endpoint, options.capabilities(), options.extra_headers()).receive_pack_headers()?;
    let url = endpoint.service_url(Service::ReceivePack)?;
    let response = client.call(HttpRequest {
        method: Method::Post,
        url,
        headers,
        body: Some(body),
        timeout: options.timeout(),
    })?;
    let mut response_body = response.body;

    if !negotiated_caps.contains(&crate::capabilities::Capability::ReportStatus) {
        return Ok(PushOutcome { advertisement, report: None });
    }
    let report = report_status::decode_report_status(response_body.as_mut(), side_band)?;
    Ok(PushOutcome { advertisement, report: Some(report) })
}
