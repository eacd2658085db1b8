//! The Fetch Driver: discovery, capability negotiation, the want/have
//! negotiation loop, and PACK ingestion.
//!
//! Grounded on `gix-upload-pack::server::negotiation::NegotiationEngine`'s
//! round loop, flipped from the server writing ACKs to the client reading
//! them and deciding what to offer next via a [`Negotiator`] collaborator.

use std::collections::BTreeSet;

use bstr::BStr;
use gix_hash::ObjectId;
use gix_packetline_blocking::{PacketLineRef, StreamingPeekableIter};

use crate::capabilities::{AckMode, CapabilityNegotiator, SideBandMode};
use crate::config::ClientOptions;
use crate::endpoint::{Endpoint, Service};
use crate::error::{Error, Result};
use crate::headers::HeaderBuilder;
use crate::mailbox::Mailbox;
use crate::model::{Acks, NegotiationMarker, RefAdvertisement, WantRequest};
use crate::negotiator::{Negotiator, NegotiatorStep};
use crate::store::{RefTarget, Store};
use crate::transport::{HttpClient, HttpRequest, Method};
use crate::wire::{discovery, negotiation, pack, upload_request};

/// What the caller selected from the advertisement: the wanted object ids
/// plus the ref names they should be written under once the pack lands.
pub struct WantSelection {
    pub wants: Vec<ObjectId>,
    pub ref_updates: Vec<(bstr::BString, ObjectId)>,
    pub shallow: Vec<ObjectId>,
    pub deepen: Option<u32>,
}

/// Outcome of a completed fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    pub advertisement: RefAdvertisement,
    pub pack_id: ObjectId,
    pub object_count: usize,
    pub rounds: u32,
    /// The local refs written as part of this fetch, `(name, target)`. Empty
    /// when the selection was empty (nothing to fetch).
    pub ref_updates: Vec<(bstr::BString, ObjectId)>,
}

/// Run discovery, negotiate, and (unless the caller's selection is empty)
/// fetch and ingest a pack, writing the selected refs into `store`.
pub fn fetch(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    store: &mut dyn Store,
    negotiator: &mut dyn Negotiator,
    select: impl FnOnce(&RefAdvertisement) -> WantSelection,
) -> Result<FetchOutcome> {
    let advertisement = discover(client, endpoint, options)?;
    let (negotiated_caps, side_band, ack_mode) =
        CapabilityNegotiator::negotiate(options.capabilities(), &advertisement.capabilities);

    let selection = select(&advertisement);
    if selection.wants.is_empty() {
        return Ok(FetchOutcome {
            advertisement,
            pack_id: ObjectId::null(gix_hash::Kind::Sha1),
            object_count: 0,
            rounds: 0,
            ref_updates: Vec::new(),
        });
    }

    let have_mbox = Mailbox::new(BTreeSet::<ObjectId>::new());
    let mut rounds = 0u32;
    let mut acks = Acks::default();

    loop {
        let step = negotiator.next_round(&acks);
        let (marker, haves_this_round) = match step {
            NegotiatorStep::Done => {
                // Stateless POSTs mean the terminal `done` round must still
                // carry every `have` negotiated so far, plus whatever the
                // previous round's acks just confirmed as common — dropping
                // either would make the server treat the client as having
                // nothing in common after all the earlier `Flush` rounds.
                let mut haves = have_mbox.take();
                haves.extend(acks.common_oids());
                have_mbox.put(haves.clone());
                (NegotiationMarker::Done, haves)
            }
            NegotiatorStep::Haves(new_haves) => {
                let mut haves = have_mbox.take();
                haves.extend(new_haves);
                have_mbox.put(haves.clone());
                (NegotiationMarker::Flush, haves)
            }
        };

        let want_request = WantRequest::new(
            selection.wants.clone(),
            haves_this_round,
            selection.shallow.clone(),
            selection.deepen,
            negotiated_caps.clone(),
        )
        .expect("selection.wants already checked non-empty above");

        let body = upload_request::encode(&want_request, marker);
        let headers =
            HeaderBuilder::new(endpoint, options.capabilities(), options.extra_headers()).upload_pack_headers()?;
        let url = endpoint.service_url(Service::UploadPack)?;
        let response = client.call(HttpRequest {
            method: Method::Post,
            url,
            headers,
            body: Some(body),
            timeout: options.timeout(),
        })?;
        let mut response_body = response.body;
        rounds += 1;

        if marker == NegotiationMarker::Done {
            let reader = crate::wire::BodyReader::new(response_body.as_mut());
            let mut iter = StreamingPeekableIter::new(reader, &[PacketLineRef::Flush], false);
            if ack_mode != AckMode::Ack || side_band != SideBandMode::None {
                let _ = negotiation::decode_negotiation_result(&mut iter)?;
            }
            return ingest_pack(iter, side_band, store, &selection.ref_updates, &advertisement, rounds);
        }

        let reader = crate::wire::BodyReader::new(response_body.as_mut());
        let mut iter = StreamingPeekableIter::new(reader, &[PacketLineRef::Flush], false);
        acks = negotiation::decode_acks(&mut iter)?;

        if acks.is_ready() {
            return ingest_pack(iter, side_band, store, &selection.ref_updates, &advertisement, rounds);
        }
    }
}

/// Discovery-only ref listing, used directly by the `ls` driver and by
/// [`fetch`] before negotiation.
pub fn discover(client: &dyn HttpClient, endpoint: &Endpoint, options: &ClientOptions) -> Result<RefAdvertisement> {
    let headers =
        HeaderBuilder::new(endpoint, options.capabilities(), options.extra_headers()).discovery_headers()?;
    let url = endpoint.discovery_url(Service::UploadPack)?;
    let response =
        client.call(HttpRequest { method: Method::Get, url, headers, body: None, timeout: options.timeout() })?;
    let mut response_body = response.body;
    discovery::decode_advertisement(response_body.as_mut(), Service::UploadPack)
}

fn ingest_pack<R: std::io::Read>(
    iter: StreamingPeekableIter<R>,
    side_band: SideBandMode,
    store: &mut dyn Store,
    ref_updates: &[(bstr::BString, ObjectId)],
    advertisement: &RefAdvertisement,
    rounds: u32,
) -> Result<FetchOutcome> {
    let mut pack_reader = pack::PackReader::new(iter, side_band, |_progress: &[u8]| {});
    let (pack_id, object_count) = store.pack_from(&mut pack_reader)?;
    if let Some(msg) = pack_reader.take_error() {
        return Err(Error::Sync(msg));
    }

    for (name, target) in ref_updates {
        store.write_ref(BStr::new(name.as_slice()), RefTarget::Hash(*target))?;
    }
    Ok(FetchOutcome {
        advertisement: advertisement.clone(),
        pack_id,
        object_count,
        rounds,
        ref_updates: ref_updates.to_vec(),
    })
}
