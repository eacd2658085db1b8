//! Thin orchestration policies layered over the fetch/push/ls drivers:
//! `clone`, `fetch_one`, `fetch_some`, `fetch_all`, and
//! `update_and_create`. None of these add protocol behavior of their own —
//! they only decide which refs the underlying drivers should select, and
//! (for `clone`) write the local ref and `HEAD` once the fetch succeeds.

use std::collections::BTreeMap;

use bstr::{BStr, BString};
use gix_hash::ObjectId;

use crate::config::ClientOptions;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::fetch::{fetch, FetchOutcome, WantSelection};
use crate::model::{Command, RefAdvertisement};
use crate::negotiator::Negotiator;
use crate::pack_generator::PackGenerator;
use crate::push::{push, PushOutcome};
use crate::store::{RefTarget, Store, HEAD};
use crate::transport::HttpClient;

/// Fetch a single named remote ref and point the local ref and `HEAD` at
/// it. Fails with `Sync` if the fetch's selection did not resolve to
/// exactly that one ref (e.g. the server's advertisement did not contain
/// it), matching the "unexpected cardinality" check clone performs before
/// touching `HEAD`.
pub fn clone(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    store: &mut dyn Store,
    negotiator: &mut dyn Negotiator,
    ref_name: &BStr,
) -> Result<FetchOutcome> {
    let wanted = ref_name.to_owned();
    let outcome = fetch(client, endpoint, options, store, negotiator, |advertisement| {
        select_named(advertisement, &wanted)
    })?;

    match outcome.ref_updates.as_slice() {
        [_single] => {
            // The local ref itself was already written by `fetch`'s pack
            // ingestion, strictly before this point — HEAD only ever moves
            // after that write has succeeded.
            store.write_ref(BStr::new(HEAD.as_bytes()), RefTarget::Ref(ref_name.to_owned()))?;
            Ok(outcome)
        }
        other => Err(Error::Sync(format!(
            "Unexpected result: expected exactly one updated ref from clone({ref_name}), got {}",
            other.len()
        ))),
    }
}

/// Fetch every advertised ref, as a full mirror would. Unlike `clone`, this
/// has no single-ref cardinality to check and never touches `HEAD`.
/// Shallow/unshallow acks the server sends back are read and discarded —
/// this crate does not maintain a shallow boundary of its own.
pub fn fetch_all(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    store: &mut dyn Store,
    negotiator: &mut dyn Negotiator,
) -> Result<FetchOutcome> {
    fetch(client, endpoint, options, store, negotiator, |advertisement| select_all(advertisement))
}

/// The result of a `fetch_one`/`fetch_some` call, categorised per
/// spec.md's distinction between "there was nothing to do" and "some local
/// refs were updated".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSomeOutcome {
    /// No local ref was written because every requested remote ref was
    /// absent from the advertisement; the caller is already in sync with
    /// whatever the server currently has.
    AlreadySync,
    /// At least one local ref was written; carries every `(local_ref,
    /// target)` pair written, in request order.
    Sync(Vec<(BString, ObjectId)>),
}

/// Fetch a single remote ref, writing it under every name in `local_refs`.
/// A `remote_ref` absent from the advertisement is not an error — it is
/// logged and the call reports `AlreadySync` — matching `fetch_some`'s
/// "log, don't fail" treatment of a single mapping.
pub fn fetch_one(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    store: &mut dyn Store,
    negotiator: &mut dyn Negotiator,
    remote_ref: &BStr,
    local_refs: &[BString],
) -> Result<FetchSomeOutcome> {
    let mut ref_map = BTreeMap::new();
    ref_map.insert(remote_ref.to_owned(), local_refs.to_vec());
    fetch_some(client, endpoint, options, store, negotiator, &ref_map)
}

/// Fetch every remote ref named in `ref_map`'s keys, writing each under
/// every local name listed for it. Remote refs in `ref_map` but absent
/// from the advertisement are skipped and logged, never treated as an
/// error; refs the server advertises outside `ref_map` are simply never
/// requested, so there is nothing "extra" for this driver to observe or
/// log at this abstraction level.
pub fn fetch_some(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    store: &mut dyn Store,
    negotiator: &mut dyn Negotiator,
    ref_map: &BTreeMap<BString, Vec<BString>>,
) -> Result<FetchSomeOutcome> {
    let outcome = fetch(client, endpoint, options, store, negotiator, |advertisement| {
        select_mapped(advertisement, ref_map)
    })?;

    let missed = ref_map
        .keys()
        .filter(|remote_name| !outcome.advertisement.refs.iter().any(|r| &&r.name == remote_name))
        .count();

    if outcome.ref_updates.is_empty() && missed > 0 {
        Ok(FetchSomeOutcome::AlreadySync)
    } else {
        Ok(FetchSomeOutcome::Sync(outcome.ref_updates))
    }
}

fn select_all(advertisement: &RefAdvertisement) -> WantSelection {
    let wants = advertisement.refs.iter().map(|r| r.target).collect();
    let ref_updates = advertisement.refs.iter().map(|r| (r.name.clone(), r.target)).collect();
    WantSelection { wants, ref_updates, shallow: Vec::new(), deepen: None }
}

fn select_named(advertisement: &RefAdvertisement, ref_name: &BString) -> WantSelection {
    match advertisement.refs.iter().find(|r| &r.name == ref_name) {
        Some(entry) => WantSelection {
            wants: vec![entry.target],
            ref_updates: vec![(ref_name.clone(), entry.target)],
            shallow: Vec::new(),
            deepen: None,
        },
        None => {
            log_missing_ref(ref_name);
            WantSelection { wants: Vec::new(), ref_updates: Vec::new(), shallow: Vec::new(), deepen: None }
        }
    }
}

fn select_mapped(advertisement: &RefAdvertisement, ref_map: &BTreeMap<BString, Vec<BString>>) -> WantSelection {
    let mut wants = Vec::new();
    let mut ref_updates = Vec::new();
    for (remote_name, local_names) in ref_map {
        match advertisement.refs.iter().find(|r| &r.name == remote_name) {
            Some(entry) => {
                wants.push(entry.target);
                ref_updates.extend(local_names.iter().map(|local_name| (local_name.clone(), entry.target)));
            }
            None => log_missing_ref(remote_name),
        }
    }
    WantSelection { wants, ref_updates, shallow: Vec::new(), deepen: None }
}

#[cfg(feature = "tracing")]
fn log_missing_ref(name: &BString) {
    tracing::warn!(ref_name = %name, "requested ref not present in advertisement, skipping");
}

#[cfg(not(feature = "tracing"))]
fn log_missing_ref(_name: &BString) {}

/// Push a set of commands built from the caller's desired end state. Create
/// and update commands are treated uniformly — the distinction lives in
/// `Command` itself, decided by whatever the caller's `desired` callback
/// returns.
pub fn update_and_create(
    client: &dyn HttpClient,
    endpoint: &Endpoint,
    options: &ClientOptions,
    generator: &mut dyn PackGenerator,
    desired: impl FnOnce(&RefAdvertisement) -> Vec<(BString, ObjectId)>,
) -> Result<PushOutcome> {
    push(client, endpoint, options, generator, |advertisement| {
        desired(advertisement)
            .into_iter()
            .map(|(name, new)| match advertisement.refs.iter().find(|r| r.name == name) {
                Some(existing) => Command::Update { old: existing.target, new, name },
                None => Command::Create { new, name },
            })
            .collect()
    })
}
