//! A client-side driver for Git's Smart HTTP transport: reference
//! discovery, capability negotiation, the fetch want/have loop, the push
//! update-request/report-status exchange, side-band demultiplexing, and
//! thin orchestration policies (`clone`, `fetch_one`, `fetch_some`,
//! `fetch_all`, `update_and_create`) built on top of them.
//!
//! The HTTP client, the pktline codec's wire format, the local object
//! store, the pack generator, and the want/have negotiation strategy are
//! all external collaborators expressed as traits ([`transport::HttpClient`],
//! [`store::Store`], [`pack_generator::PackGenerator`],
//! [`negotiator::Negotiator`]) — this crate drives them, it does not
//! implement them.
//!
//! This is not a server, not the native `git://` transport, not a
//! pack-format or ref-storage reimplementation, and it does not cache
//! negotiation state across calls.

pub mod capabilities;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod headers;
pub mod ls;
pub mod mailbox;
pub mod model;
pub mod negotiator;
pub mod orchestration;
pub mod pack_generator;
pub mod push;
pub mod store;
pub mod transport;
pub mod wire;

pub use capabilities::{AckMode, Capability, CapabilitySet, CapabilityNegotiator, SideBandMode};
pub use config::{ClientOptions, PackGeneratorTuning};
pub use endpoint::{Endpoint, Scheme, Service, Uri};
pub use error::{DecoderError, Error, Result};
pub use fetch::{fetch, FetchOutcome, WantSelection};
pub use model::{AckStatus, Acks, Command, RefAdvertisement, RefEntry, ReportStatus, WantRequest};
pub use negotiator::{FlatNegotiator, Negotiator, NegotiatorStep};
pub use orchestration::{clone, fetch_all, fetch_one, fetch_some, update_and_create, FetchSomeOutcome};
pub use pack_generator::{FixedPack, PackGenerator};
pub use push::{push, PushOutcome};
pub use store::{RefTarget, Store, HEAD};
pub use transport::{HttpClient, HttpRequest, HttpResponse, Method, ResponseBody};
