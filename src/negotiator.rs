//! The negotiation strategy contract: an external collaborator. This crate
//! drives a negotiator through successive rounds but never decides on its
//! own which commits are worth offering as `have`s — that policy (walking
//! local history, bitmap lookups, whatever) lives on the other side of this
//! trait, mirroring how `Store` and `HttpClient` are collaborators too.
//!
//! Grounded on `gix-upload-pack::server::negotiation::NegotiationEngine`'s
//! round/state shape (`NegotiationState::{haves, common, round}`), flipped
//! from "the server accumulates what the client offered" to "the client
//! decides what to offer next given what the server acknowledged".

use std::collections::BTreeSet;

use gix_hash::ObjectId;

use crate::model::Acks;

/// What the negotiator wants the fetch driver to do for the next round.
#[derive(Debug, Clone)]
pub enum NegotiatorStep {
    /// Offer these additional `have`s in the next round.
    Haves(BTreeSet<ObjectId>),
    /// Nothing more to offer; send the terminal `done`.
    Done,
}

/// A pluggable want/have negotiation strategy.
pub trait Negotiator {
    /// Called once before the first round with the advertised wants, and
    /// again after every round with the acks the server sent back for the
    /// previous round (empty on the first call).
    fn next_round(&mut self, acks: &Acks) -> NegotiatorStep;
}

/// A negotiator that offers every local tip it was given in a single round,
/// then signals `done`. Useful for tests and for callers with a small
/// enough `have` set that multi-round negotiation isn't worth the round
/// trips; not a substitute for a real ancestry-walking strategy.
pub struct FlatNegotiator {
    haves: Option<BTreeSet<ObjectId>>,
}

impl FlatNegotiator {
    /// Offer `haves` in the first round, then stop.
    pub fn new(haves: BTreeSet<ObjectId>) -> Self {
        Self { haves: Some(haves) }
    }
}

impl Negotiator for FlatNegotiator {
    fn next_round(&mut self, _acks: &Acks) -> NegotiatorStep {
        match self.haves.take() {
            Some(haves) if !haves.is_empty() => NegotiatorStep::Haves(haves),
            _ => NegotiatorStep::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_negotiator_offers_once_then_is_done() {
        let mut haves = BTreeSet::new();
        haves.insert(ObjectId::null(gix_hash::Kind::Sha1));
        let mut negotiator = FlatNegotiator::new(haves.clone());
        match negotiator.next_round(&Acks::default()) {
            NegotiatorStep::Haves(offered) => assert_eq!(offered, haves),
            NegotiatorStep::Done => panic!("expected haves on first round"),
        }
        assert!(matches!(negotiator.next_round(&Acks::default()), NegotiatorStep::Done));
    }

    #[test]
    fn flat_negotiator_with_no_haves_is_immediately_done() {
        let mut negotiator = FlatNegotiator::new(BTreeSet::new());
        assert!(matches!(negotiator.next_round(&Acks::default()), NegotiatorStep::Done));
    }
}
