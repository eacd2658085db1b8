//! Shared protocol data transfer objects named in spec.md §3.

use bstr::BString;
use gix_hash::ObjectId;

use crate::capabilities::CapabilitySet;

/// One advertised reference: its target object id, name, and (for
/// annotated tags) the peeled commit id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    pub target: ObjectId,
    pub name: BString,
    pub peeled: Option<ObjectId>,
}

/// The parsed result of reference discovery. Always carries the server's
/// capability set, even when `refs` is empty (spec.md §3 invariant).
#[derive(Debug, Clone)]
pub struct RefAdvertisement {
    pub refs: Vec<RefEntry>,
    pub capabilities: CapabilitySet,
    pub shallow: Vec<ObjectId>,
}

/// One push update command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { new: ObjectId, name: BString },
    Delete { old: ObjectId, name: BString },
    Update { old: ObjectId, new: ObjectId, name: BString },
}

impl Command {
    /// The ref name this command targets.
    pub fn name(&self) -> &BString {
        match self {
            Command::Create { name, .. } | Command::Delete { name, .. } | Command::Update { name, .. } => name,
        }
    }

    /// The `<old> <new> <name>` wire encoding of this command.
    pub fn encode(&self, object_hash: gix_hash::Kind) -> String {
        let zero = ObjectId::null(object_hash);
        match self {
            Command::Create { new, name } => format!("{} {} {}", zero.to_hex(), new.to_hex(), name),
            Command::Delete { old, name } => format!("{} {} {}", old.to_hex(), zero.to_hex(), name),
            Command::Update { old, new, name } => format!("{} {} {}", old.to_hex(), new.to_hex(), name),
        }
    }
}

/// The client's want/have request for a single fetch negotiation POST.
#[derive(Debug, Clone)]
pub struct WantRequest {
    pub wants: Vec<ObjectId>,
    pub have: std::collections::BTreeSet<ObjectId>,
    pub shallow: Vec<ObjectId>,
    pub deepen: Option<u32>,
    pub capabilities: CapabilitySet,
}

impl WantRequest {
    /// Build a want request, rejecting an empty `wants` list per spec.md's
    /// invariant that wants are non-empty before a negotiation POST.
    pub fn new(
        wants: Vec<ObjectId>,
        have: std::collections::BTreeSet<ObjectId>,
        shallow: Vec<ObjectId>,
        deepen: Option<u32>,
        capabilities: CapabilitySet,
    ) -> Option<Self> {
        if wants.is_empty() {
            return None;
        }
        Some(Self { wants, have, shallow, deepen, capabilities })
    }
}

/// Status of one acknowledgement line, depending on the negotiated ack
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Plain,
    Continue,
    Common,
    Ready,
}

/// The server's response to a negotiation round.
#[derive(Debug, Clone, Default)]
pub struct Acks {
    pub acks: Vec<(ObjectId, AckStatus)>,
    pub shallow: Vec<ObjectId>,
    pub unshallow: Vec<ObjectId>,
}

impl Acks {
    /// Whether any ack in this round signals readiness to receive the pack.
    pub fn is_ready(&self) -> bool {
        self.acks.iter().any(|(_, status)| *status == AckStatus::Ready)
    }

    /// The set of object ids acknowledged as common in this round.
    pub fn common_oids(&self) -> std::collections::BTreeSet<ObjectId> {
        self.acks
            .iter()
            .filter(|(_, status)| matches!(status, AckStatus::Common | AckStatus::Continue))
            .map(|(oid, _)| *oid)
            .collect()
    }
}

/// Per-command and overall outcome of a push, parsed from `report-status`.
#[derive(Debug, Clone)]
pub struct ReportStatus {
    pub unpack: Result<(), String>,
    pub commands: Vec<(BString, Result<(), String>)>,
}

/// Marker for a `flush`- vs `done`-terminated negotiation POST, per
/// spec.md's `HttpUploadRequest(Done|Flush, ...)` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationMarker {
    Flush,
    Done,
}
