//! Capability data model and the negotiator that derives side-band and ack
//! modes from the intersection of client and server capability sets.
//!
//! Grounded on `gix-receive-pack::protocol::capabilities::CapabilitySet`
//! (the typed-capability-plus-extras shape) and
//! `gix-upload-pack::services::capabilities::CapabilityManager::parse_client_capabilities`
//! (the token-parsing loop), both flipped from server to client use.

use bstr::BString;

/// A single capability token advertised or requested during the Smart HTTP
/// handshake. `Agent` and `Other` carry a value; the rest are presence
/// flags. Equality is structural: two different `Agent` strings are not
/// equal, so `Agent` is typically absent from the negotiated intersection —
/// the client's own agent is sent via the `User-Agent` header instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    MultiAck,
    MultiAckDetailed,
    ThinPack,
    SideBand,
    SideBand64k,
    OfsDelta,
    ReportStatus,
    NoDone,
    IncludeTag,
    NoProgress,
    Agent(String),
    /// Any other advertised token, kept verbatim for forward compatibility.
    Other(String),
}

impl Capability {
    fn token(&self) -> String {
        match self {
            Capability::MultiAck => "multi_ack".into(),
            Capability::MultiAckDetailed => "multi_ack_detailed".into(),
            Capability::ThinPack => "thin-pack".into(),
            Capability::SideBand => "side-band".into(),
            Capability::SideBand64k => "side-band-64k".into(),
            Capability::OfsDelta => "ofs-delta".into(),
            Capability::ReportStatus => "report-status".into(),
            Capability::NoDone => "no-done".into(),
            Capability::IncludeTag => "include-tag".into(),
            Capability::NoProgress => "no-progress".into(),
            Capability::Agent(v) => format!("agent={v}"),
            Capability::Other(v) => v.clone(),
        }
    }

    fn parse(token: &str) -> Self {
        match token {
            "multi_ack" => Capability::MultiAck,
            "multi_ack_detailed" => Capability::MultiAckDetailed,
            "thin-pack" => Capability::ThinPack,
            "side-band" => Capability::SideBand,
            "side-band-64k" => Capability::SideBand64k,
            "ofs-delta" => Capability::OfsDelta,
            "report-status" => Capability::ReportStatus,
            "no-done" => Capability::NoDone,
            "include-tag" => Capability::IncludeTag,
            "no-progress" => Capability::NoProgress,
            other => match other.split_once('=') {
                Some(("agent", value)) => Capability::Agent(value.to_owned()),
                _ => Capability::Other(other.to_owned()),
            },
        }
    }
}

/// An unordered collection of capabilities. Membership and intersection are
/// by structural equality, matching spec.md's data model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: Vec<Capability>,
}

impl CapabilitySet {
    /// An empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The client's modern default capability set, mirroring
    /// `gix-receive-pack::protocol::capabilities::CapabilitySet::modern_defaults`.
    pub fn modern_client_defaults(agent: impl Into<String>) -> Self {
        let mut set = Self::empty();
        for cap in [
            Capability::MultiAckDetailed,
            Capability::ThinPack,
            Capability::SideBand64k,
            Capability::OfsDelta,
            Capability::ReportStatus,
            Capability::IncludeTag,
        ] {
            set.push(cap);
        }
        set.push(Capability::Agent(agent.into()));
        set
    }

    /// Parse a space-separated capability line, e.g. the suffix of the
    /// first advertised ref line after its NUL byte.
    pub fn parse(line: &str) -> Self {
        let mut set = Self::empty();
        for token in line.split_whitespace() {
            set.push(Capability::parse(token));
        }
        set
    }

    /// Add a capability, skipping it if structurally equal to one already
    /// present.
    pub fn push(&mut self, capability: Capability) {
        if !self.entries.contains(&capability) {
            self.entries.push(capability);
        }
    }

    /// Whether `capability` is present, by structural equality.
    pub fn contains(&self, capability: &Capability) -> bool {
        self.entries.contains(capability)
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.entries.iter()
    }

    /// The agent string, if an `Agent` entry is present.
    pub fn agent(&self) -> Option<&str> {
        self.entries.iter().find_map(|c| match c {
            Capability::Agent(v) => Some(v.as_str()),
            _ => None,
        })
    }

    /// Intersect two capability sets by structural equality.
    pub fn intersect(&self, other: &CapabilitySet) -> CapabilitySet {
        let mut set = CapabilitySet::empty();
        for cap in &self.entries {
            if other.contains(cap) {
                set.push(cap.clone());
            }
        }
        set
    }

    /// Render as a single space-separated line, e.g. for encoding the
    /// first `want` line's capability suffix.
    pub fn encode(&self) -> String {
        self.entries.iter().map(Capability::token).collect::<Vec<_>>().join(" ")
    }
}

/// The selected side-band multiplexing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideBandMode {
    None,
    SideBand,
    SideBand64k,
}

/// The selected acknowledgement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    Ack,
    MultiAck,
    MultiAckDetailed,
}

/// Derives side-band and ack modes from the intersection of client and
/// server capabilities, per the precedence table in spec.md §4.4.
pub struct CapabilityNegotiator;

impl CapabilityNegotiator {
    /// Intersect `client` and `server`, returning the common set alongside
    /// the derived side-band and ack modes.
    pub fn negotiate(client: &CapabilitySet, server: &CapabilitySet) -> (CapabilitySet, SideBandMode, AckMode) {
        let common = client.intersect(server);
        let side_band = if common.contains(&Capability::SideBand64k) {
            SideBandMode::SideBand64k
        } else if common.contains(&Capability::SideBand) {
            SideBandMode::SideBand
        } else {
            SideBandMode::None
        };
        let ack_mode = if common.contains(&Capability::MultiAckDetailed) {
            AckMode::MultiAckDetailed
        } else if common.contains(&Capability::MultiAck) {
            AckMode::MultiAck
        } else {
            AckMode::Ack
        };
        (common, side_band, ack_mode)
    }
}

/// Used by the push driver's request envelope; kept here since it shares
/// the same BString-based ref-name type as the capability model.
pub type RefName = BString;
