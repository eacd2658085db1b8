//! The pack generator contract: an external collaborator. Given the
//! commands a push is about to send and this crate's fixed window/depth
//! tuning, something on the other side of this trait walks the local
//! object store and produces pack bytes — this crate has no pack-building
//! logic of its own, matching the Non-goal that this is not a pack-format
//! reimplementation.

use crate::config::PackGeneratorTuning;
use crate::error::Result;
use crate::model::Command;

/// Produces the pack body for a push, given the commands being sent.
pub trait PackGenerator {
    /// Build the complete pack bytes covering the objects reachable from
    /// each command's new object id but not already known to the remote,
    /// honoring `tuning`'s window/depth/ofs-delta parameters.
    fn generate(&mut self, commands: &[Command], tuning: PackGeneratorTuning) -> Result<Vec<u8>>;
}

/// A fixed-bytes generator used by tests and by callers who already built
/// their pack through some other path.
pub struct FixedPack(pub Vec<u8>);

impl PackGenerator for FixedPack {
    fn generate(&mut self, _commands: &[Command], _tuning: PackGeneratorTuning) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}
