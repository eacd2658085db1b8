//! The local object store contract: pack ingestion and ref writes. An
//! external collaborator; this crate performs no pack indexing or ref
//! storage of its own.

use bstr::BString;
use gix_hash::ObjectId;

use crate::error::Result;

/// The name `HEAD` always resolves to, matching the `Reference.head`
/// constant named in spec.md §6.
pub const HEAD: &str = "HEAD";

/// What a ref write points a reference at.
#[derive(Debug, Clone)]
pub enum RefTarget {
    /// Point directly at an object id.
    Hash(ObjectId),
    /// Point symbolically at another ref name.
    Ref(BString),
}

/// The local object store collaborator.
pub trait Store {
    /// Ingest a pack from `stream`, returning the pack's own object id (its
    /// trailer checksum) and the number of objects it contains. Atomic:
    /// either the whole pack is indexed and made visible, or nothing is.
    fn pack_from(&mut self, stream: &mut dyn Iterator<Item = std::io::Result<Vec<u8>>>) -> Result<(ObjectId, usize)>;

    /// Write a local reference to `target`.
    fn write_ref(&mut self, name: &bstr::BStr, target: RefTarget) -> Result<()>;
}

/// A minimal in-memory store used by tests and example drivers.
#[derive(Default)]
pub struct MemoryStore {
    pub refs: std::collections::BTreeMap<BString, RefTarget>,
    pub packs_ingested: Vec<(ObjectId, usize)>,
}

impl Store for MemoryStore {
    fn pack_from(&mut self, stream: &mut dyn Iterator<Item = std::io::Result<Vec<u8>>>) -> Result<(ObjectId, usize)> {
        let mut bytes = Vec::new();
        let mut chunk_count = 0usize;
        for chunk in stream {
            let chunk = chunk.map_err(crate::error::Error::Io)?;
            chunk_count += 1;
            bytes.extend_from_slice(&chunk);
        }
        // A real store derives the object count from the pack trailer; this
        // fake stands in with the number of chunks it copied, which is
        // enough for tests to assert "some nonzero count was returned".
        let pack_id = ObjectId::null(gix_hash::Kind::Sha1);
        let _ = bytes;
        self.packs_ingested.push((pack_id, chunk_count));
        Ok((pack_id, chunk_count))
    }

    fn write_ref(&mut self, name: &bstr::BStr, target: RefTarget) -> Result<()> {
        self.refs.insert(name.to_owned(), target);
        Ok(())
    }
}
