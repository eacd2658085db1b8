//! Decodes the `HttpReferenceDiscovery(service)` message: the pktline
//! advertisement returned by `GET .../info/refs?service=<svc>`.
//!
//! Grounded on `gix-upload-pack::services::references::ReferenceManager`,
//! which *writes* this exact wire shape (`format_v1_advertisement`); this
//! is its mirror image, reading the shape back.

use std::io::{Cursor, Read};

use bstr::ByteSlice;
use gix_hash::ObjectId;
use gix_packetline_blocking::{PacketLineRef, StreamingPeekableIter};

use crate::capabilities::CapabilitySet;
use crate::endpoint::Service;
use crate::error::{DecoderError, Error, Result};
use crate::model::{RefAdvertisement, RefEntry};
use crate::transport::ResponseBody;

/// Read the entire response body into memory. Reference advertisements are
/// bounded in size (one line per ref), so buffering the whole thing before
/// parsing — rather than streaming it through the codec one pktline at a
/// time — keeps the failure-diagnostics path simple: on a malformed
/// advertisement we still have every byte the server sent to return as the
/// `Sync` payload.
fn read_all(body: &mut dyn ResponseBody) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next_chunk()? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Decode a reference advertisement from a discovery response body.
pub fn decode_advertisement(body: &mut dyn ResponseBody, service: Service) -> Result<RefAdvertisement> {
    let raw = read_all(body)?;
    parse_bytes(&raw, service).map_err(|err| match err {
        Error::Smart(DecoderError::Msg(msg)) => Error::Sync(msg),
        Error::Smart(_) => Error::sync_payload(&raw),
        other => other,
    })
}

fn parse_bytes(raw: &[u8], service: Service) -> Result<RefAdvertisement> {
    let mut iter = StreamingPeekableIter::new(Cursor::new(raw), &[PacketLineRef::Flush], false);

    let expected_prefix = format!("# service={}", service.name());
    match read_line(&mut iter)? {
        PacketLineRef::Data(line) => {
            let text = line.to_str_lossy();
            let text = text.trim_end_matches('\n');
            if !text.starts_with(&expected_prefix) {
                return Err(Error::Smart(DecoderError::Malformed(format!(
                    "expected '{expected_prefix}', got '{text}'"
                ))));
            }
        }
        other => return Err(unexpected(other)),
    }
    match read_line(&mut iter)? {
        PacketLineRef::Flush => {}
        other => return Err(unexpected(other)),
    }

    let mut refs = Vec::new();
    let mut capabilities = CapabilitySet::empty();
    let mut first = true;

    loop {
        match read_line(&mut iter)? {
            PacketLineRef::Flush => break,
            PacketLineRef::Data(line) => {
                let mut text = line.to_str_lossy().into_owned();
                if text.ends_with('\n') {
                    text.pop();
                }
                if first {
                    if let Some(nul) = text.find('\0') {
                        capabilities = CapabilitySet::parse(&text[nul + 1..]);
                        text.truncate(nul);
                    }
                    first = false;
                }
                let mut parts = text.splitn(2, ' ');
                let oid_str = parts.next().unwrap_or_default();
                let name = parts.next().unwrap_or_default();
                let oid = ObjectId::from_hex(oid_str.as_bytes())
                    .map_err(|e| Error::Smart(DecoderError::Malformed(format!("invalid object id '{oid_str}': {e}"))))?;

                if name == "capabilities^{}" {
                    // Empty-repository marker: capabilities only, no real ref.
                    continue;
                }
                if let Some(base) = name.strip_suffix("^{}") {
                    if let Some(last) = refs.iter_mut().rev().find(|r: &&mut RefEntry| r.name == base) {
                        last.peeled = Some(oid);
                        continue;
                    }
                }
                refs.push(RefEntry { target: oid, name: name.into(), peeled: None });
            }
            other => return Err(unexpected(other)),
        }
    }

    Ok(RefAdvertisement { refs, capabilities, shallow: Vec::new() })
}

fn read_line<'a, R: Read>(iter: &'a mut StreamingPeekableIter<R>) -> Result<PacketLineRef<'a>> {
    match iter.read_line() {
        Some(Ok(Ok(line))) => Ok(line),
        Some(Ok(Err(decode_err))) => Err(Error::Smart(DecoderError::Malformed(decode_err.to_string()))),
        Some(Err(io_err)) => Err(Error::Smart(DecoderError::Malformed(io_err.to_string()))),
        None => Err(Error::Smart(DecoderError::UnexpectedEndOfInput)),
    }
}

fn unexpected(line: PacketLineRef<'_>) -> Error {
    Error::Smart(DecoderError::UnexpectedMessage(format!("{line:?}")))
}
