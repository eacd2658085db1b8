//! Decodes `Negociation(have, ack_mode) -> Acks` and the terminal
//! `NegociationResult` message.
//!
//! Grounded on `gix-upload-pack::server::negotiation::NegotiationEngine`'s
//! `process_haves_v1`, which writes exactly these ack/NAK/shallow lines;
//! this reads them back from the client's side of the same exchange.

use std::io::Read;

use gix_hash::ObjectId;
use gix_packetline_blocking::{PacketLineRef, StreamingPeekableIter};

use crate::error::{DecoderError, Error, Result};
use crate::model::{AckStatus, Acks};

/// Read one round's worth of ack/NAK/shallow/unshallow lines.
///
/// Ordinarily terminated by a flush pktline. An `ACK <oid> ready` line ends
/// the round immediately without a trailing flush instead, since PACK bytes
/// follow directly — mirroring how the server-side writer never emits a
/// flush after deciding it has enough information to start sending objects.
pub fn decode_acks<R: Read>(iter: &mut StreamingPeekableIter<R>) -> Result<Acks> {
    let mut acks = Acks::default();
    loop {
        match read_line(iter)? {
            PacketLineRef::Flush => break,
            PacketLineRef::Data(line) => {
                apply_line(&mut acks, line)?;
                if acks.is_ready() {
                    break;
                }
            }
            other => return Err(unexpected(other)),
        }
    }
    Ok(acks)
}

/// Read the single terminal ack/NAK line that immediately precedes the
/// PACK stream (no trailing flush — pack data follows directly).
pub fn decode_negotiation_result<R: Read>(iter: &mut StreamingPeekableIter<R>) -> Result<AckStatus> {
    match read_line(iter)? {
        PacketLineRef::Data(line) => {
            let mut acks = Acks::default();
            apply_line(&mut acks, line)?;
            Ok(acks.acks.first().map(|(_, status)| *status).unwrap_or(AckStatus::Plain))
        }
        other => Err(unexpected(other)),
    }
}

fn apply_line(acks: &mut Acks, line: &[u8]) -> Result<()> {
    let text = std::str::from_utf8(line)
        .map_err(|e| Error::Smart(DecoderError::Malformed(e.to_string())))?
        .trim_end_matches('\n');
    if text == "NAK" {
        return Ok(());
    }
    if let Some(rest) = text.strip_prefix("ACK ") {
        let mut parts = rest.splitn(2, ' ');
        let oid = parse_oid(parts.next().unwrap_or_default())?;
        let status = match parts.next() {
            Some("continue") => AckStatus::Continue,
            Some("common") => AckStatus::Common,
            Some("ready") => AckStatus::Ready,
            Some(other) => return Err(Error::Smart(DecoderError::UnexpectedMessage(format!("unknown ack qualifier '{other}'")))),
            None => AckStatus::Plain,
        };
        acks.acks.push((oid, status));
        return Ok(());
    }
    if let Some(rest) = text.strip_prefix("shallow ") {
        acks.shallow.push(parse_oid(rest)?);
        return Ok(());
    }
    if let Some(rest) = text.strip_prefix("unshallow ") {
        acks.unshallow.push(parse_oid(rest)?);
        return Ok(());
    }
    if let Some(rest) = text.strip_prefix("ERR ") {
        return Err(Error::Smart(DecoderError::Msg(rest.to_owned())));
    }
    Err(Error::Smart(DecoderError::UnexpectedMessage(text.to_owned())))
}

fn parse_oid(text: &str) -> Result<ObjectId> {
    ObjectId::from_hex(text.as_bytes()).map_err(|e| Error::Smart(DecoderError::Malformed(format!("invalid object id '{text}': {e}"))))
}

fn read_line<'a, R: Read>(iter: &'a mut StreamingPeekableIter<R>) -> Result<PacketLineRef<'a>> {
    match iter.read_line() {
        Some(Ok(Ok(line))) => Ok(line),
        Some(Ok(Err(decode_err))) => Err(Error::Smart(DecoderError::Malformed(decode_err.to_string()))),
        Some(Err(io_err)) => Err(Error::Smart(super::map_read_error(io_err))),
        None => Err(Error::Smart(DecoderError::UnexpectedEndOfInput)),
    }
}

fn unexpected(line: PacketLineRef<'_>) -> Error {
    Error::Smart(DecoderError::UnexpectedMessage(format!("{line:?}")))
}
