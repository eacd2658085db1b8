//! Decodes the `ReportStatus` message from a push response: the
//! `unpack`/`ok`/`ng` lines `git-receive-pack` writes when the client asked
//! for `report-status`.
//!
//! Grounded on `gix-receive-pack::protocol::report`'s writer side (the same
//! `unpack ok`/`ng <ref> <msg>` line shapes), mirrored here as a reader.
//! When side-band is negotiated the whole report is additionally wrapped in
//! channel framing exactly as the PACK stream is — this module reuses
//! [`super::pack::PackReader`] to strip that outer layer before parsing the
//! inner report lines.

use std::io::Cursor;

use bstr::{BString, ByteSlice};
use gix_packetline_blocking::{PacketLineRef, StreamingPeekableIter};

use crate::capabilities::SideBandMode;
use crate::error::{DecoderError, Error, Result};
use crate::model::ReportStatus;
use crate::transport::ResponseBody;

/// Decode a report-status response body, stripping side-band framing first
/// when it was negotiated for the push.
pub fn decode_report_status(body: &mut dyn ResponseBody, side_band: SideBandMode) -> Result<ReportStatus> {
    let inner = match side_band {
        SideBandMode::None => read_all(body)?,
        SideBandMode::SideBand | SideBandMode::SideBand64k => demux(body, side_band)?,
    };
    parse_inner(&inner)
}

fn read_all(body: &mut dyn ResponseBody) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next_chunk()? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn demux(body: &mut dyn ResponseBody, side_band: SideBandMode) -> Result<Vec<u8>> {
    let reader = super::BodyReader::new(body);
    let iter = StreamingPeekableIter::new(reader, &[PacketLineRef::Flush], false);
    let mut pack_reader = super::pack::PackReader::new(iter, side_band, |_| {});
    let mut bytes = Vec::new();
    for chunk in &mut pack_reader {
        bytes.extend_from_slice(&chunk.map_err(|e| Error::Smart(DecoderError::Malformed(e.to_string())))?);
    }
    if let Some(msg) = pack_reader.take_error() {
        return Err(Error::Sync(msg));
    }
    Ok(bytes)
}

fn parse_inner(raw: &[u8]) -> Result<ReportStatus> {
    let mut iter = StreamingPeekableIter::new(Cursor::new(raw), &[PacketLineRef::Flush], false);

    let unpack = match read_line(&mut iter)? {
        PacketLineRef::Data(line) => {
            let text = trim(line);
            match text.strip_prefix("unpack ") {
                Some("ok") => Ok(()),
                Some(reason) => Err(reason.to_owned()),
                None => return Err(Error::Smart(DecoderError::UnexpectedMessage(format!("expected 'unpack ...', got '{text}'")))),
            }
        }
        other => return Err(unexpected(other)),
    };

    let mut commands = Vec::new();
    loop {
        match read_line(&mut iter)? {
            PacketLineRef::Flush => break,
            PacketLineRef::Data(line) => {
                let text = trim(line);
                if let Some(name) = text.strip_prefix("ok ") {
                    commands.push((BString::from(name), Ok(())));
                } else if let Some(rest) = text.strip_prefix("ng ") {
                    let mut parts = rest.splitn(2, ' ');
                    let name = parts.next().unwrap_or_default();
                    let message = parts.next().unwrap_or_default();
                    commands.push((BString::from(name), Err(message.to_owned())));
                } else {
                    return Err(Error::Smart(DecoderError::UnexpectedMessage(format!("expected 'ok '/'ng ', got '{text}'"))));
                }
            }
            other => return Err(unexpected(other)),
        }
    }

    Ok(ReportStatus { unpack, commands })
}

fn trim(line: &[u8]) -> std::borrow::Cow<'_, str> {
    let text = line.to_str_lossy();
    match text {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.trim_end_matches('\n')),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.trim_end_matches('\n').to_owned()),
    }
}

fn read_line<'a, R: std::io::Read>(iter: &'a mut StreamingPeekableIter<R>) -> Result<PacketLineRef<'a>> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::BufferedBody;

    fn data_line(buf: &mut Vec<u8>, text: &str) {
        let mut line = text.as_bytes().to_vec();
        line.push(b'\n');
        gix_packetline_blocking::encode::data_to_write(&line, buf).unwrap();
    }

    #[test]
    fn decodes_clean_report_without_side_band() {
        let mut buf = Vec::new();
        data_line(&mut buf, "unpack ok");
        data_line(&mut buf, "ok refs/heads/main");
        data_line(&mut buf, "ng refs/heads/other non-fast-forward");
        gix_packetline_blocking::encode::flush_to_write(&mut buf).unwrap();
        let mut body = BufferedBody::whole(buf);
        let report = decode_report_status(&mut body, SideBandMode::None).unwrap();
        assert!(report.unpack.is_ok());
        assert_eq!(report.commands.len(), 2);
        assert!(report.commands[0].1.is_ok());
        assert_eq!(report.commands[1].1.as_ref().unwrap_err(), "non-fast-forward");
    }

    #[test]
    fn unpack_failure_is_captured_as_error_string() {
        let mut buf = Vec::new();
        data_line(&mut buf, "unpack index-pack failed");
        gix_packetline_blocking::encode::flush_to_write(&mut buf).unwrap();
        let mut body = BufferedBody::whole(buf);
        let report = decode_report_status(&mut body, SideBandMode::None).unwrap();
        assert_eq!(report.unpack.as_ref().unwrap_err(), "index-pack failed");
    }

    #[test]
    fn decodes_report_wrapped_in_side_band_channel_one() {
        let mut inner = Vec::new();
        data_line(&mut inner, "unpack ok");
        data_line(&mut inner, "ok refs/heads/main");
        gix_packetline_blocking::encode::flush_to_write(&mut inner).unwrap();

        let mut outer = Vec::new();
        let mut banded = vec![1u8];
        banded.extend_from_slice(&inner);
        gix_packetline_blocking::encode::data_to_write(&banded, &mut outer).unwrap();

        let mut body = BufferedBody::whole(outer);
        let report = decode_report_status(&mut body, SideBandMode::SideBand64k).unwrap();
        assert!(report.unpack.is_ok());
        assert_eq!(report.commands.len(), 1);
    }
}
