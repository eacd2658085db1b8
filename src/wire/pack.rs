//! Decodes the PACK stream following a successful negotiation, demultiplexing
//! side-band channels when negotiated.
//!
//! Grounded on `gix-upload-pack::services::packet_io`'s `band_to_write`
//! usage (`SideBandChannel::Data` = 1, `Progress` = 2, `Error` = 3) — this
//! reads the same three channels back on the client side, matching the
//! channel byte values that side writes.

use std::io;

use gix_packetline_blocking::{PacketLineRef, StreamingPeekableIter};

use crate::capabilities::SideBandMode;
use crate::error::{DecoderError, Error};

const RAW_CHUNK_SIZE: usize = 8 * 1024;

/// Iterates the PACK byte stream, dispatching side-band progress lines to
/// `on_progress` as they arrive and surfacing a side-band error line as the
/// final `Err` item. Implements `Iterator<Item = io::Result<Vec<u8>>>`
/// directly so it can be passed to [`crate::store::Store::pack_from`].
pub struct PackReader<'a, R: io::Read> {
    mode: SideBandMode,
    framed: Option<StreamingPeekableIter<R>>,
    raw: Option<R>,
    on_progress: Box<dyn FnMut(&[u8]) + 'a>,
    error: Option<String>,
    done: bool,
}

impl<'a, R: io::Read> PackReader<'a, R> {
    /// Build a reader continuing from a line iterator that has just finished
    /// reading the negotiation result. For [`SideBandMode::None`] the
    /// underlying reader is reclaimed via `into_inner` since the PACK bytes
    /// that follow are not pktline-framed at all.
    pub fn new(iter: StreamingPeekableIter<R>, mode: SideBandMode, on_progress: impl FnMut(&[u8]) + 'a) -> Self {
        match mode {
            SideBandMode::None => Self {
                mode,
                framed: None,
                raw: Some(iter.into_inner()),
                on_progress: Box::new(on_progress),
                error: None,
                done: false,
            },
            SideBandMode::SideBand | SideBandMode::SideBand64k => Self {
                mode,
                framed: Some(iter),
                raw: None,
                on_progress: Box::new(on_progress),
                error: None,
                done: false,
            },
        }
    }

    /// A side-band error line received during the pack stream, if any. Check
    /// this after exhausting the iterator to distinguish a clean end of pack
    /// from a server-signalled failure.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    fn next_framed(&mut self) -> Option<io::Result<Vec<u8>>> {
        let iter = self.framed.as_mut().expect("framed reader present in side-band mode");
        loop {
            match iter.read_line() {
                Some(Ok(Ok(PacketLineRef::Data(line)))) => {
                    if line.is_empty() {
                        continue;
                    }
                    let (channel, payload) = (line[0], &line[1..]);
                    match channel {
                        1 => return Some(Ok(payload.to_vec())),
                        2 => {
                            (self.on_progress)(payload);
                            continue;
                        }
                        3 => {
                            self.error = Some(String::from_utf8_lossy(payload).into_owned());
                            self.done = true;
                            return None;
                        }
                        other => {
                            return Some(Err(to_io_error(Error::Smart(DecoderError::UnexpectedMessage(format!(
                                "unknown side-band channel {other}"
                            ))))));
                        }
                    }
                }
                Some(Ok(Ok(PacketLineRef::Flush))) => {
                    self.done = true;
                    return None;
                }
                Some(Ok(Ok(other))) => {
                    return Some(Err(to_io_error(Error::Smart(DecoderError::UnexpectedMessage(format!("{other:?}"))))));
                }
                Some(Ok(Err(decode_err))) => {
                    return Some(Err(to_io_error(Error::Smart(DecoderError::Malformed(decode_err.to_string())))));
                }
                Some(Err(io_err)) => return Some(Err(io_err)),
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }

    fn next_raw(&mut self) -> Option<io::Result<Vec<u8>>> {
        let reader = self.raw.as_mut().expect("raw reader present outside side-band mode");
        let mut buf = vec![0u8; RAW_CHUNK_SIZE];
        match reader.read(&mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                buf.truncate(n);
                Some(Ok(buf))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl<R: io::Read> Iterator for PackReader<'_, R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.mode {
            SideBandMode::None => self.next_raw(),
            SideBandMode::SideBand | SideBandMode::SideBand64k => self.next_framed(),
        }
    }
}

fn to_io_error(err: Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}
