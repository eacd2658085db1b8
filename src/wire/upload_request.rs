//! Encodes the `HttpUploadRequest(Done|Flush, {want, have, shallow, deepen,
//! capabilities})` message: the body of a negotiation POST to
//! `git-upload-pack`.
//!
//! Mirrors `gix-upload-pack::server::negotiation::NegotiationEngine`'s want
//! line format (`"want " + hex oid [+ "\0" + capabilities]`), read there
//! and written here.

use crate::model::{NegotiationMarker, WantRequest};

/// Encode one negotiation round's request body.
pub fn encode(request: &WantRequest, marker: NegotiationMarker) -> Vec<u8> {
    let mut out = Vec::new();
    for (index, want) in request.wants.iter().enumerate() {
        let mut line = format!("want {}", want.to_hex());
        if index == 0 {
            line.push(' ');
            line.push_str(&request.capabilities.encode());
        }
        line.push('\n');
        super::write_data_line(&mut out, line.as_bytes()).expect("Vec<u8> writes are infallible");
    }
    for shallow in &request.shallow {
        let line = format!("shallow {}\n", shallow.to_hex());
        super::write_data_line(&mut out, line.as_bytes()).expect("Vec<u8> writes are infallible");
    }
    if let Some(depth) = request.deepen {
        let line = format!("deepen {depth}\n");
        super::write_data_line(&mut out, line.as_bytes()).expect("Vec<u8> writes are infallible");
    }
    super::write_flush(&mut out).expect("Vec<u8> writes are infallible");
    for have in &request.have {
        let line = format!("have {}\n", have.to_hex());
        super::write_data_line(&mut out, line.as_bytes()).expect("Vec<u8> writes are infallible");
    }
    if marker == NegotiationMarker::Done {
        super::write_data_line(&mut out, b"done\n").expect("Vec<u8> writes are infallible");
    } else {
        super::write_flush(&mut out).expect("Vec<u8> writes are infallible");
    }
    out
}
