//! Encodes the `HttpUpdateRequest({commands, capabilities}, pack)` message:
//! the body of a push POST to `git-receive-pack`.
//!
//! Grounded on `gix-receive-pack::protocol::commands`'s `<old> <new> <name>`
//! command line format, read there and written here, followed immediately
//! by the pack bytes the caller's pack generator produced.

use crate::capabilities::CapabilitySet;
use crate::model::Command;

/// Encode the command list and capability line, appending `pack_body`
/// verbatim after the closing flush — push requests carry no side-band
/// framing on the request side, only on the report-status response.
pub fn encode(commands: &[Command], capabilities: &CapabilitySet, object_hash: gix_hash::Kind, pack_body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for (index, command) in commands.iter().enumerate() {
        let mut line = command.encode(object_hash);
        if index == 0 {
            line.push('\0');
            line.push_str(&capabilities.encode());
        }
        line.push('\n');
        super::write_data_line(&mut out, line.as_bytes()).expect("Vec<u8> writes are infallible");
    }
    super::write_flush(&mut out).expect("Vec<u8> writes are infallible");
    out.extend_from_slice(pack_body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BString;
    use gix_hash::ObjectId;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_hex(format!("{byte:02x}").repeat(20).as_bytes()).unwrap()
    }

    #[test]
    fn first_command_carries_capabilities_after_nul() {
        let commands = vec![Command::Create { new: oid(0xaa), name: BString::from("refs/heads/new") }];
        let caps = CapabilitySet::modern_client_defaults("git/test-1.0");
        let bytes = encode(&commands, &caps, gix_hash::Kind::Sha1, b"PACKDATA");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("refs/heads/new\0"));
        assert!(text.contains("report-status"));
    }

    #[test]
    fn subsequent_commands_carry_no_capabilities() {
        let commands = vec![
            Command::Create { new: oid(0xaa), name: BString::from("refs/heads/one") },
            Command::Delete { old: oid(0xbb), name: BString::from("refs/heads/two") },
        ];
        let caps = CapabilitySet::modern_client_defaults("git/test-1.0");
        let bytes = encode(&commands, &caps, gix_hash::Kind::Sha1, b"");
        let text = String::from_utf8_lossy(&bytes);
        let second_line = text.lines().nth(1).unwrap();
        assert!(!second_line.contains("report-status"));
    }

    #[test]
    fn pack_body_follows_the_closing_flush() {
        let commands = vec![Command::Delete { old: oid(0xaa), name: BString::from("refs/heads/gone") }];
        let caps = CapabilitySet::modern_client_defaults("git/test-1.0");
        let bytes = encode(&commands, &caps, gix_hash::Kind::Sha1, b"PACKTAIL");
        assert!(bytes.ends_with(b"PACKTAIL"));
    }
}
