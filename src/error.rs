//! Error taxonomy for the smart HTTP driver.

use bstr::BString;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The three-way error taxonomy named by the protocol: wire-level protocol
/// failures, local store failures, and server-signalled semantic failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pktline frame was malformed, unexpected, or truncated.
    #[error("smart protocol error: {0}")]
    Smart(#[from] DecoderError),

    /// The local object store failed to ingest a pack or write a ref.
    #[error("store error: {0}")]
    Store(String),

    /// The server signalled a semantic failure: an `ERR` line, aggregated
    /// side-band stderr, or a non-pktline response body.
    #[error("{0}")]
    Sync(String),

    /// The endpoint's scheme is not `http`/`https`, or it has no host.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The client capability list required for header construction is
    /// missing an entry a programmer must supply (e.g. `Agent`).
    #[error("invalid capabilities: {0}")]
    InvalidCapabilities(String),

    /// Transport-level failure reported by the `HttpClient` collaborator.
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O failure while bridging a streaming body.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Construct a [`Error::Sync`] carrying a diagnostic payload extracted
    /// from a non-pktline response body (e.g. an HTML error page).
    pub fn sync_payload(payload: &[u8]) -> Self {
        Error::Sync(String::from_utf8_lossy(payload).into_owned())
    }
}

/// Decoder-level failure, with the raw bytes the decoder had buffered at
/// the point of failure preserved for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    /// The peer sent a message the decoder did not expect in its current
    /// state (e.g. an ack when a NAK/ready response was expected).
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),

    /// The response body ended while the decoder still required bytes.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// The server reported an explicit `ERR <msg>` pktline.
    #[error("server reported an error: {0}")]
    Msg(String),

    /// A pktline frame failed to parse (bad length prefix, invalid UTF-8
    /// where text was required, and so on).
    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl DecoderError {
    /// The diagnostic bytes associated with this failure, when known.
    pub fn payload(&self) -> BString {
        self.to_string().into_bytes().into()
    }
}
