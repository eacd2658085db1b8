//! The HTTP client contract: an external collaborator this crate drives
//! but never implements. Connection pooling, TLS, redirects, and auth
//! challenges live on the other side of this trait.

use std::time::Duration;

use crate::error::Result;

/// HTTP method used for a Smart HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request to send. `body` is `None` for discovery `GET`s and `Some` for
/// negotiation/push `POST`s, where it is the fully materialized request
/// body produced by the matching `wire::*::encode` function. `timeout`, if
/// set, is [`crate::config::ClientOptions::timeout`] and is the client's
/// call to honor however it sees fit.
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

/// A streaming response body: repeated calls return the next chunk in
/// order, and `None` marks the end of the body. Implementations may reuse
/// the buffer behind previously returned chunks once called again, so
/// callers (the [`crate::wire::BodyReader`] wrapping this trait for the
/// pktline codec) must copy what they need to keep before the next call.
pub trait ResponseBody {
    /// Return the next chunk of the body, or `None` at end of stream.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// A response to a request made through [`HttpClient::call`].
pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn ResponseBody>,
}

/// The external HTTP client collaborator. A single call is a complete,
/// independent request/response exchange; this crate makes no assumption
/// of session reuse across calls beyond the protocol's own statelessness.
pub trait HttpClient {
    /// Perform one HTTP call.
    fn call(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// An in-memory [`ResponseBody`] used by tests and by callers who already
/// have the full response buffered. Splits its bytes into chunks of
/// `chunk_size` to exercise boundary-sensitive decoding.
pub struct BufferedBody {
    bytes: Vec<u8>,
    offset: usize,
    chunk_size: usize,
}

impl BufferedBody {
    /// Create a body that yields all of `bytes` as a single chunk.
    pub fn whole(bytes: Vec<u8>) -> Self {
        let len = bytes.len().max(1);
        Self { bytes, offset: 0, chunk_size: len }
    }

    /// Create a body that yields `bytes` in chunks of at most `chunk_size`.
    pub fn chunked(bytes: Vec<u8>, chunk_size: usize) -> Self {
        Self { bytes, offset: 0, chunk_size: chunk_size.max(1) }
    }
}

impl ResponseBody for BufferedBody {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.offset >= self.bytes.len() {
            return Ok(None);
        }
        let end = (self.offset + self.chunk_size).min(self.bytes.len());
        let chunk = self.bytes[self.offset..end].to_vec();
        self.offset = end;
        Ok(Some(chunk))
    }
}
