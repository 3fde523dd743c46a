//! Request ID values and generators.
//!
//! A request ID ties together every log line emitted while serving one
//! request. It is either supplied by the client in the `X-Request-ID` header
//! or generated when the request enters the middleware.

use hyper::header::{HeaderName, HeaderValue};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Default header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Length of identifiers produced by [`random_id`].
pub const RANDOM_ID_LEN: usize = 32;

/// Counter for sequential request IDs.
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a 32 character random request ID.
///
/// This is the default generator. The value is the simple (unhyphenated)
/// form of a v4 UUID, so it is lowercase hex and globally unique in practice.
pub fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate a hyphenated UUID v4 request ID.
pub fn uuid_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a request ID based on a counter.
///
/// Cheaper than a UUID but only unique within a single process.
/// Format: `req-{counter}` where counter is zero-padded to 16 hex digits.
pub fn sequential_id() -> String {
    let count = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{:016x}", count)
}

/// A request ID attached to a single request/response cycle.
///
/// Stored as a header value so client-supplied IDs are echoed back byte for
/// byte. The middleware inserts it into the request extensions, where
/// handlers can pick it up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(HeaderValue);

impl RequestId {
    /// Create a new random request ID.
    pub fn new() -> Self {
        Self::from_generated(random_id())
            .expect("random ids are non-empty hex and always valid header values")
    }

    /// Wrap a header value taken from an inbound request.
    ///
    /// Returns `None` for an empty value, which callers treat as absent.
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.clone()))
        }
    }

    /// Create a request ID from generator output.
    ///
    /// Returns `None` if the string is empty or cannot be sent as a header.
    pub fn from_generated(id: String) -> Option<Self> {
        if id.is_empty() {
            return None;
        }
        HeaderValue::try_from(id).ok().map(Self)
    }

    /// Get the request ID as a string slice, if it is visible ASCII.
    pub fn to_str(&self) -> Option<&str> {
        self.0.to_str().ok()
    }

    /// Get the raw header value.
    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }

    /// Consume the request ID, returning the header value.
    pub fn into_header_value(self) -> HeaderValue {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.to_str() {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "{}", String::from_utf8_lossy(self.0.as_bytes())),
        }
    }
}

impl From<RequestId> for HeaderValue {
    fn from(id: RequestId) -> Self {
        id.0
    }
}
