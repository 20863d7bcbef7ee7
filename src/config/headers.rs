//! HTTP header name constants.

/// Content type of request bodies produced by the codec.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Detached signature of the document, required by the registration endpoint.
pub const HEADER_SIGNATURE: &str = "Signature";
