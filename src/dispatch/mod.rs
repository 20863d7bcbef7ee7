//! Rate-limited request dispatch.
//!
//! A `BoundedDispatcher` takes an `OutboundRequest`, waits for a permit from
//! its `WindowedLimiter`, hands the request to a `Transport`, and turns the
//! response into a typed value or a `DispatchError` using a `Codec`. Every
//! submission is reported once to an `EventSink` and counted in
//! `DispatchStats`.

mod codec;
mod dispatcher;
mod events;
mod request;
mod transport;

pub use codec::{Codec, JsonCodec};
pub use dispatcher::{is_success_status, BoundedDispatcher};
pub use events::{DispatchEvent, EventSink, LogSink, MemorySink};
pub use request::OutboundRequest;
pub use transport::{HttpTransport, Transport, TransportResponse};
