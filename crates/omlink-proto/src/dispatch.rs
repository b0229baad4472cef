//! Message dispatcher.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::DecodeError;
use crate::event::Event;
use crate::ids::is_response;
use crate::response::Response;

/// A decoded frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Message {
    Response(Response),
    Event(Event),
}

impl Message {
    /// Raw id byte as it appeared on the wire.
    pub fn id(&self) -> u8 {
        match self {
            Message::Response(rsp) => rsp.id(),
            Message::Event(evt) => evt.id().as_u8(),
        }
    }

    /// `"response"` or `"event"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Response(_) => "response",
            Message::Event(_) => "event",
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Message::Response(rsp) => Some(rsp),
            Message::Event(_) => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Message::Event(evt) => Some(evt),
            Message::Response(_) => None,
        }
    }
}

impl From<Response> for Message {
    fn from(rsp: Response) -> Self {
        Message::Response(rsp)
    }
}

impl From<Event> for Message {
    fn from(evt: Event) -> Self {
        Message::Event(evt)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Response(rsp) => fmt::Display::fmt(rsp, f),
            Message::Event(evt) => fmt::Display::fmt(evt, f),
        }
    }
}

/// Classify a validated payload by the response bit of its first byte and
/// decode it.
///
/// ```
/// use omlink_proto::{dispatch, Message};
///
/// let msg = dispatch(&[0x80, 0x00]).unwrap();
/// assert!(matches!(msg, Message::Response(_)));
/// assert_eq!(msg.to_string(), "MCU_RSP_NOP. Status:x0 (STATUS_SUCCESS)");
/// ```
pub fn dispatch(payload: &[u8]) -> Result<Message, DecodeError> {
    let id = *payload.first().ok_or(DecodeError::Empty)?;
    let msg = if is_response(id) {
        Message::Response(Response::decode(payload)?)
    } else {
        Message::Event(Event::decode(payload)?)
    };
    debug!(id, len = payload.len(), "dispatched {}", msg.kind());
    Ok(msg)
}
