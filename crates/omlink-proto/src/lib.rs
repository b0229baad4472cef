//! Message layer of the omlink serial protocol.
//!
//! A validated frame payload starts with a 1-byte message id. Bit 7 set
//! means a response to a host command; bit 7 clear means an unsolicited
//! event from the module. [`dispatch`] classifies the payload and decodes it
//! into a [`Response`] or [`Event`] with named fields. Every field read is
//! bounds-checked, so a short or hostile payload becomes a [`DecodeError`]
//! instead of an out-of-bounds access.
//!
//! The other direction is covered by [`Command`], which builds outbound
//! command payloads and parses the terminal command words.

pub mod codes;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod field;
pub mod hexdump;
pub mod ids;
pub mod node_id;
pub mod response;

pub use codes::{
    disconnect_reason_name, node_role_name, node_type_name, status_name, DisconnectReason,
    NodeRole, NodeType, Status,
};
pub use command::Command;
pub use dispatch::{dispatch, Message};
pub use error::{CommandError, DecodeError};
pub use event::Event;
pub use field::FieldReader;
pub use hexdump::hex_dump;
pub use ids::{is_response, CommandId, EventId, RESPONSE_MASK};
pub use node_id::{decode_node_id, encode_node_id_byte, NodeId};
pub use response::Response;
