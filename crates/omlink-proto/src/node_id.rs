use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CommandError;

/// 24-bit identifier of a mesh participant.
///
/// On the wire a node id is three bytes, least significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Largest representable id.
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Width on the wire.
    pub const WIRE_SIZE: usize = 3;

    /// `None` when `raw` does not fit in 24 bits.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw > Self::MAX {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The numeric value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Decode the 3-byte wire form.
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self((bytes[2] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[0] as u32)
    }

    /// Encode to the 3-byte wire form.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.0 as u8, (self.0 >> 8) as u8, (self.0 >> 16) as u8]
    }
}

/// Decode a node id from its wire bytes.
pub const fn decode_node_id(bytes: &[u8; 3]) -> NodeId {
    NodeId::from_bytes(*bytes)
}

/// Byte `index` (0 = least significant) of the wire form of `id`.
///
/// Indices past 2 are not part of the encoding and yield `None`.
pub const fn encode_node_id_byte(index: usize, id: NodeId) -> Option<u8> {
    if index < NodeId::WIRE_SIZE {
        Some((id.0 >> (index * 8)) as u8)
    } else {
        None
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for NodeId {
    type Error = CommandError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        NodeId::new(raw).ok_or(CommandError::NodeIdOutOfRange(raw as u64))
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Accepts decimal (`1193046`) or `0x`-prefixed hex (`0x123456`).
impl FromStr for NodeId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        let raw = parsed.map_err(|_| CommandError::InvalidArgument {
            command: "node id",
            argument: "value",
            value: s.to_string(),
        })?;
        if raw > NodeId::MAX as u64 {
            return Err(CommandError::NodeIdOutOfRange(raw));
        }
        Ok(NodeId(raw as u32))
    }
}
