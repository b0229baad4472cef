//! Response decoders.
//!
//! Every response is `id | RESPONSE_MASK` followed by id-specific fields and
//! a trailing status byte. Most commands only report a status; the query
//! commands carry data in front of it.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::codes::{NodeRole, NodeType, Status};
use crate::error::DecodeError;
use crate::field::FieldReader;
use crate::hexdump::{serialize_hex, to_hex};
use crate::ids::{CommandId, RESPONSE_MASK};
use crate::node_id::NodeId;

/// Firmware hash length in `GET_FW_VERSION`.
pub const FW_HASH_LEN: usize = 32;

/// Git SHA prefix length in `GET_FW_VERSION`.
pub const FW_SHA_LEN: usize = 8;

/// A decoded response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "response", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    /// Any command whose response is only a status byte.
    Status { command: CommandId, status: Status },
    GetFwVersion {
        major: u8,
        minor: u8,
        #[serde(serialize_with = "serialize_hex")]
        hash: [u8; FW_HASH_LEN],
        /// Short git SHA, `+` appended when the build tree was dirty.
        sha: String,
        status: Status,
    },
    GetNodeRole { role: NodeRole, status: Status },
    GetNodeId { node_id: NodeId, status: Status },
    GetNodeType { node_type: NodeType, status: Status },
    GetGapEventLength { units: u8, status: Status },
    GetScanParams {
        timeout: u16,
        window: u16,
        interval: u16,
        status: Status,
    },
    GetAdvParams {
        interval: u32,
        duration: u16,
        status: Status,
    },
    GetAdvertData {
        #[serde(serialize_with = "serialize_hex")]
        adv_data: [u8; 3],
        status: Status,
    },
    GetPairEntryCount { count: u8, status: Status },
    GetPairEntry {
        index: u8,
        node_type: NodeType,
        node_id: NodeId,
        status: Status,
    },
    GetConnectionCount { count: u8, status: Status },
    GetConnection {
        index: u8,
        node_id: NodeId,
        status: Status,
    },
    GetAdvertRssiThreshold { threshold: i8, status: Status },
    TxPayload { tx_seq: u8, status: Status },
    /// The module did not recognize a command. Newer firmware echoes the
    /// rejected id.
    UnknownCommand { rejected: Option<u8> },
}

/// Minimum payload size (id byte included) for the response to `command`.
pub const fn layout_len(command: CommandId) -> usize {
    match command {
        CommandId::GetFwVersion => 1 + 2 + FW_HASH_LEN + FW_SHA_LEN + 1 + 1,
        CommandId::GetNodeRole
        | CommandId::GetNodeType
        | CommandId::GetGapEventLength
        | CommandId::GetPairEntryCount
        | CommandId::GetConnectionCount
        | CommandId::GetAdvertRssiThreshold
        | CommandId::TxPayload => 3,
        CommandId::GetNodeId | CommandId::GetAdvertData => 5,
        CommandId::GetScanParams | CommandId::GetAdvParams => 8,
        CommandId::GetPairEntry => 7,
        CommandId::GetConnection => 6,
        CommandId::UnknownCommand => 1,
        _ => 2,
    }
}

impl Response {
    /// Decode a response payload (first byte must carry the response bit).
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(payload)?;
        let id = r.id();
        let command = match CommandId::from_u8(id & !RESPONSE_MASK) {
            Some(command) if id & RESPONSE_MASK != 0 => command,
            _ => return Err(DecodeError::UnknownResponse(id)),
        };

        r.require(layout_len(command))?;

        let response = match command {
            CommandId::GetFwVersion => {
                let major = r.u8()?;
                let minor = r.u8()?;
                let hash = r.array::<FW_HASH_LEN>()?;
                let sha_raw = r.array::<FW_SHA_LEN>()?;
                let dirty = r.u8()? != 0;
                let mut sha: String = sha_raw
                    .iter()
                    .take_while(|&&b| b != 0)
                    .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
                    .collect();
                if dirty {
                    sha.push('+');
                }
                Response::GetFwVersion {
                    major,
                    minor,
                    hash,
                    sha,
                    status: Status(r.u8()?),
                }
            }
            CommandId::GetNodeRole => Response::GetNodeRole {
                role: NodeRole(r.u8()?),
                status: Status(r.u8()?),
            },
            CommandId::GetNodeId => Response::GetNodeId {
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            CommandId::GetNodeType => Response::GetNodeType {
                node_type: NodeType(r.u8()?),
                status: Status(r.u8()?),
            },
            CommandId::GetGapEventLength => Response::GetGapEventLength {
                units: r.u8()?,
                status: Status(r.u8()?),
            },
            CommandId::GetScanParams => Response::GetScanParams {
                timeout: r.u16_le()?,
                window: r.u16_le()?,
                interval: r.u16_le()?,
                status: Status(r.u8()?),
            },
            CommandId::GetAdvParams => Response::GetAdvParams {
                interval: r.u32_le()?,
                duration: r.u16_le()?,
                status: Status(r.u8()?),
            },
            CommandId::GetAdvertData => Response::GetAdvertData {
                adv_data: r.array()?,
                status: Status(r.u8()?),
            },
            CommandId::GetPairEntryCount => Response::GetPairEntryCount {
                count: r.u8()?,
                status: Status(r.u8()?),
            },
            CommandId::GetPairEntry => Response::GetPairEntry {
                index: r.u8()?,
                node_type: NodeType(r.u8()?),
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            CommandId::GetConnectionCount => Response::GetConnectionCount {
                count: r.u8()?,
                status: Status(r.u8()?),
            },
            CommandId::GetConnection => Response::GetConnection {
                index: r.u8()?,
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            CommandId::GetAdvertRssiThreshold => Response::GetAdvertRssiThreshold {
                threshold: r.i8()?,
                status: Status(r.u8()?),
            },
            CommandId::TxPayload => Response::TxPayload {
                tx_seq: r.u8()?,
                status: Status(r.u8()?),
            },
            CommandId::UnknownCommand => Response::UnknownCommand {
                rejected: r.u8().ok(),
            },
            command => Response::Status {
                command,
                status: Status(r.u8()?),
            },
        };

        if r.remaining() > 0 {
            debug!(id, extra = r.remaining(), "ignoring trailing response bytes");
        }
        Ok(response)
    }

    /// The command this response answers.
    pub fn command(&self) -> CommandId {
        match self {
            Response::Status { command, .. } => *command,
            Response::GetFwVersion { .. } => CommandId::GetFwVersion,
            Response::GetNodeRole { .. } => CommandId::GetNodeRole,
            Response::GetNodeId { .. } => CommandId::GetNodeId,
            Response::GetNodeType { .. } => CommandId::GetNodeType,
            Response::GetGapEventLength { .. } => CommandId::GetGapEventLength,
            Response::GetScanParams { .. } => CommandId::GetScanParams,
            Response::GetAdvParams { .. } => CommandId::GetAdvParams,
            Response::GetAdvertData { .. } => CommandId::GetAdvertData,
            Response::GetPairEntryCount { .. } => CommandId::GetPairEntryCount,
            Response::GetPairEntry { .. } => CommandId::GetPairEntry,
            Response::GetConnectionCount { .. } => CommandId::GetConnectionCount,
            Response::GetConnection { .. } => CommandId::GetConnection,
            Response::GetAdvertRssiThreshold { .. } => CommandId::GetAdvertRssiThreshold,
            Response::TxPayload { .. } => CommandId::TxPayload,
            Response::UnknownCommand { .. } => CommandId::UnknownCommand,
        }
    }

    /// Wire id of this response.
    pub fn id(&self) -> u8 {
        self.command().response_id()
    }

    /// Status reported by the module.
    pub fn status(&self) -> Status {
        match self {
            Response::UnknownCommand { .. } => Status::MCU_UNKNOWN_COMMAND,
            Response::Status { status, .. }
            | Response::GetFwVersion { status, .. }
            | Response::GetNodeRole { status, .. }
            | Response::GetNodeId { status, .. }
            | Response::GetNodeType { status, .. }
            | Response::GetGapEventLength { status, .. }
            | Response::GetScanParams { status, .. }
            | Response::GetAdvParams { status, .. }
            | Response::GetAdvertData { status, .. }
            | Response::GetPairEntryCount { status, .. }
            | Response::GetPairEntry { status, .. }
            | Response::GetConnectionCount { status, .. }
            | Response::GetConnection { status, .. }
            | Response::GetAdvertRssiThreshold { status, .. }
            | Response::TxPayload { status, .. } => *status,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCU_RSP_{}. ", self.command().name())?;
        match self {
            Response::Status { .. } => {}
            Response::GetFwVersion {
                major,
                minor,
                hash,
                sha,
                ..
            } => write!(
                f,
                "Version:{major}.{minor}, Hash:{}, SHA:{sha}, ",
                to_hex(hash)
            )?,
            Response::GetNodeRole { role, .. } => write!(f, "NodeRole:{role}, ")?,
            Response::GetNodeId { node_id, .. } => write!(f, "NodeId:{node_id}, ")?,
            Response::GetNodeType { node_type, .. } => write!(f, "NodeType:{node_type}, ")?,
            Response::GetGapEventLength { units, .. } => write!(f, "Units:{units}, ")?,
            Response::GetScanParams {
                timeout,
                window,
                interval,
                ..
            } => write!(
                f,
                "Timeout:{timeout}, Window:{window}, Interval:{interval}, "
            )?,
            Response::GetAdvParams {
                interval, duration, ..
            } => write!(f, "Interval:{interval}, Duration:{duration}, ")?,
            Response::GetAdvertData { adv_data, .. } => write!(
                f,
                "Data:[0]{} [1]{} [2]{}, ",
                adv_data[0], adv_data[1], adv_data[2]
            )?,
            Response::GetPairEntryCount { count, .. }
            | Response::GetConnectionCount { count, .. } => write!(f, "Count:{count}, ")?,
            Response::GetPairEntry {
                index,
                node_type,
                node_id,
                ..
            } => write!(
                f,
                "Index:{index}, NodeType:{node_type}, NodeId:{node_id}, "
            )?,
            Response::GetConnection { index, node_id, .. } => {
                write!(f, "Index:{index}, NodeId:{node_id}, ")?
            }
            Response::GetAdvertRssiThreshold { threshold, .. } => {
                write!(f, "RSSI Threshold:{threshold}, ")?
            }
            Response::TxPayload { tx_seq, .. } => write!(f, "TxSeqNum:{tx_seq}, ")?,
            Response::UnknownCommand { rejected } => {
                if let Some(id) = rejected {
                    write!(f, "Command:x{id:02X}, ")?;
                }
            }
        }
        write!(f, "Status:{}", self.status())
    }
}
