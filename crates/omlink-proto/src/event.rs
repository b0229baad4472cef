//! Event decoders.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::codes::{DisconnectReason, NodeRole, NodeType, Status};
use crate::error::DecodeError;
use crate::field::FieldReader;
use crate::hexdump::{serialize_hex, to_hex};
use crate::ids::{EventId, RESPONSE_MASK};
use crate::node_id::NodeId;

/// BLE connection parameters, in radio units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnParams {
    pub min_interval: u16,
    pub max_interval: u16,
    pub latency: u16,
    pub supervision_timeout: u16,
}

impl ConnParams {
    fn read(r: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            min_interval: r.u16_le()?,
            max_interval: r.u16_le()?,
            latency: r.u16_le()?,
            supervision_timeout: r.u16_le()?,
        })
    }
}

impl fmt::Display for ConnParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Min:{}, Max:{}, Lat:{}, supTimeout:{}",
            self.min_interval, self.max_interval, self.latency, self.supervision_timeout
        )
    }
}

/// A decoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    BleReboot {
        role: NodeRole,
        node_type: NodeType,
        node_id: NodeId,
        paired_count: u8,
        fw_major: u8,
        fw_minor: u8,
    },
    BlePoweroff,
    McuResetRequested,
    McuBootloaderRequested,
    NodeFound {
        node_type: NodeType,
        node_id: NodeId,
        paired_node_id: NodeId,
        #[serde(serialize_with = "serialize_hex")]
        adv_data: [u8; 3],
        rssi: i8,
        fw_major: u8,
        fw_minor: u8,
    },
    NodePaired { node_type: NodeType, node_id: NodeId },
    NodePairFailed {
        node_type: NodeType,
        node_id: NodeId,
        status: Status,
    },
    NodeUnpaired { node_type: NodeType, node_id: NodeId },
    NodeConnected { node_id: NodeId, params: ConnParams },
    NodeDisconnected {
        node_id: NodeId,
        reason: DisconnectReason,
    },
    NodeConnectTimeout { node_id: NodeId },
    NodeConnectAuthError { node_id: NodeId },
    /// Data relayed from another node.
    RxPayload {
        src_node_id: NodeId,
        rssi: i8,
        #[serde(serialize_with = "serialize_hex")]
        data: Bytes,
    },
    RxAck { src_node_id: NodeId, tx_seq: u8 },
    PingRequest { node_id: NodeId },
    PingReply { node_id: NodeId },
    RemoteMcuResetRequest { node_id: NodeId, status: Status },
    RemoteMcuBootloaderRequest { node_id: NodeId, status: Status },
    RemoteMcuResetNow { node_id: NodeId, status: Status },
    RemoteBleDfuMode { node_id: NodeId, status: Status },
    Button { button: u8, pressed: bool },
    ConnParamsUpdate { params: ConnParams },
    SaveConfig { status: Status },
}

/// Fixed part of each event layout, id byte included.
///
/// `RX_PAYLOAD` additionally carries `len` data bytes after its fixed part.
pub const fn layout_len(id: EventId) -> usize {
    match id {
        EventId::BlePoweroff | EventId::McuResetRequested | EventId::McuBootloaderRequested => 1,
        EventId::SaveConfig => 2,
        EventId::Button => 3,
        EventId::NodeConnectTimeout
        | EventId::NodeConnectAuthError
        | EventId::PingRequest
        | EventId::PingReply => 4,
        EventId::NodePaired
        | EventId::NodeUnpaired
        | EventId::NodeDisconnected
        | EventId::RxAck
        | EventId::RemoteMcuResetRequest
        | EventId::RemoteMcuBootloaderRequest
        | EventId::RemoteMcuResetNow
        | EventId::RemoteBleDfuMode => 5,
        EventId::NodePairFailed | EventId::RxPayload => 6,
        EventId::BleReboot | EventId::ConnParamsUpdate => 9,
        EventId::NodeConnected => 12,
        EventId::NodeFound => 14,
    }
}

impl Event {
    /// Decode an event payload (first byte must have the response bit clear).
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(payload)?;
        let raw = r.id();
        let id = match EventId::from_u8(raw) {
            Some(id) if raw & RESPONSE_MASK == 0 => id,
            _ => return Err(DecodeError::UnknownEvent(raw)),
        };

        r.require(layout_len(id))?;

        let event = match id {
            EventId::BleReboot => Event::BleReboot {
                role: NodeRole(r.u8()?),
                node_type: NodeType(r.u8()?),
                node_id: r.node_id()?,
                paired_count: r.u8()?,
                fw_major: r.u8()?,
                fw_minor: r.u8()?,
            },
            EventId::BlePoweroff => Event::BlePoweroff,
            EventId::McuResetRequested => Event::McuResetRequested,
            EventId::McuBootloaderRequested => Event::McuBootloaderRequested,
            EventId::NodeFound => Event::NodeFound {
                node_type: NodeType(r.u8()?),
                node_id: r.node_id()?,
                paired_node_id: r.node_id()?,
                adv_data: r.array()?,
                rssi: r.i8()?,
                fw_major: r.u8()?,
                fw_minor: r.u8()?,
            },
            EventId::NodePaired => Event::NodePaired {
                node_type: NodeType(r.u8()?),
                node_id: r.node_id()?,
            },
            EventId::NodePairFailed => Event::NodePairFailed {
                node_type: NodeType(r.u8()?),
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            EventId::NodeUnpaired => Event::NodeUnpaired {
                node_type: NodeType(r.u8()?),
                node_id: r.node_id()?,
            },
            EventId::NodeConnected => Event::NodeConnected {
                node_id: r.node_id()?,
                params: ConnParams::read(&mut r)?,
            },
            EventId::NodeDisconnected => Event::NodeDisconnected {
                node_id: r.node_id()?,
                reason: DisconnectReason(r.u8()?),
            },
            EventId::NodeConnectTimeout => Event::NodeConnectTimeout {
                node_id: r.node_id()?,
            },
            EventId::NodeConnectAuthError => Event::NodeConnectAuthError {
                node_id: r.node_id()?,
            },
            EventId::RxPayload => {
                let src_node_id = r.node_id()?;
                let rssi = r.i8()?;
                let len = r.u8()? as usize;
                let data = Bytes::copy_from_slice(r.bytes(len)?);
                Event::RxPayload {
                    src_node_id,
                    rssi,
                    data,
                }
            }
            EventId::RxAck => Event::RxAck {
                src_node_id: r.node_id()?,
                tx_seq: r.u8()?,
            },
            EventId::PingRequest => Event::PingRequest {
                node_id: r.node_id()?,
            },
            EventId::PingReply => Event::PingReply {
                node_id: r.node_id()?,
            },
            EventId::RemoteMcuResetRequest => Event::RemoteMcuResetRequest {
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            EventId::RemoteMcuBootloaderRequest => Event::RemoteMcuBootloaderRequest {
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            EventId::RemoteMcuResetNow => Event::RemoteMcuResetNow {
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            EventId::RemoteBleDfuMode => Event::RemoteBleDfuMode {
                node_id: r.node_id()?,
                status: Status(r.u8()?),
            },
            EventId::Button => Event::Button {
                button: r.u8()?,
                pressed: r.u8()? != 0,
            },
            EventId::ConnParamsUpdate => Event::ConnParamsUpdate {
                params: ConnParams::read(&mut r)?,
            },
            EventId::SaveConfig => Event::SaveConfig {
                status: Status(r.u8()?),
            },
        };

        if r.remaining() > 0 {
            debug!(id = raw, extra = r.remaining(), "ignoring trailing event bytes");
        }
        Ok(event)
    }

    /// Catalog id of this event.
    pub fn id(&self) -> EventId {
        match self {
            Event::BleReboot { .. } => EventId::BleReboot,
            Event::BlePoweroff => EventId::BlePoweroff,
            Event::McuResetRequested => EventId::McuResetRequested,
            Event::McuBootloaderRequested => EventId::McuBootloaderRequested,
            Event::NodeFound { .. } => EventId::NodeFound,
            Event::NodePaired { .. } => EventId::NodePaired,
            Event::NodePairFailed { .. } => EventId::NodePairFailed,
            Event::NodeUnpaired { .. } => EventId::NodeUnpaired,
            Event::NodeConnected { .. } => EventId::NodeConnected,
            Event::NodeDisconnected { .. } => EventId::NodeDisconnected,
            Event::NodeConnectTimeout { .. } => EventId::NodeConnectTimeout,
            Event::NodeConnectAuthError { .. } => EventId::NodeConnectAuthError,
            Event::RxPayload { .. } => EventId::RxPayload,
            Event::RxAck { .. } => EventId::RxAck,
            Event::PingRequest { .. } => EventId::PingRequest,
            Event::PingReply { .. } => EventId::PingReply,
            Event::RemoteMcuResetRequest { .. } => EventId::RemoteMcuResetRequest,
            Event::RemoteMcuBootloaderRequest { .. } => EventId::RemoteMcuBootloaderRequest,
            Event::RemoteMcuResetNow { .. } => EventId::RemoteMcuResetNow,
            Event::RemoteBleDfuMode { .. } => EventId::RemoteBleDfuMode,
            Event::Button { .. } => EventId::Button,
            Event::ConnParamsUpdate { .. } => EventId::ConnParamsUpdate,
            Event::SaveConfig { .. } => EventId::SaveConfig,
        }
    }

    /// Relayed bytes, for events that carry them.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Event::RxPayload { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCU_EVT_{}", self.id().name())?;
        match self {
            Event::BlePoweroff | Event::McuResetRequested | Event::McuBootloaderRequested => Ok(()),
            Event::BleReboot {
                role,
                node_type,
                node_id,
                paired_count,
                fw_major,
                fw_minor,
            } => write!(
                f,
                ". NodeRole:{role}, NodeType:{node_type}, NodeId:{node_id}, \
                 PairedCount:{paired_count}, Version:{fw_major}.{fw_minor}"
            ),
            Event::NodeFound {
                node_type,
                node_id,
                paired_node_id,
                adv_data,
                rssi,
                fw_major,
                fw_minor,
            } => write!(
                f,
                ". NodeType:{node_type}, NodeId:{node_id}, PairedNodeId:{paired_node_id}, \
                 AdvData:{}, RSSI:{rssi}dBm, V{fw_major}.{fw_minor}",
                to_hex(adv_data).to_lowercase()
            ),
            Event::NodePaired { node_type, node_id } | Event::NodeUnpaired { node_type, node_id } => {
                write!(f, ". NodeType:{node_type}, NodeId:{node_id}")
            }
            Event::NodePairFailed {
                node_type,
                node_id,
                status,
            } => write!(
                f,
                ". NodeType:{node_type}, NodeId:{node_id}, Status:{status}"
            ),
            Event::NodeConnected { node_id, params } => {
                write!(f, ". NodeId:{node_id}, {params}")
            }
            Event::NodeDisconnected { node_id, reason } => {
                write!(f, ". NodeId:{node_id}, Reason:{reason}")
            }
            Event::NodeConnectTimeout { node_id }
            | Event::NodeConnectAuthError { node_id }
            | Event::PingRequest { node_id }
            | Event::PingReply { node_id } => write!(f, ". NodeId:{node_id}"),
            Event::RxPayload {
                src_node_id,
                rssi,
                data,
            } => write!(
                f,
                ". SrcNodeId:{src_node_id}, Len:{}, RSSI:{rssi}",
                data.len()
            ),
            Event::RxAck {
                src_node_id,
                tx_seq,
            } => write!(f, ". From SrcNodeId:{src_node_id}, TxSeqNum:{tx_seq}"),
            Event::RemoteMcuResetRequest { node_id, status }
            | Event::RemoteMcuBootloaderRequest { node_id, status }
            | Event::RemoteMcuResetNow { node_id, status }
            | Event::RemoteBleDfuMode { node_id, status } => {
                write!(f, ". NodeId:{node_id}, Status:{status}")
            }
            Event::Button { button, pressed } => write!(
                f,
                ". Button:{button} Action:{}",
                if *pressed { "pressed" } else { "released" }
            ),
            Event::ConnParamsUpdate { params } => write!(f, ". {params}"),
            Event::SaveConfig { status } => write!(f, ". Status:{status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(raw: u32) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    #[test]
    fn ble_reboot() {
        let evt = Event::decode(&[0x00, 0x01, 0x03, 0x56, 0x34, 0x12, 0x02, 0x01, 0x04]).unwrap();
        assert_eq!(
            evt.to_string(),
            "MCU_EVT_BLE_REBOOT. NodeRole:1 (Periph), NodeType:3 (Foot), NodeId:1193046, \
             PairedCount:2, Version:1.4"
        );
    }

    #[test]
    fn bare_events() {
        assert_eq!(Event::decode(&[0x01]).unwrap(), Event::BlePoweroff);
        assert_eq!(
            Event::decode(&[0x02]).unwrap().to_string(),
            "MCU_EVT_MCU_RESET_REQUESTED"
        );
    }

    #[test]
    fn node_found() {
        let evt = Event::decode(&[
            0x04, 0x02, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0xAB, 0xCD, 0xEF, 0xC4, 0x01, 0x02,
        ])
        .unwrap();
        assert_eq!(
            evt,
            Event::NodeFound {
                node_type: NodeType(2),
                node_id: node(1),
                paired_node_id: node(2),
                adv_data: [0xAB, 0xCD, 0xEF],
                rssi: -60,
                fw_major: 1,
                fw_minor: 2,
            }
        );
        assert_eq!(
            evt.to_string(),
            "MCU_EVT_NODE_FOUND. NodeType:2 (Stim2), NodeId:1, PairedNodeId:2, \
             AdvData:abcdef, RSSI:-60dBm, V1.2"
        );
    }

    #[test]
    fn node_connected_params() {
        let evt = Event::decode(&[
            0x08, 0x07, 0x00, 0x00, 0x06, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x90, 0x01,
        ])
        .unwrap();
        assert_eq!(
            evt.to_string(),
            "MCU_EVT_NODE_CONNECTED. NodeId:7, Min:6, Max:12, Lat:0, supTimeout:400"
        );
    }

    #[test]
    fn node_disconnected_reason() {
        let evt = Event::decode(&[0x09, 0x07, 0x00, 0x00, 0x13]).unwrap();
        assert_eq!(
            evt.to_string(),
            "MCU_EVT_NODE_DISCONNECTED. NodeId:7, Reason:x13 (BLE_HCI_REMOTE_USER_TERMINATED_CONNECTION)"
        );
    }

    #[test]
    fn rx_payload_carries_data() {
        let evt = Event::decode(&[0x0C, 0x05, 0x00, 0x00, 0xD8, 0x02, b'h', b'i']).unwrap();
        assert_eq!(
            evt,
            Event::RxPayload {
                src_node_id: node(5),
                rssi: -40,
                data: Bytes::from_static(b"hi"),
            }
        );
        assert_eq!(evt.data(), Some(&b"hi"[..]));
        assert_eq!(
            evt.to_string(),
            "MCU_EVT_RX_PAYLOAD. SrcNodeId:5, Len:2, RSSI:-40"
        );
    }

    #[test]
    fn rx_payload_declared_length_must_be_present() {
        let err = Event::decode(&[0x0C, 0x05, 0x00, 0x00, 0xD8, 0x04, b'h', b'i']).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                id: 0x0C,
                needed: 10,
                got: 8
            }
        );
    }

    #[test]
    fn rx_payload_zero_length() {
        let evt = Event::decode(&[0x0C, 0x05, 0x00, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(evt.data(), Some(&[][..]));
    }

    #[test]
    fn button_and_save_config() {
        assert_eq!(
            Event::decode(&[0x14, 0x01, 0x01]).unwrap().to_string(),
            "MCU_EVT_BUTTON. Button:1 Action:pressed"
        );
        assert_eq!(
            Event::decode(&[0x14, 0x02, 0x00]).unwrap().to_string(),
            "MCU_EVT_BUTTON. Button:2 Action:released"
        );
        assert_eq!(
            Event::decode(&[0x16, 0x04]).unwrap().to_string(),
            "MCU_EVT_SAVE_CONFIG. Status:x4 (STATUS_NVM_FAIL)"
        );
    }

    #[test]
    fn remote_requests_report_status() {
        let evt = Event::decode(&[0x10, 0x09, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(
            evt.to_string(),
            "MCU_EVT_REMOTE_MCU_RESET_REQUEST. NodeId:9, Status:x0 (STATUS_SUCCESS)"
        );
    }

    #[test]
    fn every_event_rejects_every_short_length() {
        for &id in EventId::ALL {
            let full = layout_len(id);
            let mut payload = vec![0u8; full];
            payload[0] = id.as_u8();
            assert!(Event::decode(&payload).is_ok(), "{id}");
            for len in 1..full {
                assert!(
                    matches!(
                        Event::decode(&payload[..len]),
                        Err(DecodeError::Truncated { .. })
                    ),
                    "{id} at {len}"
                );
            }
        }
    }

    #[test]
    fn unknown_event_rejected() {
        assert_eq!(
            Event::decode(&[0x17]).unwrap_err(),
            DecodeError::UnknownEvent(0x17)
        );
        assert_eq!(
            Event::decode(&[0x80, 0x00]).unwrap_err(),
            DecodeError::UnknownEvent(0x80)
        );
    }

    #[test]
    fn serializes_with_tag() {
        let evt = Event::decode(&[0x0C, 0x05, 0x00, 0x00, 0xD8, 0x02, 0x0A, 0x0B]).unwrap();
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["event"], "RX_PAYLOAD");
        assert_eq!(json["src_node_id"], 5);
        assert_eq!(json["rssi"], -40);
        assert_eq!(json["data"], "0A0B");
    }
}
