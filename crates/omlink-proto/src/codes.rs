//! Code to description tables.
//!
//! Each table is a pure `fn(u8) -> &'static str` plus a `Copy` newtype that
//! keeps the raw code and renders as `<code> (<name>)` in trace lines.

use std::fmt;

use serde::{Serialize, Serializer};

/// Name of a module status code.
pub fn status_name(code: u8) -> &'static str {
    match code {
        0x00 => "STATUS_SUCCESS",
        0x01 => "STATUS_ERROR",
        0x02 => "STATUS_NOT_INIT",
        0x03 => "STATUS_BUSY",
        0x04 => "STATUS_NVM_FAIL",
        0x05 => "STATUS_CONFIG_CRC_FAIL",
        0x06 => "STATUS_CONFIG_NOT_FOUND",

        0x10 => "STATUS_UART_INIT",
        0x11 => "STATUS_UART_TX_OVERFLOW",
        0x12 => "STATUS_UART_OFF",
        0x13 => "STATUS_UART_BUSY",

        0x20 => "STATUS_USB_NOT_CONNECTED",
        0x21 => "STATUS_USB_TX_OVERFLOW",
        0x22 => "STATUS_USB_ERROR",
        0x23 => "STATUS_USB_NOT_SUPPORTED",

        0x30 => "STATUS_MCU_BAD_INDEX",
        0x31 => "STATUS_MCU_UNKNOWN_COMMAND",
        0x32 => "STATUS_MCU_UNSUPPORTED_COMMAND",
        0x33 => "STATUS_MCU_NOT_SUPPORTED_IN_THIS_ROLE",
        0x34 => "STATUS_MCU_CHECK_BYTE_FAIL",
        0x35 => "STATUS_MCU_BAD_PARAM",
        0x36 => "STATUS_MCU_PAIR_TABLE_FULL",
        0x37 => "STATUS_MCU_PAIRING_ENTRY_NOT_FOUND",
        0x38 => "STATUS_MCU_ALREADY_PAIRED",
        0x39 => "STATUS_MCU_BAD_NODE_TYPE",
        // The MCU side of the UART link is reported under the link name.
        0x3A => "STATUS_UART_LINK_OFF",

        0x40 => "STATUS_NET_PEER_NOT_CONNECTED",
        0x41 => "STATUS_NET_CENTRAL_NOT_CONNECTED",
        0x42 => "STATUS_NET_BAD_CONNECTION_HANDLE",
        0x43 => "STATUS_NET_UNKNOWN_CMD",
        0x44 => "STATUS_NET_UNSUPPORTED_CMD",
        0x45 => "STATUS_NET_NOT_SUPPORTED_IN_THIS_ROLE",
        0x46 => "STATUS_NET_BAD_PARAM",
        0x47 => "STATUS_NET_PAIR_TABLE_FULL",
        0x48 => "STATUS_NET_NODE_NOT_FOUND",
        0x49 => "STATUS_NET_ALREADY_PAIRED",
        0x4A => "STATUS_NET_CONNECTION_NOT_FOUND",
        0x4B => "STATUS_NET_SECURITY_FAILED",
        0x4C => "STATUS_NET_ROUTING_ERROR",
        0x4D => "STATUS_NET_MGT_PAYLOAD_CANNOT_BE_FORWARDED",
        0x4E => "STATUS_NET_MGT_PAYLOAD_CANNOT_BE_BROADCAST",

        0x50 => "STATUS_BLE_ERROR",
        0x51 => "STATUS_BLE_NOT_SUPPORTED",
        0x52 => "STATUS_BLE_NOT_SUPPORTED_IN_THIS_ROLE",
        0x53 => "STATUS_BLE_NODE_NOT_CONNECTED",
        0x54 => "STATUS_BLE_NODE_ALREADY_CONNECTED",
        0x55 => "STATUS_BLE_CONNECTION_IN_PROGRESS",
        0x56 => "STATUS_BLE_BAD_PARAMETER",
        0x57 => "STATUS_BLE_TX_POWER_NOT_SUPPORTED",
        0x58 => "STATUS_BLE_TEST_MODE_BAD_PATTERN",
        0x59 => "STATUS_BLE_TEST_MODE_BAD_CHANNEL",

        _ => "Unknown status",
    }
}

/// Name of a node type code.
pub fn node_type_name(code: u8) -> &'static str {
    match code {
        0 => "None",
        1 => "Stim1",
        2 => "Stim2",
        3 => "Foot",
        4 => "Dongle",
        5 => "Phone",
        6 => "MCU Upgrade Mode",
        _ => "Unknown",
    }
}

/// Name of a node role code.
pub fn node_role_name(code: u8) -> &'static str {
    match code {
        0 => "Central",
        1 => "Periph",
        _ => "Unknown",
    }
}

/// Name of a Bluetooth HCI disconnect reason.
pub fn disconnect_reason_name(code: u8) -> &'static str {
    match code {
        0x00 => "BLE_HCI_STATUS_CODE_SUCCESS",
        0x01 => "BLE_HCI_STATUS_CODE_UNKNOWN_BTLE_COMMAND",
        0x02 => "BLE_HCI_STATUS_CODE_UNKNOWN_CONNECTION_IDENTIFIER",
        0x05 => "BLE_HCI_AUTHENTICATION_FAILURE",
        0x06 => "BLE_HCI_STATUS_CODE_PIN_OR_KEY_MISSING",
        0x07 => "BLE_HCI_MEMORY_CAPACITY_EXCEEDED",
        0x08 => "BLE_HCI_CONNECTION_TIMEOUT",
        0x0C => "BLE_HCI_STATUS_CODE_COMMAND_DISALLOWED",
        0x12 => "BLE_HCI_STATUS_CODE_INVALID_BTLE_COMMAND_PARAMETERS",
        0x13 => "BLE_HCI_REMOTE_USER_TERMINATED_CONNECTION",
        0x14 => "BLE_HCI_REMOTE_DEV_TERMINATION_DUE_TO_LOW_RESOURCES",
        0x15 => "BLE_HCI_REMOTE_DEV_TERMINATION_DUE_TO_POWER_OFF",
        0x16 => "BLE_HCI_LOCAL_HOST_TERMINATED_CONNECTION",
        0x1A => "BLE_HCI_UNSUPPORTED_REMOTE_FEATURE",
        0x22 => "BLE_HCI_STATUS_CODE_LMP_RESPONSE_TIMEOUT",
        0x23 => "BLE_HCI_STATUS_CODE_LMP_ERROR_TRANSACTION_COLLISION",
        0x24 => "BLE_HCI_STATUS_CODE_LMP_PDU_NOT_ALLOWED",
        0x28 => "BLE_HCI_INSTANT_PASSED",
        0x29 => "BLE_HCI_PAIRING_WITH_UNIT_KEY_UNSUPPORTED",
        0x2A => "BLE_HCI_DIFFERENT_TRANSACTION_COLLISION",
        0x30 => "BLE_HCI_PARAMETER_OUT_OF_MANDATORY_RANGE",
        0x3A => "BLE_HCI_CONTROLLER_BUSY",
        0x3B => "BLE_HCI_CONN_INTERVAL_UNACCEPTABLE",
        0x3C => "BLE_HCI_DIRECTED_ADVERTISER_TIMEOUT",
        0x3D => "BLE_HCI_CONN_TERMINATED_DUE_TO_MIC_FAILURE",
        0x3E => "BLE_HCI_CONN_FAILED_TO_BE_ESTABLISHED",
        _ => "Unknown",
    }
}

/// Module status code. Renders as `x<HEX> (<NAME>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub u8);

impl Status {
    pub const SUCCESS: Status = Status(0x00);
    pub const MCU_UNKNOWN_COMMAND: Status = Status(0x31);

    pub fn name(self) -> &'static str {
        status_name(self.0)
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{:X} ({})", self.0, self.name())
    }
}

/// Node type code. Renders as `<code> (<name>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeType(pub u8);

impl NodeType {
    pub fn name(self) -> &'static str {
        node_type_name(self.0)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

/// Node role code. Renders as `<code> (<name>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRole(pub u8);

impl NodeRole {
    pub fn name(self) -> &'static str {
        node_role_name(self.0)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

/// HCI disconnect reason. Renders as `x<hh> (<NAME>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisconnectReason(pub u8);

impl DisconnectReason {
    pub fn name(self) -> &'static str {
        disconnect_reason_name(self.0)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{:02x} ({})", self.0, self.name())
    }
}

#[derive(Serialize)]
struct CodeRepr {
    code: u8,
    name: &'static str,
}

macro_rules! serialize_as_code {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    CodeRepr { code: self.0, name: self.name() }.serialize(serializer)
                }
            }
        )+
    };
}

serialize_as_code!(Status, NodeType, NodeRole, DisconnectReason);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        assert_eq!(status_name(0x00), "STATUS_SUCCESS");
        assert_eq!(status_name(0x13), "STATUS_UART_BUSY");
        assert_eq!(status_name(0x31), "STATUS_MCU_UNKNOWN_COMMAND");
        assert_eq!(status_name(0x3A), "STATUS_UART_LINK_OFF");
        assert_eq!(status_name(0x4E), "STATUS_NET_MGT_PAYLOAD_CANNOT_BE_BROADCAST");
        assert_eq!(status_name(0x59), "STATUS_BLE_TEST_MODE_BAD_CHANNEL");
        assert_eq!(status_name(0x07), "Unknown status");
        assert_eq!(status_name(0xFF), "Unknown status");
    }

    #[test]
    fn status_ranges_are_dense() {
        for range in [0x00..=0x06, 0x10..=0x13, 0x20..=0x23, 0x30..=0x3A, 0x40..=0x4E, 0x50..=0x59] {
            for code in range {
                assert_ne!(status_name(code), "Unknown status", "code 0x{code:02X}");
            }
        }
    }

    #[test]
    fn node_tables() {
        assert_eq!(node_type_name(3), "Foot");
        assert_eq!(node_type_name(6), "MCU Upgrade Mode");
        assert_eq!(node_type_name(7), "Unknown");
        assert_eq!(node_role_name(0), "Central");
        assert_eq!(node_role_name(1), "Periph");
        assert_eq!(node_role_name(2), "Unknown");
    }

    #[test]
    fn disconnect_reasons() {
        assert_eq!(
            disconnect_reason_name(0x13),
            "BLE_HCI_REMOTE_USER_TERMINATED_CONNECTION"
        );
        assert_eq!(disconnect_reason_name(0x08), "BLE_HCI_CONNECTION_TIMEOUT");
        assert_eq!(disconnect_reason_name(0x03), "Unknown");
    }

    #[test]
    fn display_formats() {
        assert_eq!(Status(0x00).to_string(), "x0 (STATUS_SUCCESS)");
        assert_eq!(Status(0x3A).to_string(), "x3A (STATUS_UART_LINK_OFF)");
        assert_eq!(NodeType(4).to_string(), "4 (Dongle)");
        assert_eq!(NodeRole(1).to_string(), "1 (Periph)");
        assert_eq!(
            DisconnectReason(0x08).to_string(),
            "x08 (BLE_HCI_CONNECTION_TIMEOUT)"
        );
    }

    #[test]
    fn serializes_code_and_name() {
        let json = serde_json::to_value(Status(0x01)).unwrap();
        assert_eq!(json["code"], 1);
        assert_eq!(json["name"], "STATUS_ERROR");
    }
}
