//! Message id catalog.
//!
//! Commands and their responses share the low seven bits: the host sends a
//! command id with bit 7 clear and the module answers with the same id with
//! bit 7 set. Events use the same numeric space with bit 7 clear; they are
//! only ever sent by the module, so there is no ambiguity on the host side.

use serde::Serialize;

/// Bit that marks a message id as a response.
pub const RESPONSE_MASK: u8 = 0x80;

/// Whether `id` names a response (bit 7 set) rather than an event.
pub const fn is_response(id: u8) -> bool {
    id & RESPONSE_MASK != 0
}

macro_rules! id_catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:literal => $wire_name:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[repr(u8)]
        $vis enum $name {
            $($variant = $value,)+
        }

        impl $name {
            /// Every id in the catalog, in numeric order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Look up a raw id; `None` if it is not in the catalog.
            pub const fn from_u8(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Raw id value.
            pub const fn as_u8(self) -> u8 {
                self as u8
            }

            /// Protocol name, as used in trace output.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $wire_name,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

id_catalog! {
    /// Host-to-module command ids. The response to a command carries
    /// `id | RESPONSE_MASK`.
    pub enum CommandId {
        Nop = 0x00 => "NOP",
        OnMcuReset = 0x01 => "ON_MCU_RESET",
        OnMcuBootloader = 0x02 => "ON_MCU_BOOTLOADER",
        OnMcuSleep = 0x03 => "ON_MCU_SLEEP",
        BleReboot = 0x04 => "BLE_REBOOT",
        BlePoweroff = 0x05 => "BLE_POWEROFF",
        BleUartoff = 0x06 => "BLE_UARTOFF",
        BleFactoryReset = 0x07 => "BLE_FACTORY_RESET",
        BleDfuMode = 0x08 => "BLE_DFU_MODE",
        GetFwVersion = 0x09 => "GET_FW_VERSION",
        SetAuthKey = 0x0A => "SET_AUTH_KEY",
        SetTxPower = 0x0B => "SET_TX_POWER",
        SetNodeRole = 0x0C => "SET_NODE_ROLE",
        GetNodeRole = 0x0D => "GET_NODE_ROLE",
        SetNodeId = 0x0E => "SET_NODE_ID",
        GetNodeId = 0x0F => "GET_NODE_ID",
        SetNodeType = 0x10 => "SET_NODE_TYPE",
        GetNodeType = 0x11 => "GET_NODE_TYPE",
        SetConnectionParams = 0x12 => "SET_CONNECTION_PARAMS",
        SetGapEventLength = 0x13 => "SET_GAP_EVENT_LENGTH",
        GetGapEventLength = 0x14 => "GET_GAP_EVENT_LENGTH",
        SetScanParams = 0x15 => "SET_SCAN_PARAMS",
        GetScanParams = 0x16 => "GET_SCAN_PARAMS",
        Scan = 0x17 => "SCAN",
        SetAdvParams = 0x18 => "SET_ADV_PARAMS",
        GetAdvParams = 0x19 => "GET_ADV_PARAMS",
        Advertise = 0x1A => "ADVERTISE",
        SetAdvertData = 0x1B => "SET_ADVERT_DATA",
        GetAdvertData = 0x1C => "GET_ADVERT_DATA",
        SaveConfig = 0x1D => "SAVE_CONFIG",
        Connect = 0x1E => "CONNECT",
        Disconnect = 0x1F => "DISCONNECT",
        Pair = 0x20 => "PAIR",
        Unpair = 0x21 => "UNPAIR",
        UnpairAll = 0x22 => "UNPAIR_ALL",
        GetPairEntryCount = 0x23 => "GET_PAIR_ENTRY_COUNT",
        GetPairEntry = 0x24 => "GET_PAIR_ENTRY",
        GetConnectionCount = 0x25 => "GET_CONNECTION_COUNT",
        GetConnection = 0x26 => "GET_CONNECTION",
        SetAdvertRssiThreshold = 0x27 => "SET_ADVERT_RSSI_THRESHOLD",
        GetAdvertRssiThreshold = 0x28 => "GET_ADVERT_RSSI_THRESHOLD",
        RadioTestDtm = 0x29 => "RADIO_TEST_DTM",
        RadioTestModCarrier = 0x2A => "RADIO_TEST_MOD_CARRIER",
        TxPayload = 0x2B => "TX_PAYLOAD",
        RemoteMcuPingRequest = 0x2C => "REMOTE_MCU_PING_REQUEST",
        RemoteMcuPingReply = 0x2D => "REMOTE_MCU_PING_REPLY",
        RemoteMcuResetRequest = 0x2E => "REMOTE_MCU_RESET_REQUEST",
        RemoteMcuBootloaderRequest = 0x2F => "REMOTE_MCU_BOOTLOADER_REQUEST",
        RemoteMcuResetNow = 0x30 => "REMOTE_MCU_RESET_NOW",
        RemoteBleDfuMode = 0x31 => "REMOTE_BLE_DFU_MODE",
        UnknownCommand = 0x7F => "UNKNOWN_COMMAND",
    }
}

impl CommandId {
    /// Id of the response the module sends back for this command.
    pub const fn response_id(self) -> u8 {
        self as u8 | RESPONSE_MASK
    }

    /// Command a response id answers; `None` for ids outside the catalog or
    /// without the response bit.
    pub const fn from_response_id(id: u8) -> Option<Self> {
        if !is_response(id) {
            return None;
        }
        Self::from_u8(id & !RESPONSE_MASK)
    }
}

id_catalog! {
    /// Unsolicited module-to-host event ids.
    pub enum EventId {
        BleReboot = 0x00 => "BLE_REBOOT",
        BlePoweroff = 0x01 => "BLE_POWEROFF",
        McuResetRequested = 0x02 => "MCU_RESET_REQUESTED",
        McuBootloaderRequested = 0x03 => "MCU_BOOTLOADER_REQUESTED",
        NodeFound = 0x04 => "NODE_FOUND",
        NodePaired = 0x05 => "NODE_PAIRED",
        NodePairFailed = 0x06 => "NODE_PAIR_FAILED",
        NodeUnpaired = 0x07 => "NODE_UNPAIRED",
        NodeConnected = 0x08 => "NODE_CONNECTED",
        NodeDisconnected = 0x09 => "NODE_DISCONNECTED",
        NodeConnectTimeout = 0x0A => "NODE_CONNECT_TIMEOUT",
        NodeConnectAuthError = 0x0B => "NODE_CONNECT_AUTH_ERROR",
        RxPayload = 0x0C => "RX_PAYLOAD",
        RxAck = 0x0D => "RX_ACK",
        PingRequest = 0x0E => "PING_REQUEST",
        PingReply = 0x0F => "PING_REPLY",
        RemoteMcuResetRequest = 0x10 => "REMOTE_MCU_RESET_REQUEST",
        RemoteMcuBootloaderRequest = 0x11 => "REMOTE_MCU_BOOTLOADER_REQUEST",
        RemoteMcuResetNow = 0x12 => "REMOTE_MCU_RESET_NOW",
        RemoteBleDfuMode = 0x13 => "REMOTE_BLE_DFU_MODE",
        Button = 0x14 => "BUTTON",
        ConnParamsUpdate = 0x15 => "CONN_PARAMS_UPDATE",
        SaveConfig = 0x16 => "SAVE_CONFIG",
    }
}
