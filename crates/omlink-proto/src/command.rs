//! Outbound command builders and the terminal command parser.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};
use omlink_frame::MAX_PAYLOAD;

use crate::error::CommandError;
use crate::ids::CommandId;
use crate::node_id::NodeId;

/// Fixed part of a `TX_PAYLOAD` command: id, dest[3], ack, len.
pub const TX_HEADER_LEN: usize = 6;

/// Most data bytes one `TX_PAYLOAD` command can relay.
pub const MAX_TX_DATA: usize = MAX_PAYLOAD - TX_HEADER_LEN;

/// Terminal words for commands that take no arguments.
const SIMPLE_WORDS: &[(&str, CommandId)] = &[
    ("nop", CommandId::Nop),
    ("onmcureset", CommandId::OnMcuReset),
    ("onmcubootloader", CommandId::OnMcuBootloader),
    ("onmcusleep", CommandId::OnMcuSleep),
    ("reboot", CommandId::BleReboot),
    ("poweroff", CommandId::BlePoweroff),
    ("uartoff", CommandId::BleUartoff),
    ("factoryreset", CommandId::BleFactoryReset),
    ("dfumode", CommandId::BleDfuMode),
    ("fwver", CommandId::GetFwVersion),
    ("getnoderole", CommandId::GetNodeRole),
    ("getnodeid", CommandId::GetNodeId),
    ("getnodetype", CommandId::GetNodeType),
    ("getgapeventlength", CommandId::GetGapEventLength),
    ("getscanparams", CommandId::GetScanParams),
    ("getadvparams", CommandId::GetAdvParams),
    ("getadvertdata", CommandId::GetAdvertData),
    ("saveconfig", CommandId::SaveConfig),
    ("unpairall", CommandId::UnpairAll),
    ("getpaircount", CommandId::GetPairEntryCount),
    ("getconnectioncount", CommandId::GetConnectionCount),
    ("getrssithreshold", CommandId::GetAdvertRssiThreshold),
];

/// A host-to-module command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Any command sent as its bare id byte.
    Simple(CommandId),
    Connect(NodeId),
    Disconnect(NodeId),
    Pair(NodeId),
    Unpair(NodeId),
    GetPairEntry(u8),
    GetConnection(u8),
    /// Relay `data` to `dest`; with `ack` set the module reports delivery
    /// through an `RX_ACK` event.
    TxPayload { dest: NodeId, ack: bool, data: Bytes },
}

impl Command {
    pub fn id(&self) -> CommandId {
        match self {
            Command::Simple(id) => *id,
            Command::Connect(_) => CommandId::Connect,
            Command::Disconnect(_) => CommandId::Disconnect,
            Command::Pair(_) => CommandId::Pair,
            Command::Unpair(_) => CommandId::Unpair,
            Command::GetPairEntry(_) => CommandId::GetPairEntry,
            Command::GetConnection(_) => CommandId::GetConnection,
            Command::TxPayload { .. } => CommandId::TxPayload,
        }
    }

    /// Build the frame payload for this command.
    ///
    /// ```
    /// use omlink_proto::{Command, NodeId};
    ///
    /// let cmd = Command::Connect(NodeId::new(0x12_3456).unwrap());
    /// assert_eq!(&cmd.encode().unwrap()[..], &[0x1E, 0x56, 0x34, 0x12]);
    /// ```
    pub fn encode(&self) -> Result<Bytes, CommandError> {
        let mut buf = BytesMut::with_capacity(8);
        buf.put_u8(self.id().as_u8());
        match self {
            Command::Simple(_) => {}
            Command::Connect(node)
            | Command::Disconnect(node)
            | Command::Pair(node)
            | Command::Unpair(node) => buf.put_slice(&node.to_bytes()),
            Command::GetPairEntry(index) | Command::GetConnection(index) => buf.put_u8(*index),
            Command::TxPayload { dest, ack, data } => {
                if data.len() > MAX_TX_DATA {
                    return Err(CommandError::PayloadTooLarge {
                        size: data.len(),
                        max: MAX_TX_DATA,
                    });
                }
                buf.reserve(TX_HEADER_LEN + data.len());
                buf.put_slice(&dest.to_bytes());
                buf.put_u8(u8::from(*ack));
                buf.put_u8(data.len() as u8);
                buf.put_slice(data);
            }
        }
        Ok(buf.freeze())
    }

    /// Terminal word for an argument-free command id, if it has one.
    pub fn word_for(id: CommandId) -> Option<&'static str> {
        SIMPLE_WORDS
            .iter()
            .find(|(_, candidate)| *candidate == id)
            .map(|(word, _)| *word)
    }

    /// Every terminal word the parser accepts.
    pub fn words() -> impl Iterator<Item = &'static str> {
        SIMPLE_WORDS.iter().map(|(word, _)| *word).chain([
            "connect",
            "disconnect",
            "pair",
            "unpair",
            "getpairentry",
            "getconnection",
            "tx",
            "txack",
        ])
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id().name())?;
        match self {
            Command::Simple(_) => Ok(()),
            Command::Connect(node)
            | Command::Disconnect(node)
            | Command::Pair(node)
            | Command::Unpair(node) => write!(f, " NodeId:{node}"),
            Command::GetPairEntry(index) | Command::GetConnection(index) => {
                write!(f, " Index:{index}")
            }
            Command::TxPayload { dest, ack, data } => write!(
                f,
                " DestNodeId:{dest}, Ack:{}, Len:{}",
                u8::from(*ack),
                data.len()
            ),
        }
    }
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

fn node_arg<'a>(
    command: &'static str,
    rest: &'a str,
) -> Result<(NodeId, &'a str), CommandError> {
    let (token, rest) = next_token(rest);
    if token.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "node_id",
        });
    }
    let node = token.parse::<NodeId>().map_err(|err| match err {
        CommandError::NodeIdOutOfRange(_) => err,
        _ => CommandError::InvalidArgument {
            command,
            argument: "node_id",
            value: token.to_string(),
        },
    })?;
    Ok((node, rest))
}

fn index_arg(command: &'static str, rest: &str) -> Result<u8, CommandError> {
    let (token, _) = next_token(rest);
    if token.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "index",
        });
    }
    token.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        argument: "index",
        value: token.to_string(),
    })
}

fn tx_arg(command: &'static str, rest: &str, ack: bool) -> Result<Command, CommandError> {
    let (dest, text) = node_arg(command, rest)?;
    if text.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "text",
        });
    }
    if text.len() > MAX_TX_DATA {
        return Err(CommandError::PayloadTooLarge {
            size: text.len(),
            max: MAX_TX_DATA,
        });
    }
    Ok(Command::TxPayload {
        dest,
        ack,
        data: Bytes::copy_from_slice(text.as_bytes()),
    })
}

/// Parses terminal command lines such as `getnodeid`, `connect 1193046`
/// or `txack 0x123456 hello world`. Everything after the node id of a
/// `tx`/`txack` line is sent verbatim.
impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = next_token(line.trim());
        let word = word.to_ascii_lowercase();

        if let Some(&(_, id)) = SIMPLE_WORDS.iter().find(|(w, _)| *w == word) {
            return Ok(Command::Simple(id));
        }

        match word.as_str() {
            "connect" => Ok(Command::Connect(node_arg("connect", rest)?.0)),
            "disconnect" => Ok(Command::Disconnect(node_arg("disconnect", rest)?.0)),
            "pair" => Ok(Command::Pair(node_arg("pair", rest)?.0)),
            "unpair" => Ok(Command::Unpair(node_arg("unpair", rest)?.0)),
            "getpairentry" => Ok(Command::GetPairEntry(index_arg("getpairentry", rest)?)),
            "getconnection" => Ok(Command::GetConnection(index_arg("getconnection", rest)?)),
            "tx" => tx_arg("tx", rest, false),
            "txack" => tx_arg("txack", rest, true),
            _ => Err(CommandError::UnknownCommand(line.trim().to_string())),
        }
    }
}
