//! A link talking to a scripted module emulator.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::BytesMut;
use omlink_frame::{encode_frame, FrameReceiver};
use omlink_module::{LineTag, LinkConfig, LinkError, ManualClock, MemorySink, ModuleLink};
use omlink_proto::{Command, CommandId, Event, NodeId, Response, Status};
use omlink_transport::{ByteSink, ByteSource, StreamLink};

/// Answers command frames the way the radio module does.
struct Emulator {
    node_id: NodeId,
    commands: FrameReceiver,
    outbound: VecDeque<u8>,
    seen: Vec<u8>,
}

impl Emulator {
    fn new(node_id: u32) -> Self {
        Self {
            node_id: NodeId::new(node_id).unwrap(),
            commands: FrameReceiver::default(),
            outbound: VecDeque::new(),
            seen: Vec::new(),
        }
    }

    fn reply(&mut self, payload: &[u8]) {
        let mut buf = BytesMut::new();
        encode_frame(payload, &mut buf).unwrap();
        self.outbound.extend(buf.iter().copied());
    }

    fn on_command(&mut self, payload: &[u8]) {
        let id = payload[0];
        self.seen.push(id);
        match CommandId::from_u8(id) {
            Some(CommandId::GetNodeId) => {
                let [a, b, c] = self.node_id.to_bytes();
                // an unsolicited event sneaks in ahead of the response
                self.reply(&[0x0E, 0x01, 0x00, 0x00]);
                self.reply(&[0x8F, a, b, c, 0x00]);
            }
            Some(CommandId::TxPayload) => {
                self.reply(&[0xAB, 0x2A, 0x00]);
                if payload[4] == 1 {
                    let dest = [payload[1], payload[2], payload[3]];
                    self.reply(&[0x0D, dest[0], dest[1], dest[2], 0x2A]);
                }
            }
            Some(CommandId::Connect) => self.reply(&[0x9E, 0x53]),
            Some(_) | None => self.reply(&[0xFF, id]),
        }
    }
}

impl Read for Emulator {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.outbound.is_empty() {
            return Err(io::ErrorKind::TimedOut.into());
        }
        let n = buf.len().min(self.outbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for Emulator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            if let Ok(Some(payload)) = self.commands.on_byte(b) {
                self.on_command(&payload);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn link(node_id: u32) -> ModuleLink<StreamLink<Emulator>, MemorySink, ManualClock> {
    ModuleLink::with_clock(
        StreamLink::new(Emulator::new(node_id)),
        MemorySink::new(),
        ManualClock::new(0),
        LinkConfig::default(),
    )
}

const WAIT: Duration = Duration::from_millis(100);

#[test]
fn get_node_id_round_trip() {
    let mut link = link(0x12_3456);

    let rsp = link.request(&"getnodeid".parse().unwrap(), WAIT).unwrap();

    assert_eq!(
        rsp,
        Response::GetNodeId {
            node_id: NodeId::new(0x12_3456).unwrap(),
            status: Status::SUCCESS,
        }
    );
    assert_eq!(
        link.sink().texts(LineTag::Event),
        vec!["MCU_EVT_PING_REQUEST. NodeId:1"]
    );
    assert_eq!(link.stats().responses, 1);
    assert_eq!(link.stats().events, 1);
}

#[test]
fn acked_payload_reports_delivery() {
    let mut link = link(1);

    let rsp = link.request(&"txack 9 hello".parse().unwrap(), WAIT).unwrap();
    assert_eq!(rsp, Response::TxPayload { tx_seq: 0x2A, status: Status::SUCCESS });

    let later = link.process().unwrap();
    assert_eq!(later.len(), 1);
    assert_eq!(
        later[0].as_event(),
        Some(&Event::RxAck {
            src_node_id: NodeId::new(9).unwrap(),
            tx_seq: 0x2A
        })
    );
}

#[test]
fn failure_status_is_returned_not_raised() {
    let mut link = link(1);
    let rsp = link
        .request(&Command::Connect(NodeId::new(5).unwrap()), WAIT)
        .unwrap();
    assert_eq!(rsp.status().name(), "STATUS_BLE_NODE_NOT_CONNECTED");
    assert!(!rsp.status().is_success());
}

#[test]
fn rejected_command_ends_the_wait() {
    let mut link = link(1);
    let rsp = link.request(&"factoryreset".parse().unwrap(), WAIT).unwrap();
    assert_eq!(
        rsp,
        Response::UnknownCommand {
            rejected: Some(CommandId::BleFactoryReset.as_u8())
        }
    );
    assert_eq!(link.transport().get_ref().seen, vec![0x07]);
}

#[test]
fn silent_module_times_out() {
    let mut link = link(1);
    let err = link
        .wait_for_response(CommandId::GetNodeId, Duration::from_millis(10))
        .unwrap_err();
    assert!(matches!(err, LinkError::Timeout(_)));
}

#[test]
fn transport_traits_are_usable_directly() {
    let mut transport = StreamLink::new(Emulator::new(1));
    let mut buf = BytesMut::new();
    encode_frame(&[0x0F], &mut buf).unwrap();
    transport.write_bytes(&buf).unwrap();

    let mut rx = FrameReceiver::default();
    let mut payloads = Vec::new();
    while transport.bytes_available().unwrap() {
        if let Some(p) = rx.on_byte(transport.read_byte().unwrap()).unwrap() {
            payloads.push(p);
        }
    }
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[1][0], 0x8F);
}
