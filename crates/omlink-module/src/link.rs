use std::thread;
use std::time::{Duration, Instant};

use omlink_frame::{FrameReceiver, FrameTransmitter, ReceiverStats};
use omlink_proto::{dispatch, hex_dump, Command, CommandId, DecodeError, Event, Message, Response};
use omlink_transport::{ByteSink, ByteSource, TransportError};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::sink::{Line, LineSink, LineTag, TracingSink};

/// Counters for one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frame-level counters from the receiver.
    pub receiver: ReceiverStats,
    /// Responses decoded.
    pub responses: u64,
    /// Events decoded.
    pub events: u64,
    /// Payloads whose id is in neither catalog.
    pub unknown_ids: u64,
    /// Payloads shorter than their layout.
    pub truncated: u64,
    /// Frames that carried no payload at all.
    pub empty_payloads: u64,
}

impl LinkStats {
    /// Payloads that passed the checksum but could not be decoded.
    pub fn decode_errors(&self) -> u64 {
        self.unknown_ids + self.truncated + self.empty_payloads
    }

    /// Every frame- and decode-level failure.
    pub fn errors(&self) -> u64 {
        self.receiver.errors() + self.decode_errors()
    }
}

/// One host-side connection to a radio module.
///
/// The link owns the frame receiver for its transport and is driven by the
/// caller: feed it bytes with [`on_byte`](Self::on_byte), or let
/// [`process`](Self::process) drain whatever the transport has buffered.
/// Every decoded message and every error is written to the [`LineSink`] as a
/// tagged line and decoded messages are also handed back to the caller.
/// Nothing here blocks except [`wait_for_response`](Self::wait_for_response).
pub struct ModuleLink<L, S = TracingSink, C = SystemClock> {
    transport: L,
    sink: S,
    clock: C,
    config: LinkConfig,
    receiver: FrameReceiver,
    stats: LinkStats,
}

impl<L, S> ModuleLink<L, S, SystemClock>
where
    L: ByteSource + ByteSink,
    S: LineSink,
{
    /// Create a link with default configuration.
    pub fn new(transport: L, sink: S) -> Self {
        Self::with_config(transport, sink, LinkConfig::default())
    }

    /// Create a link with explicit configuration.
    pub fn with_config(transport: L, sink: S, config: LinkConfig) -> Self {
        Self::with_clock(transport, sink, SystemClock::new(), config)
    }
}

impl<L, S, C> ModuleLink<L, S, C>
where
    L: ByteSource + ByteSink,
    S: LineSink,
    C: Clock,
{
    /// Create a link stamping lines from `clock`.
    pub fn with_clock(transport: L, sink: S, clock: C, config: LinkConfig) -> Self {
        let receiver = FrameReceiver::new(config.frame.clone());
        Self {
            transport,
            sink,
            clock,
            config,
            receiver,
            stats: LinkStats::default(),
        }
    }

    /// Drop any partial frame and wait for a fresh header.
    pub fn init(&mut self) {
        self.receiver.reset();
        debug!("module link initialized");
    }

    /// Feed one received byte.
    ///
    /// Returns the decoded message when this byte completed a valid frame.
    /// Frame errors are reported to the sink and counted.
    pub fn on_byte(&mut self, byte: u8) -> Option<Message> {
        let now = self.clock.now_millis();
        match self.receiver.on_byte_at(byte, now) {
            Ok(Some(payload)) => self.handle(&payload),
            Ok(None) => None,
            Err(err) => {
                self.emit(LineTag::Error, err.to_string());
                None
            }
        }
    }

    /// Feed every byte the transport has available right now.
    pub fn process(&mut self) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        while self.transport.bytes_available()? {
            let byte = match self.transport.read_byte() {
                Ok(byte) => byte,
                Err(TransportError::Empty) => break,
                Err(err) => return Err(err.into()),
            };
            if let Some(msg) = self.on_byte(byte) {
                messages.push(msg);
            }
        }
        Ok(messages)
    }

    /// Dispatch an already validated payload.
    ///
    /// This is the path taken by every received frame; it is public so that
    /// captured payloads can be replayed without framing them first.
    pub fn handle(&mut self, payload: &[u8]) -> Option<Message> {
        match dispatch(payload) {
            Ok(msg) => {
                let tag = match msg {
                    Message::Response(_) => {
                        self.stats.responses += 1;
                        LineTag::Response
                    }
                    Message::Event(_) => {
                        self.stats.events += 1;
                        LineTag::Event
                    }
                };
                self.emit(tag, msg.to_string());
                if let Some(data) = msg.as_event().and_then(Event::data) {
                    for line in hex_dump(data, self.config.hex_dump_width) {
                        self.emit(LineTag::Trace, line);
                    }
                }
                Some(msg)
            }
            Err(err) => {
                match err {
                    DecodeError::Empty => self.stats.empty_payloads += 1,
                    DecodeError::Truncated { .. } => self.stats.truncated += 1,
                    DecodeError::UnknownResponse(_) | DecodeError::UnknownEvent(_) => {
                        self.stats.unknown_ids += 1
                    }
                }
                warn!(error = %err, len = payload.len(), "dropping undecodable payload");
                self.emit(LineTag::Error, err.to_string());
                None
            }
        }
    }

    /// Frame and write a raw payload.
    pub fn transmit(&mut self, payload: &[u8]) -> Result<()> {
        FrameTransmitter::with_config(&mut self.transport, self.config.frame.clone())
            .transmit(payload)?;
        Ok(())
    }

    /// Encode and transmit a command.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let payload = command.encode()?;
        self.transmit(&payload)?;
        self.emit(LineTag::Trace, format!("MCU_CMD_{command}"));
        Ok(())
    }

    /// Send `command` and wait for its response.
    pub fn request(&mut self, command: &Command, timeout: Duration) -> Result<Response> {
        self.send(command)?;
        self.wait_for_response(command.id(), timeout)
    }

    /// Poll the transport until the response to `command` arrives.
    ///
    /// Messages received meanwhile are reported to the sink as usual. Any
    /// `UNKNOWN_COMMAND` response also ends the wait: its body is not a
    /// reliable command id, and the module sends nothing else after it.
    pub fn wait_for_response(&mut self, command: CommandId, timeout: Duration) -> Result<Response> {
        let deadline = Instant::now() + timeout;
        loop {
            while self.transport.bytes_available()? {
                let byte = match self.transport.read_byte() {
                    Ok(byte) => byte,
                    Err(TransportError::Empty) => break,
                    Err(err) => return Err(err.into()),
                };
                if let Some(Message::Response(rsp)) = self.on_byte(byte) {
                    if answers(&rsp, command) {
                        return Ok(rsp);
                    }
                    debug!(expected = %command, got = %rsp.command(), "ignoring unrelated response");
                }
            }

            if self.transport.is_closed() {
                return Err(LinkError::Disconnected(format!(
                    "transport closed while waiting for {command}"
                )));
            }
            if Instant::now() >= deadline {
                return Err(LinkError::Timeout(timeout));
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Snapshot of the link counters.
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            receiver: self.receiver.stats(),
            ..self.stats
        }
    }

    fn emit(&mut self, tag: LineTag, text: String) {
        let line = Line {
            tag,
            timestamp_ms: self.clock.now_millis(),
            text,
        };
        self.sink.emit(line);
    }
}

impl<L, S, C> ModuleLink<L, S, C> {
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn receiver(&self) -> &FrameReceiver {
        &self.receiver
    }

    pub fn transport(&self) -> &L {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut L {
        &mut self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consume the link and return its transport and sink.
    pub fn into_parts(self) -> (L, S) {
        (self.transport, self.sink)
    }
}

fn answers(rsp: &Response, command: CommandId) -> bool {
    matches!(rsp, Response::UnknownCommand { .. }) || rsp.command() == command
}
