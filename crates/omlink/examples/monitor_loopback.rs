//! Drive a link against canned module traffic, no hardware needed.
//!
//! Run with:
//!   cargo run --example monitor_loopback

use omlink::frame::FrameTransmitter;
use omlink::module::{Line, LineSink};
use omlink::transport::Loopback;
use omlink::{Command, LinkConfig, ModuleLink};

/// Prints every line the way `omlink monitor --format pretty` does.
struct Stdout;

impl LineSink for Stdout {
    fn emit(&mut self, line: Line) {
        println!("[{:>6}] {:<8} {}", line.timestamp_ms, line.tag.as_str(), line.text);
    }
}

fn frames(payloads: &[&[u8]]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut tx = FrameTransmitter::new(Vec::new());
    for payload in payloads {
        tx.transmit(payload)?;
    }
    Ok(tx.into_inner())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // What a freshly booted module says: reboot event, a ping, a relayed
    // payload, then the answer to GET_NODE_ID.
    let traffic = frames(&[
        &[0x00, 0x01, 0x04, 0x56, 0x34, 0x12, 0x02, 0x01, 0x07],
        &[0x0E, 0x09, 0x00, 0x00],
        &[0x0C, 0x09, 0x00, 0x00, 0xC4, 0x05, b'h', b'e', b'l', b'l', b'o'],
        &[0x8F, 0x56, 0x34, 0x12, 0x00],
    ])?;

    let mut transport = Loopback::with_rx(&traffic);
    // line noise after the last frame
    transport.push_rx([0xAA, 0x00]);

    let mut link = ModuleLink::with_config(transport, Stdout, LinkConfig::default());
    link.init();

    let command: Command = "getnodeid".parse()?;
    link.send(&command)?;
    eprintln!("host sent {} bytes", link.transport().tx().len());

    let messages = link.process()?;
    let stats = link.stats();
    eprintln!(
        "{} messages, {} responses, {} events, {} errors",
        messages.len(),
        stats.responses,
        stats.events,
        stats.errors()
    );
    Ok(())
}
