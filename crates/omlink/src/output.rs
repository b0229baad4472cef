use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use omlink_module::{Line, LineSink, LineTag, LinkStats};
use omlink_proto::hexdump::to_hex;
use omlink_proto::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    timestamp_ms: u64,
    kind: &'static str,
    id: String,
    text: String,
    message: &'a Message,
}

const TABLE_HEADER: [&str; 4] = ["TIME (ms)", "KIND", "ID", "MESSAGE"];

/// Renders link output on stdout in the selected format.
///
/// Text formats are driven by the link's tagged lines; JSON and table
/// output need the decoded structure and are fed through
/// [`message`](Printer::message). Error lines always go to stderr.
pub struct Printer {
    format: OutputFormat,
    batch: bool,
    rows: Vec<Vec<String>>,
}

impl Printer {
    /// Print every message as soon as it is decoded.
    pub fn streaming(format: OutputFormat) -> Self {
        Self {
            format,
            batch: false,
            rows: Vec::new(),
        }
    }

    /// Collect table rows until [`finish`](Printer::finish).
    pub fn batched(format: OutputFormat) -> Self {
        Self {
            format,
            batch: true,
            rows: Vec::new(),
        }
    }

    pub fn message(&mut self, msg: &Message, timestamp_ms: u64) {
        match self.format {
            OutputFormat::Json => {
                let out = MessageOutput {
                    timestamp_ms,
                    kind: msg.kind(),
                    id: format!("0x{:02X}", msg.id()),
                    text: msg.to_string(),
                    message: msg,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => {
                let row = vec![
                    timestamp_ms.to_string(),
                    msg.kind().to_string(),
                    format!("0x{:02X}", msg.id()),
                    msg.to_string(),
                ];
                if self.batch {
                    self.rows.push(row);
                } else {
                    print_table(vec![row]);
                }
            }
            OutputFormat::Pretty | OutputFormat::Raw => {}
        }
    }

    /// Flush collected table rows.
    pub fn finish(&mut self) {
        if !self.rows.is_empty() {
            print_table(std::mem::take(&mut self.rows));
        }
    }
}

impl LineSink for Printer {
    fn emit(&mut self, line: Line) {
        match (line.tag, self.format) {
            (LineTag::Error, _) => eprintln!("error: {}", line.text),
            (LineTag::Event | LineTag::Response, OutputFormat::Pretty) => {
                println!("[{:>8}] {}", line.timestamp_ms, line.text)
            }
            (LineTag::Trace, OutputFormat::Pretty) => println!("{:>10} {}", "", line.text),
            (LineTag::Event | LineTag::Response, OutputFormat::Raw) => println!("{}", line.text),
            _ => {}
        }
    }
}

fn print_table(rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(TABLE_HEADER.to_vec());
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    command: String,
    payload: String,
    frame: String,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    word: Option<&'a str>,
}

/// Print an encoded command frame.
pub fn print_frame(command: &str, word: Option<&str>, payload: &[u8], frame: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                command: command.to_string(),
                payload: to_hex(payload),
                frame: to_hex(frame),
                length: frame.len(),
                word,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "LENGTH", "FRAME"])
                .add_row(vec![
                    command.to_string(),
                    frame.len().to_string(),
                    spaced_hex(frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", spaced_hex(frame)),
        OutputFormat::Raw => print_raw(frame),
    }
}

#[derive(Serialize)]
struct StatsOutput {
    frames: u64,
    responses: u64,
    events: u64,
    framing_errors: u64,
    length_errors: u64,
    checksum_errors: u64,
    stale_frames: u64,
    unknown_ids: u64,
    truncated: u64,
    empty_payloads: u64,
}

impl From<LinkStats> for StatsOutput {
    fn from(stats: LinkStats) -> Self {
        Self {
            frames: stats.receiver.frames,
            responses: stats.responses,
            events: stats.events,
            framing_errors: stats.receiver.framing_errors,
            length_errors: stats.receiver.length_errors,
            checksum_errors: stats.receiver.checksum_errors,
            stale_frames: stats.receiver.stale_frames,
            unknown_ids: stats.unknown_ids,
            truncated: stats.truncated,
            empty_payloads: stats.empty_payloads,
        }
    }
}

/// Summary counters, always on stderr so stdout stays machine readable.
pub fn print_stats(stats: LinkStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput::from(stats);
            eprintln!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        _ => eprintln!(
            "frames={} responses={} events={} errors={}",
            stats.receiver.frames,
            stats.responses,
            stats.events,
            stats.errors()
        ),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// `AA 55 01 85` style hex.
pub fn spaced_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaced_hex_formats_frames() {
        assert_eq!(spaced_hex(&[0xAA, 0x55, 0x01, 0x85]), "AA 55 01 85");
        assert_eq!(spaced_hex(&[]), "");
    }

    #[test]
    fn batched_table_rows_collected_until_finish() {
        let msg = omlink_proto::dispatch(&[0x80, 0x00]).unwrap();
        let mut printer = Printer::batched(OutputFormat::Table);
        printer.message(&msg, 5);
        assert_eq!(printer.rows.len(), 1);
        assert_eq!(printer.rows[0][2], "0x80");
        printer.finish();
        assert!(printer.rows.is_empty());
    }
}
