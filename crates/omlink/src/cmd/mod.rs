use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use omlink_frame::FrameConfig;
use omlink_module::{LinkConfig, ModuleLink};
use omlink_transport::serial::{self, SerialConfig, SerialLink};

use crate::exit::{transport_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::{OutputFormat, Printer};

pub mod decode;
pub mod encode;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a captured byte stream into messages.
    Decode(DecodeArgs),
    /// Build the frame for a command line such as `connect 9`.
    Encode(EncodeArgs),
    /// Print every message a module sends on a serial port.
    Monitor(MonitorArgs),
    /// Send one command to a module and optionally wait for its response.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex bytes to decode (whitespace, commas and 0x prefixes allowed).
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Binary capture file. Default: read stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Smallest accepted length byte.
    #[arg(long, default_value = "1")]
    pub min_length: u8,
    /// Largest accepted length byte.
    #[arg(long, default_value = "255")]
    pub max_length: u8,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command words, e.g. `getnodeid` or `tx 9 hello`.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub words: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial device (e.g. /dev/ttyACM0, COM3).
    pub port: String,
    /// Line speed.
    #[arg(long, default_value_t = omlink_transport::serial::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Drop a partial frame after this much silence (e.g. 50ms).
    #[arg(long, value_name = "DURATION")]
    pub stale: Option<String>,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Command to send once the port is open (repeatable, e.g. --send getnodeid).
    #[arg(long, value_name = "COMMAND")]
    pub send: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Command words, e.g. `getnodeid` or `tx 9 hello`.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub words: Vec<String>,
    /// Wait for the response and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the response (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Parse loosely formatted hex: `AA 55 01 85`, `aa5501 85`, `0xAA,0x55`.
pub(crate) fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let mut out = Vec::new();
    for token in input.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if token.is_empty() {
            continue;
        }
        if token.len() % 2 != 0 {
            return Err(CliError::new(
                USAGE,
                format!("odd number of hex digits in `{token}`"),
            ));
        }
        for pair in token.as_bytes().chunks(2) {
            let text = std::str::from_utf8(pair).unwrap_or("");
            let byte = u8::from_str_radix(text, 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte `{text}`")))?;
            out.push(byte);
        }
    }
    Ok(out)
}

/// Open the serial port and wrap it in a link printing to stdout.
pub(crate) fn open_link(
    args: &PortArgs,
    format: OutputFormat,
) -> CliResult<ModuleLink<SerialLink, Printer>> {
    let stale_after = args.stale.as_deref().map(parse_duration).transpose()?;
    let config = LinkConfig {
        frame: FrameConfig {
            stale_after,
            ..FrameConfig::default()
        },
        ..LinkConfig::default()
    };

    let serial_config = SerialConfig {
        baud_rate: args.baud,
        ..SerialConfig::new(&args.port)
    };
    let transport = serial::open(&serial_config)
        .map_err(|err| transport_error(&format!("failed to open {}", args.port), err))?;

    let mut link = ModuleLink::with_config(transport, Printer::streaming(format), config);
    link.init();
    Ok(link)
}

/// Join trailing command words back into one command line.
pub(crate) fn command_line(words: &[String]) -> String {
    words.join(" ")
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
