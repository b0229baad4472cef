mod cmd;
mod exit;
mod logging;
mod output;

use clap::{ArgAction, Parser};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "omlink",
    version,
    about = "Talk to a BLE radio module over its serial link"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// More protocol logging; repeat (-vv) to trace every byte-level step.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.verbose);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_with_trailing_words() {
        let cli = Cli::try_parse_from([
            "omlink",
            "send",
            "/dev/ttyACM0",
            "--wait",
            "tx",
            "9",
            "hello",
            "world",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert!(args.wait);
                assert_eq!(args.port.port, "/dev/ttyACM0");
                assert_eq!(args.words, ["tx", "9", "hello", "world"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_hex_with_file() {
        let err = Cli::try_parse_from([
            "omlink",
            "decode",
            "--hex",
            "AA 55 01 85",
            "--file",
            "capture.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn encode_requires_words() {
        let err = Cli::try_parse_from(["omlink", "encode"]).expect_err("missing words");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn verbose_flag_counts_repeats() {
        let cli = Cli::try_parse_from(["omlink", "-vv", "encode", "nop"]).expect("should parse");
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["omlink", "encode", "nop"]).expect("should parse");
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_monitor_options() {
        let cli = Cli::try_parse_from([
            "omlink",
            "monitor",
            "COM3",
            "--baud",
            "115200",
            "--stale",
            "50ms",
            "--count",
            "4",
            "--send",
            "getnodeid",
        ])
        .expect("monitor args should parse");
        match cli.command {
            Command::Monitor(args) => {
                assert_eq!(args.port.baud, 115_200);
                assert_eq!(args.port.stale.as_deref(), Some("50ms"));
                assert_eq!(args.count, Some(4));
                assert_eq!(args.send, ["getnodeid"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
