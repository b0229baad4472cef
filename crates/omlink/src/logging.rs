use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Link engine and decoders; `-v` turns these up first.
const PROTOCOL_TARGETS: [&str; 3] = ["omlink", "omlink_module", "omlink_proto"];

/// Byte-level layers; only `-vv` opens them up, they log per frame.
const WIRE_TARGETS: [&str; 2] = ["omlink_frame", "omlink_transport"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Ordered from quietest to noisiest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// `EnvFilter` directives for `--log-level` plus `-v` repetitions.
///
/// Third-party crates (the serial backend) stay at `warn` regardless.
pub fn filter_directives(level: LogLevel, verbose: u8) -> String {
    let protocol = match verbose {
        0 => level,
        1 => level.max(LogLevel::Debug),
        _ => LogLevel::Trace,
    };
    let wire = if verbose >= 2 { LogLevel::Trace } else { level };

    let mut directives = vec!["warn".to_string()];
    directives.extend(
        PROTOCOL_TARGETS
            .iter()
            .map(|target| format!("{target}={}", protocol.as_str())),
    );
    directives.extend(
        WIRE_TARGETS
            .iter()
            .map(|target| format!("{target}={}", wire.as_str())),
    );
    directives.join(",")
}

/// Install the stderr subscriber. Decoded output owns stdout.
///
/// `RUST_LOG`, when set, replaces the computed directives.
pub fn init_logging(format: LogFormat, level: LogLevel, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(verbose >= 2);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
