use std::io::Read;

use omlink_frame::{FrameConfig, ReceiverState};
use omlink_module::{LinkConfig, ManualClock, ModuleLink};
use omlink_transport::Loopback;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_stats, OutputFormat, Printer};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.min_length == 0 || args.min_length > args.max_length {
        return Err(CliError::new(
            USAGE,
            format!(
                "invalid length bounds [{}, {}]",
                args.min_length, args.max_length
            ),
        ));
    }

    let bytes = read_input(&args)?;
    let config = LinkConfig {
        frame: FrameConfig {
            min_length: args.min_length,
            max_length: args.max_length,
            ..FrameConfig::default()
        },
        ..LinkConfig::default()
    };

    // Timestamps in a capture are byte offsets.
    let clock = ManualClock::new(0);
    let mut link = ModuleLink::with_clock(
        Loopback::new(),
        Printer::batched(format),
        clock.clone(),
        config,
    );
    link.init();

    for (offset, byte) in bytes.into_iter().enumerate() {
        clock.set(offset as u64);
        if let Some(msg) = link.on_byte(byte) {
            link.sink_mut().message(&msg, offset as u64);
        }
    }
    link.sink_mut().finish();

    let stats = link.stats();
    if link.receiver().state() != ReceiverState::AwaitingHeader1 {
        eprintln!("warning: capture ends inside a frame");
    }
    print_stats(stats, format);

    if stats.errors() > 0 {
        Ok(DATA_INVALID)
    } else {
        Ok(SUCCESS)
    }
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed to read {}", path.display()), err));
    }
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed to read stdin", err))?;
    Ok(buf)
}
