use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use omlink_module::Clock;
use omlink_proto::Command;
use omlink_transport::ByteSource;
use tracing::info;

use crate::cmd::{install_ctrlc_handler, open_link, MonitorArgs};
use crate::exit::{command_error, link_error, CliResult, SUCCESS};
use crate::output::{print_stats, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let commands = args
        .send
        .iter()
        .map(|line| line.parse::<Command>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| command_error("invalid command", err))?;

    let mut link = open_link(&args.port, format)?;
    info!(port = %args.port.port, baud = args.port.baud, "monitoring");

    for command in &commands {
        link.send(command)
            .map_err(|err| link_error("send failed", err))?;
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    'outer: while running.load(Ordering::SeqCst) {
        let messages = link
            .process()
            .map_err(|err| link_error("receive failed", err))?;
        for msg in messages {
            let now = link.clock().now_millis();
            link.sink_mut().message(&msg, now);
            printed += 1;
            if args.count.is_some_and(|limit| printed >= limit) {
                break 'outer;
            }
        }
        if link.transport().is_closed() {
            info!("port closed");
            break;
        }
    }

    print_stats(link.stats(), format);
    Ok(SUCCESS)
}
