use omlink_module::Clock;
use omlink_proto::{Command, Message};

use crate::cmd::{command_line, open_link, parse_duration, SendArgs};
use crate::exit::{command_error, link_error, CliResult, FAILURE, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command: Command = command_line(&args.words)
        .parse()
        .map_err(|err| command_error("invalid command", err))?;
    let timeout = parse_duration(&args.timeout)?;

    let mut link = open_link(&args.port, format)?;

    if !args.wait {
        link.send(&command)
            .map_err(|err| link_error("send failed", err))?;
        return Ok(SUCCESS);
    }

    let rsp = link
        .request(&command, timeout)
        .map_err(|err| link_error("request failed", err))?;
    let ok = rsp.status().is_success();

    let now = link.clock().now_millis();
    link.sink_mut().message(&Message::Response(rsp), now);

    Ok(if ok { SUCCESS } else { FAILURE })
}
