use bytes::BytesMut;
use omlink_frame::encode_frame;
use omlink_proto::Command;

use crate::cmd::{command_line, EncodeArgs};
use crate::exit::{command_error, frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let command: Command = command_line(&args.words)
        .parse()
        .map_err(|err| command_error("invalid command", err))?;
    let payload = command
        .encode()
        .map_err(|err| command_error("encode failed", err))?;

    let mut frame = BytesMut::new();
    encode_frame(&payload, &mut frame).map_err(|err| frame_error("encode failed", err))?;

    print_frame(
        &command.to_string(),
        Command::word_for(command.id()),
        &payload,
        &frame,
        format,
    );
    Ok(SUCCESS)
}
