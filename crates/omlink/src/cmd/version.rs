use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("omlink {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!(
            "target: {}",
            option_env!("OMLINK_BUILD_TARGET").unwrap_or("unknown")
        );
        println!("async codec: {}", cfg!(feature = "async"));
        println!(
            "link: {} baud, payload <= {} bytes",
            omlink_transport::serial::DEFAULT_BAUD_RATE,
            omlink_frame::MAX_PAYLOAD
        );
    }
    Ok(SUCCESS)
}
