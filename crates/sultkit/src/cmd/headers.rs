use sultkit_frame::ChannelKey;
use sultkit_route::Router;

use crate::cmd::{open_capture, HeadersArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_header, OutputFormat};

pub fn run(args: HeadersArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = open_capture(&args.file)?;
    let filter = ChannelKey::new(args.type_code, args.id);

    // Routed without callbacks so continuity advisories still reach the log.
    let mut router = Router::new();
    let mut printed = 0usize;

    loop {
        let offset = reader.offset();
        let packet = match reader.read_packet() {
            Ok(Some(packet)) => packet,
            Ok(None) => break,
            Err(err) => return Err(frame_error("decode failed", err)),
        };
        router.dispatch(&packet);

        if !filter.matches(packet.key()) {
            continue;
        }
        print_header(&packet.header, offset, format);
        printed = printed.saturating_add(1);

        if let Some(limit) = args.limit {
            if printed >= limit {
                break;
            }
        }
    }

    tracing::debug!(printed, "headers done");
    Ok(SUCCESS)
}
