use std::cell::RefCell;
use std::collections::BTreeMap;

use sultkit_frame::{ChannelKey, WILDCARD};
use sultkit_route::{Router, RunOptions, RunOutcome};

use crate::cmd::{open_capture, SummaryArgs};
use crate::exit::{route_error, CliResult, SUCCESS};
use crate::output::{print_summary, ChannelSummary, OutputFormat, SummaryOutput};

pub fn run(args: SummaryArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = open_capture(&args.file)?;
    let counts: RefCell<BTreeMap<ChannelKey, (u64, u64)>> = RefCell::new(BTreeMap::new());

    let mut router = Router::new();
    router.register(WILDCARD, WILDCARD, |packet| {
        let mut counts = counts.borrow_mut();
        let entry = counts.entry(packet.key()).or_default();
        entry.0 += 1;
        entry.1 += packet.header.len as u64;
    });

    let options = RunOptions::default().max_offset(args.max_offset);
    let outcome = router
        .run(&mut reader, &options)
        .map_err(|err| route_error("decode failed", err))?;
    let stats = router.stats();
    drop(router);

    let out = SummaryOutput {
        file: args.file.display().to_string(),
        outcome: match outcome {
            RunOutcome::StreamEnded => "stream ended",
            RunOutcome::StoppedEarly => "stopped early",
            RunOutcome::FrameBoundary => "stopped at frame boundary",
        },
        bytes: reader.offset(),
        packets: stats.packets,
        data_loss: stats.data_loss,
        sequence_anomalies: stats.sequence_anomalies,
        channels: collect_channels(counts.into_inner()),
    };

    tracing::info!(packets = out.packets, channels = out.channels.len(), "summary complete");
    print_summary(&out, format);
    Ok(SUCCESS)
}

fn collect_channels(counts: BTreeMap<ChannelKey, (u64, u64)>) -> Vec<ChannelSummary> {
    counts
        .into_iter()
        .map(|(key, (packets, words))| ChannelSummary {
            type_code: key.type_code,
            id: key.id,
            packets,
            words,
        })
        .collect()
}
