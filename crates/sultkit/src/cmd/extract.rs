use std::path::{Path, PathBuf};

use sultkit_route::ChannelExtractor;

use crate::cmd::{open_capture, ExtractArgs};
use crate::exit::{io_error, route_error, CliResult, SUCCESS};
use crate::output::{print_extract, ExtractOutput, OutputFormat};

pub fn run(args: ExtractArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = open_capture(&args.file)?;
    let mut extractor = ChannelExtractor::new(args.type_code, args.id);
    if let Some(element) = args.element {
        extractor = extractor.with_element(element.into());
    }

    tracing::info!(channel = %extractor.key(), "extracting");
    let mut files = Vec::new();
    let mut rows = 0usize;

    while let Some(samples) = extractor
        .extract(&mut reader)
        .map_err(|err| route_error("extract failed", err))?
    {
        let path = numbered_path(&args.prefix, files.len());
        std::fs::write(&path, samples.to_be_bytes())
            .map_err(|err| io_error(&format!("write {} failed", path.display()), err))?;
        tracing::debug!(path = %path.display(), rows = samples.row_count(), "frame written");

        rows += samples.row_count();
        files.push(path.display().to_string());
    }

    print_extract(
        &ExtractOutput {
            type_code: args.type_code,
            id: args.id,
            files,
            rows,
        },
        format,
    );
    Ok(SUCCESS)
}

/// `<dir>/<stem>_<index:05><ext>` for a prefix `<dir>/<stem><ext>`.
fn numbered_path(prefix: &Path, index: usize) -> PathBuf {
    let stem = prefix
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = prefix
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    prefix.with_file_name(format!("{stem}_{index:05}{suffix}"))
}
