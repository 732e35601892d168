use clap::{Args, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use sultkit_frame::PacketReader;
use sultkit_route::ElementType;

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod extract;
pub mod headers;
pub mod summary;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count packets per channel.
    Summary(SummaryArgs),
    /// Write each frame of one channel to numbered files.
    Extract(ExtractArgs),
    /// Print packet headers.
    Headers(HeadersArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Summary(args) => summary::run(args, format),
        Command::Extract(args) => extract::run(args, format),
        Command::Headers(args) => headers::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Capture file to read.
    pub file: PathBuf,
    /// Stop after this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_offset: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Capture file to read.
    pub file: PathBuf,
    /// Output path prefix; frames go to `<stem>_00000<ext>`, `<stem>_00001<ext>`, ...
    #[arg(long, short = 'e', value_name = "PATH")]
    pub prefix: PathBuf,
    /// Channel type to extract (decimal or 0x-prefixed hex).
    #[arg(long = "type", short = 't', default_value = "0x22", value_parser = parse_channel_byte)]
    pub type_code: u8,
    /// Channel id to extract (decimal or 0x-prefixed hex).
    #[arg(long, short = 'i', default_value = "0x01", value_parser = parse_channel_byte)]
    pub id: u8,
    /// Decode payloads as this element type instead of deriving it from the channel type.
    #[arg(long, value_enum)]
    pub element: Option<ElementArg>,
}

#[derive(Args, Debug)]
pub struct HeadersArgs {
    /// Capture file to read.
    pub file: PathBuf,
    /// Only show this channel type (decimal or 0x-prefixed hex).
    #[arg(long = "type", short = 't', default_value = "0xFF", value_parser = parse_channel_byte)]
    pub type_code: u8,
    /// Only show this channel id (decimal or 0x-prefixed hex).
    #[arg(long, short = 'i', default_value = "0xFF", value_parser = parse_channel_byte)]
    pub id: u8,
    /// Stop after printing N headers.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ElementArg {
    I8,
    I16,
    I32,
    U32,
}

impl From<ElementArg> for ElementType {
    fn from(arg: ElementArg) -> Self {
        match arg {
            ElementArg::I8 => ElementType::I8,
            ElementArg::I16 => ElementType::I16,
            ElementArg::I32 => ElementType::I32,
            ElementArg::U32 => ElementType::U32,
        }
    }
}

pub(crate) fn open_capture(path: &Path) -> CliResult<PacketReader<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|err| io_error(&format!("open {} failed", path.display()), err))?;
    Ok(PacketReader::new(BufReader::new(file)))
}

fn parse_channel_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse::<u8>(),
    };
    parsed.map_err(|_| format!("expected a byte value (0-255 or 0x00-0xFF), got `{input}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_byte_accepts_hex_and_decimal() {
        assert_eq!(parse_channel_byte("0x22").unwrap(), 0x22);
        assert_eq!(parse_channel_byte("0XcC").unwrap(), 0xCC);
        assert_eq!(parse_channel_byte("34").unwrap(), 34);
    }

    #[test]
    fn parse_channel_byte_rejects_out_of_range() {
        assert!(parse_channel_byte("256").is_err());
        assert!(parse_channel_byte("0x100").is_err());
        assert!(parse_channel_byte("abc").is_err());
    }
}
