use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use sultkit_frame::PacketHeader;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub type_code: u8,
    pub id: u8,
    pub packets: u64,
    pub words: u64,
}

#[derive(Serialize, Debug)]
pub struct SummaryOutput {
    pub file: String,
    pub outcome: &'static str,
    pub bytes: u64,
    pub packets: u64,
    pub data_loss: u64,
    pub sequence_anomalies: u64,
    pub channels: Vec<ChannelSummary>,
}

pub fn print_summary(out: &SummaryOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "ID", "PACKETS", "WORDS"]);
            for ch in &out.channels {
                table.add_row(vec![
                    format!("0x{:02X}", ch.type_code),
                    format!("0x{:02X}", ch.id),
                    ch.packets.to_string(),
                    ch.words.to_string(),
                ]);
            }
            println!("{table}");
            println!(
                "{} packets, {} bytes ({}); data loss: {}, sequence anomalies: {}",
                out.packets, out.bytes, out.outcome, out.data_loss, out.sequence_anomalies
            );
        }
        OutputFormat::Pretty => {
            for ch in &out.channels {
                println!(
                    "Type 0x{:X} ID 0x{:X} : {} packets",
                    ch.type_code, ch.id, ch.packets
                );
            }
        }
    }
}

#[derive(Serialize)]
struct HeaderOutput {
    offset: u64,
    sync: u8,
    type_code: u8,
    id: u8,
    flags: u8,
    len: u16,
    rtc: u64,
    seq_len: u32,
}

pub fn print_header(header: &PacketHeader, offset: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&HeaderOutput {
            offset,
            sync: header.sync,
            type_code: header.type_code,
            id: header.id,
            flags: header.flags,
            len: header.len,
            rtc: header.rtc(),
            seq_len: header.seq_len,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("0x{offset:08X}  Packet.head({header})");
        }
    }
}

#[derive(Serialize)]
pub struct ExtractOutput {
    pub type_code: u8,
    pub id: u8,
    pub files: Vec<String>,
    pub rows: usize,
}

pub fn print_extract(out: &ExtractOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table | OutputFormat::Pretty => {
            for file in &out.files {
                println!("wrote {file}");
            }
            println!(
                "{} frame(s), {} row(s) from channel 0x{:02X}/0x{:02X}",
                out.files.len(),
                out.rows,
                out.type_code,
                out.id
            );
        }
    }
}

fn print_json(value: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
