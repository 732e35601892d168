//! Decode multiplexed SULT telemetry captures.
//!
//! A SULT capture interleaves many `(type, id)` data channels in one byte
//! stream. sultkit recovers packet boundaries from that stream and hands
//! each channel's data to your callbacks.
//!
//! # Crate Structure
//!
//! - [`frame`]: header layout, sync recovery, packet reader and writer
//! - [`route`]: channel router, reassembly buffer, channel extractor
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use sultkit::frame::PacketReader;
//! use sultkit::route::{Router, RunOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = PacketReader::new(BufReader::new(File::open("capture.sult")?));
//! let mut router = Router::new();
//! router.register(0x22, 0xFF, |packet| {
//!     println!("{}", packet.header);
//! });
//! router.run(&mut reader, &RunOptions::default())?;
//! # Ok(())
//! # }
//! ```

/// Re-export frame types.
pub mod frame {
    pub use sultkit_frame::*;
}

/// Re-export routing types.
pub mod route {
    pub use sultkit_route::*;
}
