//! Channel routing and payload reassembly for SULT captures.
//!
//! This is the layer consumers talk to. Register callbacks on `(type, id)`
//! channels (0xFF is a wildcard), then run the router over a
//! [`PacketReader`](sultkit_frame::PacketReader). Sequence continuity and
//! data-loss flags are checked on the way through and reported as
//! `tracing` warnings; they never stop decoding.

pub mod error;
pub mod extract;
pub mod reassembly;
pub mod router;
pub mod sample;

pub use error::{Result, RouteError};
pub use extract::ChannelExtractor;
pub use reassembly::Reassembler;
pub use router::{Router, RouterStats, RunOptions, RunOutcome};
pub use sample::{decode_elements, ElementLayout, ElementType, Samples};
