//! h5chan - read-only accessor for HDF5 measurement-channel files.
//!
//! Measurement files follow a fixed hierarchy:
//!
//! ```text
//! measurements/<idx>/channels/<channelId>/blocks/<idx>/<datasetName>
//! ```
//!
//! The crate is a thin traversal and marshalling layer over that layout:
//! channel discovery, a fixed allow-list of channel attributes, dataset
//! enumeration and shape inspection, and clamped chunked reads of unsigned
//! 16-bit samples. Storage, chunking and compression are the HDF5 library's
//! business.
//!
//! Two surfaces are exposed:
//!
//! * [`ChannelReader`] - one open file, typed [`AccessError`] results.
//! * [`HandleRegistry`] - a handle table for host processes, degrading every
//!   failure to an empty result plus a log diagnostic.
//!
//! # Example
//!
//! ```no_run
//! use h5chan::ChannelReader;
//!
//! # fn main() -> h5chan::Result<()> {
//! let reader = ChannelReader::open("measurement.h5")?;
//! for id in reader.channel_ids()? {
//!     let shape = reader.dataset_shape(&id, "raw")?;
//!     let samples = reader.read_chunk(&id, "raw", 0, 4096)?;
//!     println!("{id}: shape {shape:?}, first chunk {} samples", samples.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod error;
pub mod layout;
pub mod reader;
pub mod registry;

pub use chunk::FlattenPolicy;
pub use error::{AccessError, Result};
pub use layout::StorageLayout;
pub use reader::ChannelReader;
pub use registry::{Handle, HandleRegistry};
