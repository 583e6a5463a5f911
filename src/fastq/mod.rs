//! Memory mapped fastq reading.

/* mod declaration */
pub mod block;

pub use self::block::{Producer, Reader};
