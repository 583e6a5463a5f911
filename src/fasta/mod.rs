//! Memory mapped fasta reading.

/* mod declaration */
pub mod block;

pub use self::block::{Producer, Reader};
