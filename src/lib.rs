//! Filter long reads on the quality value stored at the end of read id and on read length,
//! write passing reads in a gzip fastq and keep a bounded sample of read metrics for plotting.
//!
//! ```no_run
//! let mut config = fqclean::config::Config::new("reads.fq.gz", "sample");
//! config.thresholds.quality_cutoff = 9.0;
//!
//! let summary = fqclean::pipeline::run(&config.validate()?)?;
//! fqclean::report::write_summary(&mut std::io::stdout(), &summary.counters)
//!     .map_err(|source| fqclean::error::Error::WriteOutput { source })?;
//! # Ok::<(), fqclean::error::Error>(())
//! ```

/* mod declaration */
pub mod block;
pub mod cli;
pub mod config;
pub mod error;
pub mod fasta;
pub mod fastq;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sampler;
pub mod sink;
pub mod source;
pub mod stream;
