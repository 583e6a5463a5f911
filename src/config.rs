//! Run configuration, built by command line and checked before any processing.

/* crate use */
use serde::Serialize;

/* project use */
use crate::error;
use crate::filter::FilterThresholds;

pub const DEFAULT_PLOT_LIMIT: usize = 50_000;
pub const DEFAULT_BLOCKSIZE: u64 = 65_536;
pub const DEFAULT_COMPRESSION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Input fasta or fastq, plain or gzip compressed
    pub fastx: std::path::PathBuf,
    /// Prefix of every output
    pub outpre: String,
    /// Only sample metrics, no filter and no output reads
    pub plot_only: bool,
    /// Also export plot data when filtering
    pub plot: bool,
    /// Maximal number of read kept in sample
    pub plot_limit: usize,
    pub thresholds: FilterThresholds,
    /// Separator before quality value in read id
    pub delimiter: char,
    /// Number of thread used to compute metrics, 0 use all cpus
    pub threads: usize,
    /// Size of memory mapped block
    pub blocksize: u64,
    /// Gzip compression level of output
    pub compression: u32,
}

impl Config {
    pub fn new<P>(fastx: P, outpre: &str) -> Self
    where
        P: AsRef<std::path::Path>,
    {
        Self {
            fastx: fastx.as_ref().to_path_buf(),
            outpre: outpre.to_string(),
            plot_only: false,
            plot: false,
            plot_limit: DEFAULT_PLOT_LIMIT,
            thresholds: FilterThresholds::default(),
            delimiter: '_',
            threads: 1,
            blocksize: DEFAULT_BLOCKSIZE,
            compression: DEFAULT_COMPRESSION,
        }
    }

    /// Check value, return the first problem found
    pub fn validate(self) -> error::Result<Self> {
        if self.outpre.trim().is_empty() {
            return Err(configuration("output prefix is required"));
        }

        if self.fastx.as_os_str().is_empty() {
            return Err(configuration("input fastx path is required"));
        }

        if !self.thresholds.quality_cutoff.is_finite() {
            return Err(configuration("quality cutoff must be a finite number"));
        }

        if self.blocksize == 0 {
            return Err(configuration("blocksize must be greater than 0"));
        }

        if self.compression > 9 {
            return Err(configuration("compression level must be between 0 and 9"));
        }

        Ok(self)
    }

    /// Export plot data at end of run
    pub fn export_plot(&self) -> bool {
        self.plot_only || self.plot
    }
}

fn configuration(message: &str) -> error::Error {
    error::Error::Configuration {
        message: message.to_string(),
    }
}
