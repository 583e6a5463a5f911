//! Command line interface

/* crate use */
use clap::Parser;

/* project use */
use crate::config;
use crate::error;
use crate::filter::FilterThresholds;

#[derive(Parser, Debug)]
#[command(
    name = "fqclean",
    version,
    about = "Filter reads on quality stored in read id and on length, sample read metrics for plotting"
)]
pub struct Command {
    /// Input file, fasta or fastq (can be gzip compressed)
    #[arg(value_name = "FASTX")]
    pub fastx: std::path::PathBuf,

    /// Prefix for outputs
    #[arg(short = 'o', long = "outpre", value_name = "STR")]
    pub outpre: String,

    /// Only plot distribution of gc content, quality and read length
    #[arg(long = "plot_only", alias = "plot-only")]
    pub plot_only: bool,

    /// Also export plot data when filtering
    #[arg(short = 'p', long = "plot")]
    pub plot: bool,

    /// Number of reads kept for plotting, also accepted as `--lim` (single dash `-lim` isn't
    /// supported)
    #[arg(long = "plot_limit", alias = "lim", value_name = "INT", default_value_t = config::DEFAULT_PLOT_LIMIT)]
    pub plot_limit: usize,

    /// Filtering cutoff for read length
    #[arg(short = 'l', long = "len", value_name = "INT", default_value_t = 1000)]
    pub length_cutoff: usize,

    /// Filtering cutoff for read quality
    #[arg(short = 'q', long = "qual", value_name = "FLOAT", default_value_t = 7.0)]
    pub quality_cutoff: f64,

    /// Separator before quality value in read id
    #[arg(short = 'd', long = "delimiter", default_value_t = '_')]
    pub delimiter: char,

    /// Number of threads used to compute read metrics, 0 use all cpus
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub threads: usize,

    /// Size of input block read at once
    #[arg(short = 'b', long = "blocksize", default_value_t = config::DEFAULT_BLOCKSIZE)]
    pub blocksize: u64,

    /// Gzip compression level of filtered reads
    #[arg(short = 'z', long = "compression", default_value_t = config::DEFAULT_COMPRESSION)]
    pub compression: u32,

    /// Silence all output
    #[arg(short = 'Q', long = "quiet")]
    pub quiet: bool,

    /// Verbose mode (-v, -vv, -vvv, etc)
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Command {
    /// Log level filter from quiet and verbosity flag
    pub fn level_filter(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Off
        } else {
            match self.verbosity {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        }
    }

    /// Build and check run configuration
    pub fn config(&self) -> error::Result<config::Config> {
        config::Config {
            fastx: self.fastx.clone(),
            outpre: self.outpre.clone(),
            plot_only: self.plot_only,
            plot: self.plot,
            plot_limit: self.plot_limit,
            thresholds: FilterThresholds {
                quality_cutoff: self.quality_cutoff,
                length_cutoff: self.length_cutoff,
            },
            delimiter: self.delimiter,
            threads: self.threads,
            blocksize: self.blocksize,
            compression: self.compression,
        }
        .validate()
    }
}
