//! Report of a run: console summary and export of sampled metrics for plotting tools.

/* std use */
use std::io::Write as _;

/* crate use */
use serde::Serialize;

/* project use */
use crate::error;
use crate::pipeline::RunCounters;
use crate::sampler::SampleTable;

/// Number of bins of each distribution
pub const NB_BINS: usize = 50;

/// Write filter summary
pub fn write_summary<W>(out: &mut W, counters: &RunCounters) -> std::io::Result<()>
where
    W: std::io::Write,
{
    writeln!(out, "filtering done!")?;
    writeln!(out, "   Total Reads: {}", counters.total)?;
    writeln!(out, "Filtered Reads: {}", counters.filtered)?;

    Ok(())
}

/// One bar of a histogram, `start` is inclusive, `end` exclusive except for last bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Histogram and summary statistics of one metric of [SampleTable]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub metric: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub bins: Vec<Bin>,
}

impl Distribution {
    /// Build distribution, bins cover range from smallest to largest value
    pub fn new(metric: &str, values: Vec<f64>, nb_bins: usize) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self::with_range(metric, values, nb_bins, min, max)
    }

    /// Build distribution with bins that cover range min to max, values out of range are
    /// counted in first or last bin
    pub fn with_range(
        metric: &str,
        mut values: Vec<f64>,
        nb_bins: usize,
        min: f64,
        max: f64,
    ) -> Self {
        values.retain(|v| v.is_finite());

        if values.is_empty() {
            return Self {
                metric: metric.to_string(),
                count: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                median: 0.0,
                bins: Vec::new(),
            };
        }

        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };

        let (min, max) = if min.is_finite() && max.is_finite() && min <= max {
            (min, max)
        } else {
            (values[0], values[count - 1])
        };

        let nb_bins = if max > min { nb_bins.max(1) } else { 1 };
        let width = if max > min {
            (max - min) / nb_bins as f64
        } else {
            1.0
        };

        let mut bins = (0..nb_bins)
            .map(|i| Bin {
                start: min + i as f64 * width,
                end: min + (i + 1) as f64 * width,
                count: 0,
            })
            .collect::<Vec<Bin>>();

        for value in values.iter() {
            let index = ((value - min) / width).max(0.0) as usize;
            bins[index.min(nb_bins - 1)].count += 1;
        }

        Self {
            metric: metric.to_string(),
            count,
            min: values[0],
            max: values[count - 1],
            mean,
            median,
            bins,
        }
    }
}

/// Distributions of quality, gc and length of sample
pub fn distributions(table: &SampleTable) -> [Distribution; 3] {
    [
        Distribution::new("quality", table.qualities().collect(), NB_BINS),
        Distribution::with_range("gc", table.gcs().collect(), NB_BINS, 0.0, 1.0),
        Distribution::new(
            "length",
            table.lengths().map(|length| length as f64).collect(),
            NB_BINS,
        ),
    ]
}

/// Write sample table as tab separated value
pub fn write_sample<W>(out: &mut W, table: &SampleTable) -> std::io::Result<()>
where
    W: std::io::Write,
{
    writeln!(out, "id\tquality\tgc\tlength")?;
    for row in table.rows() {
        writeln!(out, "{}\t{}\t{:.6}\t{}", row.id, row.quality, row.gc, row.length)?;
    }

    Ok(())
}

fn create(path: &std::path::Path) -> error::Result<std::io::BufWriter<std::fs::File>> {
    std::fs::File::create(path)
        .map(std::io::BufWriter::new)
        .map_err(|source| error::Error::Report {
            path: path.to_path_buf(),
            source,
        })
}

/// Write plot data of sample, `<prefix>.sample.tsv` and one `<prefix>.<metric>.json` per
/// distribution, return path of written files
pub fn write_plot_data(prefix: &str, table: &SampleTable) -> error::Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::with_capacity(4);

    let sample_path = std::path::PathBuf::from(format!("{}.sample.tsv", prefix));
    let mut out = create(&sample_path)?;
    write_sample(&mut out, table)
        .and_then(|_| out.flush())
        .map_err(|source| error::Error::Report {
            path: sample_path.clone(),
            source,
        })?;
    paths.push(sample_path);

    for distribution in distributions(table) {
        let path = std::path::PathBuf::from(format!("{}.{}.json", prefix, distribution.metric));
        let mut out = create(&path)?;

        serde_json::to_writer_pretty(&mut out, &distribution)
            .map_err(std::io::Error::from)
            .and_then(|_| out.flush())
            .map_err(|source| error::Error::Report {
                path: path.clone(),
                source,
            })?;

        log::debug!("{} distribution write in {}", distribution.metric, path.display());
        paths.push(path);
    }

    Ok(paths)
}
