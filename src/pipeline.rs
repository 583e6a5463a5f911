//! Pipeline driver: extract metrics, sample, filter and write each read in arrival order.

/* crate use */
use rayon::prelude::*;
use serde::Serialize;

/* project use */
use crate::config::Config;
use crate::error;
use crate::filter::{self, FilterThresholds};
use crate::metrics::{self, DerivedMetrics, IdSuffix, QualityExtractor};
use crate::record::RawRecord;
use crate::sampler::{SampleTable, Sampler};
use crate::sink::{self, Sink};
use crate::source::{self, RecordSource};

/// State of a [Pipeline]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Streaming,
    Done,
    Aborted,
}

/// Count of reads seen and reads removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub total: u64,
    pub filtered: u64,
}

impl RunCounters {
    /// Reads written in output, meaningless in plot only mode
    pub fn passed(&self) -> u64 {
        self.total - self.filtered
    }
}

/// What a finished run give to report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub counters: RunCounters,
    pub sample: SampleTable,
    /// None in plot only mode
    pub output: Option<std::path::PathBuf>,
}

/// Own all mutable state of one run
pub struct Pipeline<E = IdSuffix> {
    thresholds: FilterThresholds,
    plot_only: bool,
    extractor: E,
    pool: Option<rayon::ThreadPool>,
    counters: RunCounters,
    sampler: Sampler,
    state: State,
}

impl Pipeline<IdSuffix> {
    /// Pipeline that read quality at end of read id
    pub fn new(config: &Config) -> error::Result<Self> {
        Self::with_extractor(
            config,
            IdSuffix {
                delimiter: config.delimiter,
            },
        )
    }
}

impl<E> Pipeline<E>
where
    E: QualityExtractor,
{
    pub fn with_extractor(config: &Config, extractor: E) -> error::Result<Self> {
        let pool = if config.threads == 1 {
            None
        } else {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.threads)
                    .build()
                    .map_err(|e| error::Error::Configuration {
                        message: format!("can't build thread pool {}", e),
                    })?,
            )
        };

        Ok(Self {
            thresholds: config.thresholds,
            plot_only: config.plot_only,
            extractor,
            pool,
            counters: RunCounters::default(),
            sampler: Sampler::new(config.plot_limit),
            state: State::Init,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Consume source, write passing reads in sink.
    ///
    /// Sink must be None in plot only mode. On error the pipeline end in [State::Aborted] and
    /// sink is dropped, what is already written stay in output and gzip stream is finished.
    pub fn run<S>(&mut self, source: &mut S, mut sink: Option<Sink>) -> error::Result<RunSummary>
    where
        S: RecordSource + ?Sized,
    {
        self.transition(State::Streaming);

        let output = match self.stream(source, sink.as_mut()) {
            Ok(()) => sink.map(Self::close).transpose(),
            Err(e) => Err(e),
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                self.transition(State::Aborted);
                log::error!(
                    "run aborted after {} reads ({} filtered)",
                    self.counters.total,
                    self.counters.filtered
                );
                return Err(e);
            }
        };

        self.transition(State::Done);

        Ok(RunSummary {
            counters: self.counters,
            sample: self.sampler.finish(),
            output,
        })
    }

    fn close(sink: Sink) -> error::Result<std::path::PathBuf> {
        let path = sink.path().to_path_buf();
        let written = sink.close()?;
        log::info!("{} reads written in {}", written, path.display());

        Ok(path)
    }

    fn transition(&mut self, state: State) {
        log::debug!("pipeline {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn stream<S>(&mut self, source: &mut S, mut sink: Option<&mut Sink>) -> error::Result<()>
    where
        S: RecordSource + ?Sized,
    {
        while let Some(batch) = source.next_batch()? {
            log::debug!("process batch of {} reads", batch.len());

            let metrics = self.batch_metrics(&batch);

            for (record, metrics) in batch.iter().zip(metrics) {
                self.counters.total += 1;

                let metrics = metrics?;
                self.sampler.offer(record, &metrics);

                if self.plot_only {
                    continue;
                }

                if filter::passes(&metrics, &self.thresholds) {
                    if let Some(out) = sink.as_deref_mut() {
                        out.write(record)?;
                    }
                } else {
                    log::trace!("filter {} {:?}", record.id, metrics);
                    self.counters.filtered += 1;
                }
            }
        }

        Ok(())
    }

    /// Metrics of each record of batch, in batch order
    fn batch_metrics(&self, batch: &[RawRecord]) -> Vec<error::Result<DerivedMetrics>> {
        let extractor = &self.extractor;

        match &self.pool {
            Some(pool) => pool.install(|| {
                batch
                    .par_iter()
                    .map(|record| metrics::extract(record, extractor))
                    .collect()
            }),
            None => batch
                .iter()
                .map(|record| metrics::extract(record, extractor))
                .collect(),
        }
    }
}

/// Run a full job from configuration: open input, create output, process every reads.
pub fn run(config: &Config) -> error::Result<RunSummary> {
    let mut pipeline = Pipeline::new(config)?;

    let mut source = source::open(&config.fastx, config.blocksize)?;

    let sink = if config.plot_only {
        None
    } else {
        Some(Sink::create(
            sink::output_path(&config.outpre),
            config.compression,
        )?)
    };

    log::info!(
        "start processing {} (plot only: {})",
        config.fastx.display(),
        config.plot_only
    );

    pipeline.run(source.as_mut(), sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::source::MemorySource;
    use crate::tests::read_gz;

    fn record(id: &str, length: usize) -> RawRecord {
        RawRecord::new(id, vec![b'G'; length], vec![b'5'; length])
    }

    fn config(dir: &tempfile::TempDir) -> Config {
        Config::new(dir.path().join("reads.fq"), &dir.path().join("out").to_string_lossy())
    }

    fn output_ids(path: &std::path::Path) -> Vec<String> {
        read_gz(path)
            .lines()
            .step_by(4)
            .map(|line| line[1..].to_string())
            .collect()
    }

    #[test]
    fn filter_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let path = sink::output_path(&config.outpre);

        let mut source = MemorySource::new(vec![
            record("read1_9.0", 1200),
            record("read2_5.0", 900),
            record("read3_8.0", 1500),
        ]);
        let sink = Sink::create(&path, 6).unwrap();

        let mut pipeline = Pipeline::new(&config).unwrap();
        assert_eq!(pipeline.state(), State::Init);

        let summary = pipeline.run(&mut source, Some(sink)).unwrap();
        assert_eq!(pipeline.state(), State::Done);

        assert_eq!(
            summary.counters,
            RunCounters {
                total: 3,
                filtered: 1
            }
        );
        assert_eq!(summary.counters.passed(), 2);
        assert_eq!(summary.output, Some(path.clone()));
        assert_eq!(output_ids(&path), vec!["read1_9.0", "read3_8.0"]);
        assert_eq!(summary.sample.len(), 3);
    }

    #[test]
    fn written_block() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let path = sink::output_path(&config.outpre);

        let mut source = MemorySource::new(vec![RawRecord::new(
            "r_9.0",
            b"ACGT".to_vec(),
            b"IIII".to_vec(),
        )]);
        let mut config = config;
        config.thresholds.length_cutoff = 4;

        Pipeline::new(&config)
            .unwrap()
            .run(&mut source, Some(Sink::create(&path, 6).unwrap()))
            .unwrap();

        assert_eq!(read_gz(&path), "@r_9.0\nACGT\n+\nIIII\n");
    }

    #[test]
    fn fasta_written_with_empty_quality() {
        let dir = tempfile::tempdir().unwrap();
        let mut fasta = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut fasta,
            b">keep_9.0 comment\nACGT\nTT\n>drop_2.0\nACGTAC\n",
        )
        .unwrap();

        let mut config = Config::new(fasta.path(), &dir.path().join("out").to_string_lossy());
        config.thresholds.length_cutoff = 6;

        let summary = run(&config).unwrap();

        assert_eq!(summary.counters.total, 2);
        assert_eq!(summary.counters.filtered, 1);
        assert_eq!(
            read_gz(&sink::output_path(&config.outpre)),
            "@keep_9.0\nACGTTT\n+\n\n"
        );
    }

    #[test]
    fn sample_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir);
        config.plot_limit = 2;
        config.plot_only = true;

        let mut source =
            MemorySource::new((0..5).map(|i| record(&format!("read{}_9.0", i), 10)).collect());

        let summary = Pipeline::new(&config)
            .unwrap()
            .run(&mut source, None)
            .unwrap();

        assert_eq!(summary.counters.total, 5);
        assert_eq!(summary.counters.filtered, 0);
        assert_eq!(summary.output, None);
        assert_eq!(
            summary
                .sample
                .rows()
                .iter()
                .map(|r| r.id.as_str())
                .collect::<Vec<_>>(),
            vec!["read0_9.0", "read1_9.0"]
        );
    }

    #[test]
    fn parse_error_abort() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let path = sink::output_path(&config.outpre);

        let mut source = MemorySource::new(vec![
            record("read1_9.0", 1200),
            record("read42_abc", 1200),
            record("read3_8.0", 1500),
        ]);
        let sink = Sink::create(&path, 6).unwrap();

        let mut pipeline = Pipeline::new(&config).unwrap();

        match pipeline.run(&mut source, Some(sink)) {
            Err(error::Error::QualityParse { id, .. }) => assert_eq!(id, "read42_abc"),
            _ => panic!("run must abort on quality parse error"),
        }
        assert_eq!(pipeline.state(), State::Aborted);
        assert_eq!(pipeline.counters().total, 2);

        // reads before the error stay in a readable output
        assert_eq!(output_ids(&path), vec!["read1_9.0"]);
    }

    #[test]
    fn abort_stop_processing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);

        let mut pipeline = Pipeline::new(&config).unwrap();
        let mut source = MemorySource::new(vec![record("read42_abc", 10), record("b_9.0", 10)]);

        assert!(pipeline.stream(&mut source, None).is_err());
        assert_eq!(pipeline.counters().total, 1);
        assert_eq!(pipeline.sampler.table().len(), 0);
    }

    #[test]
    fn counters_add_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let path = sink::output_path(&config.outpre);

        let records = (0..100)
            .map(|i| record(&format!("read{}_{}.5", i, i % 12), (i * 37) % 2000))
            .collect::<Vec<_>>();
        let expected = records
            .iter()
            .filter(|r| {
                let m = metrics::extract(*r, &IdSuffix::default()).unwrap();
                filter::passes(&m, &config.thresholds)
            })
            .map(|r| r.id.clone())
            .collect::<Vec<_>>();

        let summary = Pipeline::new(&config)
            .unwrap()
            .run(
                &mut MemorySource::new(records),
                Some(Sink::create(&path, 6).unwrap()),
            )
            .unwrap();

        assert_eq!(summary.counters.total, 100);
        assert_eq!(
            summary.counters.total,
            summary.counters.filtered + expected.len() as u64
        );
        assert_eq!(output_ids(&path), expected);
    }

    #[test]
    fn parallel_keep_order() {
        let dir = tempfile::tempdir().unwrap();
        let fastq = crate::tests::generate_fastq(42, 2_000, 1_200);

        let mut sequential = Config::new(fastq.path(), &dir.path().join("seq").to_string_lossy());
        sequential.blocksize = 8192;
        sequential.plot_limit = 500;

        let mut parallel = sequential.clone();
        parallel.outpre = dir.path().join("par").to_string_lossy().into_owned();
        parallel.threads = 4;

        let seq_summary = run(&sequential).unwrap();
        let par_summary = run(&parallel).unwrap();

        assert_eq!(seq_summary.counters, par_summary.counters);
        assert_eq!(seq_summary.sample, par_summary.sample);
        assert_eq!(seq_summary.sample.len(), 500);
        assert_eq!(
            read_gz(&sink::output_path(&sequential.outpre)),
            read_gz(&sink::output_path(&parallel.outpre))
        );
    }

    #[test]
    fn rerun_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fastq = crate::tests::generate_fastq(42, 50, 1_200);
        let config = Config::new(fastq.path(), &dir.path().join("out").to_string_lossy());
        let path = sink::output_path(&config.outpre);

        run(&config).unwrap();
        let first = std::fs::read(&path).unwrap();

        assert!(matches!(
            run(&config),
            Err(error::Error::AlreadyExists { .. })
        ));
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn plot_only_create_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let fastq = crate::tests::generate_fasta(42, 50, 1_200);
        let mut config = Config::new(fastq.path(), &dir.path().join("out").to_string_lossy());
        config.plot_only = true;

        let summary = run(&config).unwrap();

        assert_eq!(summary.counters.total, 50);
        assert_eq!(summary.sample.len(), 50);
        assert!(!sink::output_path(&config.outpre).exists());
    }

    #[test]
    fn missing_input_create_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);

        assert!(matches!(run(&config), Err(error::Error::OpenFile { .. })));
        assert!(!sink::output_path(&config.outpre).exists());
    }
}
