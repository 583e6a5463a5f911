//! Gzip compressed fastq output of reads that pass filter.

/* std use */
use std::io::Write as _;

/* project use */
use crate::error;
use crate::record::RawRecord;

/// Suffix add to output prefix
pub const OUTPUT_SUFFIX: &str = ".clean.fq.gz";

type Encoder = flate2::write::GzEncoder<std::io::BufWriter<std::fs::File>>;

/// Output stream of passing reads.
///
/// Output file is never overwritten. Gzip stream is finished by [Sink::close], or on drop if an
/// error stops the run before.
pub struct Sink {
    path: std::path::PathBuf,
    encoder: Option<Encoder>,
    written: u64,
}

impl Sink {
    /// Create output file, fail if path already exist
    pub fn create<P>(path: P, level: u32) -> error::Result<Self>
    where
        P: AsRef<std::path::Path>,
    {
        let path = path.as_ref().to_path_buf();

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::AlreadyExists => error::Error::AlreadyExists {
                    path: path.clone(),
                },
                _ => error::Error::CreateOutput {
                    path: path.clone(),
                    source,
                },
            })?;

        log::debug!("create {} with compression level {}", path.display(), level);

        Ok(Self {
            path,
            encoder: Some(flate2::write::GzEncoder::new(
                std::io::BufWriter::new(file),
                flate2::Compression::new(level),
            )),
            written: 0,
        })
    }

    /// Write record as a four line fastq block
    pub fn write(&mut self, record: &RawRecord) -> error::Result<()> {
        let encoder = match self.encoder.as_mut() {
            Some(encoder) => encoder,
            None => {
                return Err(error::Error::WriteOutput {
                    source: std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "sink already closed",
                    ),
                })
            }
        };

        Self::write_record(encoder, record).map_err(|source| error::Error::WriteOutput { source })?;
        self.written += 1;

        Ok(())
    }

    fn write_record<W>(out: &mut W, record: &RawRecord) -> std::io::Result<()>
    where
        W: std::io::Write,
    {
        out.write_all(b"@")?;
        out.write_all(record.id.as_bytes())?;
        out.write_all(b"\n")?;
        out.write_all(&record.sequence)?;
        out.write_all(b"\n+\n")?;
        out.write_all(&record.quality)?;
        out.write_all(b"\n")
    }

    /// Finish gzip stream and flush file
    pub fn close(mut self) -> error::Result<u64> {
        self.finish()?;

        Ok(self.written)
    }

    fn finish(&mut self) -> error::Result<()> {
        if let Some(encoder) = self.encoder.take() {
            let mut writer = encoder
                .finish()
                .map_err(|source| error::Error::WriteOutput { source })?;
            writer
                .flush()
                .map_err(|source| error::Error::WriteOutput { source })?;

            log::debug!("close {} after {} records", self.path.display(), self.written);
        }

        Ok(())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!(
                "{} closed before end of input, it contains {} records",
                self.path.display(),
                self.written
            );

            if let Err(e) = self.finish() {
                log::error!("{}", e);
            }
        }
    }
}

/// Output path of a prefix
pub fn output_path(prefix: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(format!("{}{}", prefix, OUTPUT_SUFFIX))
}
