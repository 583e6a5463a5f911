//! Record source, produce batch of [RawRecord] from an input path.
//!
//! Plain file are memory mapped block by block, gzip compressed file are decoded as a stream.

/* std use */
use std::io::Read as _;

/* project use */
use crate::block;
use crate::error;
use crate::fasta;
use crate::fastq;
use crate::record::RawRecord;
use crate::stream::StreamSource;

/// First bytes of a gzip file
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Sequence format of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Fasta,
    Fastq,
}

impl Format {
    /// Detect format from first line of input
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data.first() {
            Some(b'>') => Some(Format::Fasta),
            Some(b'@') => Some(Format::Fastq),
            _ => None,
        }
    }
}

/// A lazy, finite and non restartable sequence of record.
///
/// Record are produced by batch, each batch keep arrival order and batch are produced in order.
pub trait RecordSource {
    /// Get next batch of record, None when source is exhausted. A batch is never empty.
    fn next_batch(&mut self) -> error::Result<Option<Vec<RawRecord>>>;
}

/// Read a memory mapped file one [block::Block] per batch
pub struct MappedSource<P, R> {
    producer: P,
    reader: std::marker::PhantomData<R>,
}

impl<P, R> MappedSource<P, R>
where
    P: block::Producer,
    R: block::Reader,
{
    pub fn with_blocksize<T>(blocksize: u64, path: T) -> error::Result<Self>
    where
        T: AsRef<std::path::Path>,
    {
        Ok(Self {
            producer: P::with_blocksize(blocksize, path)?,
            reader: std::marker::PhantomData,
        })
    }
}

impl<P, R> RecordSource for MappedSource<P, R>
where
    P: block::Producer,
    R: block::Reader,
{
    fn next_batch(&mut self) -> error::Result<Option<Vec<RawRecord>>> {
        while let Some(block) = self.producer.next_block()? {
            log::trace!("read block of {} bytes", block.len());

            let mut reader = R::new(block);
            let mut batch = Vec::new();
            while let Some(record) = reader.next_record()? {
                batch.push(record.to_raw());
            }

            if !batch.is_empty() {
                return Ok(Some(batch));
            }
        }

        Ok(None)
    }
}

/// Record already in memory, produced as one batch
pub struct MemorySource {
    records: Option<Vec<RawRecord>>,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: Some(records).filter(|records| !records.is_empty()),
        }
    }
}

impl RecordSource for MemorySource {
    fn next_batch(&mut self) -> error::Result<Option<Vec<RawRecord>>> {
        Ok(self.records.take())
    }
}

/// First byte that isn't an end of line, blank lines before first record are skipped by readers
fn first_marker<R>(reader: R) -> error::Result<Option<u8>>
where
    R: std::io::Read,
{
    for byte in std::io::BufReader::new(reader).bytes() {
        let byte = byte.map_err(|source| error::Error::ReadInput { source })?;
        if !matches!(byte, b'\n' | b'\r') {
            return Ok(Some(byte));
        }
    }

    Ok(None)
}

/// Open input path, choose how to read it from its first bytes.
pub fn open<P>(path: P, blocksize: u64) -> error::Result<Box<dyn RecordSource>>
where
    P: AsRef<std::path::Path>,
{
    let path = path.as_ref();

    let mut file =
        std::fs::File::open(path).map_err(|source| error::Error::OpenFile { source })?;
    let mut magic = Vec::with_capacity(2);
    (&mut file)
        .take(2)
        .read_to_end(&mut magic)
        .map_err(|source| error::Error::ReadInput { source })?;

    if magic.is_empty() {
        log::warn!("{} is empty", path.display());
        return Ok(Box::new(MemorySource::new(Vec::new())));
    }

    if magic == GZIP_MAGIC {
        log::info!("read {} as gzip stream", path.display());

        let file =
            std::fs::File::open(path).map_err(|source| error::Error::OpenFile { source })?;
        return Ok(Box::new(StreamSource::new(std::io::BufReader::new(
            flate2::read::MultiGzDecoder::new(file),
        ))));
    }

    let marker = match first_marker(magic.as_slice().chain(&mut file))? {
        Some(marker) => marker,
        None => {
            log::warn!("{} contains only empty lines", path.display());
            return Ok(Box::new(MemorySource::new(Vec::new())));
        }
    };

    match Format::detect(&[marker]) {
        Some(Format::Fastq) => {
            log::info!("read {} as fastq", path.display());
            Ok(Box::new(MappedSource::<fastq::Producer, fastq::Reader>::with_blocksize(
                blocksize, path,
            )?))
        }
        Some(Format::Fasta) => {
            log::info!("read {} as fasta", path.display());
            Ok(Box::new(MappedSource::<fasta::Producer, fasta::Reader>::with_blocksize(
                blocksize, path,
            )?))
        }
        None => Err(error::Error::UnknownFormat),
    }
}
