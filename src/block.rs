//! Struct that extract part of file (called block) and read it as fastx file.

/* crate use */
use bstr::ByteSlice;

/* project use */
use crate::error;
use crate::record::RawRecord;

/// Block reperesent a section of file memory mapped, trimmed to end on a record boundary
#[derive(Debug)]
pub struct Block {
    mem: memmap2::Mmap,
    end: usize,
}

impl Block {
    /// Create a new Block
    pub fn new(end: usize, mem: memmap2::Mmap) -> Self {
        Self { mem, end }
    }

    /// Acces to data owned by block
    pub fn data(&self) -> &[u8] {
        &self.mem[..self.end]
    }

    /// Get length of block
    pub fn len(&self) -> usize {
        self.end
    }

    /// Return true if the block is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record borrow all its field from a [Block]
///
/// For fasta `quality` is empty and `sequence` can span multiple lines.
pub struct Record<'a> {
    pub comment: &'a [u8],
    pub sequence: &'a [u8],
    pub quality: &'a [u8],
}

impl<'a> Record<'a> {
    /// Copy record out of the block
    pub fn to_raw(&self) -> RawRecord {
        RawRecord::from_header(
            self.comment,
            self.sequence
                .iter()
                .copied()
                .filter(|c| *c != b'\n' && *c != b'\r')
                .collect(),
            self.quality.trim_end_with(|c| c == '\r').to_vec(),
        )
    }
}

/// Trait to produce block
pub trait Producer {
    /// Open path and prepare block production
    fn with_blocksize<P>(blocksize: u64, path: P) -> error::Result<Self>
    where
        P: AsRef<std::path::Path>,
        Self: Sized;

    /// Get the next [Block], all [Block] contains at least one record.
    ///
    /// If no record begin in the first `blocksize` bytes the mapped window is doubled until
    /// a record start is found or the end of file is reached.
    fn next_block(&mut self) -> error::Result<Option<Block>> {
        if self.offset() == self.file_length() {
            return Ok(None);
        }

        let mut window = self.blocksize().max(1);
        loop {
            if self.offset() + window >= self.file_length() {
                let length = self.file_length() - self.offset();
                let block = self.map(length)?;

                self.set_offset(self.file_length());

                return Ok(Some(Block::new(length as usize, block)));
            }

            let block = self.map(window)?;
            if let Some(blocksize) = Self::correct_block_size(&block) {
                self.set_offset(self.offset() + blocksize);

                return Ok(Some(Block::new(blocksize as usize, block)));
            }

            log::trace!("no record start in {} bytes, grow block", window);
            window *= 2;
        }
    }

    /// Map `length` bytes of file from current offset
    fn map(&self, length: u64) -> error::Result<memmap2::Mmap> {
        unsafe {
            memmap2::MmapOptions::new()
                .offset(self.offset())
                .len(length as usize)
                .map(self.file())
                .map_err(|source| error::Error::MapFile { source })
        }
    }

    /// Get file size
    fn filesize<P>(path: &P) -> error::Result<u64>
    where
        P: AsRef<std::path::Path>,
    {
        Ok(path
            .as_ref()
            .metadata()
            .map_err(|source| error::Error::MetaDataFile { source })?
            .len())
    }

    /// Search the begin of the last record of data, the partial record at the end of block
    /// is left for the next block
    fn correct_block_size(data: &[u8]) -> Option<u64> {
        let mut end = data.len();

        while let Some(pos) = data[..end].rfind_byte(b'\n') {
            if Self::is_record_start(&data[pos + 1..]) {
                return Some((pos + 1) as u64);
            }
            end = pos;
        }

        None
    }

    /// Return true if a record begin at start of data
    fn is_record_start(data: &[u8]) -> bool;

    /// Get current value of offset
    fn offset(&self) -> u64;

    /// Get file length
    fn file_length(&self) -> u64;

    /// Get file
    fn file(&self) -> &std::fs::File;

    /// Get blocksize
    fn blocksize(&self) -> u64;

    /// Set value of offset
    fn set_offset(&mut self, value: u64);
}

/// Trait to read record in a [Block]
pub trait Reader {
    /// Create a reader at the begin of block
    fn new(block: Block) -> Self;

    /// Get next record of block, None at the end of block
    fn next_record(&mut self) -> error::Result<Option<Record<'_>>>;
}

/// Range of the line begin at offset, without the new line.
///
/// The last line of a block may not end with a new line.
pub(crate) fn get_line(data: &[u8], offset: usize) -> Option<std::ops::Range<usize>> {
    if offset >= data.len() {
        None
    } else {
        let length = memchr::memchr(b'\n', &data[offset..]).unwrap_or(data.len() - offset);
        Some(offset..offset + length)
    }
}

/// Position after the line begin at offset
pub(crate) fn next_line(data: &[u8], range: &std::ops::Range<usize>) -> usize {
    (range.end + 1).min(data.len())
}

/// Generate a struct that implement [Producer], only record start detection change between
/// formats.
macro_rules! impl_producer {
    ($name:ident, $record_start:expr) => {
        /// Memory map input file block by block
        pub struct $name {
            offset: u64,
            blocksize: u64,
            file: std::fs::File,
            file_length: u64,
        }

        impl $crate::block::Producer for $name {
            fn with_blocksize<P>(blocksize: u64, path: P) -> $crate::error::Result<Self>
            where
                P: AsRef<std::path::Path>,
            {
                let file_length = <Self as $crate::block::Producer>::filesize(&path)?;

                Ok(Self {
                    offset: 0,
                    blocksize,
                    file_length,
                    file: std::fs::File::open(path)
                        .map_err(|source| $crate::error::Error::OpenFile { source })?,
                })
            }

            fn is_record_start(data: &[u8]) -> bool {
                $record_start(data)
            }

            fn offset(&self) -> u64 {
                self.offset
            }

            fn file_length(&self) -> u64 {
                self.file_length
            }

            fn file(&self) -> &std::fs::File {
                &self.file
            }

            fn blocksize(&self) -> u64 {
                self.blocksize
            }

            fn set_offset(&mut self, value: u64) {
                self.offset = value;
            }
        }
    };
}

pub(crate) use impl_producer;
