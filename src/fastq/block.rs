//! Struct that extract part of file (called block) and read it as fastq file.

/* project use */
use crate::block;
use crate::block::Record;
use crate::error;

block::impl_producer!(Producer, is_record_start);

/// A fastq record begin by a line starting with `@` and its third line start with `+`.
///
/// A quality line can start with `@` but the line two lines after it is a sequence, so this
/// check doesn't confound header and quality.
pub fn is_record_start(data: &[u8]) -> bool {
    if data.first() != Some(&b'@') {
        return false;
    }

    let sequence = match memchr::memchr(b'\n', data) {
        Some(end) => &data[end + 1..],
        None => return false,
    };

    match memchr::memchr(b'\n', sequence) {
        Some(end) => sequence.get(end + 1) == Some(&b'+'),
        None => false,
    }
}

/// Read fastq record of a [block::Block]
pub struct Reader {
    offset: usize,
    block: block::Block,
}

impl block::Reader for Reader {
    fn new(block: block::Block) -> Self {
        Reader { offset: 0, block }
    }

    fn next_record(&mut self) -> error::Result<Option<Record<'_>>> {
        let data = self.block.data();

        while self.offset < data.len() && matches!(data[self.offset], b'\n' | b'\r') {
            self.offset += 1;
        }

        let comment = match block::get_line(data, self.offset) {
            Some(range) => range,
            None => return Ok(None),
        };
        if data[comment.start] != b'@' {
            return Err(error::Error::NotAFastqFile);
        }

        let sequence = block::get_line(data, block::next_line(data, &comment))
            .ok_or(error::Error::PartialRecord)?;

        let plus = block::get_line(data, block::next_line(data, &sequence))
            .ok_or(error::Error::PartialRecord)?;
        if data[plus.start] != b'+' {
            return Err(error::Error::NotAFastqFile);
        }

        let quality = block::get_line(data, block::next_line(data, &plus))
            .ok_or(error::Error::PartialRecord)?;

        self.offset = block::next_line(data, &quality);

        Ok(Some(Record {
            comment: &data[comment],
            sequence: &data[sequence],
            quality: &data[quality],
        }))
    }
}
