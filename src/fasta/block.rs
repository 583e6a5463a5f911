//! Struct that extract part of file (called block) and read it as fasta file.

/* crate use */
use bstr::ByteSlice;

/* project use */
use crate::block;
use crate::block::Record;
use crate::error;

block::impl_producer!(Producer, is_record_start);

/// In fasta any line starting with `>` is a header
pub fn is_record_start(data: &[u8]) -> bool {
    data.first() == Some(&b'>')
}

/// Read fasta record of a [block::Block], sequence can be wrapped on multiple lines
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
        if data[comment.start] != b'>' {
            return Err(error::Error::NotAFastaFile);
        }

        let start = block::next_line(data, &comment);
        let end = if is_record_start(&data[start..]) {
            start
        } else {
            match data[start..].find(b"\n>") {
                Some(pos) => start + pos + 1,
                None => data.len(),
            }
        };

        self.offset = end;

        Ok(Some(Record {
            comment: &data[comment],
            sequence: &data[start..end],
            quality: &data[end..end],
        }))
    }
}
