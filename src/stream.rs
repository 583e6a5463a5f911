//! Streaming fastx parser, used when input can't be memory mapped (gzip compressed file).

/* std use */
use std::io::BufRead;

/* project use */
use crate::error;
use crate::record::RawRecord;
use crate::source::{Format, RecordSource};

/// Number of record per batch
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Parse fasta or fastq record from any [BufRead], format is detected on first record marker.
pub struct StreamSource<B> {
    reader: B,
    format: Option<Format>,
    batch_size: usize,
    /// fasta header already read by previous record
    pending: Option<Vec<u8>>,
}

impl<B> StreamSource<B>
where
    B: BufRead,
{
    pub fn new(reader: B) -> Self {
        Self::with_batch_size(DEFAULT_BATCH_SIZE, reader)
    }

    pub fn with_batch_size(batch_size: usize, reader: B) -> Self {
        Self {
            reader,
            format: None,
            batch_size: batch_size.max(1),
            pending: None,
        }
    }

    /// Read a line without its end of line, None at end of stream
    fn read_line(&mut self) -> error::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();

        let length = self
            .reader
            .read_until(b'\n', &mut line)
            .map_err(|source| error::Error::ReadInput { source })?;
        if length == 0 {
            return Ok(None);
        }

        while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
            line.pop();
        }

        Ok(Some(line))
    }

    /// Read next non empty line
    fn read_header(&mut self) -> error::Result<Option<Vec<u8>>> {
        if let Some(header) = self.pending.take() {
            return Ok(Some(header));
        }

        while let Some(line) = self.read_line()? {
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }

        Ok(None)
    }

    pub fn next_record(&mut self) -> error::Result<Option<RawRecord>> {
        let header = match self.read_header()? {
            Some(header) => header,
            None => return Ok(None),
        };

        let format = match self.format {
            Some(format) => format,
            None => {
                let format = Format::detect(&header).ok_or(error::Error::UnknownFormat)?;
                log::debug!("stream input detected as {:?}", format);
                self.format = Some(format);
                format
            }
        };

        let record = match format {
            Format::Fastq => self.fastq_record(header)?,
            Format::Fasta => self.fasta_record(header)?,
        };

        Ok(Some(record))
    }

    fn fastq_record(&mut self, header: Vec<u8>) -> error::Result<RawRecord> {
        if header.first() != Some(&b'@') {
            return Err(error::Error::NotAFastqFile);
        }

        let sequence = self.read_line()?.ok_or(error::Error::PartialRecord)?;
        let plus = self.read_line()?.ok_or(error::Error::PartialRecord)?;
        if plus.first() != Some(&b'+') {
            return Err(error::Error::NotAFastqFile);
        }
        let quality = self.read_line()?.ok_or(error::Error::PartialRecord)?;

        Ok(RawRecord::from_header(&header, sequence, quality))
    }

    fn fasta_record(&mut self, header: Vec<u8>) -> error::Result<RawRecord> {
        if header.first() != Some(&b'>') {
            return Err(error::Error::NotAFastaFile);
        }

        let mut sequence = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.first() == Some(&b'>') {
                self.pending = Some(line);
                break;
            }
            sequence.extend_from_slice(&line);
        }

        Ok(RawRecord::from_header(&header, sequence, Vec::new()))
    }
}

impl<B> RecordSource for StreamSource<B>
where
    B: BufRead,
{
    fn next_batch(&mut self) -> error::Result<Option<Vec<RawRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            match self.next_record()? {
                Some(record) => batch.push(record),
                None => break,
            }
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn ids(source: &mut StreamSource<&[u8]>) -> Vec<String> {
        let mut ids = Vec::new();
        while let Some(record) = source.next_record().unwrap() {
            ids.push(record.id);
        }
        ids
    }

    #[test]
    fn fastq() {
        let data = b"@a_9.0 comment\nACGT\n+a_9.0\nIIII\n\n@b_8.0\nGG\n+\n!!";
        let mut source = StreamSource::new(&data[..]);

        let first = source.next_record().unwrap().unwrap();
        assert_eq!(
            first,
            RawRecord::new("a_9.0", b"ACGT".to_vec(), b"IIII".to_vec())
        );

        let second = source.next_record().unwrap().unwrap();
        assert_eq!(
            second,
            RawRecord::new("b_8.0", b"GG".to_vec(), b"!!".to_vec())
        );

        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn fasta_multi_line() {
        let data = b">a_9.0\r\nACGT\r\nac\r\n>b_8.0\n>c_7.0\nTT\n";
        let mut source = StreamSource::new(&data[..]);

        let records = std::iter::from_fn(|| source.next_record().unwrap()).collect::<Vec<_>>();

        assert_eq!(
            records,
            vec![
                RawRecord::new("a_9.0", b"ACGTac".to_vec(), Vec::new()),
                RawRecord::new("b_8.0", Vec::new(), Vec::new()),
                RawRecord::new("c_7.0", b"TT".to_vec(), Vec::new()),
            ]
        );
    }

    #[test]
    fn batch() {
        let data = b">a_1\nA\n>b_2\nC\n>c_3\nG\n";
        let mut source = StreamSource::with_batch_size(2, &data[..]);

        assert_eq!(source.next_batch().unwrap().unwrap().len(), 2);
        assert_eq!(source.next_batch().unwrap().unwrap().len(), 1);
        assert!(source.next_batch().unwrap().is_none());
    }

    #[test]
    fn empty() {
        let mut source = StreamSource::new(&b"\n\n"[..]);

        assert!(ids(&mut source).is_empty());
    }

    #[test]
    fn errors() {
        let mut source = StreamSource::new(&b"hello\nworld\n"[..]);
        assert!(matches!(
            source.next_record(),
            Err(error::Error::UnknownFormat)
        ));

        let mut source = StreamSource::new(&b"@a_9.0\nACGT\nIIII\n"[..]);
        assert!(matches!(
            source.next_record(),
            Err(error::Error::NotAFastqFile)
        ));

        let mut source = StreamSource::new(&b"@a_9.0\nACGT\n"[..]);
        assert!(matches!(
            source.next_record(),
            Err(error::Error::PartialRecord)
        ));
    }

    #[test]
    fn gzip() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(b"@a_9.0\nACGT\n+\nIIII\n@b_8.0\nGG\n+\n!!\n")
            .unwrap();
        let compressed = encoder.finish().unwrap();

        let mut source = StreamSource::new(std::io::BufReader::new(
            flate2::read::MultiGzDecoder::new(&compressed[..]),
        ));

        assert_eq!(source.next_record().unwrap().unwrap().id, "a_9.0");
        assert_eq!(source.next_record().unwrap().unwrap().id, "b_8.0");
        assert!(source.next_record().unwrap().is_none());
    }
}
