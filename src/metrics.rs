//! Per read metrics: quality, GC fraction and length.

/* crate use */
use serde::Serialize;

/* project use */
use crate::error;
use crate::record::RawRecord;

/// Metrics of one read, computed once and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub quality: f64,
    pub gc: f64,
    pub length: usize,
}

/// Get the quality value of a read.
///
/// Basecaller store read quality in read id, this trait let change how quality is found without
/// touch to pipeline.
pub trait QualityExtractor: Sync {
    fn quality(&self, record: &RawRecord) -> error::Result<f64>;
}

/// Quality is the last segment of id after `delimiter`, an id without delimiter is parsed as a
/// whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSuffix {
    pub delimiter: char,
}

impl Default for IdSuffix {
    fn default() -> Self {
        Self { delimiter: '_' }
    }
}

impl QualityExtractor for IdSuffix {
    fn quality(&self, record: &RawRecord) -> error::Result<f64> {
        let segment = record
            .id
            .rsplit(self.delimiter)
            .next()
            .unwrap_or(record.id.as_str());

        segment
            .parse::<f64>()
            .map_err(|source| error::Error::QualityParse {
                id: record.id.clone(),
                segment: segment.to_string(),
                source,
            })
    }
}

/// Proportion of G and C (case insensitive) in sequence, 0 for an empty sequence
pub fn gc_fraction(sequence: &[u8]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }

    let gc = sequence
        .iter()
        .filter(|nuc| matches!(nuc, b'G' | b'C' | b'g' | b'c'))
        .count();

    gc as f64 / sequence.len() as f64
}

/// Compute metrics of record
pub fn extract<E>(record: &RawRecord, extractor: &E) -> error::Result<DerivedMetrics>
where
    E: QualityExtractor + ?Sized,
{
    Ok(DerivedMetrics {
        quality: extractor.quality(record)?,
        gc: gc_fraction(&record.sequence),
        length: record.sequence.len(),
    })
}
