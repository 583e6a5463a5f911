//! Bounded sample of read metrics, kept for plotting.

/* crate use */
use serde::Serialize;

/* project use */
use crate::metrics::DerivedMetrics;
use crate::record::RawRecord;

/// One row of [SampleTable]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub id: String,
    pub quality: f64,
    pub gc: f64,
    pub length: usize,
}

/// Metrics of the first reads seen, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleTable {
    rows: Vec<SampleRow>,
}

impl SampleTable {
    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn qualities(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|row| row.quality)
    }

    pub fn gcs(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|row| row.gc)
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|row| row.length)
    }
}

/// Fill a [SampleTable] until `limit` rows, later offers are ignored
#[derive(Debug)]
pub struct Sampler {
    limit: usize,
    table: SampleTable,
}

impl Sampler {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            table: SampleTable {
                rows: Vec::with_capacity(limit.min(1 << 16)),
            },
        }
    }

    /// Add record metrics to table if limit isn't reach
    pub fn offer(&mut self, record: &RawRecord, metrics: &DerivedMetrics) {
        if self.table.rows.len() < self.limit {
            self.table.rows.push(SampleRow {
                id: record.id.clone(),
                quality: metrics.quality,
                gc: metrics.gc,
                length: metrics.length,
            });
        }
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    /// Take the filled table, sampler is left empty
    pub fn finish(&mut self) -> SampleTable {
        std::mem::take(&mut self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(sampler: &mut Sampler, i: usize) {
        let record = RawRecord::new(format!("read{}_9.0", i), vec![b'A'; i], vec![b'I'; i]);
        let metrics = DerivedMetrics {
            quality: 9.0,
            gc: 0.0,
            length: i,
        };

        sampler.offer(&record, &metrics);
    }

    #[test]
    fn keep_first_rows() {
        let mut sampler = Sampler::new(2);

        for i in 0..5 {
            offer(&mut sampler, i);
        }

        let table = sampler.finish();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["read0_9.0", "read1_9.0"]
        );
        assert_eq!(table.lengths().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn less_record_than_limit() {
        let mut sampler = Sampler::new(50_000);

        for i in 0..3 {
            offer(&mut sampler, i);
        }

        assert_eq!(sampler.table().len(), 3);
        assert_eq!(sampler.finish().len(), 3);
        assert!(sampler.table().is_empty());
    }

    #[test]
    fn zero_limit() {
        let mut sampler = Sampler::new(0);

        offer(&mut sampler, 1);

        assert!(sampler.finish().is_empty());
    }
}
