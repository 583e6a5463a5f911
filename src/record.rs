//! Owned sequencing record, what the pipeline receive from a record source.

/* crate use */
use bstr::ByteSlice;

/// One read: id, sequence and quality string (empty for fasta)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: String,
    pub sequence: Vec<u8>,
    pub quality: Vec<u8>,
}

impl RawRecord {
    pub fn new<S>(id: S, sequence: Vec<u8>, quality: Vec<u8>) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            sequence,
            quality,
        }
    }

    /// Build a record from a raw header line, `@` or `>` marker is removed and only the first
    /// word is kept as id, comment is dropped.
    pub fn from_header(header: &[u8], sequence: Vec<u8>, quality: Vec<u8>) -> Self {
        Self::new(header_id(header), sequence, quality)
    }
}

/// First word of header line after the record marker
pub fn header_id(header: &[u8]) -> String {
    let header = match header.first() {
        Some(b'@') | Some(b'>') => &header[1..],
        _ => header,
    };

    header
        .fields()
        .next()
        .unwrap_or_default()
        .to_str_lossy()
        .into_owned()
}
