//! Error type of fqclean, every fallible function return [Result].

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("{} has existed, please check!", .path.display())]
    AlreadyExists { path: std::path::PathBuf },

    #[error("fqclean can't create output {path:?} {source}")]
    CreateOutput {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("fqclean failled to write output {source}")]
    WriteOutput { source: std::io::Error },

    #[error("fqclean failled to write report {path:?} {source}")]
    Report {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("read id {id} doesn't end with a quality value, '{segment}' isn't a number")]
    QualityParse {
        id: String,
        segment: String,
        source: std::num::ParseFloatError,
    },

    #[error("fqclean failled to read file metadata {source}")]
    MetaDataFile { source: std::io::Error },

    #[error("fqclean can't open file {source}")]
    OpenFile { source: std::io::Error },

    #[error("fqclean can't map file on memory {source}")]
    MapFile { source: std::io::Error },

    #[error("fqclean failled to read input {source}")]
    ReadInput { source: std::io::Error },

    #[error("fqclean didn't find new line in block increase block size")]
    NoNewLineInBlock,

    #[error("Input file seems not be a fastq file")]
    NotAFastqFile,

    #[error("Input file seems not be a fasta file")]
    NotAFastaFile,

    #[error("Input file seems not be a fasta or fastq file")]
    UnknownFormat,

    #[error("fqclean found a partial record")]
    PartialRecord,
}

pub type Result<T> = std::result::Result<T, Error>;
