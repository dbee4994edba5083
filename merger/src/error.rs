use std::path::PathBuf;

/// Errors that abort a batch (or a single pair-file read).
///
/// Per-component conditions -- a graph yielding more paths than the cap,
/// a component larger than ten times the sample count -- are not errors;
/// they are counted in [crate::MergeStats] and processing continues.
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("no contigs passed the entropy filter")]
    EmptyInput,
    #[error("malformed pair file {file}, line {line}: {reason}")]
    MalformedPairFile {
        file: PathBuf,
        line: usize,
        reason: String,
    },
}
