use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("batch size mismatch: {what} has {got} entries, expected {expected}")]
    BatchMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("sample {index}: {what} map is {got:?} (h, w), expected {expected:?}")]
    MapShape {
        index: usize,
        what: &'static str,
        got: (usize, usize),
        expected: (usize, usize),
    },
    #[error("sample {index}: {what} map must be single-channel with {expected} values")]
    InvalidMap {
        index: usize,
        what: &'static str,
        expected: usize,
    },
    #[error("failed to read predictions {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
