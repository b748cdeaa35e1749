use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to connect to predictor at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("predictor closed the connection after {received} of {expected} bytes")]
    PeerDisconnected { received: usize, expected: usize },
    #[error("malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },
    #[error("dataset not found: {0}")]
    DatasetMissing(PathBuf),
    #[error("dataset {0} contains no usable rows")]
    DatasetEmpty(PathBuf),
    #[error("dataset has no samples to cycle through")]
    EmptyDataset,
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Faults that mean the peer went away rather than something being wrong
    /// on our side.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::PeerDisconnected { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
