use thiserror::Error;
use tmerc::ProjectionError;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record on line {line}, {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("incomplete grid, expected {expected} records but read {read}")]
    IncompleteGrid { expected: usize, read: usize },

    #[error("degenerate interval [{start}, {end}]")]
    DegenerateInterval { start: f64, end: f64 },

    #[error("sample {index}, {source}")]
    Projection {
        index: usize,
        #[source]
        source: ProjectionError,
    },

    #[error("no anchor given and no data to derive one from")]
    EmptyExtent,

    #[error("{0}")]
    Anchor(#[from] ProjectionError),
}
