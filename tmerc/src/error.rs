use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("projection is singular at ({x}, {y})")]
    Singularity { x: f64, y: f64 },

    #[error("invalid anchor, {0}")]
    InvalidAnchor(&'static str),
}
