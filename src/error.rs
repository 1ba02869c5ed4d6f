use glam::UVec3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid grid dimensions {dims}")]
    InvalidDimensions { dims: UVec3 },

    #[error("grid dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: UVec3, found: UVec3 },

    #[error("voxel {coord} out of bounds for grid {dims}")]
    OutOfBounds { coord: UVec3, dims: UVec3 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
