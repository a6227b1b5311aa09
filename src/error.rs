use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = AccessError> = std::result::Result<T, E>;

/// Errors raised by the typed read layer.
///
/// The host-facing [`HandleRegistry`](crate::HandleRegistry) maps all of
/// these to empty results; use [`ChannelReader`](crate::ChannelReader)
/// directly to tell the causes apart.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A file, group or dataset is absent at the resolved path.
    #[error("object not found: {path}")]
    NotFound { path: String },

    /// The requested start index lies past the end of the first dimension.
    #[error("start index {start} is past the end of the dataset (length {len})")]
    OutOfBounds { start: usize, len: usize },

    /// Only rank-1 and rank-2 datasets can be read as chunks.
    #[error("unsupported dataset rank {rank} (expected 1 or 2)")]
    UnsupportedRank { rank: usize },

    /// A `ColumnSelect` policy named a column the dataset does not have.
    #[error("column {column} out of range for a dataset with {columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },

    /// Any other failure reported by the HDF5 library.
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),
}
