//! Chunk clamping and the rank-2 flattening policy.

use ndarray::Array2;

use crate::error::{AccessError, Result};

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// A bounded slice of a dataset's first dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    pub start: usize,
    pub len: usize,
}

impl ChunkBounds {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Clamp a requested `(start, count)` range against the first-dimension
/// length. `start == dim0` is allowed and yields an empty chunk; anything
/// beyond is rejected rather than left to unsigned underflow.
pub fn clamp(start: usize, count: usize, dim0: usize) -> Result<ChunkBounds> {
    if start > dim0 {
        return Err(AccessError::OutOfBounds { start, len: dim0 });
    }
    Ok(ChunkBounds {
        start,
        len: count.min(dim0 - start),
    })
}

// ---------------------------------------------------------------------------
// FlattenPolicy - how a rank-2 block becomes a flat sample sequence
// ---------------------------------------------------------------------------

/// Reduction applied to a rank-2 block before handing samples to the host.
///
/// Min/max pair datasets are stored as `(n, 2)`; the default
/// `ColumnSelect(0)` keeps only the first pair member of each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenPolicy {
    /// Keep a single column of each selected row.
    ColumnSelect(usize),
    /// Row-major flatten of the whole block.
    Interleave,
}

impl Default for FlattenPolicy {
    fn default() -> Self {
        FlattenPolicy::ColumnSelect(0)
    }
}

impl FlattenPolicy {
    /// Apply the policy to a block of shape `(rows, cols)`.
    pub fn flatten(self, block: &Array2<u16>) -> Result<Vec<u16>> {
        match self {
            FlattenPolicy::ColumnSelect(column) => {
                let columns = block.ncols();
                if column >= columns {
                    return Err(AccessError::ColumnOutOfRange { column, columns });
                }
                Ok(block.column(column).to_vec())
            }
            FlattenPolicy::Interleave => Ok(block.iter().copied().collect()),
        }
    }
}
