//! Typed read layer over one open measurement file.

use std::collections::BTreeMap;
use std::path::Path;

use hdf5::types::{VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use log::{debug, trace};
use ndarray::{s, Array1, Array2};

use crate::chunk::{clamp, FlattenPolicy};
use crate::error::{AccessError, Result};
use crate::layout::StorageLayout;

/// Channel attributes surfaced verbatim as strings.
const STRING_ATTRS: [&str; 3] = ["name", "physicalUnit", "ChannelName"];

/// Channel attributes stored as doubles, surfaced as decimal strings.
const NUMERIC_ATTRS: [&str; 2] = ["binToVoltConstant", "binToVoltFactor"];

// ---------------------------------------------------------------------------
// ChannelReader
// ---------------------------------------------------------------------------

/// Read-only accessor over one measurement file.
///
/// Owns the open [`hdf5::File`]; dropping the reader closes it. All methods
/// resolve paths through the reader's [`StorageLayout`] and return typed
/// errors; see [`HandleRegistry`](crate::HandleRegistry) for the lenient
/// host-facing surface.
#[derive(Debug)]
pub struct ChannelReader {
    file: File,
    layout: StorageLayout,
}

impl ChannelReader {
    /// Open `path` read-only with the default layout.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_layout(path, StorageLayout::default())
    }

    /// Open `path` read-only, resolving paths against `layout`.
    pub fn open_with_layout<P: AsRef<Path>>(path: P, layout: StorageLayout) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AccessError::NotFound {
                path: path.display().to_string(),
            });
        }
        let file = File::open(path)?;
        debug!("opened {} read-only", path.display());
        Ok(Self { file, layout })
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Channel ids under the channels group, in listing order.
    pub fn channel_ids(&self) -> Result<Vec<String>> {
        let group = self.group(&self.layout.channels_group())?;
        let ids = group.member_names()?;
        debug!("found {} channels", ids.len());
        Ok(ids)
    }

    /// The subset of the attribute allow-list present on the channel group.
    ///
    /// Each attribute is attempted independently; a missing or unreadable
    /// attribute is skipped, never raised. Numeric values are rendered in
    /// their shortest round-trippable decimal form.
    pub fn channel_attributes(&self, channel_id: &str) -> Result<BTreeMap<String, String>> {
        let group = self.group(&self.layout.channel_group(channel_id))?;
        let mut attrs = BTreeMap::new();

        for name in STRING_ATTRS {
            match read_string_attr(&group, name) {
                Ok(Some(value)) => {
                    attrs.insert(name.to_string(), value);
                }
                Ok(None) => {}
                Err(err) => trace!("skipping attribute {name} on {channel_id}: {err}"),
            }
        }
        for name in NUMERIC_ATTRS {
            match read_f64_attr(&group, name) {
                Ok(Some(value)) => {
                    attrs.insert(name.to_string(), value.to_string());
                }
                Ok(None) => {}
                Err(err) => trace!("skipping attribute {name} on {channel_id}: {err}"),
            }
        }
        Ok(attrs)
    }

    /// Dataset names under the channel's block group. Only `data*` members
    /// and `raw` are surfaced; bookkeeping objects are hidden.
    pub fn available_datasets(&self, channel_id: &str) -> Result<Vec<String>> {
        let group = self.group(&self.layout.block_group(channel_id))?;
        let names: Vec<String> = group
            .member_names()?
            .into_iter()
            .filter(|name| name.starts_with("data") || name == "raw")
            .collect();
        debug!("channel {channel_id} has {} datasets", names.len());
        Ok(names)
    }

    /// Dimension sizes of one dataset, in order.
    pub fn dataset_shape(&self, channel_id: &str, dataset_name: &str) -> Result<Vec<usize>> {
        let dataset = self.dataset(&self.layout.dataset_path(channel_id, dataset_name))?;
        Ok(dataset.shape())
    }

    /// Read up to `count` samples starting at `start` along the first
    /// dimension, using the default first-column flattening for rank 2.
    pub fn read_chunk(
        &self,
        channel_id: &str,
        dataset_name: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<u16>> {
        self.read_chunk_with(channel_id, dataset_name, start, count, FlattenPolicy::default())
    }

    /// [`read_chunk`](Self::read_chunk) with an explicit rank-2 policy.
    ///
    /// `count` is clamped to the remaining first-dimension length; a `start`
    /// past the end is [`AccessError::OutOfBounds`]. Rank-2 reads materialise
    /// the full `(len, dims[1])` block and then apply `policy`.
    pub fn read_chunk_with(
        &self,
        channel_id: &str,
        dataset_name: &str,
        start: usize,
        count: usize,
        policy: FlattenPolicy,
    ) -> Result<Vec<u16>> {
        let dataset = self.dataset(&self.layout.dataset_path(channel_id, dataset_name))?;
        let dims = dataset.shape();

        match dims.len() {
            1 => {
                let bounds = clamp(start, count, dims[0])?;
                if bounds.is_empty() {
                    return Ok(Vec::new());
                }
                let data: Array1<u16> = dataset.read_slice_1d(s![bounds.start..bounds.end()])?;
                trace!("read {} samples from {dataset_name} at {start}", data.len());
                Ok(data.to_vec())
            }
            2 => {
                let bounds = clamp(start, count, dims[0])?;
                if bounds.is_empty() {
                    return Ok(Vec::new());
                }
                let block: Array2<u16> =
                    dataset.read_slice(s![bounds.start..bounds.end(), ..])?;
                trace!(
                    "read {}x{} block from {dataset_name} at {start}",
                    block.nrows(),
                    block.ncols()
                );
                policy.flatten(&block)
            }
            rank => Err(AccessError::UnsupportedRank { rank }),
        }
    }

    // -- path helpers --

    fn group(&self, path: &str) -> Result<Group> {
        if !self.file.link_exists(path) {
            return Err(AccessError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.file.group(path)?)
    }

    fn dataset(&self, path: &str) -> Result<Dataset> {
        if !self.file.link_exists(path) {
            return Err(AccessError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.file.dataset(path)?)
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

/// Read a string attribute if present. Variable-length Unicode is tried
/// first, then variable-length ASCII; fixed-width strings are rejected by
/// the second read and surface as an error for the caller to skip.
fn read_string_attr(group: &Group, name: &str) -> Result<Option<String>> {
    if !has_attr(group, name)? {
        return Ok(None);
    }
    let attr = group.attr(name)?;
    if let Ok(value) = attr.read_scalar::<VarLenUnicode>() {
        return Ok(Some(value.to_string()));
    }
    let value = attr.read_scalar::<VarLenAscii>()?;
    Ok(Some(value.to_string()))
}

/// Read a double attribute if present.
fn read_f64_attr(group: &Group, name: &str) -> Result<Option<f64>> {
    if !has_attr(group, name)? {
        return Ok(None);
    }
    Ok(Some(group.attr(name)?.read_scalar::<f64>()?))
}

fn has_attr(group: &Group, name: &str) -> Result<bool> {
    Ok(group.attr_names()?.iter().any(|a| a == name))
}
