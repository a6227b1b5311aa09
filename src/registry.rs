//! Host-facing handle table with lenient error mapping.
//!
//! Hosts talk to the crate through opaque handles and primitive values: open
//! yields `Option<Handle>`, every read yields an empty sequence or map on any
//! failure, and the cause goes to the log instead of the caller. An FFI shim
//! can wrap this surface one function to one export.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, warn};

use crate::chunk::FlattenPolicy;
use crate::layout::StorageLayout;
use crate::reader::ChannelReader;

/// Opaque id of one open file in a [`HandleRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

/// Handle table mapping opaque ids to open readers.
///
/// Handles are never reused within one registry, so a stale handle after
/// [`close_file`](Self::close_file) degrades to empty results rather than
/// reading from an unrelated file.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    open: HashMap<u64, ChannelReader>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` read-only with the default layout; `None` if the file
    /// cannot be opened.
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Option<Handle> {
        self.open_file_with_layout(path, StorageLayout::default())
    }

    /// Open `path` read-only, resolving paths against `layout`.
    pub fn open_file_with_layout<P: AsRef<Path>>(
        &mut self,
        path: P,
        layout: StorageLayout,
    ) -> Option<Handle> {
        let path = path.as_ref();
        match ChannelReader::open_with_layout(path, layout) {
            Ok(reader) => {
                self.next_id += 1;
                let handle = Handle(self.next_id);
                self.open.insert(handle.0, reader);
                Some(handle)
            }
            Err(err) => {
                warn!("failed to open {}: {err}", path.display());
                None
            }
        }
    }

    /// Channel ids in the file, or empty if the handle is closed or the
    /// channels group is missing.
    pub fn channel_ids(&self, handle: Handle) -> Vec<String> {
        let Some(reader) = self.reader(handle) else {
            return Vec::new();
        };
        reader.channel_ids().unwrap_or_else(|err| {
            warn!("listing channels failed: {err}");
            Vec::new()
        })
    }

    /// Present allow-list attributes of one channel, or empty on failure.
    pub fn channel_attributes(&self, handle: Handle, channel_id: &str) -> BTreeMap<String, String> {
        let Some(reader) = self.reader(handle) else {
            return BTreeMap::new();
        };
        reader.channel_attributes(channel_id).unwrap_or_else(|err| {
            warn!("reading attributes of {channel_id} failed: {err}");
            BTreeMap::new()
        })
    }

    /// Dataset names in the channel's block, or empty on failure.
    pub fn available_datasets(&self, handle: Handle, channel_id: &str) -> Vec<String> {
        let Some(reader) = self.reader(handle) else {
            return Vec::new();
        };
        reader.available_datasets(channel_id).unwrap_or_else(|err| {
            warn!("listing datasets of {channel_id} failed: {err}");
            Vec::new()
        })
    }

    /// Dimension sizes of one dataset, or empty on failure.
    pub fn dataset_shape(
        &self,
        handle: Handle,
        channel_id: &str,
        dataset_name: &str,
    ) -> Vec<usize> {
        let Some(reader) = self.reader(handle) else {
            return Vec::new();
        };
        reader
            .dataset_shape(channel_id, dataset_name)
            .unwrap_or_else(|err| {
                warn!("reading shape of {channel_id}/{dataset_name} failed: {err}");
                Vec::new()
            })
    }

    /// Clamped chunk read with the default first-column flattening, or empty
    /// on any failure (closed handle, missing dataset, out-of-range start,
    /// unsupported rank).
    pub fn read_dataset_chunk(
        &self,
        handle: Handle,
        channel_id: &str,
        dataset_name: &str,
        start: usize,
        count: usize,
    ) -> Vec<u16> {
        self.read_dataset_chunk_with(
            handle,
            channel_id,
            dataset_name,
            start,
            count,
            FlattenPolicy::default(),
        )
    }

    /// [`read_dataset_chunk`](Self::read_dataset_chunk) with an explicit
    /// rank-2 policy.
    pub fn read_dataset_chunk_with(
        &self,
        handle: Handle,
        channel_id: &str,
        dataset_name: &str,
        start: usize,
        count: usize,
        policy: FlattenPolicy,
    ) -> Vec<u16> {
        let Some(reader) = self.reader(handle) else {
            return Vec::new();
        };
        reader
            .read_chunk_with(channel_id, dataset_name, start, count, policy)
            .unwrap_or_else(|err| {
                warn!("reading chunk of {channel_id}/{dataset_name} failed: {err}");
                Vec::new()
            })
    }

    /// Close `handle` and release the underlying file. Idempotent; closing
    /// an unknown or already closed handle is a logged no-op.
    pub fn close_file(&mut self, handle: Handle) {
        if self.open.remove(&handle.0).is_some() {
            debug!("closed handle {handle:?}");
        } else {
            debug!("close_file: handle {handle:?} already closed");
        }
    }

    /// Number of currently open files.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    fn reader(&self, handle: Handle) -> Option<&ChannelReader> {
        let reader = self.open.get(&handle.0);
        if reader.is_none() {
            warn!("handle {handle:?} is not open");
        }
        reader
    }
}
