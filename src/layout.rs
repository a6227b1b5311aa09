//! Path resolution for the measurement/channel/block hierarchy.
//!
//! Files are laid out as
//! `measurements/<idx>/channels/<channelId>/blocks/<idx>/<datasetName>`
//! with both indices rendered as zero-padded 8-digit segments. The default
//! layout (`00000001`/`00000001`) is the single schema version written by
//! current acquisition software; other indices can be selected per reader.

use serde::{Deserialize, Serialize};

/// Which measurement and block a reader resolves paths against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLayout {
    /// 1-based measurement index under `measurements/`.
    pub measurement_index: u32,
    /// 1-based block index under each channel's `blocks/`.
    pub block_index: u32,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            measurement_index: 1,
            block_index: 1,
        }
    }
}

impl StorageLayout {
    pub fn new(measurement_index: u32, block_index: u32) -> Self {
        Self {
            measurement_index,
            block_index,
        }
    }

    /// Group holding all channels of the measurement.
    pub fn channels_group(&self) -> String {
        format!("measurements/{:08}/channels", self.measurement_index)
    }

    /// Group of one channel, carrying its attributes.
    pub fn channel_group(&self, channel_id: &str) -> String {
        format!("{}/{channel_id}", self.channels_group())
    }

    /// Block group holding the channel's datasets.
    pub fn block_group(&self, channel_id: &str) -> String {
        format!("{}/blocks/{:08}", self.channel_group(channel_id), self.block_index)
    }

    /// Full path of one dataset inside the channel's block.
    pub fn dataset_path(&self, channel_id: &str, dataset_name: &str) -> String {
        format!("{}/{dataset_name}", self.block_group(channel_id))
    }
}
