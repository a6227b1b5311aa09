//! Inspector CLI: print a JSON summary of a measurement file.
//!
//! ```text
//! h5chan <file.h5> [channel-id]
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use h5chan::ChannelReader;

#[derive(Serialize)]
struct DatasetSummary {
    name: String,
    shape: Vec<usize>,
}

#[derive(Serialize)]
struct ChannelSummary {
    id: String,
    attributes: BTreeMap<String, String>,
    datasets: Vec<DatasetSummary>,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: h5chan <file.h5> [channel-id]");
    };
    let only_channel = args.next();

    let reader = ChannelReader::open(&path).with_context(|| format!("opening {path}"))?;

    let mut channels = Vec::new();
    for id in reader.channel_ids().context("listing channels")? {
        if let Some(only) = &only_channel {
            if only != &id {
                continue;
            }
        }
        let attributes = reader
            .channel_attributes(&id)
            .with_context(|| format!("reading attributes of {id}"))?;
        let mut datasets = Vec::new();
        for name in reader
            .available_datasets(&id)
            .with_context(|| format!("listing datasets of {id}"))?
        {
            let shape = reader
                .dataset_shape(&id, &name)
                .with_context(|| format!("reading shape of {id}/{name}"))?;
            datasets.push(DatasetSummary { name, shape });
        }
        channels.push(ChannelSummary {
            id,
            attributes,
            datasets,
        });
    }

    if channels.is_empty() {
        if let Some(only) = &only_channel {
            bail!("channel {only} not found in {path}");
        }
    }

    println!("{}", serde_json::to_string_pretty(&channels)?);
    Ok(())
}
