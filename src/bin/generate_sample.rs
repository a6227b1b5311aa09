//! Write a deterministic sample measurement file for manual testing.
//!
//! Produces two channels under `measurements/00000001/channels`, each with
//! the standard attributes, a rank-1 `raw` dataset of u16 samples and a
//! rank-2 `data00000001` min/max pair dataset.

use anyhow::{anyhow, Context, Result};
use hdf5::types::VarLenUnicode;
use hdf5::{File, Group};
use ndarray::{Array1, Array2};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Sine burst plus uniform noise, centred on the u16 midpoint.
fn generate_samples(len: usize, period: f64, amplitude: f64, rng: &mut SimpleRng) -> Vec<u16> {
    (0..len)
        .map(|i| {
            let signal = amplitude * (i as f64 * std::f64::consts::TAU / period).sin();
            let noise = (rng.next_f64() - 0.5) * 200.0;
            (32768.0 + signal + noise).clamp(0.0, 65535.0) as u16
        })
        .collect()
}

/// Per-bucket (min, max) pairs for the preview dataset.
fn min_max_pairs(samples: &[u16], bucket: usize) -> Array2<u16> {
    let rows: Vec<(u16, u16)> = samples
        .chunks(bucket)
        .map(|window| {
            let min = window.iter().copied().min().unwrap_or(0);
            let max = window.iter().copied().max().unwrap_or(0);
            (min, max)
        })
        .collect();
    let mut pairs = Array2::zeros((rows.len(), 2));
    for (i, (min, max)) in rows.into_iter().enumerate() {
        pairs[[i, 0]] = min;
        pairs[[i, 1]] = max;
    }
    pairs
}

fn write_string_attr(group: &Group, name: &str, value: &str) -> Result<()> {
    let value: VarLenUnicode = value
        .parse()
        .map_err(|_| anyhow!("attribute value for {name} is not valid unicode"))?;
    group
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_measurement.h5".to_string());

    let file = File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let channels = file.create_group("measurements/00000001/channels")?;

    let mut rng = SimpleRng::new(42);
    let sample_count = 40_000;
    let bucket = 16;

    let specs = [
        ("CH1", "Voltage A", "V", 1.0e-3, 4000.0),
        ("CH2", "Voltage B", "mV", 2.5e-4, 1300.0),
    ];

    for (id, name, unit, factor, amplitude) in specs {
        let channel = channels.create_group(id)?;
        write_string_attr(&channel, "name", name)?;
        write_string_attr(&channel, "physicalUnit", unit)?;
        write_string_attr(&channel, "ChannelName", id)?;
        channel
            .new_attr::<f64>()
            .create("binToVoltConstant")?
            .write_scalar(&-32.768)?;
        channel
            .new_attr::<f64>()
            .create("binToVoltFactor")?
            .write_scalar(&factor)?;

        let block = channel.create_group("blocks/00000001")?;

        let samples = generate_samples(sample_count, 700.0, amplitude, &mut rng);
        let raw = Array1::from(samples.clone());
        // Chunked storage so readers exercise real hyperslab selection.
        let dataset = block
            .new_dataset::<u16>()
            .chunk(8192)
            .shape(sample_count)
            .create("raw")?;
        dataset.write(&raw)?;

        let pairs = min_max_pairs(&samples, bucket);
        block
            .new_dataset_builder()
            .with_data(&pairs)
            .create("data00000001")?;
    }

    println!(
        "Wrote {} channels ({sample_count} samples each, min/max bucket {bucket}) to {output_path}",
        specs.len()
    );
    Ok(())
}
