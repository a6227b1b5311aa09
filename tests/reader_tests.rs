//! Integration tests against generated measurement fixtures.

use std::path::{Path, PathBuf};

use hdf5::types::VarLenUnicode;
use hdf5::{File, Group};
use ndarray::{Array1, Array2, Array3};
use tempfile::TempDir;

use h5chan::{AccessError, ChannelReader, FlattenPolicy, HandleRegistry, StorageLayout};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn write_string_attr(group: &Group, name: &str, value: &str) {
    let value: VarLenUnicode = value.parse().expect("valid unicode");
    group
        .new_attr::<VarLenUnicode>()
        .create(name)
        .expect("create attribute")
        .write_scalar(&value)
        .expect("write attribute");
}

/// Two channels under the default layout:
///
/// * `CH1`: attributes `name`, `physicalUnit`, `binToVoltFactor` (2.5);
///   datasets `raw` (rank 1, length 5), `data00000001` (rank 2, 100x2 with
///   row i = `[i, 1000 + i]`), `cube` (rank 3) and `notes` (not surfaced).
/// * `CH2`: only `ChannelName`; `raw` of length 8.
fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("measurement.h5");
    let file = File::create(&path).expect("create fixture file");
    let channels = file
        .create_group("measurements/00000001/channels")
        .expect("create channels group");

    let ch1 = channels.create_group("CH1").expect("create CH1");
    write_string_attr(&ch1, "name", "Voltage A");
    write_string_attr(&ch1, "physicalUnit", "V");
    ch1.new_attr::<f64>()
        .create("binToVoltFactor")
        .expect("create attribute")
        .write_scalar(&2.5)
        .expect("write attribute");

    let block = ch1.create_group("blocks/00000001").expect("create block");
    block
        .new_dataset_builder()
        .with_data(&Array1::from(vec![0u16, 1, 2, 3, 4]))
        .create("raw")
        .expect("create raw");
    let pairs = Array2::from_shape_fn((100, 2), |(i, j)| {
        if j == 0 {
            i as u16
        } else {
            1000 + i as u16
        }
    });
    block
        .new_dataset_builder()
        .with_data(&pairs)
        .create("data00000001")
        .expect("create data00000001");
    block
        .new_dataset_builder()
        .with_data(&Array3::<u16>::zeros((2, 2, 2)))
        .create("cube")
        .expect("create cube");
    block
        .new_dataset_builder()
        .with_data(&Array1::from(vec![9u16]))
        .create("notes")
        .expect("create notes");

    let ch2 = channels.create_group("CH2").expect("create CH2");
    write_string_attr(&ch2, "ChannelName", "CH2");
    let block2 = ch2.create_group("blocks/00000001").expect("create block");
    let ramp: Vec<u16> = (0..8).map(|i| i * 10).collect();
    block2
        .new_dataset_builder()
        .with_data(&Array1::from(ramp))
        .create("raw")
        .expect("create raw");

    path
}

fn open_fixture() -> (TempDir, ChannelReader) {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_fixture(dir.path());
    let reader = ChannelReader::open(&path).expect("open fixture");
    (dir, reader)
}

// ---------------------------------------------------------------------------
// Opening and closing
// ---------------------------------------------------------------------------

#[test]
fn open_missing_file_is_not_found() {
    let dir = TempDir::new().expect("create tempdir");
    let missing = dir.path().join("no_such_file.h5");

    match ChannelReader::open(&missing) {
        Err(AccessError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }

    let mut registry = HandleRegistry::new();
    assert!(registry.open_file(&missing).is_none());
    assert_eq!(registry.open_count(), 0);
}

#[test]
fn closed_handle_behaves_as_empty() {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_fixture(dir.path());

    let mut registry = HandleRegistry::new();
    let handle = registry.open_file(&path).expect("open fixture");
    registry.close_file(handle);

    assert!(registry.channel_ids(handle).is_empty());
    assert!(registry.channel_attributes(handle, "CH1").is_empty());
    assert!(registry.dataset_shape(handle, "CH1", "raw").is_empty());
    assert!(registry
        .read_dataset_chunk(handle, "CH1", "raw", 0, 4)
        .is_empty());
}

#[test]
fn double_close_is_a_no_op() {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_fixture(dir.path());

    let mut registry = HandleRegistry::new();
    let handle = registry.open_file(&path).expect("open fixture");
    registry.close_file(handle);
    registry.close_file(handle);
    assert_eq!(registry.open_count(), 0);
}

/// Write a fixture into a fresh subdirectory of `root`.
fn write_fixture_in(root: &Path, name: &str) -> PathBuf {
    let sub = root.join(name);
    std::fs::create_dir_all(&sub).expect("create subdir");
    write_fixture(&sub)
}

#[test]
fn two_files_open_independently() {
    let dir = TempDir::new().expect("create tempdir");
    let first = write_fixture_in(dir.path(), "a");
    let second = write_fixture_in(dir.path(), "b");

    let mut registry = HandleRegistry::new();
    let h1 = registry.open_file(&first).expect("open first");
    let h2 = registry.open_file(&second).expect("open second");
    assert_ne!(h1, h2);
    assert_eq!(registry.open_count(), 2);

    registry.close_file(h1);
    assert!(registry.channel_ids(h1).is_empty());
    assert_eq!(registry.channel_ids(h2), vec!["CH1", "CH2"]);
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn fixture_lists_both_channels() {
    let (_dir, reader) = open_fixture();
    assert_eq!(reader.channel_ids().expect("channel ids"), vec!["CH1", "CH2"]);
}

#[test]
fn channels_group_missing_is_not_found() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("empty.h5");
    File::create(&path).expect("create empty file");

    let reader = ChannelReader::open(&path).expect("open empty file");
    match reader.channel_ids() {
        Err(AccessError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn datasets_filtered_to_data_and_raw() {
    let (_dir, reader) = open_fixture();
    let mut names = reader.available_datasets("CH1").expect("datasets");
    names.sort();
    assert_eq!(names, vec!["data00000001", "raw"]);
}

#[test]
fn dataset_shape_reports_dimensions_in_order() {
    let (_dir, reader) = open_fixture();
    assert_eq!(reader.dataset_shape("CH1", "raw").expect("shape"), vec![5]);
    assert_eq!(
        reader.dataset_shape("CH1", "data00000001").expect("shape"),
        vec![100, 2]
    );
}

#[test]
fn missing_dataset_shape_is_not_found() {
    let (_dir, reader) = open_fixture();
    match reader.dataset_shape("CH1", "bogus") {
        Err(AccessError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

#[test]
fn attributes_contain_only_present_keys() {
    let (_dir, reader) = open_fixture();

    let attrs = reader.channel_attributes("CH1").expect("CH1 attributes");
    let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["binToVoltFactor", "name", "physicalUnit"]);
    assert_eq!(attrs["name"], "Voltage A");
    assert_eq!(attrs["physicalUnit"], "V");

    // Numeric attributes must round-trip through their string form.
    let factor: f64 = attrs["binToVoltFactor"].parse().expect("decimal form");
    assert_eq!(factor, 2.5);

    let attrs = reader.channel_attributes("CH2").expect("CH2 attributes");
    let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["ChannelName"]);
}

#[test]
fn attributes_of_missing_channel_are_not_found() {
    let (_dir, reader) = open_fixture();
    match reader.channel_attributes("CH9") {
        Err(AccessError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Chunk reads
// ---------------------------------------------------------------------------

#[test]
fn rank1_read_clamps_to_available_length() {
    let (_dir, reader) = open_fixture();
    let samples = reader.read_chunk("CH1", "raw", 0, 10).expect("read");
    assert_eq!(samples, vec![0, 1, 2, 3, 4]);

    let tail = reader.read_chunk("CH1", "raw", 3, 10).expect("read");
    assert_eq!(tail, vec![3, 4]);
}

#[test]
fn rank2_read_takes_first_column_by_default() {
    let (_dir, reader) = open_fixture();
    let samples = reader
        .read_chunk("CH1", "data00000001", 0, 100)
        .expect("read");
    assert_eq!(samples.len(), 100);
    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(*sample, i as u16);
    }
}

#[test]
fn rank2_policies_select_columns_or_interleave() {
    let (_dir, reader) = open_fixture();

    let maxima = reader
        .read_chunk_with("CH1", "data00000001", 0, 3, FlattenPolicy::ColumnSelect(1))
        .expect("read");
    assert_eq!(maxima, vec![1000, 1001, 1002]);

    let interleaved = reader
        .read_chunk_with("CH1", "data00000001", 0, 3, FlattenPolicy::Interleave)
        .expect("read");
    assert_eq!(interleaved, vec![0, 1000, 1, 1001, 2, 1002]);

    match reader.read_chunk_with("CH1", "data00000001", 0, 3, FlattenPolicy::ColumnSelect(2)) {
        Err(AccessError::ColumnOutOfRange { column: 2, columns: 2 }) => {}
        other => panic!("expected ColumnOutOfRange, got {other:?}"),
    }
}

#[test]
fn rank3_dataset_is_unsupported() {
    let (_dir, reader) = open_fixture();
    match reader.read_chunk("CH1", "cube", 0, 4) {
        Err(AccessError::UnsupportedRank { rank: 3 }) => {}
        other => panic!("expected UnsupportedRank, got {other:?}"),
    }
}

#[test]
fn start_past_end_is_out_of_bounds() {
    let (_dir, reader) = open_fixture();

    match reader.read_chunk("CH1", "raw", 6, 1) {
        Err(AccessError::OutOfBounds { start: 6, len: 5 }) => {}
        other => panic!("expected OutOfBounds, got {other:?}"),
    }

    // Exactly at the end yields an empty chunk, not an error.
    let samples = reader.read_chunk("CH1", "raw", 5, 1).expect("read");
    assert!(samples.is_empty());
}

#[test]
fn lenient_surface_degrades_read_failures_to_empty() {
    let dir = TempDir::new().expect("create tempdir");
    let path = write_fixture(dir.path());

    let mut registry = HandleRegistry::new();
    let handle = registry.open_file(&path).expect("open fixture");

    assert!(registry.read_dataset_chunk(handle, "CH1", "cube", 0, 4).is_empty());
    assert!(registry.read_dataset_chunk(handle, "CH1", "raw", 6, 1).is_empty());
    assert!(registry.read_dataset_chunk(handle, "CH1", "bogus", 0, 4).is_empty());
    assert!(registry.dataset_shape(handle, "CH1", "bogus").is_empty());
    assert!(registry.channel_attributes(handle, "CH9").is_empty());

    // The same handle still serves good reads afterwards.
    assert_eq!(
        registry.read_dataset_chunk(handle, "CH1", "raw", 0, 10),
        vec![0, 1, 2, 3, 4]
    );
    assert_eq!(
        registry.read_dataset_chunk_with(
            handle,
            "CH1",
            "data00000001",
            0,
            2,
            FlattenPolicy::Interleave
        ),
        vec![0, 1000, 1, 1001]
    );
    registry.close_file(handle);
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn custom_layout_resolves_other_indices() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("second_block.h5");

    let file = File::create(&path).expect("create file");
    let ch = file
        .create_group("measurements/00000002/channels/CH1")
        .expect("create channel");
    let block = ch.create_group("blocks/00000003").expect("create block");
    block
        .new_dataset_builder()
        .with_data(&Array1::from(vec![7u16, 8, 9]))
        .create("raw")
        .expect("create raw");

    let layout = StorageLayout::new(2, 3);
    let reader = ChannelReader::open_with_layout(&path, layout).expect("open");
    assert_eq!(reader.channel_ids().expect("channel ids"), vec!["CH1"]);
    assert_eq!(reader.read_chunk("CH1", "raw", 0, 8).expect("read"), vec![7, 8, 9]);

    // The default layout does not see this file's hierarchy.
    let reader = ChannelReader::open(&path).expect("open");
    match reader.channel_ids() {
        Err(AccessError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}
