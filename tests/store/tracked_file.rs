use rstest::rstest;
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;
use tracked_file::store::compress::CompressionAlgorithm;
use tracked_file::{ErrorKind, PayloadFormat, PersistenceConfig, TrackedFile};

type Record = BTreeMap<String, i64>;

fn record(pairs: &[(&str, i64)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn save_then_reopen_scenario() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.dat");

    let mut file: TrackedFile<Record> = TrackedFile::open(&path).expect("open");
    assert!(file.get_data().is_none());
    assert!(!file.has_unsaved_changes());
    assert!(!path.exists());

    file.set_data(record(&[("x", 1)]));
    assert!(file.has_unsaved_changes());

    file.save().expect("save");
    assert!(path.exists());
    assert!(!file.has_unsaved_changes());

    let reopened: TrackedFile<Record> = TrackedFile::open(&path).expect("reopen");
    assert_eq!(reopened.get_data(), Some(&record(&[("x", 1)])));
    assert!(!reopened.has_unsaved_changes());
}

#[rstest]
#[case(PayloadFormat::Yaml, CompressionAlgorithm::Lz4)]
#[case(PayloadFormat::Json, CompressionAlgorithm::None)]
fn roundtrip_through_fresh_instance(
    #[case] format: PayloadFormat,
    #[case] compression: CompressionAlgorithm,
) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested.custom");
    let config = PersistenceConfig::default()
        .with_format(format)
        .with_compression(compression);

    let value: Vec<(String, Option<f64>, bool)> = vec![
        ("alpha".into(), Some(1.5), true),
        ("beta".into(), None, false),
    ];

    let mut file = TrackedFile::open_with_config(&path, config.clone()).expect("open");
    file.set_data(value.clone());
    file.save().expect("save");

    let restored: TrackedFile<Vec<(String, Option<f64>, bool)>> =
        TrackedFile::open_with_config(&path, config).expect("reopen");
    assert_eq!(restored.get_data(), Some(&value));
}

#[test]
fn empty_payload_roundtrips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("empty.dat");

    let mut file: TrackedFile<String> = TrackedFile::open(&path).expect("open");
    file.save().expect("save");

    let mut restored: TrackedFile<String> = TrackedFile::open(&path).expect("reopen");
    assert!(restored.get_data().is_none());
    restored.load().expect("load");
    assert!(restored.get_data().is_none());
}

#[rstest]
#[case(PayloadFormat::Yaml)]
#[case(PayloadFormat::Json)]
fn stored_none_is_not_an_empty_file(#[case] format: PayloadFormat) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("maybe.dat");
    let config = PersistenceConfig::default().with_format(format);

    let mut file: TrackedFile<Option<u32>> =
        TrackedFile::open_with_config(&path, config.clone()).expect("open");
    file.set_data(None);
    file.save().expect("save");

    let restored: TrackedFile<Option<u32>> =
        TrackedFile::open_with_config(&path, config.clone()).expect("reopen");
    assert_eq!(restored.get_data(), Some(&None));

    let mut cleared: TrackedFile<Option<u32>> =
        TrackedFile::open_with_config(&path, config.clone()).expect("reopen");
    cleared.mutate(|payload| *payload = None);
    cleared.save().expect("save empty");

    let restored: TrackedFile<Option<u32>> =
        TrackedFile::open_with_config(&path, config).expect("reopen");
    assert!(restored.get_data().is_none());
}

#[rstest]
#[case(PayloadFormat::Yaml)]
#[case(PayloadFormat::Json)]
fn unit_payload_survives_reopen(#[case] format: PayloadFormat) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("unit.dat");
    let config = PersistenceConfig::default().with_format(format);

    let mut file: TrackedFile<()> =
        TrackedFile::open_with_config(&path, config.clone()).expect("open");
    file.set_data(());
    file.save().expect("save");

    let restored: TrackedFile<()> = TrackedFile::open_with_config(&path, config).expect("reopen");
    assert_eq!(restored.get_data(), Some(&()));
}

#[test]
fn set_data_marks_dirty_regardless_of_prior_state() {
    let dir = tempdir().expect("tempdir");
    let mut file = TrackedFile::open(dir.path().join("b.dat")).expect("open");

    file.set_data(1u32);
    file.set_data(1u32);
    assert!(file.has_unsaved_changes());
    file.save().expect("save");
    file.set_data(1u32);
    assert!(file.has_unsaved_changes());
}

#[test]
fn load_discards_unsaved_changes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("c.dat");
    let mut file = TrackedFile::open(&path).expect("open");
    file.set_data("saved".to_string());
    file.save().expect("save");

    file.set_data("scratch".to_string());
    file.load().expect("load");
    assert_eq!(file.get_data().map(String::as_str), Some("saved"));
    assert!(!file.has_unsaved_changes());
}

#[test]
fn load_missing_file_leaves_state_alone() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("d.dat");
    let mut file = TrackedFile::open(&path).expect("open");
    file.set_data(vec![1, 2, 3]);

    let err = file.load().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(file.get_data(), Some(&vec![1, 2, 3]));
    assert!(file.has_unsaved_changes());
}

#[test]
fn load_corrupt_file_is_deserialization_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("e.dat");
    let mut file = TrackedFile::open(&path).expect("open");
    file.set_data(7u8);
    fs::write(&path, b"\x80\x04\x95 not ours").expect("write junk");

    let err = file.load().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialization);
    assert_eq!(file.get_data(), Some(&7));
    assert!(file.has_unsaved_changes());

    let err = TrackedFile::<u8>::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialization);
}

#[test]
fn load_wrong_payload_shape_is_deserialization_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("f.dat");
    let mut file = TrackedFile::open(&path).expect("open");
    file.set_data("not a number".to_string());
    file.save().expect("save");

    let err = TrackedFile::<u64>::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialization);
}

#[test]
fn failed_save_keeps_dirty_flag() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing-dir").join("g.dat");
    let mut file = TrackedFile::open(&path).expect("open");
    file.set_data(3u8);

    let err = file.save().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Write);
    assert!(file.has_unsaved_changes());
    assert!(!path.exists());
}

#[test]
fn unrepresentable_payload_is_serialization_error() {
    let dir = tempdir().expect("tempdir");
    let config = PersistenceConfig::default().with_format(PayloadFormat::Json);
    let mut file = TrackedFile::open_with_config(dir.path().join("h.json"), config)
        .expect("open");
    let mut keyed = BTreeMap::new();
    keyed.insert(vec![1u8], "composite key".to_string());
    file.set_data(keyed);

    let err = file.save().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert!(file.has_unsaved_changes());
}

#[test]
fn untitled_file_saves_once_given_a_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("Foo.bar");

    let mut file = TrackedFile::untitled();
    file.set_data("SOME BOGUS DATA".to_string());
    assert_eq!(file.save().unwrap_err().kind(), ErrorKind::MissingLocation);

    file.save_as(&path).expect("save as");
    assert!(!file.has_unsaved_changes());
    assert_eq!(file.name(), Some("Foo"));
    assert_eq!(file.extension(), Some(".bar"));
    assert_eq!(file.directory(), Some(dir.path()));
    assert_eq!(file.absolute_path(), Some(path.clone()));

    let reopened: TrackedFile<String> = TrackedFile::open(&path).expect("reopen");
    assert_eq!(reopened.get_data().map(String::as_str), Some("SOME BOGUS DATA"));
}

#[test]
fn created_dirs_when_configured() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deep").join("er").join("i.dat");
    let config = PersistenceConfig::default().with_missing_dirs_created(true);
    let mut file = TrackedFile::open_with_config(&path, config).expect("open");
    file.set_data(true);
    file.save().expect("save");
    assert!(path.exists());
}
