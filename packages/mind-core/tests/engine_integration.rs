use mind_core::{
    DataSource, EngineConfig, RecordingHandle, RecordingKey, RecordingKind, RecordingStore,
    SignalEngine, WindowRequest,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn engine() -> SignalEngine {
    SignalEngine::new(Arc::new(RecordingStore::new()), EngineConfig::default())
}

fn eeg_key() -> RecordingKey {
    RecordingKey::default_session(RecordingKind::Eeg)
}

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
    path
}

/// 2 channels, 100 Hz, 20 s, first 5 s padded with the zero-time sentinel.
/// Channel 0 holds the sample index, channel 1 its negation.
fn gapped_recording(dir: &Path) -> PathBuf {
    let time: Vec<f64> = (0..2000)
        .map(|i| if i < 500 { 0.0 } else { (i + 1) as f64 / 100.0 })
        .collect();
    let ch0: Vec<f64> = (0..2000).map(|i| i as f64).collect();
    let ch1: Vec<f64> = ch0.iter().map(|v| -v).collect();
    write_json(
        dir,
        "gapped.json",
        json!({
            "arrays": [
                {"name": "Time", "shape": [1, 2000], "values": time},
                {"name": "Data", "values": [ch0, ch1]}
            ],
            "attributes": {"SamplingFreq": 100.0, "ChannelNames": ["Cz", "Pz"]}
        }),
    )
}

#[test]
fn test_window_skips_zero_gap() {
    let dir = TempDir::new().unwrap();
    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(gapped_recording(dir.path())));

    let result = engine.get_window(&eeg_key(), WindowRequest::new(0.0, 10.0));
    assert!(result.error.is_none());
    assert_eq!(result.source, DataSource::Recording);
    assert_eq!(result.sampling_freq, 100.0);

    let cz = result.channel("Cz").unwrap();
    assert_eq!(cz.time[0], 0.0);
    assert!(*cz.time.last().unwrap() <= 10.0 + 1e-9);
    // First valid sample sits right after the 500-sample gap.
    assert_eq!(cz.values[0], 500.0);
    assert!(cz.values.iter().all(|&v| v >= 500.0));
    assert!((1000..=1001).contains(&cz.values.len()));

    let pz = result.channel("Pz").unwrap();
    assert_eq!(pz.time, cz.time);
    assert_eq!(pz.values[0], -500.0);
}

#[test]
fn test_short_recording_has_no_spectrograms() {
    let dir = TempDir::new().unwrap();
    let time: Vec<f64> = (1..=50).map(|i| i as f64 / 250.0).collect();
    let values: Vec<f64> = (0..50).map(|i| (i as f64).sin()).collect();
    let path = write_json(
        dir.path(),
        "short.json",
        json!({
            "arrays": [
                {"name": "Time", "values": time},
                {"name": "Data", "values": [values]}
            ]
        }),
    );

    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(path));
    let result = engine.get_spectrogram(&eeg_key(), engine.spectrogram_request(0.0));
    assert_eq!(result.sampling_freq, 250.0);
    assert!(result.spectrograms.is_empty());
    assert!(result.error.is_none());
    assert_eq!(result.channel_names, vec!["Ch_1"]);
}

#[test]
fn test_no_recording_gives_empty_window_with_default_duration() {
    let engine = engine();
    let request = engine.live_request(0.0);
    let result = engine.get_window(&eeg_key(), request);
    assert!(result.channels.is_empty());
    assert_eq!(result.window_duration, 10.0);
    assert!(result.error.is_none());

    let spectrogram = engine.get_spectrogram(&eeg_key(), engine.spectrogram_request(0.0));
    assert_eq!(spectrogram.window_duration, 30.0);
    assert!(spectrogram.spectrograms.is_empty());
}

#[test]
fn test_repeated_requests_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(gapped_recording(dir.path())));

    let request = WindowRequest::new(3.0, 4.0);
    let first = serde_json::to_vec(&engine.get_window(&eeg_key(), request)).unwrap();
    let second = serde_json::to_vec(&engine.get_window(&eeg_key(), request)).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_vec(&engine.get_spectrogram(&eeg_key(), request)).unwrap();
    let second = serde_json::to_vec(&engine.get_spectrogram(&eeg_key(), request)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_out_of_range_offsets() {
    let dir = TempDir::new().unwrap();
    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(gapped_recording(dir.path())));

    // Valid span is 5.01 ..= 20.0 s.
    for offset in [15.0, 30.0, 1e6] {
        let result = engine.get_window(&eeg_key(), WindowRequest::new(offset, 10.0));
        assert!(result.channels.is_empty(), "offset {}", offset);
        assert!(result.error.is_none());
    }

    for offset in [-0.5, -100.0] {
        let result = engine.get_window(&eeg_key(), WindowRequest::new(offset, 2.0));
        let cz = result.channel("Cz").unwrap();
        assert_eq!(cz.time[0], 0.0);
        assert!(cz.time.iter().all(|&t| t >= 0.0));
        assert_eq!(cz.values[0], 500.0);
    }
}

#[test]
fn test_spectrogram_over_gapped_recording() {
    let dir = TempDir::new().unwrap();
    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(gapped_recording(dir.path())));

    let result = engine.get_spectrogram(&eeg_key(), engine.spectrogram_request(0.0));
    assert!(result.error.is_none());
    assert_eq!(result.spectrograms.len(), 2);
    // fs = 100 → 100-sample segments, 51 one-sided bins.
    assert_eq!(result.frequencies.len(), 51);
    assert_eq!(result.frequencies[50], 50.0);
    assert!(result.times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_transposed_data_matrix() {
    let dir = TempDir::new().unwrap();
    let rows: Vec<Vec<f64>> = (1..=4).map(|i| vec![i as f64, 10.0 * i as f64]).collect();
    let path = write_json(
        dir.path(),
        "transposed.json",
        json!({
            "arrays": [
                {"name": "Time", "values": [0.1, 0.2, 0.3, 0.4]},
                {"name": "Data", "values": rows}
            ],
            "attributes": {"SamplingFreq": 10}
        }),
    );

    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(path));
    let result = engine.get_window(&eeg_key(), WindowRequest::new(0.0, 10.0));
    assert_eq!(result.channel_names, vec!["Ch_1", "Ch_2"]);
    assert_eq!(result.channel("Ch_1").unwrap().values, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(result.channel("Ch_2").unwrap().values, vec![10.0, 20.0, 30.0, 40.0]);
}

#[test]
fn test_unreadable_recording_reports_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recording.edf");
    std::fs::write(&path, b"not a supported container").unwrap();

    let engine = engine();
    engine.register(eeg_key(), RecordingHandle::File(path));

    let window = engine.get_window(&eeg_key(), WindowRequest::new(0.0, 10.0));
    assert!(window.channels.is_empty());
    assert!(window.error.unwrap().contains("Unsupported"));

    let trend = engine.get_trend(&eeg_key());
    assert_eq!(trend.source, DataSource::Synthetic);
    assert!(trend.error.is_some());
}

#[test]
fn test_vitals_collection_from_file() {
    let dir = TempDir::new().unwrap();
    let time: Vec<f64> = (1..=60).map(|i| i as f64).collect();
    let path = write_json(
        dir.path(),
        "numerics.json",
        json!({
            "arrays": [
                {"name": "HR", "values": [time.clone(), vec![72.0; 60]]},
                {"name": "MAP_mean", "values": [time.clone(), vec![88.0; 60]]},
                {"name": "Label", "values": [1.0, 2.0]}
            ]
        }),
    );

    let engine = engine();
    let key = RecordingKey::default_session(RecordingKind::Numerics);
    engine.register(key.clone(), RecordingHandle::File(path));

    let trend = engine.get_vitals_trend(&key);
    assert_eq!(trend.source, DataSource::Recording);
    let hr = trend.series("hr").unwrap();
    assert_eq!(hr.values.len(), 60);
    assert!(hr.values.iter().all(|&v| v == 72.0));
    assert!(trend.series("map").unwrap().values.iter().all(|&v| v == 88.0));
    // No SpO2 series in the file.
    assert_eq!(trend.series("spo2").unwrap().values.len(), 120);
}
