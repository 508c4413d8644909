use crate::error::{Result, SignalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sampling frequency assumed when a recording does not declare one.
pub const DEFAULT_SAMPLING_FREQ: f64 = 250.0;

/// A parsed recording: one shared time vector and a channel × sample matrix.
///
/// Immutable once constructed. `data[c].len() == time.len()` for every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    time: Vec<f64>,
    data: Vec<Vec<f64>>,
}

impl Recording {
    pub fn new(time: Vec<f64>, data: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((idx, row)) = data
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != time.len())
        {
            return Err(SignalError::Format(format!(
                "Channel {} has {} samples but the time vector has {}",
                idx,
                row.len(),
                time.len()
            )));
        }
        Ok(Self { time, data })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    pub fn sample_count(&self) -> usize {
        self.time.len()
    }
}

/// A value that either came from the recording or fell back to a default.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting<T> {
    Default(T),
    Explicit(T),
}

impl<T> Setting<T> {
    pub fn value(&self) -> &T {
        match self {
            Setting::Default(v) | Setting::Explicit(v) => v,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Setting::Explicit(_))
    }
}

/// Best-effort per-file metadata. Every field has a default.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingMetadata {
    pub channel_names: Setting<Vec<String>>,
    pub sampling_freq: Setting<f64>,
    pub initial_time: Option<String>,
}

impl RecordingMetadata {
    /// Metadata for a recording with `channel_count` channels and nothing declared.
    pub fn with_defaults(channel_count: usize) -> Self {
        Self {
            channel_names: Setting::Default(default_channel_names(channel_count)),
            sampling_freq: Setting::Default(DEFAULT_SAMPLING_FREQ),
            initial_time: None,
        }
    }

    pub fn sampling_freq(&self) -> f64 {
        *self.sampling_freq.value()
    }

    /// Name of channel `index`, generated as `Ch_{index + 1}` past the declared list.
    pub fn channel_name(&self, index: usize) -> String {
        self.channel_names
            .value()
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Ch_{}", index + 1))
    }

    /// Names for the first `count` channels.
    pub fn names_for(&self, count: usize) -> Vec<String> {
        (0..count).map(|i| self.channel_name(i)).collect()
    }
}

impl Default for RecordingMetadata {
    fn default() -> Self {
        Self::with_defaults(0)
    }
}

pub fn default_channel_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Ch_{}", i + 1)).collect()
}

/// Offset/duration pair describing the requested window, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowRequest {
    pub offset: f64,
    pub duration: f64,
}

impl WindowRequest {
    pub fn new(offset: f64, duration: f64) -> Self {
        Self { offset, duration }
    }
}

/// Where the samples of a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Recording,
    Synthetic,
    Empty,
}

/// One channel of a window; `time[0] == 0.0` unless empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWindow {
    pub name: String,
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    pub title: String,
    pub channel_names: Vec<String>,
    /// Channels with data in range only; empty channels are omitted.
    pub channels: Vec<ChannelWindow>,
    pub sampling_freq: f64,
    pub time_offset: f64,
    pub window_duration: f64,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WindowResult {
    pub fn empty(title: impl Into<String>, request: WindowRequest) -> Self {
        Self {
            title: title.into(),
            channel_names: Vec::new(),
            channels: Vec::new(),
            sampling_freq: DEFAULT_SAMPLING_FREQ,
            time_offset: request.offset,
            window_duration: request.duration,
            source: DataSource::Empty,
            error: None,
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelWindow> {
        self.channels.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramResult {
    pub channel_names: Vec<String>,
    pub frequencies: Vec<f64>,
    pub times: Vec<f64>,
    /// Channel name → `[frequency][time]` power in dB.
    pub spectrograms: BTreeMap<String, Vec<Vec<f64>>>,
    pub sampling_freq: f64,
    pub time_offset: f64,
    pub window_duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpectrogramResult {
    pub fn empty(sampling_freq: f64, request: WindowRequest) -> Self {
        Self {
            channel_names: Vec::new(),
            frequencies: Vec::new(),
            times: Vec::new(),
            spectrograms: BTreeMap::new(),
            sampling_freq,
            time_offset: request.offset,
            window_duration: request.duration,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub title: String,
    pub series: Vec<TrendSeries>,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrendResult {
    pub fn series(&self, name: &str) -> Option<&TrendSeries> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// A named time/value pair from a vitals container (row 0 = time, row 1 = value).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

/// Independently named vitals series, in container order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesCollection {
    pub series: Vec<NamedSeries>,
}

impl SeriesCollection {
    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_rejects_mismatched_rows() {
        let err = Recording::new(vec![1.0, 2.0, 3.0], vec![vec![0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, SignalError::Format(_)));
    }

    #[test]
    fn test_channel_name_generation() {
        let meta = RecordingMetadata {
            channel_names: Setting::Explicit(vec!["Fp1".to_string()]),
            ..RecordingMetadata::default()
        };
        assert_eq!(meta.channel_name(0), "Fp1");
        assert_eq!(meta.channel_name(1), "Ch_2");
        assert_eq!(meta.names_for(3), vec!["Fp1", "Ch_2", "Ch_3"]);
    }

    #[test]
    fn test_defaults() {
        let meta = RecordingMetadata::with_defaults(2);
        assert_eq!(meta.sampling_freq(), 250.0);
        assert!(!meta.sampling_freq.is_explicit());
        assert_eq!(meta.channel_names.value(), &vec!["Ch_1", "Ch_2"]);
    }

    #[test]
    fn test_window_result_serialization_skips_missing_error() {
        let result = WindowResult::empty("EEG", WindowRequest::new(0.0, 10.0));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["source"], "empty");
        assert_eq!(json["window_duration"], 10.0);
    }
}
