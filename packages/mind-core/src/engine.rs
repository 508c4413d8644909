//! Request-level operations bound to a [`RecordingStore`].
//!
//! Every call dereferences the registered handle and parses the recording
//! from scratch; nothing parsed outlives the call. Results are always well
//! formed: a missing recording yields an empty or synthesized result and a
//! broken one reports its failure in `error`.

use crate::config::EngineConfig;
use crate::error::{Result, SignalError};
use crate::readers::{self, RecordingHandle, RecordingSource};
use crate::roles::{find_series, NUMERIC_ROLES, WAVEFORM_ROLES};
use crate::spectrogram::build_all_channel_spectrograms;
use crate::store::{RecordingKey, RecordingStore};
use crate::synth::{synthesize_profile, synthesize_waveform_seeded, SignalKind, EEG_TREND_PROFILE};
use crate::trend::rms_trend;
use crate::types::{
    ChannelWindow, DataSource, Recording, RecordingMetadata, SeriesCollection, SpectrogramResult,
    TrendResult, TrendSeries, WindowRequest, WindowResult, DEFAULT_SAMPLING_FREQ,
};
use crate::validity::{valid_recording_view, valid_series, SentinelPolicy};
use crate::window::{extract, extract_channels};
use std::sync::Arc;

pub const EEG_TREND_DURATION_S: f64 = 60.0;
pub const EEG_TREND_SAMPLES: usize = 3000;
pub const VITALS_TREND_DURATION_S: f64 = 60.0;
pub const VITALS_TREND_SAMPLES: usize = 120;

const WINDOW_TITLE: &str = "EEG Window";
const LIVE_TITLE: &str = "EEG Live Signal";
const TREND_TITLE: &str = "EEG Trend Signal";
const VITALS_LIVE_TITLE: &str = "Vitals Live Waveforms";
const VITALS_TREND_TITLE: &str = "Vitals Trend";

fn simulated(title: &str) -> String {
    format!("{} (Simulated)", title)
}

pub struct SignalEngine {
    store: Arc<RecordingStore>,
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(store: Arc<RecordingStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<RecordingStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live request at `offset` with the configured default duration.
    pub fn live_request(&self, offset: f64) -> WindowRequest {
        WindowRequest::new(offset, self.config.live_window_s)
    }

    /// Spectrogram request at `offset` with the configured default duration.
    pub fn spectrogram_request(&self, offset: f64) -> WindowRequest {
        WindowRequest::new(offset, self.config.spectrogram_window_s)
    }

    pub fn register(&self, key: RecordingKey, handle: RecordingHandle) -> Option<RecordingHandle> {
        self.store.register(key, handle)
    }

    /// Release the recording under `key`, returning its handle.
    pub fn clear(&self, key: &RecordingKey) -> Option<RecordingHandle> {
        self.store.clear(key)
    }

    /// Release every recording of `session`, returning the handles.
    pub fn clear_session(&self, session: &str) -> Vec<RecordingHandle> {
        self.store.clear_session(session)
    }

    fn open(&self, key: &RecordingKey) -> Result<Box<dyn RecordingSource>> {
        let handle = self
            .store
            .get(key)
            .ok_or_else(|| SignalError::MissingRecording(key.to_string()))?;
        handle.open()
    }

    /// Parse the multi-channel recording under `key` with its metadata.
    pub fn load_recording(&self, key: &RecordingKey) -> Result<(Recording, RecordingMetadata)> {
        let source = self.open(key)?;
        let recording = readers::parse(source.as_ref())?;
        let metadata = readers::read_metadata(source.as_ref());
        log::debug!(
            "Parsed {} recording ({}): {} channels × {} samples",
            key,
            source.format_name(),
            recording.channel_count(),
            recording.sample_count()
        );
        Ok((recording, metadata))
    }

    /// Parse the vitals collection under `key` with its metadata.
    pub fn load_collection(&self, key: &RecordingKey) -> Result<(SeriesCollection, RecordingMetadata)> {
        let source = self.open(key)?;
        let collection = readers::parse_collection(source.as_ref())?;
        let metadata = readers::read_metadata(source.as_ref());
        log::debug!("Parsed {} collection: {:?}", key, collection.names());
        Ok((collection, metadata))
    }

    /// Windowed channels of the recording under `key`.
    ///
    /// Nothing registered gives an empty result; a parse failure gives an
    /// empty result carrying the error message.
    pub fn get_window(&self, key: &RecordingKey, request: WindowRequest) -> WindowResult {
        match self.load_recording(key) {
            Ok((recording, metadata)) => {
                window_recording(&recording, &metadata, request, self.config.sentinel, WINDOW_TITLE)
            }
            Err(e) if e.is_missing() => WindowResult::empty(WINDOW_TITLE, request),
            Err(e) => {
                log::warn!("Failed to read {} recording: {}", key, e);
                WindowResult::empty(WINDOW_TITLE, request).with_error(e.to_string())
            }
        }
    }

    /// Like [`get_window`](Self::get_window), but substitutes a synthesized
    /// EEG channel when the recording is missing or unreadable.
    pub fn get_live(&self, key: &RecordingKey, request: WindowRequest) -> WindowResult {
        match self.load_recording(key) {
            Ok((recording, metadata)) => {
                window_recording(&recording, &metadata, request, self.config.sentinel, LIVE_TITLE)
            }
            Err(e) => {
                let fallback = self.synthetic_eeg_window(request);
                if e.is_missing() {
                    fallback
                } else {
                    log::warn!("Failed to read {} recording, using placeholder: {}", key, e);
                    fallback.with_error(e.to_string())
                }
            }
        }
    }

    fn synthetic_eeg_window(&self, request: WindowRequest) -> WindowResult {
        let kind = SignalKind::Eeg;
        let (time, values) = self.synthesize(kind, request.duration);
        WindowResult {
            title: simulated(LIVE_TITLE),
            channel_names: vec![kind.label().to_string()],
            channels: vec![ChannelWindow {
                name: kind.label().to_string(),
                time,
                values,
            }],
            sampling_freq: self.config.synthetic_sample_rate,
            time_offset: request.offset,
            window_duration: request.duration,
            source: DataSource::Synthetic,
            error: None,
        }
    }

    fn synthesize(&self, kind: SignalKind, duration_s: f64) -> (Vec<f64>, Vec<f64>) {
        synthesize_waveform_seeded(
            kind,
            duration_s,
            self.config.synthetic_samples(duration_s),
            self.config.noise_seed,
        )
    }

    pub fn get_spectrogram(&self, key: &RecordingKey, request: WindowRequest) -> SpectrogramResult {
        match self.load_recording(key) {
            Ok((recording, metadata)) => build_all_channel_spectrograms(
                &recording,
                &metadata,
                request,
                self.config.sentinel,
                self.config.max_segment_length,
            ),
            Err(e) if e.is_missing() => SpectrogramResult::empty(DEFAULT_SAMPLING_FREQ, request),
            Err(e) => {
                log::warn!("Failed to read {} recording for spectrogram: {}", key, e);
                let mut result = SpectrogramResult::empty(DEFAULT_SAMPLING_FREQ, request);
                result.error = Some(e.to_string());
                result
            }
        }
    }

    /// Rolling RMS across all channels of the recording under `key`.
    pub fn get_trend(&self, key: &RecordingKey) -> TrendResult {
        match self.load_recording(key) {
            Ok((recording, _)) => self.recording_trend(&recording),
            Err(e) => {
                let mut fallback = self.synthetic_eeg_trend();
                if !e.is_missing() {
                    log::warn!("Failed to read {} recording, using placeholder trend: {}", key, e);
                    fallback.error = Some(e.to_string());
                }
                fallback
            }
        }
    }

    fn recording_trend(&self, recording: &Recording) -> TrendResult {
        let mut result = TrendResult {
            title: TREND_TITLE.to_string(),
            series: Vec::new(),
            source: DataSource::Recording,
            error: None,
        };

        let view = valid_recording_view(recording, self.config.sentinel);
        if view.is_empty() || view.data.is_empty() {
            return result;
        }
        let combined = channel_rms(&view.data);
        let time = rebase(&view.time);
        match rms_trend(&time, &combined, self.config.trend_window) {
            Ok((time, values)) => result.series.push(rms_series(time, values)),
            Err(SignalError::InsufficientData(msg)) => log::debug!("No trend: {}", msg),
            Err(e) => result.error = Some(e.to_string()),
        }
        result
    }

    fn synthetic_eeg_trend(&self) -> TrendResult {
        let (time, values) = synthesize_profile(
            EEG_TREND_PROFILE,
            EEG_TREND_DURATION_S,
            EEG_TREND_SAMPLES,
            self.config.noise_seed,
        );
        let (series, error) = match rms_trend(&time, &values, self.config.trend_window) {
            Ok((time, values)) => (vec![rms_series(time, values)], None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        TrendResult {
            title: simulated(TREND_TITLE),
            series,
            source: DataSource::Synthetic,
            error,
        }
    }

    /// ECG and ABP windows, plus Pleth and Respiration when present.
    ///
    /// ECG and ABP are synthesized over the requested duration when the
    /// collection has no series for them.
    pub fn get_vitals_live(&self, key: &RecordingKey, request: WindowRequest) -> WindowResult {
        let (collection, sampling_freq, error) = self.collection_or_default(key);

        let mut result = WindowResult::empty(VITALS_LIVE_TITLE, request);
        result.sampling_freq = sampling_freq;
        result.error = error;

        let mut real = 0usize;
        let mut synthetic = 0usize;
        for &role in WAVEFORM_ROLES {
            let name = role.key().to_string();
            if let Some(series) = find_series(&collection, role) {
                let (time, values) = valid_series(&series.time, &series.values, self.config.sentinel);
                let windowed = extract(&time, &values, request);
                result.channel_names.push(name.clone());
                real += 1;
                if !windowed.is_empty() {
                    result.channels.push(ChannelWindow {
                        name,
                        time: windowed.relative_time,
                        values: windowed.values,
                    });
                }
            } else if let Some(kind) = role.fallback() {
                let (time, values) = self.synthesize(kind, request.duration);
                result.channel_names.push(name.clone());
                result.channels.push(ChannelWindow { name, time, values });
                synthetic += 1;
            }
        }

        result.source = mixed_source(real, synthetic);
        if result.source == DataSource::Synthetic {
            result.title = simulated(VITALS_LIVE_TITLE);
            result.sampling_freq = self.config.synthetic_sample_rate;
        }
        result
    }

    /// HR, SpO₂ and MAP series; each missing one is synthesized.
    pub fn get_vitals_trend(&self, key: &RecordingKey) -> TrendResult {
        let (collection, _, error) = self.collection_or_default(key);

        let mut series = Vec::new();
        let mut real = 0usize;
        let mut synthetic = 0usize;
        for &role in NUMERIC_ROLES {
            let (time, values) = match find_series(&collection, role) {
                Some(found) => {
                    real += 1;
                    let (time, values) = valid_series(&found.time, &found.values, self.config.sentinel);
                    (rebase(&time), values)
                }
                None => {
                    let Some(kind) = role.fallback() else {
                        continue;
                    };
                    synthetic += 1;
                    synthesize_waveform_seeded(
                        kind,
                        VITALS_TREND_DURATION_S,
                        VITALS_TREND_SAMPLES,
                        self.config.noise_seed,
                    )
                }
            };
            if time.is_empty() {
                continue;
            }
            series.push(TrendSeries {
                name: role.key().to_string(),
                label: role.label().to_string(),
                unit: role.unit().to_string(),
                time,
                values,
            });
        }

        let source = mixed_source(real, synthetic);
        TrendResult {
            title: if source == DataSource::Synthetic {
                simulated(VITALS_TREND_TITLE)
            } else {
                VITALS_TREND_TITLE.to_string()
            },
            series,
            source,
            error,
        }
    }

    /// The collection under `key`, or an empty one when it is missing or
    /// unreadable (with the error message in the latter case).
    fn collection_or_default(&self, key: &RecordingKey) -> (SeriesCollection, f64, Option<String>) {
        match self.load_collection(key) {
            Ok((collection, metadata)) => (collection, metadata.sampling_freq(), None),
            Err(e) if e.is_missing() => (SeriesCollection::default(), DEFAULT_SAMPLING_FREQ, None),
            Err(e) => {
                log::warn!("Failed to read {} collection, using placeholders: {}", key, e);
                (SeriesCollection::default(), DEFAULT_SAMPLING_FREQ, Some(e.to_string()))
            }
        }
    }
}

/// Window every channel of `recording` against one shared interval.
///
/// Channels with no samples in range are left out of `channels` but keep
/// their entry in `channel_names`.
pub fn window_recording(
    recording: &Recording,
    metadata: &RecordingMetadata,
    request: WindowRequest,
    policy: SentinelPolicy,
    title: &str,
) -> WindowResult {
    let mut result = WindowResult::empty(title, request);
    result.channel_names = metadata.names_for(recording.channel_count());
    result.sampling_freq = metadata.sampling_freq();
    result.source = DataSource::Recording;

    let view = valid_recording_view(recording, policy);
    if view.is_empty() {
        return result;
    }
    let (relative_time, channels) = extract_channels(&view.time, &view.data, request);
    if relative_time.is_empty() {
        return result;
    }

    result.channels = channels
        .into_iter()
        .zip(&result.channel_names)
        .filter(|(values, _)| !values.is_empty())
        .map(|(values, name)| ChannelWindow {
            name: name.clone(),
            time: relative_time.clone(),
            values,
        })
        .collect();
    result
}

/// Per-sample RMS across channels, so a single rolling RMS covers all of them.
fn channel_rms(data: &[Vec<f64>]) -> Vec<f64> {
    let n = data.iter().map(|row| row.len()).min().unwrap_or(0);
    let channels = data.len() as f64;
    (0..n)
        .map(|i| (data.iter().map(|row| row[i] * row[i]).sum::<f64>() / channels).sqrt())
        .collect()
}

fn rebase(time: &[f64]) -> Vec<f64> {
    match time.first() {
        Some(&t0) => time.iter().map(|t| t - t0).collect(),
        None => Vec::new(),
    }
}

fn rms_series(time: Vec<f64>, values: Vec<f64>) -> TrendSeries {
    TrendSeries {
        name: "eeg_rms".to_string(),
        label: "RMS Amplitude".to_string(),
        unit: SignalKind::Eeg.unit().to_string(),
        time,
        values,
    }
}

fn mixed_source(real: usize, synthetic: usize) -> DataSource {
    match (real, synthetic) {
        (0, 0) => DataSource::Empty,
        (0, _) => DataSource::Synthetic,
        _ => DataSource::Recording,
    }
}
