use crate::spectrogram::MAX_SEGMENT_LENGTH;
use crate::synth::DEFAULT_NOISE_SEED;
use crate::trend::DEFAULT_TREND_WINDOW;
use crate::validity::SentinelPolicy;
use serde::{Deserialize, Serialize};

/// 20 minutes at 250 Hz.
pub const DEFAULT_MAX_SYNTHETIC_SAMPLES: usize = 300_000;

/// Tunables for [`SignalEngine`](crate::engine::SignalEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sentinel: SentinelPolicy,
    /// Default live display window, seconds.
    pub live_window_s: f64,
    /// Default spectrogram window, seconds.
    pub spectrogram_window_s: f64,
    pub max_segment_length: usize,
    /// Samples per RMS trend window.
    pub trend_window: usize,
    /// Rate used when a placeholder waveform has to cover a requested duration.
    pub synthetic_sample_rate: f64,
    /// Upper bound on the length of one synthesized series.
    pub max_synthetic_samples: usize,
    pub noise_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentinel: SentinelPolicy::default(),
            live_window_s: 10.0,
            spectrogram_window_s: 30.0,
            max_segment_length: MAX_SEGMENT_LENGTH,
            trend_window: DEFAULT_TREND_WINDOW,
            synthetic_sample_rate: 250.0,
            max_synthetic_samples: DEFAULT_MAX_SYNTHETIC_SAMPLES,
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl EngineConfig {
    /// Sample count for a synthesized window of `duration_s` seconds,
    /// capped at `max_synthetic_samples`. Longer windows are spread over
    /// fewer samples.
    pub fn synthetic_samples(&self, duration_s: f64) -> usize {
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return 0;
        }
        let samples = (duration_s * self.synthetic_sample_rate).round();
        if samples >= self.max_synthetic_samples as f64 {
            return self.max_synthetic_samples;
        }
        samples as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"sentinel": "keep_all", "trend_window": 50}"#).unwrap();
        assert_eq!(config.sentinel, SentinelPolicy::KeepAll);
        assert_eq!(config.trend_window, 50);
        assert_eq!(config.live_window_s, 10.0);
        assert_eq!(config.spectrogram_window_s, 30.0);
        assert_eq!(config.max_segment_length, 256);
    }

    #[test]
    fn test_synthetic_samples() {
        let config = EngineConfig::default();
        assert_eq!(config.synthetic_samples(10.0), 2500);
        assert_eq!(config.synthetic_samples(-1.0), 0);
        assert_eq!(config.synthetic_samples(f64::NAN), 0);
    }

    #[test]
    fn test_synthetic_samples_capped_for_huge_durations() {
        let config = EngineConfig::default();
        assert_eq!(config.synthetic_samples(1e12), DEFAULT_MAX_SYNTHETIC_SAMPLES);
        assert_eq!(config.synthetic_samples(f64::MAX), DEFAULT_MAX_SYNTHETIC_SAMPLES);

        let small = EngineConfig {
            max_synthetic_samples: 100,
            ..EngineConfig::default()
        };
        assert_eq!(small.synthetic_samples(10.0), 100);
        assert_eq!(small.synthetic_samples(0.2), 50);
    }
}
