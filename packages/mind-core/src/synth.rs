//! Placeholder waveforms for when no usable recording exists.
//!
//! Each kind is a baseline plus a sum of sinusoids plus bounded uniform
//! noise from a seeded generator, so a given `(kind, duration, count, seed)`
//! always produces the same samples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const DEFAULT_NOISE_SEED: u64 = 0x4d49_4e44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Eeg,
    Ecg,
    ArterialPressure,
    HeartRate,
    SpO2,
    MeanArterialPressure,
}

/// `baseline + Σ amplitude·sin(2π·freq·t) + noise·U(-1, 1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformProfile {
    pub baseline: f64,
    pub components: &'static [(f64, f64)],
    pub noise: f64,
}

/// Slower, noisier EEG used for the RMS trend placeholder.
pub const EEG_TREND_PROFILE: WaveformProfile = WaveformProfile {
    baseline: 0.0,
    components: &[(1.0, 8.0)],
    noise: 0.3,
};

impl SignalKind {
    pub fn profile(&self) -> WaveformProfile {
        match self {
            SignalKind::Eeg => WaveformProfile {
                baseline: 0.0,
                components: &[(1.0, 10.0)],
                noise: 0.2,
            },
            SignalKind::Ecg => WaveformProfile {
                baseline: 0.0,
                components: &[(1.5, 1.3), (0.5, 10.0)],
                noise: 0.1,
            },
            SignalKind::ArterialPressure => WaveformProfile {
                baseline: 80.0,
                components: &[(20.0, 1.2)],
                noise: 5.0,
            },
            SignalKind::HeartRate => WaveformProfile {
                baseline: 70.0,
                components: &[(5.0, 1.0 / 30.0)],
                noise: 1.0,
            },
            SignalKind::SpO2 => WaveformProfile {
                baseline: 97.0,
                components: &[(0.5, 1.0 / 45.0)],
                noise: 0.3,
            },
            SignalKind::MeanArterialPressure => WaveformProfile {
                baseline: 90.0,
                components: &[(8.0, 1.0 / 40.0)],
                noise: 1.0,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Eeg => "EEG",
            SignalKind::Ecg => "ECG Lead II",
            SignalKind::ArterialPressure => "Arterial Blood Pressure",
            SignalKind::HeartRate => "Heart Rate",
            SignalKind::SpO2 => "SpO₂",
            SignalKind::MeanArterialPressure => "MAP",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SignalKind::Eeg => "μV",
            SignalKind::Ecg => "mV",
            SignalKind::ArterialPressure | SignalKind::MeanArterialPressure => "mmHg",
            SignalKind::HeartRate => "bpm",
            SignalKind::SpO2 => "%",
        }
    }

    fn seed_offset(&self) -> u64 {
        *self as u64
    }
}

/// `n` evenly spaced points over `[0, duration]`, both ends included.
pub fn linspace(duration: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| i as f64 * duration / (n - 1) as f64)
            .collect(),
    }
}

pub fn synthesize_profile(
    profile: WaveformProfile,
    duration_s: f64,
    sample_count: usize,
    seed: u64,
) -> (Vec<f64>, Vec<f64>) {
    let time = linspace(duration_s, sample_count);
    let mut rng = StdRng::seed_from_u64(seed);
    let values = time
        .iter()
        .map(|&t| {
            let signal: f64 = profile
                .components
                .iter()
                .map(|&(amplitude, freq)| amplitude * (2.0 * PI * freq * t).sin())
                .sum();
            profile.baseline + signal + profile.noise * rng.random_range(-1.0..=1.0)
        })
        .collect();
    (time, values)
}

pub fn synthesize_waveform_seeded(
    kind: SignalKind,
    duration_s: f64,
    sample_count: usize,
    seed: u64,
) -> (Vec<f64>, Vec<f64>) {
    synthesize_profile(
        kind.profile(),
        duration_s,
        sample_count,
        seed.wrapping_add(kind.seed_offset()),
    )
}

pub fn synthesize_waveform(kind: SignalKind, duration_s: f64, sample_count: usize) -> (Vec<f64>, Vec<f64>) {
    synthesize_waveform_seeded(kind, duration_s, sample_count, DEFAULT_NOISE_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_includes_endpoints() {
        assert_eq!(linspace(2.0, 5), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(linspace(2.0, 1), vec![0.0]);
        assert!(linspace(2.0, 0).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let a = synthesize_waveform(SignalKind::Ecg, 5.0, 1000);
        let b = synthesize_waveform(SignalKind::Ecg, 5.0, 1000);
        assert_eq!(a, b);
        let c = synthesize_waveform_seeded(SignalKind::Ecg, 5.0, 1000, 7);
        assert_ne!(a.1, c.1);
    }

    #[test]
    fn test_shape_and_bounds() {
        for kind in [
            SignalKind::Eeg,
            SignalKind::Ecg,
            SignalKind::ArterialPressure,
            SignalKind::HeartRate,
            SignalKind::SpO2,
            SignalKind::MeanArterialPressure,
        ] {
            let (time, values) = synthesize_waveform(kind, 60.0, 120);
            assert_eq!(time.len(), 120);
            assert_eq!(values.len(), 120);
            assert_eq!(time[0], 0.0);
            assert_eq!(*time.last().unwrap(), 60.0);

            let profile = kind.profile();
            let span: f64 = profile.components.iter().map(|(a, _)| a.abs()).sum::<f64>() + profile.noise;
            assert!(values
                .iter()
                .all(|v| (v - profile.baseline).abs() <= span + 1e-9));
        }
    }

    #[test]
    fn test_spo2_stays_physiological() {
        let (_, values) = synthesize_waveform(SignalKind::SpO2, 60.0, 120);
        assert!(values.iter().all(|&v| (96.0..=98.0).contains(&v)));
    }
}
