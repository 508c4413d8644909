//! Short-time Fourier spectrograms.
//!
//! Matches the conventions of a one-sided PSD spectrogram: periodic Tukey
//! window (alpha = 0.25), per-segment mean removal, density scaling
//! `1 / (fs * Σw²)` and doubled non-DC/non-Nyquist bins. Segment times are
//! segment centres relative to the window start.

use crate::error::{Result, SignalError};
use crate::types::{Recording, RecordingMetadata, SpectrogramResult, WindowRequest};
use crate::validity::{valid_recording_view, SentinelPolicy};
use crate::window::extract_channels;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

pub const MAX_SEGMENT_LENGTH: usize = 256;

/// Added to the PSD before taking the log so exact zeros map to -100 dB.
pub const POWER_EPSILON: f64 = 1e-10;

const TUKEY_ALPHA: f64 = 0.25;

/// Segment length and overlap, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StftParams {
    pub segment_length: usize,
    pub overlap: usize,
}

impl StftParams {
    /// `segment_length = min(256, floor(fs))`, `overlap = segment_length / 2`.
    pub fn for_sampling_freq(sampling_freq: f64) -> Self {
        Self::with_max_segment(sampling_freq, MAX_SEGMENT_LENGTH)
    }

    pub fn with_max_segment(sampling_freq: f64, max_segment_length: usize) -> Self {
        let floor = if sampling_freq.is_finite() && sampling_freq > 0.0 {
            sampling_freq.floor() as usize
        } else {
            0
        };
        let segment_length = floor.min(max_segment_length);
        Self {
            segment_length,
            overlap: segment_length / 2,
        }
    }

    pub fn step(&self) -> usize {
        self.segment_length - self.overlap
    }

    /// Number of full segments in `n` samples.
    pub fn segment_count(&self, n: usize) -> usize {
        if self.segment_length == 0 || n < self.segment_length {
            return 0;
        }
        (n - self.overlap) / self.step()
    }
}

/// Frequency axis, time axis and `[frequency][time]` power in dB for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpectrogram {
    pub frequencies: Vec<f64>,
    pub times: Vec<f64>,
    pub power_db: Vec<Vec<f64>>,
}

/// Planned STFT, reusable across channels sharing a sampling rate.
pub struct Stft {
    params: StftParams,
    sampling_freq: f64,
    window: Vec<f64>,
    scale: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl Stft {
    pub fn new(sampling_freq: f64, params: StftParams) -> Result<Self> {
        if params.segment_length == 0 || params.overlap >= params.segment_length {
            return Err(SignalError::InvalidData(format!(
                "Invalid STFT parameters: segment length {}, overlap {}",
                params.segment_length, params.overlap
            )));
        }
        let window = tukey_periodic(params.segment_length, TUKEY_ALPHA);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let fft = FftPlanner::<f64>::new().plan_fft_forward(params.segment_length);
        Ok(Self {
            params,
            sampling_freq,
            window,
            scale: 1.0 / (sampling_freq * window_power),
            fft,
        })
    }

    pub fn params(&self) -> StftParams {
        self.params
    }

    /// `k * fs / segment_length` for `k = 0..=segment_length / 2`.
    pub fn frequencies(&self) -> Vec<f64> {
        let n = self.params.segment_length;
        (0..=n / 2)
            .map(|k| k as f64 * self.sampling_freq / n as f64)
            .collect()
    }

    /// Segment centres, in seconds from the first sample.
    pub fn times(&self, sample_count: usize) -> Vec<f64> {
        let half = self.params.segment_length as f64 / 2.0;
        let step = self.params.step();
        (0..self.params.segment_count(sample_count))
            .map(|k| (half + (k * step) as f64) / self.sampling_freq)
            .collect()
    }

    /// Log-power surface, `[frequency][time]`.
    pub fn power_db(&self, samples: &[f64]) -> Result<Vec<Vec<f64>>> {
        if samples.iter().any(|v| !v.is_finite()) {
            return Err(SignalError::InvalidData(
                "samples contain NaN or infinite values".to_string(),
            ));
        }

        let n = self.params.segment_length;
        let step = self.params.step();
        let segments = self.params.segment_count(samples.len());
        let bins = n / 2 + 1;
        let mut power = vec![Vec::with_capacity(segments); bins];
        let mut buffer = vec![Complex::new(0.0, 0.0); n];

        for seg in 0..segments {
            let chunk = &samples[seg * step..seg * step + n];
            let mean = chunk.iter().sum::<f64>() / n as f64;
            for (slot, (&x, &w)) in buffer.iter_mut().zip(chunk.iter().zip(&self.window)) {
                *slot = Complex::new((x - mean) * w, 0.0);
            }

            self.fft.process(&mut buffer);

            for (k, row) in power.iter_mut().enumerate() {
                let mut psd = buffer[k].norm_sqr() * self.scale;
                if is_doubled_bin(k, n) {
                    psd *= 2.0;
                }
                row.push(10.0 * (psd + POWER_EPSILON).log10());
            }
        }

        Ok(power)
    }
}

/// One-sided spectra double every bin except DC and, for even lengths, Nyquist.
fn is_doubled_bin(k: usize, n: usize) -> bool {
    if k == 0 {
        return false;
    }
    !(n % 2 == 0 && k == n / 2)
}

/// Periodic Tukey window of length `n`.
pub fn tukey_periodic(n: usize, alpha: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let mut w = tukey_symmetric(n + 1, alpha);
    w.truncate(n);
    w
}

fn tukey_symmetric(m: usize, alpha: f64) -> Vec<f64> {
    if m <= 1 {
        return vec![1.0; m];
    }
    if alpha <= 0.0 {
        return vec![1.0; m];
    }
    let denom = (m - 1) as f64;
    if alpha >= 1.0 {
        return (0..m)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
            .collect();
    }

    let width = (alpha * denom / 2.0).floor() as usize;
    (0..m)
        .map(|i| {
            let x = i as f64;
            if i <= width {
                0.5 * (1.0 + (PI * (-1.0 + 2.0 * x / alpha / denom)).cos())
            } else if i < m - width - 1 {
                1.0
            } else {
                0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * x / alpha / denom)).cos())
            }
        })
        .collect()
}

/// Spectrogram of one channel.
pub fn spectrogram(
    samples: &[f64],
    sampling_freq: f64,
    segment_length: usize,
    overlap: usize,
) -> Result<ChannelSpectrogram> {
    let params = StftParams {
        segment_length,
        overlap,
    };
    if samples.len() < segment_length {
        return Err(SignalError::InsufficientData(format!(
            "{} samples is shorter than one {}-sample segment",
            samples.len(),
            segment_length
        )));
    }
    let stft = Stft::new(sampling_freq, params)?;
    Ok(ChannelSpectrogram {
        frequencies: stft.frequencies(),
        times: stft.times(samples.len()),
        power_db: stft.power_db(samples)?,
    })
}

/// Window every channel with one shared interval and compute its spectrogram.
///
/// Channels shorter than one segment are left out. The first failing channel
/// stops the batch; channels already computed stay in the result and the
/// failure is reported in `error`.
pub fn build_all_channel_spectrograms(
    recording: &Recording,
    metadata: &RecordingMetadata,
    request: WindowRequest,
    policy: SentinelPolicy,
    max_segment_length: usize,
) -> SpectrogramResult {
    let sampling_freq = metadata.sampling_freq();
    let mut result = SpectrogramResult::empty(sampling_freq, request);
    result.channel_names = metadata.names_for(recording.channel_count());

    let view = valid_recording_view(recording, policy);
    if view.is_empty() {
        log::debug!("Recording has fewer than two valid samples; no spectrogram");
        return result;
    }

    let (relative_time, channels) = extract_channels(&view.time, &view.data, request);
    if relative_time.is_empty() {
        return result;
    }

    let params = StftParams::with_max_segment(sampling_freq, max_segment_length);
    let stft = match Stft::new(sampling_freq, params) {
        Ok(stft) => stft,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    let computed: Vec<Option<Result<Vec<Vec<f64>>>>> = channels
        .par_iter()
        .map(|samples| {
            if samples.len() < params.segment_length {
                None
            } else {
                Some(stft.power_db(samples))
            }
        })
        .collect();

    for (idx, outcome) in computed.into_iter().enumerate() {
        let name = metadata.channel_name(idx);
        match outcome {
            None => log::debug!(
                "Skipping channel {}: {} samples < segment length {}",
                name,
                channels[idx].len(),
                params.segment_length
            ),
            Some(Ok(power_db)) => {
                if result.frequencies.is_empty() {
                    result.frequencies = stft.frequencies();
                    result.times = stft.times(channels[idx].len());
                }
                result.spectrograms.insert(name, power_db);
            }
            Some(Err(e)) => {
                log::warn!("Spectrogram failed for channel {}: {}", name, e);
                result.error = Some(format!("Channel {}: {}", name, e));
                break;
            }
        }
    }

    result
}
