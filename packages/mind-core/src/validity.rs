//! Valid-sample selection.
//!
//! Recordings pad unrecorded stretches with a time value of exactly `0.0`.
//! Such samples are dropped from every channel before windowing. A genuine
//! first sample at `t = 0` is indistinguishable from padding and is dropped
//! too under [`SentinelPolicy::ZeroIsInvalid`].

use crate::types::Recording;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelPolicy {
    /// `time == 0.0` marks an invalid sample.
    #[default]
    ZeroIsInvalid,
    /// Every sample is valid.
    KeepAll,
}

impl SentinelPolicy {
    pub fn is_valid(&self, t: f64) -> bool {
        match self {
            SentinelPolicy::ZeroIsInvalid => t != 0.0,
            SentinelPolicy::KeepAll => true,
        }
    }
}

/// Indices of valid samples, ascending.
pub fn valid_mask(time: &[f64], policy: SentinelPolicy) -> Vec<usize> {
    time.iter()
        .enumerate()
        .filter(|(_, &t)| policy.is_valid(t))
        .map(|(i, _)| i)
        .collect()
}

/// Valid time axis plus the same samples from every channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidView {
    pub time: Vec<f64>,
    pub data: Vec<Vec<f64>>,
}

impl ValidView {
    /// Fewer than two valid samples: no window can be computed.
    pub fn is_empty(&self) -> bool {
        self.time.len() < 2
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }
}

/// Apply one mask to the time axis and every channel row.
///
/// Returns an empty view when fewer than two samples survive.
pub fn valid_view(time: &[f64], data: &[Vec<f64>], policy: SentinelPolicy) -> ValidView {
    let mask = valid_mask(time, policy);
    if mask.len() < 2 {
        return ValidView::default();
    }
    ValidView {
        time: mask.iter().map(|&i| time[i]).collect(),
        data: data
            .iter()
            .map(|row| mask.iter().map(|&i| row[i]).collect())
            .collect(),
    }
}

pub fn valid_recording_view(recording: &Recording, policy: SentinelPolicy) -> ValidView {
    valid_view(recording.time(), recording.data(), policy)
}

/// Single-series variant used for vitals.
pub fn valid_series(time: &[f64], values: &[f64], policy: SentinelPolicy) -> (Vec<f64>, Vec<f64>) {
    let n = time.len().min(values.len());
    let mask = valid_mask(&time[..n], policy);
    if mask.len() < 2 {
        return (Vec::new(), Vec::new());
    }
    (
        mask.iter().map(|&i| time[i]).collect(),
        mask.iter().map(|&i| values[i]).collect(),
    )
}
