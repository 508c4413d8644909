//! Window extraction over a valid (sentinel-free, ascending) time axis.

use crate::types::WindowRequest;

/// Absolute `[start, end]` interval of a window, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowBounds {
    pub start: f64,
    pub end: f64,
}

impl WindowBounds {
    /// Clamp the request against the first/last valid sample.
    ///
    /// Negative offsets start at the recording start. Offsets past the end
    /// yield `start > end`, which selects nothing.
    pub fn compute(time_valid: &[f64], request: WindowRequest) -> Option<Self> {
        let (&first, &last) = (time_valid.first()?, time_valid.last()?);
        let start = first.max(first + request.offset);
        let end = last.min(start + request.duration);
        Some(Self { start, end })
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Indices of samples inside the window.
    pub fn select(&self, time_valid: &[f64]) -> Vec<usize> {
        time_valid
            .iter()
            .enumerate()
            .filter(|(_, &t)| self.contains(t))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Rebased time axis plus the selected values of one series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Windowed {
    pub relative_time: Vec<f64>,
    pub values: Vec<f64>,
}

impl Windowed {
    pub fn is_empty(&self) -> bool {
        self.relative_time.is_empty()
    }
}

/// Select samples of one series inside `bounds`, rebasing time to the window start.
pub fn extract_with_bounds(time_valid: &[f64], values_valid: &[f64], bounds: WindowBounds) -> Windowed {
    let indices: Vec<usize> = bounds
        .select(time_valid)
        .into_iter()
        .filter(|&i| i < values_valid.len())
        .collect();
    Windowed {
        relative_time: indices.iter().map(|&i| time_valid[i] - bounds.start).collect(),
        values: indices.iter().map(|&i| values_valid[i]).collect(),
    }
}

/// Single-series extraction: compute bounds, select, rebase.
pub fn extract(time_valid: &[f64], values_valid: &[f64], request: WindowRequest) -> Windowed {
    match WindowBounds::compute(time_valid, request) {
        Some(bounds) => extract_with_bounds(time_valid, values_valid, bounds),
        None => Windowed::default(),
    }
}

/// Multi-channel extraction with one shared window so channels stay aligned.
///
/// The sample selection is computed once and applied to each channel.
pub fn extract_channels(
    time_valid: &[f64],
    data_valid: &[Vec<f64>],
    request: WindowRequest,
) -> (Vec<f64>, Vec<Vec<f64>>) {
    let Some(bounds) = WindowBounds::compute(time_valid, request) else {
        return (Vec::new(), Vec::new());
    };
    let indices = bounds.select(time_valid);
    if indices.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let relative_time = indices.iter().map(|&i| time_valid[i] - bounds.start).collect();
    let channels = data_valid
        .iter()
        .map(|row| indices.iter().map(|&i| row[i]).collect())
        .collect();
    (relative_time, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> Vec<f64> {
        (1..=100).map(|i| i as f64 * 0.125).collect() // 0.125 ..= 12.5
    }

    #[test]
    fn test_window_rebases_to_zero() {
        let time = axis();
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let w = extract(&time, &values, WindowRequest::new(2.0, 3.0));
        assert_eq!(w.relative_time[0], 0.0);
        assert_eq!(w.values[0], 16.0); // t = 2.125
        assert!(w.relative_time.iter().all(|&t| (0.0..=3.0 + 1e-9).contains(&t)));
    }

    #[test]
    fn test_negative_offset_clamps_to_start() {
        let time = axis();
        let values = vec![1.0; 100];
        let w = extract(&time, &values, WindowRequest::new(-50.0, 1.0));
        assert_eq!(w.relative_time[0], 0.0);
        assert!(w.relative_time.iter().all(|&t| t >= 0.0));
        assert_eq!(w.values.len(), 9); // 0.125 ..= 1.125
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let time = axis();
        let values = vec![1.0; 100];
        let recording_duration = time[99] - time[0];
        for offset in [recording_duration + 0.01, 20.0, 1e9] {
            assert!(extract(&time, &values, WindowRequest::new(offset, 5.0)).is_empty());
        }
    }

    #[test]
    fn test_end_clamps_to_last_sample() {
        let time = axis();
        let values = vec![1.0; 100];
        let w = extract(&time, &values, WindowRequest::new(8.0, 100.0));
        let last = *w.relative_time.last().unwrap();
        assert_eq!(last, 12.5 - 8.125);
    }

    #[test]
    fn test_empty_axis() {
        assert!(extract(&[], &[], WindowRequest::new(0.0, 1.0)).is_empty());
        assert!(WindowBounds::compute(&[], WindowRequest::new(0.0, 1.0)).is_none());
    }

    #[test]
    fn test_inclusive_bounds() {
        let bounds = WindowBounds { start: 1.0, end: 2.0 };
        assert_eq!(bounds.select(&[0.5, 1.0, 1.5, 2.0, 2.5]), vec![1, 2, 3]);
    }

    #[test]
    fn test_channels_share_bounds() {
        let time = axis();
        let data = vec![
            (0..100).map(|i| i as f64).collect::<Vec<_>>(),
            (0..100).map(|i| -(i as f64)).collect::<Vec<_>>(),
        ];
        let (t, channels) = extract_channels(&time, &data, WindowRequest::new(1.0, 2.0));
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].len(), t.len());
        assert_eq!(channels[1].len(), t.len());
        assert_eq!(channels[0][0], -channels[1][0]);
    }
}
