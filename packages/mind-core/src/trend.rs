//! Rolling RMS trend over a single channel.

use crate::error::{Result, SignalError};

/// Default number of samples in the RMS window.
pub const DEFAULT_TREND_WINDOW: usize = 200;

/// `sqrt(mean(x²))` over every full window of `window` samples.
///
/// Only fully covered positions are produced, so the output has
/// `len - window + 1` points. Uses a running sum of squares.
pub fn rolling_rms(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(SignalError::InvalidData("RMS window must be positive".to_string()));
    }
    if values.len() < window {
        return Err(SignalError::InsufficientData(format!(
            "{} samples < RMS window {}",
            values.len(),
            window
        )));
    }

    let squares: Vec<f64> = values.iter().map(|v| v * v).collect();
    let mut sum: f64 = squares[..window].iter().sum();
    let mut out = Vec::with_capacity(values.len() - window + 1);
    out.push((sum / window as f64).max(0.0).sqrt());
    for i in window..squares.len() {
        sum += squares[i] - squares[i - window];
        out.push((sum / window as f64).max(0.0).sqrt());
    }
    Ok(out)
}

/// Trend values paired with the leading time stamps (time truncated to the trend length).
pub fn rms_trend(time: &[f64], values: &[f64], window: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let trend = rolling_rms(values, window)?;
    let time = time.iter().take(trend.len()).copied().collect();
    Ok((time, trend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_signal() {
        let rms = rolling_rms(&[3.0; 10], 4).unwrap();
        assert_eq!(rms.len(), 7);
        assert!(rms.iter().all(|v| (v - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_matches_direct_computation() {
        let values: Vec<f64> = (0..50).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
        let rms = rolling_rms(&values, 5).unwrap();
        for (i, r) in rms.iter().enumerate() {
            let direct = (values[i..i + 5].iter().map(|v| v * v).sum::<f64>() / 5.0).sqrt();
            assert!((r - direct).abs() < 1e-9);
        }
    }

    #[test]
    fn test_time_truncated_to_trend_length() {
        let time: Vec<f64> = (0..3000).map(|i| i as f64 * 0.02).collect();
        let values = vec![1.0; 3000];
        let (t, v) = rms_trend(&time, &values, DEFAULT_TREND_WINDOW).unwrap();
        assert_eq!(v.len(), 2801);
        assert_eq!(t.len(), 2801);
        assert_eq!(t[0], 0.0);
    }

    #[test]
    fn test_short_input() {
        assert!(matches!(
            rolling_rms(&[1.0, 2.0], 5),
            Err(SignalError::InsufficientData(_))
        ));
        assert!(matches!(rolling_rms(&[1.0], 0), Err(SignalError::InvalidData(_))));
    }
}
