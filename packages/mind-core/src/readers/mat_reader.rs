/// MATLAB Recording Reader
///
/// Reads level-5 `.mat` files. Each MATLAB variable is a named array; the
/// metadata attributes (`ChannelNames`, `SamplingFreq`, ...) are stored as
/// variables with those names. MATLAB stores matrices column-major, so values
/// are reordered to row-major on the way out.
///
/// Text is expected as uint8/int8/uint16 arrays (what `uint8('Fp1')` produces);
/// a multi-row text array yields one string per row.
use super::{ArrayData, AttributeValue, RecordingSource};
use crate::error::{Result, SignalError};
use matfile::{MatFile, NumericData};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct MatRecordingReader {
    mat_file: MatFile,
}

impl MatRecordingReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mat_file = MatFile::parse(BufReader::new(file)).map_err(|e| {
            SignalError::Format(format!("Failed to parse MAT file {}: {:?}", path.display(), e))
        })?;
        log::debug!(
            "Opened MAT recording {} with {} arrays",
            path.display(),
            mat_file.arrays().len()
        );
        Ok(Self { mat_file })
    }

    fn numeric_values(data: &NumericData) -> Vec<f64> {
        match data {
            NumericData::Double { real, .. } => real.clone(),
            NumericData::Single { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::Int8 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::Int16 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::Int32 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::Int64 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::UInt8 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::UInt16 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::UInt32 { real, .. } => real.iter().map(|&v| v as f64).collect(),
            NumericData::UInt64 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        }
    }

    /// Character codes for byte/char-like arrays, `None` for real numeric data.
    fn char_codes(data: &NumericData) -> Option<Vec<u32>> {
        match data {
            NumericData::UInt8 { real, .. } => Some(real.iter().map(|&v| v as u32).collect()),
            NumericData::Int8 { real, .. } => Some(real.iter().map(|&v| v as u8 as u32).collect()),
            NumericData::UInt16 { real, .. } => Some(real.iter().map(|&v| v as u32).collect()),
            _ => None,
        }
    }
}

/// Column-major `[rows, cols]` → row-major.
fn column_major_to_row_major(values: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for r in 0..rows {
        for c in 0..cols {
            out.push(values[c * rows + r]);
        }
    }
    out
}

fn codes_to_string(codes: impl Iterator<Item = u32>) -> String {
    let s: String = codes.filter_map(char::from_u32).collect();
    s.trim_end_matches(['\0', ' ']).trim().to_string()
}

impl RecordingSource for MatRecordingReader {
    fn array(&self, name: &str) -> Result<Option<ArrayData>> {
        let Some(array) = self.mat_file.find_by_name(name) else {
            return Ok(None);
        };
        let size = array.size();
        let values = Self::numeric_values(array.data());

        let (shape, values) = match size.len() {
            0 | 1 => (vec![values.len()], values),
            2 => (
                vec![size[0], size[1]],
                column_major_to_row_major(&values, size[0], size[1]),
            ),
            _ => {
                return Err(SignalError::Format(format!(
                    "Array '{}' has {} dimensions; only 2-D arrays are supported",
                    name,
                    size.len()
                )))
            }
        };

        ArrayData::new(shape, values).map(Some)
    }

    fn array_names(&self) -> Vec<String> {
        self.mat_file
            .arrays()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        let array = self.mat_file.find_by_name(name)?;
        let size = array.size();

        if let Some(codes) = Self::char_codes(array.data()) {
            let (rows, cols) = match size.len() {
                2 => (size[0], size[1]),
                _ => (1, codes.len()),
            };
            if rows <= 1 {
                return Some(AttributeValue::Text(codes_to_string(codes.into_iter())));
            }
            let names = (0..rows)
                .map(|r| codes_to_string((0..cols).map(|c| codes[c * rows + r])))
                .collect();
            return Some(AttributeValue::TextList(names));
        }

        Some(AttributeValue::Numbers(Self::numeric_values(array.data())))
    }

    fn format_name(&self) -> &str {
        "MAT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_reorder() {
        // [[1, 2, 3], [4, 5, 6]] stored column-major
        let col_major = vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
        assert_eq!(
            column_major_to_row_major(&col_major, 2, 3),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_codes_to_string_trims_padding() {
        let codes = "Fp1  \0".chars().map(|c| c as u32);
        assert_eq!(codes_to_string(codes), "Fp1");
    }

    #[test]
    fn test_open_garbage_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mat");
        std::fs::write(&path, b"definitely not a MAT file").unwrap();
        assert!(matches!(
            MatRecordingReader::open(&path),
            Err(SignalError::Format(_))
        ));
    }
}
