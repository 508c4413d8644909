//! Recording readers.
//!
//! A recording container is anything that exposes named numeric arrays and
//! named attributes. EEG recordings hold a `Time` vector and a `Data` matrix;
//! vitals recordings hold many independently named 2-row arrays
//! (row 0 = time, row 1 = value). New container formats are added by
//! implementing [`RecordingSource`] and registering the extension in
//! [`RecordingReaderFactory`].

use crate::error::{Result, SignalError};
use crate::types::{
    default_channel_names, NamedSeries, Recording, RecordingMetadata, SeriesCollection, Setting,
    DEFAULT_SAMPLING_FREQ,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "hdf5-support")]
pub mod hdf5_reader;
pub mod json_reader;
pub mod mat_reader;

#[cfg(feature = "hdf5-support")]
pub use hdf5_reader::Hdf5RecordingReader;
pub use json_reader::JsonRecordingReader;
pub use mat_reader::MatRecordingReader;

pub const TIME_ARRAY: &str = "Time";
pub const DATA_ARRAY: &str = "Data";
pub const ATTR_CHANNEL_NAMES: &str = "ChannelNames";
pub const ATTR_CHANNEL_COUNT: &str = "ChannelCount";
pub const ATTR_SAMPLING_FREQ: &str = "SamplingFreq";
pub const ATTR_INITIAL_TIME: &str = "InitialTime";

/// Numeric array in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    shape: Vec<usize>,
    values: Vec<f64>,
}

impl ArrayData {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| {
                SignalError::Format(format!("Array shape {:?} is too large", shape))
            })?;
        if expected != values.len() {
            return Err(SignalError::Format(format!(
                "Array shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    pub fn matrix(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(SignalError::Format("Ragged matrix rows".to_string()));
        }
        let shape = vec![rows.len(), cols];
        Ok(Self {
            shape,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Leading dimension; a 1-D array is a single row.
    pub fn rows(&self) -> usize {
        if self.shape.len() >= 2 {
            self.shape[0]
        } else {
            1
        }
    }

    pub fn cols(&self) -> usize {
        match self.shape.len() {
            0 => self.values.len(),
            1 => self.shape[0],
            _ => self.shape[1..].iter().product(),
        }
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let cols = self.cols();
        &self.values[index * cols..(index + 1) * cols]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows()).map(|r| self.row(r).to_vec()).collect()
    }

    /// Columns as rows.
    pub fn transposed_rows(&self) -> Vec<Vec<f64>> {
        let (rows, cols) = (self.rows(), self.cols());
        (0..cols)
            .map(|c| (0..rows).map(|r| self.values[r * cols + c]).collect())
            .collect()
    }

    /// True for N, 1×N and N×1 shapes.
    pub fn is_vector(&self) -> bool {
        self.shape.iter().filter(|&&d| d > 1).count() <= 1
    }
}

/// Optional named attribute attached to a recording.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    TextList(Vec<String>),
    Bytes(Vec<u8>),
    BytesList(Vec<Vec<u8>>),
    Numbers(Vec<f64>),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Numbers(v) => v.first().copied(),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Bytes(b) => decode_bytes(b).trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            AttributeValue::Text(s) => Some(s.clone()),
            AttributeValue::Bytes(b) => Some(decode_bytes(b)),
            AttributeValue::TextList(v) => v.first().cloned(),
            AttributeValue::BytesList(v) => v.first().map(|b| decode_bytes(b)),
            AttributeValue::Numbers(v) => v.first().map(|n| n.to_string()),
        }
    }

    pub fn as_text_list(&self) -> Option<Vec<String>> {
        match self {
            AttributeValue::TextList(v) => Some(v.clone()),
            AttributeValue::BytesList(v) => Some(v.iter().map(|b| decode_bytes(b)).collect()),
            AttributeValue::Text(s) => Some(split_name_list(s)),
            AttributeValue::Bytes(b) => Some(split_name_list(&decode_bytes(b))),
            AttributeValue::Numbers(_) => None,
        }
    }
}

/// Decodes byte-encoded text, dropping NUL and space padding.
pub fn decode_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', ' '])
        .trim()
        .to_string()
}

fn split_name_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// A container of named arrays and attributes.
pub trait RecordingSource: Send + Sync {
    /// Read a named array; `Ok(None)` if the container has no such array.
    fn array(&self, name: &str) -> Result<Option<ArrayData>>;

    /// Array names in container order.
    fn array_names(&self) -> Vec<String>;

    fn attribute(&self, name: &str) -> Option<AttributeValue>;

    /// Shape of a named array without keeping its values.
    fn array_shape(&self, name: &str) -> Option<Vec<usize>> {
        self.array(name).ok().flatten().map(|a| a.shape().to_vec())
    }

    fn format_name(&self) -> &str;
}

/// In-memory container; also the target that eager readers load into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySource {
    arrays: Vec<(String, ArrayData)>,
    attributes: BTreeMap<String, AttributeValue>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Time` + `Data` container for a multi-channel recording.
    pub fn from_recording(time: Vec<f64>, data: Vec<Vec<f64>>) -> Result<Self> {
        Ok(Self::new()
            .with_array(TIME_ARRAY, ArrayData::vector(time))
            .with_array(DATA_ARRAY, ArrayData::matrix(data)?))
    }

    pub fn with_array(mut self, name: impl Into<String>, array: ArrayData) -> Self {
        self.insert_array(name, array);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Adds a 2-row vitals series.
    pub fn with_series(self, name: impl Into<String>, time: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Ok(self.with_array(name, ArrayData::matrix(vec![time, values])?))
    }

    pub fn insert_array(&mut self, name: impl Into<String>, array: ArrayData) {
        let name = name.into();
        match self.arrays.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = array,
            None => self.arrays.push((name, array)),
        }
    }

    pub fn insert_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }
}

impl RecordingSource for MemorySource {
    fn array(&self, name: &str) -> Result<Option<ArrayData>> {
        Ok(self
            .arrays
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a.clone()))
    }

    fn array_names(&self) -> Vec<String> {
        self.arrays.iter().map(|(n, _)| n.clone()).collect()
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).cloned()
    }

    fn array_shape(&self, name: &str) -> Option<Vec<usize>> {
        self.arrays
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a.shape().to_vec())
    }

    fn format_name(&self) -> &str {
        "memory"
    }
}

/// Reference to a registered recording. Dereferenced (opened) on every request.
#[derive(Debug, Clone)]
pub enum RecordingHandle {
    File(PathBuf),
    Memory(Arc<MemorySource>),
}

impl RecordingHandle {
    pub fn open(&self) -> Result<Box<dyn RecordingSource>> {
        match self {
            RecordingHandle::File(path) => {
                if !path.exists() {
                    return Err(SignalError::FileNotFound(path.display().to_string()));
                }
                RecordingReaderFactory::open(path)
            }
            RecordingHandle::Memory(source) => Ok(Box::new(source.as_ref().clone())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            RecordingHandle::File(path) => Some(path),
            RecordingHandle::Memory(_) => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RecordingHandle::File(path) => path.display().to_string(),
            RecordingHandle::Memory(_) => "<memory>".to_string(),
        }
    }
}

/// Picks a reader by file extension.
pub struct RecordingReaderFactory;

impl RecordingReaderFactory {
    pub fn open(path: &Path) -> Result<Box<dyn RecordingSource>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "mat" => Ok(Box::new(MatRecordingReader::open(path)?)),
            "json" => Ok(Box::new(JsonRecordingReader::open(path)?)),
            #[cfg(feature = "hdf5-support")]
            "h5" | "hdf5" => Ok(Box::new(Hdf5RecordingReader::open(path)?)),
            #[cfg(not(feature = "hdf5-support"))]
            "h5" | "hdf5" => Err(SignalError::UnsupportedFormat(
                "HDF5 recordings require the hdf5-support feature".to_string(),
            )),
            _ => Err(SignalError::UnsupportedFormat(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    pub fn supported_extensions() -> Vec<&'static str> {
        let mut exts = vec!["mat", "json"];
        if cfg!(feature = "hdf5-support") {
            exts.extend(["h5", "hdf5"]);
        }
        exts
    }

    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| Self::supported_extensions().contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Parse the `Time` vector and `Data` matrix of a multi-channel recording.
///
/// `Data` is expected as C×N; an N×C matrix is transposed.
pub fn parse(source: &dyn RecordingSource) -> Result<Recording> {
    let time = source
        .array(TIME_ARRAY)?
        .ok_or_else(|| SignalError::MissingArray(TIME_ARRAY.to_string()))?;
    let data = source
        .array(DATA_ARRAY)?
        .ok_or_else(|| SignalError::MissingArray(DATA_ARRAY.to_string()))?;

    if !time.is_vector() {
        return Err(SignalError::Format(format!(
            "Time must be 1×N or N, got shape {:?}",
            time.shape()
        )));
    }
    let time = time.values().to_vec();
    let n = time.len();

    let rows = if data.shape().len() < 2 {
        vec![data.values().to_vec()]
    } else if data.cols() == n {
        data.to_rows()
    } else if data.rows() == n {
        log::debug!("Data stored as N×C ({:?}), transposing", data.shape());
        data.transposed_rows()
    } else {
        return Err(SignalError::Format(format!(
            "Data shape {:?} does not match {} time samples",
            data.shape(),
            n
        )));
    };

    Recording::new(time, rows)
}

/// Collect every array with at least two rows as a (time, value) series.
pub fn parse_collection(source: &dyn RecordingSource) -> Result<SeriesCollection> {
    let mut series = Vec::new();
    for name in source.array_names() {
        let Some(array) = source.array(&name)? else {
            continue;
        };
        if array.shape().len() < 2 || array.rows() < 2 {
            continue;
        }
        series.push(NamedSeries {
            name,
            time: array.row(0).to_vec(),
            values: array.row(1).to_vec(),
        });
    }
    Ok(SeriesCollection { series })
}

/// Read optional metadata attributes. Never fails; absent or unreadable
/// attributes fall back to their defaults.
pub fn read_metadata(source: &dyn RecordingSource) -> RecordingMetadata {
    let channel_names = source
        .attribute(ATTR_CHANNEL_NAMES)
        .and_then(|a| a.as_text_list())
        .filter(|names| !names.is_empty());

    let channel_names = match channel_names {
        Some(names) => Setting::Explicit(names),
        None => {
            let count = source
                .attribute(ATTR_CHANNEL_COUNT)
                .and_then(|a| a.as_f64())
                .filter(|c| c.is_finite() && *c >= 0.0)
                .map(|c| c as usize)
                .unwrap_or_else(|| channel_count_from_shapes(source));
            Setting::Default(default_channel_names(count))
        }
    };

    let sampling_freq = source
        .attribute(ATTR_SAMPLING_FREQ)
        .and_then(|a| a.as_f64())
        .filter(|fs| fs.is_finite() && *fs > 0.0)
        .map(Setting::Explicit)
        .unwrap_or(Setting::Default(DEFAULT_SAMPLING_FREQ));

    let initial_time = source
        .attribute(ATTR_INITIAL_TIME)
        .and_then(|a| a.as_text())
        .filter(|s| !s.is_empty());

    RecordingMetadata {
        channel_names,
        sampling_freq,
        initial_time,
    }
}

fn channel_count_from_shapes(source: &dyn RecordingSource) -> usize {
    let Some(data_shape) = source.array_shape(DATA_ARRAY) else {
        return 0;
    };
    if data_shape.len() < 2 {
        return 1;
    }
    let n: usize = source
        .array_shape(TIME_ARRAY)
        .map(|s| s.iter().product())
        .unwrap_or(data_shape[1]);
    if data_shape[1] != n && data_shape[0] == n {
        data_shape[1]
    } else {
        data_shape[0]
    }
}
