/// JSON Recording Reader
///
/// Plain-text container used for exports and fixtures:
///
/// ```json
/// {
///   "arrays": [
///     {"name": "Time", "shape": [1, 3], "values": [0.1, 0.2, 0.3]},
///     {"name": "Data", "values": [[1, 2, 3], [4, 5, 6]]}
///   ],
///   "attributes": {"ChannelNames": ["Fp1", "Fp2"], "SamplingFreq": 10}
/// }
/// ```
///
/// `values` is either a flat list (with an optional `shape`) or a list of rows.
use super::{ArrayData, AttributeValue, MemorySource};
use crate::error::{Result, SignalError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct JsonContainer {
    #[serde(default)]
    arrays: Vec<JsonArray>,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct JsonArray {
    name: String,
    #[serde(default)]
    shape: Option<Vec<usize>>,
    values: JsonValues,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonValues {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

pub struct JsonRecordingReader;

impl JsonRecordingReader {
    /// Load the whole container into memory.
    pub fn open(path: &Path) -> Result<MemorySource> {
        let file = File::open(path)?;
        let container: JsonContainer = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SignalError::Format(format!("Invalid JSON recording: {}", e)))?;
        Self::from_container(container)
    }

    pub fn parse_str(json: &str) -> Result<MemorySource> {
        let container: JsonContainer = serde_json::from_str(json)
            .map_err(|e| SignalError::Format(format!("Invalid JSON recording: {}", e)))?;
        Self::from_container(container)
    }

    fn from_container(container: JsonContainer) -> Result<MemorySource> {
        let mut source = MemorySource::new();

        for array in container.arrays {
            let data = match (array.values, array.shape) {
                (JsonValues::Flat(values), Some(shape)) => ArrayData::new(shape, values)?,
                (JsonValues::Flat(values), None) => ArrayData::vector(values),
                (JsonValues::Rows(rows), _) => ArrayData::matrix(rows)?,
            };
            source.insert_array(array.name, data);
        }

        for (name, value) in container.attributes {
            match attribute_from_json(&value) {
                Some(attr) => source.insert_attribute(name, attr),
                None => log::debug!("Ignoring attribute '{}' with unsupported value", name),
            }
        }

        Ok(source)
    }
}

fn attribute_from_json(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::String(s) => Some(AttributeValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(|v| AttributeValue::Numbers(vec![v])),
        Value::Array(items) if items.iter().all(Value::is_string) => Some(AttributeValue::TextList(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )),
        Value::Array(items) if items.iter().all(Value::is_number) => Some(AttributeValue::Numbers(
            items.iter().filter_map(Value::as_f64).collect(),
        )),
        _ => None,
    }
}
