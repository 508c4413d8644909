/// HDF5 Recording Reader
///
/// Reads `.h5`/`.hdf5` containers (including MATLAB v7.3 files) where `Time`,
/// `Data` and vitals series are root-level datasets and metadata lives in
/// root attributes or attributes on the `Data` dataset. The file is loaded
/// eagerly; each request opens it again.
use super::{ArrayData, AttributeValue, MemorySource, DATA_ARRAY};
use crate::error::{Result, SignalError};
use hdf5::types::{VarLenAscii, VarLenUnicode};
use hdf5::{Attribute, File as H5File, Location};
use std::path::Path;

pub struct Hdf5RecordingReader;

impl Hdf5RecordingReader {
    pub fn open(path: &Path) -> Result<MemorySource> {
        let file = H5File::open(path).map_err(|e| {
            SignalError::Format(format!("Failed to open HDF5 file {}: {}", path.display(), e))
        })?;

        let mut source = MemorySource::new();
        let names = file
            .member_names()
            .map_err(|e| SignalError::Format(format!("Failed to list HDF5 members: {}", e)))?;

        for name in names {
            let Ok(dataset) = file.dataset(&name) else {
                continue;
            };
            match dataset.read_raw::<f64>() {
                Ok(values) => source.insert_array(name, ArrayData::new(dataset.shape(), values)?),
                Err(e) => log::debug!("Skipping non-numeric dataset '{}': {}", name, e),
            }
        }

        Self::load_attributes(&file, &mut source);
        if let Ok(data) = file.dataset(DATA_ARRAY) {
            Self::load_attributes(&data, &mut source);
        }

        log::debug!("Loaded HDF5 recording {}", path.display());
        Ok(source)
    }

    fn load_attributes(location: &Location, source: &mut MemorySource) {
        let Ok(names) = location.attr_names() else {
            return;
        };
        for name in names {
            if let Some(value) = location.attr(&name).ok().and_then(|a| read_attribute(&a)) {
                source.insert_attribute(name, value);
            }
        }
    }
}

fn read_attribute(attr: &Attribute) -> Option<AttributeValue> {
    if let Ok(values) = attr.read_raw::<f64>() {
        return Some(AttributeValue::Numbers(values));
    }
    if let Ok(values) = attr.read_raw::<VarLenUnicode>() {
        let list: Vec<String> = values.iter().map(|s| s.as_str().to_string()).collect();
        return Some(text_or_list(list));
    }
    if let Ok(values) = attr.read_raw::<VarLenAscii>() {
        let list: Vec<String> = values.iter().map(|s| s.as_str().to_string()).collect();
        return Some(text_or_list(list));
    }
    attr.read_raw::<u8>().ok().map(AttributeValue::Bytes)
}

fn text_or_list(mut list: Vec<String>) -> AttributeValue {
    if list.len() == 1 {
        AttributeValue::Text(list.remove(0))
    } else {
        AttributeValue::TextList(list)
    }
}
