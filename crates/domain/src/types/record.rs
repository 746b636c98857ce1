//! Parsed report rows

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One report row: column header → cell value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: Vec<(String, String)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell. A repeated header overwrites the earlier value in place.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(h, _)| *h == header) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.iter().find(|(h, _)| h == header).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (header, value) in iter {
            record.insert(header, value);
        }
        record
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (header, value) in &self.fields {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}
