//! Parsed record: insertion-ordered named fields plus the byte payload.

use crate::value::Value;
use log::debug;
use std::collections::HashMap;

/// Structured output of interpreting one input record.
///
/// Field names are unique. The first write to a name wins: a later
/// [`insert`](ParsedRecord::insert) with the same name is dropped and
/// reported through its return value.
#[derive(Debug, Clone, Default)]
pub struct ParsedRecord {
    fields: Vec<(String, Value)>,
    /// Field name -> position in `fields`.
    index: HashMap<String, usize>,
    payload: Vec<u8>,
}

// `index` is derived from `fields`.
impl PartialEq for ParsedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.payload == other.payload
    }
}

impl Eq for ParsedRecord {}

impl ParsedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name` unless the name is already present.
    /// Returns `false` when the write was dropped.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if self.index.contains_key(&name) {
            debug!("field {} already set, dropping later write", name);
            return false;
        }
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push((name, value));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.fields[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    pub fn into_parts(self) -> (Vec<(String, Value)>, Vec<u8>) {
        (self.fields, self.payload)
    }

    /// Append one unsigned field per payload byte, named `{prefix}0`, `{prefix}1`, ...
    pub fn add_payload_as_fields(&mut self, prefix: &str) {
        self.fields.reserve(self.payload.len());
        self.index.reserve(self.payload.len());
        for i in 0..self.payload.len() {
            let byte = self.payload[i];
            self.insert(format!("{}{}", prefix, i), Value::Unsigned(byte as u64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_writer_wins() {
        let mut r = ParsedRecord::new();
        assert!(r.insert("type", Value::Mnemonic("PKT_RX".into())));
        assert!(!r.insert("type", Value::Mnemonic("PKT_TX".into())));
        assert_eq!(r.get("type"), Some(&Value::Mnemonic("PKT_RX".into())));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut r = ParsedRecord::new();
        r.insert("z", Value::Unsigned(1));
        r.insert("a", Value::Signed(-1));
        r.insert("m", Value::Mnemonic("x".into()));
        let names: Vec<_> = r.field_names().collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn payload_as_fields() {
        let mut r = ParsedRecord::new();
        r.payload_mut().extend([0x0a, 0xff]);
        r.insert("d1", Value::Unsigned(99));
        r.add_payload_as_fields("d");
        assert_eq!(r.get("d0"), Some(&Value::Unsigned(0x0a)));
        assert_eq!(r.get("d1"), Some(&Value::Unsigned(99)));
        assert_eq!(r.payload(), &[0x0a, 0xff]);
    }

    #[test]
    fn large_payload_as_fields() {
        let mut r = ParsedRecord::new();
        r.insert("length", Value::Signed(65536));
        r.payload_mut().extend((0..65536u32).map(|i| (i & 0xff) as u8));
        let start = std::time::Instant::now();
        r.add_payload_as_fields("d");
        let elapsed = start.elapsed();
        assert_eq!(r.len(), 65537);
        assert_eq!(r.get("d65535"), Some(&Value::Unsigned(0xff)));
        assert_eq!(r.get("d256"), Some(&Value::Unsigned(0)));
        assert_eq!(r.field_names().nth(1), Some("d0"));
        assert!(
            elapsed < std::time::Duration::from_secs(2),
            "64 KiB payload took {:?}",
            elapsed
        );
    }

    #[test]
    fn equality_compares_fields_and_payload() {
        let mut a = ParsedRecord::new();
        a.insert("x", Value::Unsigned(1));
        let mut b = a.clone();
        assert_eq!(a, b);
        b.insert("y", Value::Unsigned(2));
        assert_ne!(a, b);
    }
}
