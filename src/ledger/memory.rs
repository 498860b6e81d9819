use super::{Ledger, StateIter};
use crate::core::{DbError, Result};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Volatile ledger backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    state: BTreeMap<String, Vec<u8>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: BTreeMap<String, Vec<u8>>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl Ledger for MemoryLedger {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn range_scan<'a>(&'a self, start: &str, end: &str) -> Result<StateIter<'a>> {
        // BTreeMap::range panics on an inverted range.
        if start >= end {
            return Ok(Box::new(std::iter::empty()));
        }
        let entries = self
            .state
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(key, value)| Ok::<_, DbError>((key.clone(), value.clone())));
        Ok(Box::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut ledger = MemoryLedger::new();
        assert_eq!(ledger.get_state("a").unwrap(), None);

        ledger.put_state("a", vec![1]).unwrap();
        ledger.put_state("a", vec![2]).unwrap();
        assert_eq!(ledger.get_state("a").unwrap(), Some(vec![2]));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_range_scan_is_half_open_and_ordered() {
        let mut ledger = MemoryLedger::new();
        for key in ["b2", "a", "b1", "b3", "c"] {
            ledger.put_state(key, key.as_bytes().to_vec()).unwrap();
        }

        let keys: Vec<String> = ledger
            .range_scan("b", "b3")
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys, vec!["b1", "b2"]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let mut ledger = MemoryLedger::new();
        ledger.put_state("m", vec![]).unwrap();
        assert_eq!(ledger.range_scan("z", "a").unwrap().count(), 0);
        assert_eq!(ledger.range_scan("m", "m").unwrap().count(), 0);
    }
}
