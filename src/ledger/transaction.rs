// ============================================================================
// Ledger Transaction Overlay
// ============================================================================
//
// Buffers the puts of one unit of work on top of a read-only base ledger.
// Reads see the transaction's own writes first. Nothing reaches the base
// until the write set is applied; dropping the transaction discards it.
//
// ============================================================================

use super::{Ledger, StateEntry, StateIter};
use crate::core::Result;
use std::cmp::Ordering;
use std::collections::{BTreeMap, btree_map};
use std::iter::Peekable;
use std::ops::Bound;
use uuid::Uuid;

pub struct Transaction<'a, L: Ledger + ?Sized> {
    id: Uuid,
    base: &'a L,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'a, L: Ledger + ?Sized> Transaction<'a, L> {
    pub fn new(base: &'a L) -> Self {
        Self::with_id(base, Uuid::new_v4())
    }

    pub fn with_id(base: &'a L, id: Uuid) -> Self {
        Self {
            id,
            base,
            writes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Ends the transaction, releasing the base borrow.
    pub fn into_write_set(self) -> WriteSet {
        WriteSet {
            tx_id: self.id,
            puts: self.writes,
        }
    }
}

impl<L: Ledger + ?Sized> Ledger for Transaction<'_, L> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.base.get_state(key),
        }
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn range_scan<'s>(&'s self, start: &str, end: &str) -> Result<StateIter<'s>> {
        if start >= end {
            return Ok(Box::new(std::iter::empty()));
        }

        let writes = self
            .writes
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)));
        Ok(Box::new(MergedScan {
            base: self.base.range_scan(start, end)?.peekable(),
            writes: writes.peekable(),
        }))
    }
}

/// Ordered merge of a base scan and the buffered writes in the same range.
/// A buffered write shadows the base entry with the same key.
struct MergedScan<'a> {
    base: Peekable<StateIter<'a>>,
    writes: Peekable<btree_map::Range<'a, String, Vec<u8>>>,
}

enum Next {
    Base,
    Write,
    Shadowed,
}

impl Iterator for MergedScan<'_> {
    type Item = Result<StateEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match (self.base.peek(), self.writes.peek()) {
            (None, None) => return None,
            (Some(_), None) | (Some(Err(_)), _) => Next::Base,
            (None, Some(_)) => Next::Write,
            (Some(Ok((base_key, _))), Some((write_key, _))) => {
                match base_key.as_str().cmp(write_key.as_str()) {
                    Ordering::Less => Next::Base,
                    Ordering::Equal => Next::Shadowed,
                    Ordering::Greater => Next::Write,
                }
            }
        };

        match next {
            Next::Base => self.base.next(),
            Next::Shadowed => {
                self.base.next();
                self.next_write()
            }
            Next::Write => self.next_write(),
        }
    }
}

impl MergedScan<'_> {
    fn next_write(&mut self) -> Option<Result<StateEntry>> {
        self.writes
            .next()
            .map(|(key, value)| Ok((key.clone(), value.clone())))
    }
}

/// Buffered puts of a finished transaction, in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSet {
    tx_id: Uuid,
    puts: BTreeMap<String, Vec<u8>>,
}

impl WriteSet {
    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.puts.keys().map(String::as_str)
    }

    /// Apply every buffered put to `ledger`. Stops at the first failure.
    pub fn apply<L: Ledger + ?Sized>(self, ledger: &mut L) -> Result<()> {
        for (key, value) in self.puts {
            ledger.put_state(&key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DbError;
    use crate::ledger::MemoryLedger;

    fn keys(iter: StateIter<'_>) -> Vec<String> {
        iter.map(|entry| entry.unwrap().0).collect()
    }

    #[test]
    fn test_reads_see_own_writes() {
        let mut base = MemoryLedger::new();
        base.put_state("k", vec![1]).unwrap();

        let mut tx = Transaction::new(&base);
        assert_eq!(tx.get_state("k").unwrap(), Some(vec![1]));
        tx.put_state("k", vec![2]).unwrap();
        assert_eq!(tx.get_state("k").unwrap(), Some(vec![2]));
        assert_eq!(base.get_state("k").unwrap(), Some(vec![1]));
    }

    #[test]
    fn test_range_scan_merges_base_and_writes() {
        let mut base = MemoryLedger::new();
        base.put_state("r1", vec![1]).unwrap();
        base.put_state("r3", vec![3]).unwrap();

        let mut tx = Transaction::new(&base);
        tx.put_state("r2", vec![2]).unwrap();
        tx.put_state("r3", vec![33]).unwrap();
        tx.put_state("s", vec![]).unwrap();

        assert_eq!(keys(tx.range_scan("r", "s").unwrap()), vec!["r1", "r2", "r3"]);
        let r3 = tx
            .range_scan("r3", "r4")
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(r3.1, vec![33]);
    }

    /// Base ledger whose scans fail after the first entry.
    struct FailingTail(MemoryLedger);

    impl Ledger for FailingTail {
        fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.0.get_state(key)
        }

        fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
            self.0.put_state(key, value)
        }

        fn range_scan<'a>(&'a self, start: &str, end: &str) -> Result<StateIter<'a>> {
            let head = self.0.range_scan(start, end)?.take(1);
            let tail = std::iter::once(Err(DbError::StoreRejected("scan interrupted".into())));
            Ok(Box::new(head.chain(tail)))
        }
    }

    #[test]
    fn test_range_scan_yields_lazily_in_key_order() {
        let mut inner = MemoryLedger::new();
        inner.put_state("r2", vec![2]).unwrap();
        inner.put_state("r4", vec![4]).unwrap();
        let base = FailingTail(inner);

        let mut tx = Transaction::new(&base);
        tx.put_state("r1", vec![1]).unwrap();
        tx.put_state("r5", vec![5]).unwrap();

        let mut scan = tx.range_scan("r", "s").unwrap();
        assert_eq!(scan.next().unwrap().unwrap().0, "r1");
        assert_eq!(scan.next().unwrap().unwrap().0, "r2");
        assert!(matches!(scan.next(), Some(Err(DbError::StoreRejected(_)))));
        assert_eq!(scan.next().unwrap().unwrap().0, "r5");
        assert!(scan.next().is_none());
    }

    #[test]
    fn test_range_scan_with_only_writes() {
        let base = MemoryLedger::new();
        let mut tx = Transaction::new(&base);
        tx.put_state("b", vec![2]).unwrap();
        tx.put_state("a", vec![1]).unwrap();

        assert_eq!(keys(tx.range_scan("a", "z").unwrap()), vec!["a", "b"]);
        assert!(tx.range_scan("z", "a").unwrap().next().is_none());
    }

    #[test]
    fn test_write_set_applies_on_commit() {
        let mut base = MemoryLedger::new();
        let tx_id = Uuid::new_v4();

        let mut tx = Transaction::with_id(&base, tx_id);
        tx.put_state("a", vec![1]).unwrap();
        tx.put_state("b", vec![2]).unwrap();
        assert_eq!(tx.pending_writes(), 2);

        let writes = tx.into_write_set();
        assert_eq!(writes.tx_id(), tx_id);
        assert_eq!(writes.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        writes.apply(&mut base).unwrap();
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_dropped_transaction_leaves_base_untouched() {
        let base = MemoryLedger::new();
        {
            let mut tx = Transaction::new(&base);
            tx.put_state("a", vec![1]).unwrap();
        }
        assert!(base.is_empty());
    }
}
