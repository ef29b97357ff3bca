//! Address-ordered line records and the floor search over them.

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// "The code at `address` and beyond, until the next record, belongs to `line`."
///
/// Both indices point into the owning map's [`NameTable`](super::NameTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord
{
    pub address: Address,
    pub line: u32,
    pub source_file_index: i32,
    pub object_name_index: i32,
}

/// Line records in the order the symbol source delivered them
///
/// Sources deliver records sorted ascending by address and resolution relies on
/// that, but the table does not reorder anything. It only remembers whether the
/// order still holds so [`floor`](LineTable::floor) can pick its search strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable
{
    records: Vec<LineRecord>,
    sorted: bool,
}

impl Default for LineTable
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl LineTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            records: Vec::new(),
            sorted: true,
        }
    }

    pub(crate) fn from_records(records: Vec<LineRecord>) -> Self
    {
        let sorted = records.windows(2).all(|pair| pair[0].address <= pair[1].address);
        Self { records, sorted }
    }

    pub fn push(&mut self, record: LineRecord)
    {
        if let Some(last) = self.records.last() {
            self.sorted &= last.address <= record.address;
        }
        self.records.push(record);
    }

    /// Find the record covering `target`
    ///
    /// Picks the record with the greatest address `<= target`. When several
    /// records share that address, the last one in table order wins, which is
    /// the first one met when scanning backward from the end.
    ///
    /// Sorted tables are searched with `partition_point`; a table that lost its
    /// ordering falls back to the plain backward scan so the answer stays the
    /// one the scan would give. Either way it is a cold-path lookup over a few
    /// thousand records at most.
    ///
    /// Returns `None` when `target` is below every recorded address.
    #[must_use]
    pub fn floor(&self, target: Address) -> Option<&LineRecord>
    {
        if self.sorted {
            let end = self.records.partition_point(|record| record.address <= target);
            return end.checked_sub(1).map(|index| &self.records[index]);
        }

        self.records
            .iter()
            .rposition(|record| record.address <= target)
            .map(|index| &self.records[index])
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool
    {
        self.sorted
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.records.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[LineRecord]
    {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineRecord>
    {
        self.records.iter()
    }

    pub fn clear(&mut self)
    {
        self.records.clear();
        self.sorted = true;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn record(address: u64, line: u32) -> LineRecord
    {
        LineRecord {
            address: Address::new(address),
            line,
            source_file_index: 0,
            object_name_index: 1,
        }
    }

    fn table(entries: &[(u64, u32)]) -> LineTable
    {
        let mut table = LineTable::new();
        for &(address, line) in entries {
            table.push(record(address, line));
        }
        table
    }

    #[test]
    fn test_floor_prefers_last_duplicate()
    {
        let lines = table(&[(10, 1), (20, 2), (20, 3), (35, 4)]);
        assert!(lines.is_sorted());

        assert_eq!(lines.floor(Address::new(25)).map(|r| r.line), Some(3));
        assert_eq!(lines.floor(Address::new(20)).map(|r| r.line), Some(3));
        assert_eq!(lines.floor(Address::new(5)), None);
        assert_eq!(lines.floor(Address::new(100)).map(|r| r.line), Some(4));
        assert_eq!(lines.floor(Address::new(10)).map(|r| r.line), Some(1));
    }

    #[test]
    fn test_floor_on_empty_table()
    {
        assert_eq!(LineTable::new().floor(Address::new(0)), None);
    }

    #[test]
    fn test_unsorted_table_uses_backward_scan()
    {
        let lines = table(&[(30, 1), (10, 2), (20, 3)]);
        assert!(!lines.is_sorted());

        // The backward scan stops at the first record <= target from the end.
        assert_eq!(lines.floor(Address::new(25)).map(|r| r.line), Some(3));
        assert_eq!(lines.floor(Address::new(15)).map(|r| r.line), Some(2));
        assert_eq!(lines.floor(Address::new(5)), None);
    }

    #[test]
    fn test_sorted_flag_from_records_and_clear()
    {
        let mut lines = LineTable::from_records(vec![record(5, 1), record(3, 2)]);
        assert!(!lines.is_sorted());

        lines.clear();
        assert!(lines.is_sorted());
        assert!(lines.is_empty());
    }
}
