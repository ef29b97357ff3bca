//! Deduplicating string table.

/// Ordered list of unique strings addressed by index
///
/// Source file paths and container names repeat across thousands of line
/// records. Each distinct string is stored once here and the records carry the
/// index instead.
///
/// Indices are `i32` to match the persisted record layout. They are stable once
/// assigned: there is no removal, only `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable
{
    names: Vec<String>,
}

impl NameTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self { names: Vec::new() }
    }

    /// Rebuild a table from persisted names, keeping their order and indices.
    pub(crate) fn from_names(names: Vec<String>) -> Self
    {
        Self { names }
    }

    /// Intern `name` and return its index
    ///
    /// Returns the existing index when the exact (case-sensitive) string is
    /// already present, otherwise appends it. The scan is linear; persisted
    /// tables hold a few hundred names at most.
    pub fn add(&mut self, name: &str) -> i32
    {
        if let Some(pos) = self.names.iter().position(|existing| existing == name) {
            return to_index(pos);
        }

        self.names.push(name.to_owned());
        to_index(self.names.len() - 1)
    }

    /// Look up the string at `index`
    ///
    /// Never fails: a negative or out-of-range index yields `""`.
    #[must_use]
    pub fn get(&self, index: i32) -> &str
    {
        usize::try_from(index)
            .ok()
            .and_then(|pos| self.names.get(pos))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str>
    {
        self.names.iter().map(String::as_str)
    }

    pub(crate) fn as_slice(&self) -> &[String]
    {
        &self.names
    }

    pub fn clear(&mut self)
    {
        self.names.clear();
    }
}

// A module would need more than 2^31 distinct file names to saturate this.
fn to_index(pos: usize) -> i32
{
    i32::try_from(pos).unwrap_or(i32::MAX)
}
