//! Code address type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Strongly typed code address within a module
///
/// Symbol base addresses and line record addresses are both offsets into the
/// module's compiled code. Wrapping them in a newtype keeps them from being
/// mixed up with line numbers, name indices or symbol ids, which are all plain
/// integers in the persisted tables.
///
/// ## Example
///
/// ```rust
/// use linemap_core::types::Address;
///
/// let base = Address::from(0x1000);
/// assert_eq!(base.checked_offset(0x20), Some(Address::from(0x1020)));
/// assert_eq!(base.checked_offset(-0x10), Some(Address::from(0xff0)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(u64);

impl Address
{
    /// The zero address
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Apply a signed code offset to this address, checking for overflow
    ///
    /// Returns `None` if the result would fall below zero or past `u64::MAX`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use linemap_core::types::Address;
    ///
    /// let addr = Address::from(0x10);
    /// assert_eq!(addr.checked_offset(-0x11), None); // Underflow
    /// assert_eq!(Address::new(u64::MAX).checked_offset(1), None); // Overflow
    /// ```
    #[must_use]
    pub fn checked_offset(self, offset: i64) -> Option<Self>
    {
        self.0.checked_add_signed(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}
