//! Interfaces for durable storage of the double-spend ledger.
//!
//! A production implementation sits on a persistent ordered key-value store such as LevelDb
//! or RocksDb, with the serial-number and mint-height maps under separate key namespaces.
//! Implementations must apply the writes of one block connection or disconnection and the
//! corresponding chain-tip pointer update in a single atomic batch: a ledger that commits a
//! spend without its tip (or vice versa) cannot be reverted exactly on reorg.

use crate::ledger::SpendRecord;

/// Storage for consumed serial numbers at the current chain tip.
pub trait SpendState<S> {
    /// Record a serial number as consumed
    fn insert(&mut self, serial: S, record: SpendRecord);

    /// Remove a serial number, returning its record if it was present
    fn remove(&mut self, serial: &S) -> Option<SpendRecord>;

    /// Consumption record for a serial number, if any
    fn get(&self, serial: &S) -> Option<SpendRecord>;

    /// Check if a serial number is recorded
    fn has(&self, serial: &S) -> bool;

    /// Number of serial numbers currently recorded
    fn size(&self) -> u64;

    /// Drop everything. Reindexing and test isolation only.
    fn clear(&mut self);
}

/// Storage mapping coin identity to mint height, used for maturity checks.
pub trait MintState<C> {
    /// Record the height a coin was minted at
    fn insert(&mut self, coin: C, height: u32);

    /// Remove a coin's mint record, returning its height if it was present
    fn remove(&mut self, coin: &C) -> Option<u32>;

    /// Height the coin was minted at, if known
    fn get(&self, coin: &C) -> Option<u32>;

    /// Drop everything. Reindexing and test isolation only.
    fn clear(&mut self);
}
