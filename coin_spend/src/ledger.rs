//! Consensus bookkeeping that makes every coin redeemable exactly once.
//!
//! Per coin, the state machine is `Minted(height) -> Mature -> Spent(height, tx)`:
//! maturity is reached once the mint is `required_confirmations` deep, spending records the
//! serial number, and a block disconnection reverts the record exactly. The ledger is a
//! plain value owned by the caller with single-writer discipline: only the block
//! connect/disconnect path mutates it, never concurrently with verification, and only after
//! a block's whole batch of spend proofs has verified.

use crate::{
    error::CoinSpendError,
    persistence::{MintState, SpendState},
};
use ark_std::{collections::BTreeSet, marker::PhantomData};

/// Consumption record for one serial number.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SpendRecord {
    /// Height of the block that consumed the serial number
    pub height: u32,
    /// Binding hash of the transaction that consumed it
    pub tx_binding_hash: [u8; 32],
}

/// Reorg-aware set of consumed serial numbers plus the mint-height index for maturity
/// checks, over caller-supplied storage.
#[derive(Clone, Debug)]
pub struct DoubleSpendLedger<S, C, SS: SpendState<S>, MS: MintState<C>> {
    spends: SS,
    mints: MS,
    required_confirmations: u32,
    _phantom: PhantomData<(S, C)>,
}

impl<S: Clone, C: Clone, SS: SpendState<S>, MS: MintState<C>> DoubleSpendLedger<S, C, SS, MS> {
    pub fn new(spends: SS, mints: MS, required_confirmations: u32) -> Self {
        Self {
            spends,
            mints,
            required_confirmations,
            _phantom: PhantomData,
        }
    }

    pub fn required_confirmations(&self) -> u32 {
        self.required_confirmations
    }

    /// Record a coin's mint height on block connection.
    pub fn record_mint(&mut self, coin: C, height: u32) {
        self.mints.insert(coin, height);
    }

    /// Remove a coin's mint record on block disconnection.
    ///
    /// # Panics
    ///
    /// Panics if the coin has no mint record: disconnecting a block that did not mint the
    /// coin is a caller contract violation, not a recoverable condition.
    pub fn revert_mint(&mut self, coin: &C) {
        if self.mints.remove(coin).is_none() {
            panic!("reverting mint that was never recorded");
        }
    }

    pub fn mint_height(&self, coin: &C) -> Option<u32> {
        self.mints.get(coin)
    }

    /// Cheap spendability precondition: the coin's mint must be `required_confirmations`
    /// deep at `spend_height`. Called before any cryptographic work.
    pub fn check_maturity(&self, coin: &C, spend_height: u32) -> Result<(), CoinSpendError> {
        let mint_height = self.mints.get(coin).ok_or(CoinSpendError::UnknownCoin)?;
        let confirmations = spend_height.saturating_sub(mint_height);
        if confirmations < self.required_confirmations {
            return Err(CoinSpendError::InsufficientMaturity {
                mint_height,
                spend_height,
                required_confirmations: self.required_confirmations,
            });
        }
        Ok(())
    }

    /// Record a serial number as consumed. Fails with `DoubleSpend` if it already is; the
    /// ledger is left untouched in that case.
    pub fn record_spend(
        &mut self,
        serial: S,
        height: u32,
        tx_binding_hash: [u8; 32],
    ) -> Result<(), CoinSpendError> {
        if self.spends.has(&serial) {
            return Err(CoinSpendError::DoubleSpend);
        }
        self.spends.insert(
            serial,
            SpendRecord {
                height,
                tx_binding_hash,
            },
        );
        Ok(())
    }

    /// Remove a spend record on block disconnection, restoring the pre-spend state exactly.
    ///
    /// # Panics
    ///
    /// Panics if the serial number is not recorded, or is recorded at a different height
    /// than the block being disconnected. Either means connect/disconnect calls are out of
    /// sync, and continuing would silently corrupt the ledger.
    pub fn revert_spend(&mut self, serial: &S, height: u32) {
        match self.spends.remove(serial) {
            None => panic!("reverting spend that was never recorded"),
            Some(record) if record.height != height => panic!(
                "reverting spend at height {} but it was recorded at height {}",
                height, record.height
            ),
            Some(_) => (),
        }
    }

    pub fn is_spent(&self, serial: &S) -> bool {
        self.spends.has(serial)
    }

    pub fn spend_record(&self, serial: &S) -> Option<SpendRecord> {
        self.spends.get(serial)
    }

    pub fn spend_count(&self) -> u64 {
        self.spends.size()
    }

    /// Apply all of a block's spends, all-or-nothing: every serial number (including
    /// duplicates within the batch) is checked before the first write, so a failing block
    /// leaves the ledger exactly as it was. Callers run this only after the block's spend
    /// proofs have all verified.
    pub fn connect_block_spends(
        &mut self,
        height: u32,
        spends: &[(S, [u8; 32])],
    ) -> Result<(), CoinSpendError>
    where
        S: PartialEq,
    {
        for (i, (serial, _)) in spends.iter().enumerate() {
            if self.spends.has(serial) || spends[..i].iter().any(|(s, _)| s == serial) {
                return Err(CoinSpendError::DoubleSpend);
            }
        }
        for (serial, tx_binding_hash) in spends {
            self.spends.insert(
                serial.clone(),
                SpendRecord {
                    height,
                    tx_binding_hash: *tx_binding_hash,
                },
            );
        }
        Ok(())
    }

    /// Undo `connect_block_spends` for a disconnected block.
    ///
    /// # Panics
    ///
    /// Panics under the same contract as [`Self::revert_spend`].
    pub fn disconnect_block_spends(&mut self, height: u32, spends: &[(S, [u8; 32])]) {
        for (serial, _) in spends.iter().rev() {
            self.revert_spend(serial, height);
        }
    }

    /// Drop all state. Test isolation and reindexing only, never during normal operation.
    pub fn reset(&mut self) {
        self.spends.clear();
        self.mints.clear();
    }
}

/// Serial numbers claimed by transactions currently in the mempool. Admission checks the
/// ledger's tip state and this pending set; there is no other provisional view. Entries are
/// removed when their transaction is mined or evicted.
#[derive(Clone, Debug, Default)]
pub struct MempoolSpendTracker<S: Ord + Clone> {
    pending: BTreeSet<S>,
}

impl<S: Ord + Clone> MempoolSpendTracker<S> {
    pub fn new() -> Self {
        Self {
            pending: BTreeSet::new(),
        }
    }

    /// Claim a serial number for a mempool transaction. Rejects serials already consumed at
    /// the tip and serials another mempool transaction has claimed. Callers must re-check
    /// at block-template and acceptance time, since the tip may have advanced.
    pub fn try_admit<C, SS, MS>(
        &mut self,
        ledger: &DoubleSpendLedger<S, C, SS, MS>,
        serial: &S,
    ) -> Result<(), CoinSpendError>
    where
        C: Clone,
        SS: SpendState<S>,
        MS: MintState<C>,
    {
        if ledger.is_spent(serial) {
            return Err(CoinSpendError::DoubleSpend);
        }
        if self.pending.contains(serial) {
            return Err(CoinSpendError::AlreadyPendingInMempool);
        }
        self.pending.insert(serial.clone());
        Ok(())
    }

    /// Release a claim when its transaction is mined or evicted.
    pub fn remove(&mut self, serial: &S) {
        self.pending.remove(serial);
    }

    pub fn contains(&self, serial: &S) -> bool {
        self.pending.contains(serial)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
