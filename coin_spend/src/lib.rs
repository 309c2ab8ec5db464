#![cfg_attr(not(feature = "std"), no_std)]

//! Anonymous redemption of minted coins.
//!
//! A client mints a [`PrivateCoin`]: a Pedersen commitment to a secret serial number under
//! secret randomness. Only the commitment, wrapped in a [`PublicCoin`], goes on chain, where
//! consensus appends it to the per-denomination [`CoinAccumulator`]. To redeem, the client
//! reveals the serial number and a [`SpendProof`] showing that *some* accumulated coin commits
//! to that serial, without identifying which one:
//!
//! - a [`MembershipProof`] ties a fresh re-blinded commitment to the accumulated set,
//! - a [`SerialNumberProof`] ties the re-blinded commitment to the revealed serial and to the
//!   spending transaction's metadata, so a captured proof cannot be replayed elsewhere.
//!
//! The revealed serial number is the only linkable value; the [`DoubleSpendLedger`] records it
//! at block connection and removes it at disconnection, so every coin is redeemable exactly
//! once per chain, across reorganizations. [`SpendBatchVerifier`] fans independent proof
//! verifications out over a thread pool during block validation; ledger mutation starts only
//! after the whole batch has verified.
//!
//! [`MembershipProof`]: one_out_of_many::MembershipProof
//! [`PrivateCoin`]: crate::coin::PrivateCoin
//! [`PublicCoin`]: crate::coin::PublicCoin
//! [`CoinAccumulator`]: crate::accumulator::CoinAccumulator
//! [`SpendProof`]: crate::spend::SpendProof
//! [`SerialNumberProof`]: crate::serial_number::SerialNumberProof
//! [`DoubleSpendLedger`]: crate::ledger::DoubleSpendLedger
//! [`SpendBatchVerifier`]: crate::batch_verify::SpendBatchVerifier

pub mod accumulator;
#[cfg(feature = "std")]
pub mod batch_verify;
pub mod coin;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod serial_number;
pub mod setup;
pub mod spend;

pub mod prelude {
    #[cfg(feature = "std")]
    pub use crate::batch_verify::{CancellationHandle, SpendBatchVerifier};
    pub use crate::{
        accumulator::{AccumulatorWitness, CoinAccumulator},
        coin::{Denomination, PrivateCoin, PublicCoin},
        error::CoinSpendError,
        ledger::{DoubleSpendLedger, MempoolSpendTracker, SpendRecord},
        persistence::{MintState, SpendState},
        serial_number::SerialNumberProof,
        setup::SpendParams,
        spend::{create_spend, SpendMetadata, SpendProof},
    };
}

#[cfg(test)]
#[macro_use]
pub mod test_setup;
#[cfg(test)]
pub mod tests;
