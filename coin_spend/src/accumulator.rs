//! Per-denomination accumulation of public coin commitments.
//!
//! The accumulator keeps two views of the same set: an order-independent running aggregate
//! (`value`, the group sum of all accumulated commitments, digested into the checksum spend
//! proofs bind to) and the commitment list itself, which is the anonymity set membership
//! proofs range over. All operations are pure; callers hold whichever snapshots they need.
//!
//! Accumulating the same coin twice is a caller-enforced precondition, not something the
//! protocol detects: a duplicate gives two list positions the same opening and breaks the
//! one-redemption-per-coin guarantee at the proof layer.

use crate::{
    coin::{Denomination, PublicCoin},
    error::CoinSpendError,
};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{vec, vec::Vec};
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sigma_crypto_utils::{
    hashing_utils::field_elem_from_try_and_incr, serde_utils::ArkObjectBytes,
};

/// Append-only aggregate over one denomination's minted coins.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct CoinAccumulator<G: AffineRepr> {
    pub denomination: Denomination,
    /// Group sum of all accumulated commitments. Identical for any accumulation order.
    #[serde_as(as = "ArkObjectBytes")]
    pub value: G,
    /// The accumulated commitments in inclusion order; the anonymity set for spend proofs
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub coins: Vec<G>,
}

/// Data enabling one membership proof for one coin against one accumulator snapshot.
/// Becomes stale as soon as the accumulator advances; regenerate it from the new state.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct AccumulatorWitness<F: PrimeField> {
    /// Position of the coin in the snapshot's commitment list
    pub index: u32,
    /// Snapshot size at generation time
    pub set_size: u32,
    /// Checksum of the snapshot the witness was generated against
    #[serde_as(as = "ArkObjectBytes")]
    pub checksum: F,
}

impl<G: AffineRepr> CoinAccumulator<G> {
    pub fn initialize(denomination: Denomination) -> Self {
        Self {
            denomination,
            value: G::zero(),
            coins: vec![],
        }
    }

    /// Fold one coin in, returning the advanced accumulator. Commutative and associative in
    /// the aggregate value; fails only on group-level malformation or a denomination
    /// mismatch, never on content.
    pub fn accumulate(&self, coin: &PublicCoin<G>) -> Result<Self, CoinSpendError> {
        self.check_coin(coin)?;
        let mut coins = Vec::with_capacity(self.coins.len() + 1);
        coins.extend_from_slice(&self.coins);
        coins.push(coin.commitment);
        Ok(Self {
            denomination: self.denomination,
            value: (self.value.into_group() + coin.commitment).into_affine(),
            coins,
        })
    }

    /// Fold a block's worth of coins in, in the given order.
    pub fn accumulate_batch(&self, coins: &[PublicCoin<G>]) -> Result<Self, CoinSpendError> {
        let mut acc = self.clone();
        for coin in coins {
            acc = acc.accumulate(coin)?;
        }
        Ok(acc)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Digest of the snapshot: denomination, size and aggregate value. Order-independent,
    /// and embedded in every spend proof built against this snapshot.
    pub fn checksum<D: Digest>(&self) -> Result<G::ScalarField, CoinSpendError> {
        let mut bytes = vec![];
        self.denomination.serialize_compressed(&mut bytes)?;
        (self.coins.len() as u32).serialize_compressed(&mut bytes)?;
        self.value.serialize_compressed(&mut bytes)?;
        Ok(field_elem_from_try_and_incr::<G::ScalarField, D>(&bytes))
    }

    /// Locate `coin` in the accumulated set and bind a witness to the current snapshot.
    /// Fails with `NotMember` for a coin that was never accumulated here.
    pub fn generate_witness<D: Digest>(
        &self,
        coin: &PublicCoin<G>,
    ) -> Result<AccumulatorWitness<G::ScalarField>, CoinSpendError> {
        self.check_coin(coin)?;
        let index = self
            .coins
            .iter()
            .position(|c| *c == coin.commitment)
            .ok_or(CoinSpendError::NotMember)?;
        Ok(AccumulatorWitness {
            index: index as u32,
            set_size: self.coins.len() as u32,
            checksum: self.checksum::<D>()?,
        })
    }

    fn check_coin(&self, coin: &PublicCoin<G>) -> Result<(), CoinSpendError> {
        if !coin.is_well_formed() {
            return Err(CoinSpendError::MalformedCoin);
        }
        if coin.denomination != self.denomination {
            return Err(CoinSpendError::DenominationMismatch(
                coin.denomination.0,
                self.denomination.0,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coin::PrivateCoin, test_serialization, test_setup::test_params};
    use ark_bls12_381::G1Affine;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use blake2::Blake2b512;

    fn mint_coins(seed: u64, count: usize) -> Vec<PublicCoin<G1Affine>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let params = test_params(2, 3);
        (0..count)
            .map(|_| {
                PrivateCoin::mint(&mut rng, &params, Denomination(1))
                    .unwrap()
                    .public
                    .clone()
            })
            .collect()
    }

    #[test]
    fn order_independent_value() {
        let coins = mint_coins(0, 6);
        let acc = CoinAccumulator::initialize(Denomination(1));

        let forward = acc.accumulate_batch(&coins).unwrap();
        let mut reversed_coins = coins.clone();
        reversed_coins.reverse();
        let reversed = acc.accumulate_batch(&reversed_coins).unwrap();

        assert_eq!(forward.value, reversed.value);
        assert_eq!(
            forward.checksum::<Blake2b512>().unwrap(),
            reversed.checksum::<Blake2b512>().unwrap()
        );
        // the anonymity lists themselves do retain inclusion order
        assert_ne!(forward.coins, reversed.coins);
    }

    #[test]
    fn checksum_tracks_membership() {
        let coins = mint_coins(1, 3);
        let acc = CoinAccumulator::initialize(Denomination(1));
        let one = acc.accumulate(&coins[0]).unwrap();
        let two = one.accumulate(&coins[1]).unwrap();
        assert_ne!(
            one.checksum::<Blake2b512>().unwrap(),
            two.checksum::<Blake2b512>().unwrap()
        );
    }

    #[test]
    fn witness_generation() {
        let coins = mint_coins(2, 5);
        let acc = CoinAccumulator::initialize(Denomination(1))
            .accumulate_batch(&coins)
            .unwrap();

        let witness = acc.generate_witness::<Blake2b512>(&coins[3]).unwrap();
        assert_eq!(witness.index, 3);
        assert_eq!(witness.set_size, 5);
        assert_eq!(witness.checksum, acc.checksum::<Blake2b512>().unwrap());

        let outsider = mint_coins(3, 1).pop().unwrap();
        assert!(matches!(
            acc.generate_witness::<Blake2b512>(&outsider),
            Err(CoinSpendError::NotMember)
        ));
    }

    #[test]
    fn rejects_wrong_denomination_and_malformed() {
        let coins = mint_coins(4, 1);
        let acc = CoinAccumulator::<G1Affine>::initialize(Denomination(10));
        assert!(matches!(
            acc.accumulate(&coins[0]),
            Err(CoinSpendError::DenominationMismatch(1, 10))
        ));

        let identity = PublicCoin::<G1Affine> {
            commitment: G1Affine::zero(),
            denomination: Denomination(10),
        };
        assert!(matches!(
            acc.accumulate(&identity),
            Err(CoinSpendError::MalformedCoin)
        ));
    }

    #[test]
    fn accumulator_serialization() {
        use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
        let coins = mint_coins(5, 4);
        let acc = CoinAccumulator::initialize(Denomination(1))
            .accumulate_batch(&coins)
            .unwrap();
        test_serialization!(CoinAccumulator<G1Affine>, acc);

        let witness = acc.generate_witness::<Blake2b512>(&coins[0]).unwrap();
        test_serialization!(AccumulatorWitness<ark_bls12_381::Fr>, witness);
    }
}
