//! The composite spend proof: one verifiable object per coin redemption.
//!
//! A spend publishes the coin's serial number `S`, a fresh re-blinded commitment
//! `C* = g * S + h * r*`, and two transcripts:
//!
//! - a [`MembershipProof`] over the accumulator's commitment list with offset `C*`, showing
//!   some hidden list element differs from `C*` only in its blinding term, i.e. commits to
//!   the same value,
//! - a [`SerialNumberProof`] showing `C*` commits to `S`, with the transaction metadata
//!   bound into its challenge.
//!
//! Together: some accumulated coin commits to `S`, and whoever produced the object knows
//! that coin's opening. Which coin stays hidden; `S` is the only linkable value and feeds
//! the double-spend ledger.
//!
//! [`MembershipProof`]: one_out_of_many::MembershipProof
//! [`SerialNumberProof`]: crate::serial_number::SerialNumberProof

use crate::{
    accumulator::{AccumulatorWitness, CoinAccumulator},
    coin::{Denomination, PrivateCoin},
    error::CoinSpendError,
    ledger::DoubleSpendLedger,
    persistence::{MintState, SpendState},
    serial_number::SerialNumberProof,
    setup::SpendParams,
};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{io::Write, rand::RngCore, vec, vec::Vec};
use digest::Digest;
use one_out_of_many::MembershipProof;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sigma_crypto_utils::{join, serde_utils::ArkObjectBytes};

/// External context a spend proof is bound to: which accumulator epoch it references and a
/// digest of the transaction carrying it. A proof captured from one transaction cannot be
/// replayed under different metadata.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SpendMetadata {
    pub accumulator_id: u32,
    pub tx_binding_hash: [u8; 32],
}

impl SpendMetadata {
    /// Bind to a serialized transaction by hashing it with SHA-256.
    pub fn from_tx_bytes(accumulator_id: u32, tx_bytes: &[u8]) -> Self {
        use sha2::Digest as _;
        let mut tx_binding_hash = [0u8; 32];
        tx_binding_hash.copy_from_slice(&sha2::Sha256::digest(tx_bytes));
        Self {
            accumulator_id,
            tx_binding_hash,
        }
    }

    pub fn challenge_contribution<W: Write>(&self, mut writer: W) -> Result<(), CoinSpendError> {
        self.accumulator_id.serialize_compressed(&mut writer)?;
        self.tx_binding_hash.serialize_compressed(&mut writer)?;
        Ok(())
    }

    pub(crate) fn to_bytes(self) -> Result<Vec<u8>, CoinSpendError> {
        let mut bytes = vec![];
        self.challenge_contribution(&mut bytes)?;
        Ok(bytes)
    }
}

/// One coin redemption. Serial number and denomination are public; everything else about the
/// coin stays hidden. Immutable once created.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct SpendProof<G: AffineRepr> {
    /// The coin's serial number, revealed exactly once
    #[serde_as(as = "ArkObjectBytes")]
    pub serial_number: G::ScalarField,
    pub denomination: Denomination,
    /// Fresh commitment to the serial number, the pivot both sub-proofs attach to
    #[serde_as(as = "ArkObjectBytes")]
    pub reblinded_commitment: G,
    pub membership: MembershipProof<G>,
    pub serial_proof: SerialNumberProof<G>,
    /// Checksum of the accumulator snapshot the membership proof ranges over
    #[serde_as(as = "ArkObjectBytes")]
    pub accumulator_checksum: G::ScalarField,
}

impl<G: AffineRepr> SpendProof<G> {
    /// Build a spend for `coin` against the accumulator snapshot `witness` was generated
    /// from. The witness must point at this coin (`WitnessMismatch` otherwise) and must
    /// match the accumulator's current state (`StaleWitness` after the set has advanced).
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        params: &SpendParams<G>,
        coin: &PrivateCoin<G>,
        accumulator: &CoinAccumulator<G>,
        witness: &AccumulatorWitness<G::ScalarField>,
        metadata: &SpendMetadata,
    ) -> Result<Self, CoinSpendError> {
        params.validate()?;
        let denomination = coin.public.denomination;
        if !params.supports_denomination(denomination) {
            return Err(CoinSpendError::UnsupportedDenomination(denomination.0));
        }
        if denomination != accumulator.denomination {
            return Err(CoinSpendError::DenominationMismatch(
                denomination.0,
                accumulator.denomination.0,
            ));
        }
        if witness.set_size as usize != accumulator.len()
            || witness.checksum != accumulator.checksum::<D>()?
        {
            return Err(CoinSpendError::StaleWitness);
        }
        if accumulator.coins.get(witness.index as usize) != Some(&coin.public.commitment) {
            return Err(CoinSpendError::WitnessMismatch);
        }

        let serial_number = coin.serial_number();
        // The membership statement ranges over C_i - C*; its secret opening is the
        // difference of the two blindings
        let (reblinded_commitment, r_star) =
            params.comm_key.commit_with_rng(rng, &serial_number);
        let delta_r = coin.randomness() - r_star;

        let membership = MembershipProof::new::<R, D>(
            rng,
            &accumulator.coins,
            witness.index as usize,
            &delta_r,
            Some(&reblinded_commitment),
            &params.membership,
        )?;
        let serial_proof = SerialNumberProof::new::<R, D>(
            rng,
            &params.comm_key,
            &reblinded_commitment,
            &serial_number,
            &r_star,
            &metadata.to_bytes()?,
        )?;

        Ok(Self {
            serial_number,
            denomination,
            reblinded_commitment,
            membership,
            serial_proof,
            accumulator_checksum: witness.checksum,
        })
    }

    /// Verify against an accumulator snapshot and the transaction context. Cheap structural
    /// checks run first; the two transcript verifications are independent and run in
    /// parallel when the `parallel` feature is on. Every failure is an `Err` for the caller
    /// to map to a transaction rejection; no partial side effects.
    pub fn verify<D: Digest>(
        &self,
        params: &SpendParams<G>,
        accumulator: &CoinAccumulator<G>,
        metadata: &SpendMetadata,
    ) -> Result<(), CoinSpendError> {
        params.validate()?;
        if !params.supports_denomination(self.denomination) {
            return Err(CoinSpendError::UnsupportedDenomination(self.denomination.0));
        }
        if self.denomination != accumulator.denomination {
            return Err(CoinSpendError::DenominationMismatch(
                self.denomination.0,
                accumulator.denomination.0,
            ));
        }
        if self.accumulator_checksum != accumulator.checksum::<D>()? {
            return Err(CoinSpendError::AccumulatorChecksumMismatch);
        }

        let metadata_bytes = metadata.to_bytes()?;
        let (membership_result, serial_result) = join!(
            self.membership
                .verify::<D>(
                    &accumulator.coins,
                    Some(&self.reblinded_commitment),
                    &params.membership,
                )
                .map_err(CoinSpendError::from),
            self.serial_proof.verify::<D>(
                &self.serial_number,
                &self.reblinded_commitment,
                &metadata_bytes,
                &params.comm_key,
            )
        );
        membership_result?;
        serial_result?;
        Ok(())
    }
}

/// Ledger-aware spend creation: the maturity of the coin's mint is checked before any
/// cryptographic work is attempted, per the coin state machine
/// `Minted -> Mature -> Spent`.
pub fn create_spend<G, R, D, SS, MS>(
    rng: &mut R,
    params: &SpendParams<G>,
    ledger: &DoubleSpendLedger<G::ScalarField, Vec<u8>, SS, MS>,
    coin: &PrivateCoin<G>,
    accumulator: &CoinAccumulator<G>,
    witness: &AccumulatorWitness<G::ScalarField>,
    metadata: &SpendMetadata,
    current_height: u32,
) -> Result<SpendProof<G>, CoinSpendError>
where
    G: AffineRepr,
    R: RngCore,
    D: Digest,
    SS: SpendState<G::ScalarField>,
    MS: MintState<Vec<u8>>,
{
    ledger.check_maturity(&coin.public.id()?, current_height)?;
    SpendProof::new::<R, D>(rng, params, coin, accumulator, witness, metadata)
}
