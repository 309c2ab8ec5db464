//! Proof of knowledge binding a re-blinded coin commitment to a publicly revealed serial
//! number and to the spending transaction's context.
//!
//! The spend publishes `C* = g * S + h * r*` for the revealed serial `S` and fresh blinding
//! `r*`. Knowledge of an opening of `C*` whose committed value equals `S` is equivalent to
//! knowledge of `r*` in `C* - g * S = h * r*`, which is what the protocol proves:
//!
//! 1. Prover picks random `b`, sends `t = h * b`.
//! 2. Challenge `c` hashes the commitment key, `C*`, `S`, `t` and the metadata hash of the
//!    transaction the spend is embedded in.
//! 3. Response `s = b + c * r*`; the verifier checks `h * s == t + (C* - g * S) * c`.
//!
//! Binding the metadata into the challenge is what makes a captured proof worthless in any
//! other transaction: the replayed context hashes to a different challenge.

use crate::error::CoinSpendError;
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{io::Write, rand::RngCore, vec, vec::Vec, UniformRand};
use digest::Digest;
use one_out_of_many::compute_random_oracle_challenge;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sigma_crypto_utils::{commitment::PedersenCommitmentKey, serde_utils::ArkObjectBytes};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// In-flight prover state. Holds the blinding and the witness, so it is wiped on drop.
#[derive(Clone, PartialEq, Eq, Debug, Zeroize, ZeroizeOnDrop)]
pub struct SerialNumberProtocol<G: AffineRepr> {
    /// Commitment to the prover's randomness
    #[zeroize(skip)]
    pub t: G,
    blinding: G::ScalarField,
    witness: G::ScalarField,
}

/// Non-interactive proof. The challenge is embedded so the verifier can check the
/// transcript hash alongside the group relation.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SerialNumberProof<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub challenge: G::ScalarField,
    /// One response per witness; this relation has a single witness, the re-blinding
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub responses: Vec<G::ScalarField>,
}

impl<G: AffineRepr> SerialNumberProtocol<G> {
    pub fn init(witness: G::ScalarField, blinding: G::ScalarField, h: &G) -> Self {
        Self {
            t: (*h * blinding).into(),
            blinding,
            witness,
        }
    }

    pub fn gen_proof(self, challenge: &G::ScalarField) -> SerialNumberProof<G> {
        SerialNumberProof {
            t: self.t,
            challenge: *challenge,
            responses: vec![self.blinding + self.witness * *challenge],
        }
    }

    pub fn compute_challenge_contribution<W: Write>(
        comm_key: &PedersenCommitmentKey<G>,
        reblinded_commitment: &G,
        serial_number: &G::ScalarField,
        t: &G,
        metadata_hash: &[u8],
        mut writer: W,
    ) -> Result<(), CoinSpendError> {
        comm_key.g.serialize_compressed(&mut writer)?;
        comm_key.h.serialize_compressed(&mut writer)?;
        reblinded_commitment.serialize_compressed(&mut writer)?;
        serial_number.serialize_compressed(&mut writer)?;
        t.serialize_compressed(&mut writer)?;
        writer
            .write_all(metadata_hash)
            .map_err(ark_serialize::SerializationError::IoError)?;
        Ok(())
    }
}

impl<G: AffineRepr> SerialNumberProof<G> {
    /// Prove knowledge of the re-blinding `r_star` opening `reblinded_commitment` to
    /// `serial_number`, bound to `metadata_hash`.
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        comm_key: &PedersenCommitmentKey<G>,
        reblinded_commitment: &G,
        serial_number: &G::ScalarField,
        r_star: &G::ScalarField,
        metadata_hash: &[u8],
    ) -> Result<Self, CoinSpendError> {
        let blinding = G::ScalarField::rand(rng);
        let protocol = SerialNumberProtocol::init(*r_star, blinding, &comm_key.h);
        let mut challenge_bytes = vec![];
        SerialNumberProtocol::compute_challenge_contribution(
            comm_key,
            reblinded_commitment,
            serial_number,
            &protocol.t,
            metadata_hash,
            &mut challenge_bytes,
        )?;
        let challenge = compute_random_oracle_challenge::<G::ScalarField, D>(&challenge_bytes);
        Ok(protocol.gen_proof(&challenge))
    }

    /// Check the proof against the revealed serial, the re-blinded commitment and the
    /// transaction context. Malformed structure and failed equations surface as distinct
    /// `Err` values for the caller to turn into a transaction rejection.
    pub fn verify<D: Digest>(
        &self,
        serial_number: &G::ScalarField,
        reblinded_commitment: &G,
        metadata_hash: &[u8],
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(), CoinSpendError> {
        if self.responses.len() != 1 {
            return Err(CoinSpendError::MalformedSerialNumberProof(
                self.responses.len(),
                1,
            ));
        }

        let mut challenge_bytes = vec![];
        SerialNumberProtocol::compute_challenge_contribution(
            comm_key,
            reblinded_commitment,
            serial_number,
            &self.t,
            metadata_hash,
            &mut challenge_bytes,
        )?;
        let challenge = compute_random_oracle_challenge::<G::ScalarField, D>(&challenge_bytes);
        if challenge != self.challenge {
            return Err(CoinSpendError::InvalidSerialNumberProof);
        }

        // h * s - (C* - g * S) * c == t
        let adjusted = reblinded_commitment.into_group() - comm_key.g * serial_number;
        let lhs = comm_key.h * self.responses[0] - adjusted * challenge;
        if lhs.into() == self.t {
            Ok(())
        } else {
            Err(CoinSpendError::InvalidSerialNumberProof)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_serialization, test_setup::test_params};
    use ark_bls12_381::{Fr, G1Affine};
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use blake2::Blake2b512;

    #[test]
    fn prove_and_verify() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let comm_key = test_params(2, 3).comm_key;

        let serial = Fr::rand(&mut rng);
        let (reblinded, r_star) = comm_key.commit_with_rng(&mut rng, &serial);
        let metadata = [7u8; 32];

        let proof = SerialNumberProof::new::<_, Blake2b512>(
            &mut rng, &comm_key, &reblinded, &serial, &r_star, &metadata,
        )
        .unwrap();
        proof
            .verify::<Blake2b512>(&serial, &reblinded, &metadata, &comm_key)
            .unwrap();

        test_serialization!(SerialNumberProof<G1Affine>, proof);
    }

    #[test]
    fn wrong_serial_rejected() {
        let mut rng = StdRng::seed_from_u64(1u64);
        let comm_key = test_params(2, 3).comm_key;

        let serial = Fr::rand(&mut rng);
        let (reblinded, r_star) = comm_key.commit_with_rng(&mut rng, &serial);
        let metadata = [7u8; 32];
        let proof = SerialNumberProof::new::<_, Blake2b512>(
            &mut rng, &comm_key, &reblinded, &serial, &r_star, &metadata,
        )
        .unwrap();

        let other_serial = Fr::rand(&mut rng);
        assert!(matches!(
            proof.verify::<Blake2b512>(&other_serial, &reblinded, &metadata, &comm_key),
            Err(CoinSpendError::InvalidSerialNumberProof)
        ));
    }

    #[test]
    fn replay_in_other_context_rejected() {
        let mut rng = StdRng::seed_from_u64(2u64);
        let comm_key = test_params(2, 3).comm_key;

        let serial = Fr::rand(&mut rng);
        let (reblinded, r_star) = comm_key.commit_with_rng(&mut rng, &serial);
        let proof = SerialNumberProof::new::<_, Blake2b512>(
            &mut rng,
            &comm_key,
            &reblinded,
            &serial,
            &r_star,
            &[7u8; 32],
        )
        .unwrap();

        assert!(proof
            .verify::<Blake2b512>(&serial, &reblinded, &[8u8; 32], &comm_key)
            .is_err());
    }

    #[test]
    fn malformed_response_vector_rejected() {
        let mut rng = StdRng::seed_from_u64(3u64);
        let comm_key = test_params(2, 3).comm_key;

        let serial = Fr::rand(&mut rng);
        let (reblinded, r_star) = comm_key.commit_with_rng(&mut rng, &serial);
        let metadata = [7u8; 32];
        let mut proof = SerialNumberProof::new::<_, Blake2b512>(
            &mut rng, &comm_key, &reblinded, &serial, &r_star, &metadata,
        )
        .unwrap();
        proof.responses.push(Fr::rand(&mut rng));

        assert!(matches!(
            proof.verify::<Blake2b512>(&serial, &reblinded, &metadata, &comm_key),
            Err(CoinSpendError::MalformedSerialNumberProof(2, 1))
        ));
    }
}
