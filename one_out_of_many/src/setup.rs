//! Setup parameters for the one-out-of-many proof: the decomposition shape `(n, m)` and the
//! bases used for the digit-matrix commitments.

use crate::error::OneOutOfManyError;
use ark_ec::{AffineRepr, VariableBaseMSM};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{io::Write, vec::Vec};
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sigma_crypto_utils::{
    concat_slices, hashing_utils::affine_group_elem_from_try_and_incr,
    misc::n_affine_group_elements, serde_utils::ArkObjectBytes,
};

/// Largest supported `n^m`. Proof positions are indexed by `u32` on the wire.
const MAX_CAPACITY: u64 = u32::MAX as u64;

/// Public parameters for proofs over lists of up to `n^m` commitments.
///
/// `h` is the randomness base; it must be the same base the list's commitments use for
/// their blinding term, since the final verification equation checks that the folded list
/// collapses to a multiple of `h`. `f` holds `n*m` independent bases, one per cell of the
/// `m x n` digit matrix committed to in the first round.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SetupParams<G: AffineRepr> {
    pub n: u32,
    pub m: u32,
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G,
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub f: Vec<G>,
}

impl<G: AffineRepr> SetupParams<G> {
    /// Derive all bases by hashing `label`. No discrete log relation between any two of the
    /// derived elements is known to anyone.
    pub fn new<D: Digest>(label: &[u8], n: u32, m: u32) -> Result<Self, OneOutOfManyError> {
        check_shape(n, m)?;
        let h = affine_group_elem_from_try_and_incr::<G, D>(&concat_slices![label, b" : h"]);
        let f = n_affine_group_elements::<G, D>(&concat_slices![label, b" : f"], n * m);
        Ok(Self { n, m, h, f })
    }

    /// Construct from an existing randomness base, deriving only the digit bases. Used when
    /// the commitment list's blinding base is fixed by an outer protocol.
    pub fn new_with_randomness_base<D: Digest>(
        label: &[u8],
        h: G,
        n: u32,
        m: u32,
    ) -> Result<Self, OneOutOfManyError> {
        check_shape(n, m)?;
        let f = n_affine_group_elements::<G, D>(&concat_slices![label, b" : f"], n * m);
        Ok(Self { n, m, h, f })
    }

    pub fn validate(&self) -> Result<(), OneOutOfManyError> {
        check_shape(self.n, self.m)?;
        let expected = (self.n * self.m) as usize;
        if self.f.len() != expected {
            return Err(OneOutOfManyError::GeneratorVectorLengthMismatch(
                self.f.len(),
                expected,
            ));
        }
        Ok(())
    }

    pub fn n(&self) -> usize {
        self.n as usize
    }

    pub fn m(&self) -> usize {
        self.m as usize
    }

    /// `n^m`, the number of proof positions.
    pub fn capacity(&self) -> usize {
        self.n().pow(self.m)
    }

    /// Commit to an `m x n` scalar matrix (row-major) under randomness `rho`:
    /// `rho * h + sum M[j][i] * f[j*n + i]`.
    pub fn com(&self, matrix: &[G::ScalarField], rho: &G::ScalarField) -> G::Group {
        debug_assert_eq!(matrix.len(), self.f.len());
        G::Group::msm_unchecked(&self.f, matrix) + self.h * rho
    }

    pub fn challenge_contribution<W: Write>(&self, mut writer: W) -> Result<(), OneOutOfManyError> {
        self.n.serialize_compressed(&mut writer)?;
        self.m.serialize_compressed(&mut writer)?;
        self.h.serialize_compressed(&mut writer)?;
        self.f.serialize_compressed(&mut writer)?;
        Ok(())
    }
}

fn check_shape(n: u32, m: u32) -> Result<(), OneOutOfManyError> {
    if n < 2 {
        return Err(OneOutOfManyError::BaseTooSmall(n as usize));
    }
    if m == 0 {
        return Err(OneOutOfManyError::ZeroLevels);
    }
    match (n as u64).checked_pow(m) {
        Some(c) if c <= MAX_CAPACITY => Ok(()),
        _ => Err(OneOutOfManyError::CapacityOverflow(n as usize, m as usize)),
    }
}
