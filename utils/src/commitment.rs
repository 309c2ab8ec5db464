use crate::{
    concat_slices, hashing_utils::affine_group_elem_from_try_and_incr, serde_utils::ArkObjectBytes,
};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, UniformRand};
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// A Pedersen commitment key `(g, h)`. The commitment to `m` under randomness `r` is
/// `g * m + h * r` with opening `(m, r)`. Hiding under uniform `r`, binding under the
/// discrete log assumption between `g` and `h`.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PedersenCommitmentKey<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G,
}

impl<G: AffineRepr> PedersenCommitmentKey<G> {
    /// Derive a commitment key by hashing a label. The discrete log between `g` and `h` is
    /// unknown to everyone, including the creator.
    pub fn new<D: Digest>(label: &[u8]) -> Self {
        let g = affine_group_elem_from_try_and_incr::<G, D>(&concat_slices![label, b" : G"]);
        let h = affine_group_elem_from_try_and_incr::<G, D>(&concat_slices![label, b" : H"]);
        Self { g, h }
    }

    /// Commit to a message with the given randomness.
    pub fn commit(&self, message: &G::ScalarField, randomness: &G::ScalarField) -> G {
        self.commit_as_projective(message, randomness).into()
    }

    /// Commit to a message under fresh randomness sampled from `rng`. Returns the
    /// commitment together with the randomness needed to open it.
    pub fn commit_with_rng<R: RngCore>(
        &self,
        rng: &mut R,
        message: &G::ScalarField,
    ) -> (G, G::ScalarField) {
        let randomness = G::ScalarField::rand(rng);
        (self.commit(message, &randomness), randomness)
    }

    pub fn commit_as_projective(
        &self,
        message: &G::ScalarField,
        randomness: &G::ScalarField,
    ) -> G::Group {
        self.g * message + self.h * randomness
    }
}
