//! Consensus parameter surface. Everything the proof system consumes as read-only
//! configuration lives in [`SpendParams`]: the commitment key, the membership proof shape,
//! the denomination set, the maturity depth and the activation height.

use crate::{coin::Denomination, error::CoinSpendError};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use digest::Digest;
use one_out_of_many::SetupParams;
use serde::{Deserialize, Serialize};
use sigma_crypto_utils::{commitment::PedersenCommitmentKey, concat_slices};

/// Parameters shared by every participant. The membership parameters reuse the commitment
/// key's blinding base `h`, which is what lets the one-out-of-many relation range over
/// differences of coin commitments.
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct SpendParams<G: AffineRepr> {
    pub comm_key: PedersenCommitmentKey<G>,
    pub membership: SetupParams<G>,
    /// Allowed coin denominations
    pub denominations: Vec<Denomination>,
    /// Confirmation depth a mint must reach before the coin becomes spendable
    pub required_confirmations: u32,
    /// Height at which the proof system becomes consensus-valid
    pub activation_height: u32,
}

impl<G: AffineRepr> SpendParams<G> {
    /// Derive all bases from `label`. Deterministic, so every node configured with the same
    /// label and shape arrives at identical parameters.
    pub fn new<D: Digest>(
        label: &[u8],
        n: u32,
        m: u32,
        denominations: Vec<Denomination>,
        required_confirmations: u32,
        activation_height: u32,
    ) -> Result<Self, CoinSpendError> {
        let comm_key = PedersenCommitmentKey::<G>::new::<D>(label);
        let membership = SetupParams::new_with_randomness_base::<D>(
            &concat_slices![label, b" : membership"],
            comm_key.h,
            n,
            m,
        )?;
        Ok(Self {
            comm_key,
            membership,
            denominations,
            required_confirmations,
            activation_height,
        })
    }

    pub fn validate(&self) -> Result<(), CoinSpendError> {
        self.membership.validate()?;
        if self.membership.h != self.comm_key.h {
            return Err(CoinSpendError::InconsistentSetupParams);
        }
        Ok(())
    }

    pub fn supports_denomination(&self, denomination: Denomination) -> bool {
        self.denominations.contains(&denomination)
    }

    pub fn is_active(&self, height: u32) -> bool {
        height >= self.activation_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Affine;
    use blake2::Blake2b512;

    fn test_params() -> SpendParams<G1Affine> {
        SpendParams::new::<Blake2b512>(
            b"spend-params-test",
            2,
            3,
            [1, 10, 100].map(Denomination).to_vec(),
            6,
            1000,
        )
        .unwrap()
    }

    #[test]
    fn shared_blinding_base() {
        let params = test_params();
        params.validate().unwrap();
        assert_eq!(params.comm_key.h, params.membership.h);

        let mut broken = params.clone();
        broken.membership.h = broken.membership.f[0];
        assert!(matches!(
            broken.validate(),
            Err(CoinSpendError::InconsistentSetupParams)
        ));
    }

    #[test]
    fn denomination_set_and_activation() {
        let params = test_params();
        assert!(params.supports_denomination(Denomination(10)));
        assert!(!params.supports_denomination(Denomination(25)));
        assert!(!params.is_active(999));
        assert!(params.is_active(1000));
    }

    #[test]
    fn deterministic_derivation() {
        let a = test_params();
        let b = test_params();
        assert_eq!(a, b);
    }
}
