//! Coins. The public half is a Pedersen commitment plus a denomination tag; the private half
//! holds the serial-number seed and the commitment randomness and never leaves the minting
//! client.

use crate::{error::CoinSpendError, setup::SpendParams};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, vec::Vec, UniformRand};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sigma_crypto_utils::serde_utils::ArkObjectBytes;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Denomination tag of a coin. The set of allowed values is consensus configuration, not
/// protocol logic; see [`SpendParams::denominations`].
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Denomination(pub u64);

/// The on-chain face of a coin. Immutable once minted; its identity is the commitment value.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PublicCoin<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub commitment: G,
    pub denomination: Denomination,
}

impl<G: AffineRepr> PublicCoin<G> {
    /// Stable identity of the coin, used as the mint-index key in the ledger.
    pub fn id(&self) -> Result<Vec<u8>, CoinSpendError> {
        let mut bytes = Vec::with_capacity(self.commitment.compressed_size());
        self.commitment.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// The identity element can be opened trivially and must never enter an accumulator.
    pub fn is_well_formed(&self) -> bool {
        !self.commitment.is_zero()
    }
}

/// The minting client's secret state. Wiped on drop; the serial seed becomes public only as
/// the serial number, at the moment the coin is spent.
#[derive(Clone, PartialEq, Eq, Debug, Zeroize, ZeroizeOnDrop)]
pub struct PrivateCoin<G: AffineRepr> {
    #[zeroize(skip)]
    pub public: PublicCoin<G>,
    serial_seed: G::ScalarField,
    randomness: G::ScalarField,
}

impl<G: AffineRepr> PrivateCoin<G> {
    /// Mint a fresh coin: sample a serial seed, commit to it under fresh randomness.
    pub fn mint<R: RngCore>(
        rng: &mut R,
        params: &SpendParams<G>,
        denomination: Denomination,
    ) -> Result<Self, CoinSpendError> {
        if !params.supports_denomination(denomination) {
            return Err(CoinSpendError::UnsupportedDenomination(denomination.0));
        }
        let serial_seed = G::ScalarField::rand(rng);
        let (commitment, randomness) = params.comm_key.commit_with_rng(rng, &serial_seed);
        Ok(Self {
            public: PublicCoin {
                commitment,
                denomination,
            },
            serial_seed,
            randomness,
        })
    }

    /// The public, linkable serial number derived from the coin's secret: the committed
    /// value itself. Revealed exactly once, on spend.
    pub fn serial_number(&self) -> G::ScalarField {
        self.serial_seed
    }

    pub(crate) fn randomness(&self) -> G::ScalarField {
        self.randomness
    }
}
