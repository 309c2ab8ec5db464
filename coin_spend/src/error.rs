use ark_serialize::SerializationError;
use ark_std::fmt::Debug;
use one_out_of_many::error::OneOutOfManyError;

#[derive(Debug)]
pub enum CoinSpendError {
    /// The commitment key and membership parameters disagree on the blinding base
    InconsistentSetupParams,
    /// Denomination is not part of the configured denomination set
    UnsupportedDenomination(u64),
    /// Coin and accumulator belong to different denomination groups
    DenominationMismatch(u64, u64),
    /// Coin commitment is the group identity or otherwise unusable
    MalformedCoin,
    /// The coin was never accumulated into this set
    NotMember,
    /// The witness does not point at the coin being spent
    WitnessMismatch,
    /// The witness was generated against an older accumulator snapshot and must be refreshed
    StaleWitness,
    /// Spend proof references a different accumulator snapshot than the one supplied
    AccumulatorChecksumMismatch,
    /// The coin's mint is not recorded, so maturity cannot be established
    UnknownCoin,
    /// The coin has not reached the required confirmation depth
    InsufficientMaturity {
        mint_height: u32,
        spend_height: u32,
        required_confirmations: u32,
    },
    /// Serial number already consumed at the current chain tip
    DoubleSpend,
    /// Serial number already claimed by another transaction in the mempool
    AlreadyPendingInMempool,
    /// Serial number proof response vector has the wrong length
    MalformedSerialNumberProof(usize, usize),
    /// Serial number proof equations do not hold. A rejection, not a fault.
    InvalidSerialNumberProof,
    /// The verification batch was cancelled before completing
    BatchCancelled,
    MembershipProof(OneOutOfManyError),
    Serialization(SerializationError),
}

impl From<OneOutOfManyError> for CoinSpendError {
    fn from(e: OneOutOfManyError) -> Self {
        Self::MembershipProof(e)
    }
}

impl From<SerializationError> for CoinSpendError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
