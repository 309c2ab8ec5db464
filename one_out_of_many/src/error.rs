use ark_serialize::SerializationError;
use ark_std::fmt::Debug;

#[derive(Debug)]
pub enum OneOutOfManyError {
    /// The decomposition base `n` must be at least 2
    BaseTooSmall(usize),
    /// The number of decomposition levels `m` must be at least 1
    ZeroLevels,
    /// `n^m` does not fit the supported range
    CapacityOverflow(usize, usize),
    /// The commitment list is larger than the `n^m` positions the proof shape covers
    CapacityExceeded(usize, usize),
    EmptyCommitmentList,
    /// Number of digit bases does not equal `n*m`
    GeneratorVectorLengthMismatch(usize, usize),
    /// Proof was created over a list of different length than the one supplied
    SetSizeMismatch(usize, usize),
    /// Response vector length does not equal `m*(n-1)`
    ResponseVectorLengthMismatch(usize, usize),
    /// Number of coefficient commitments does not equal `m`
    CoefficientCommitmentLengthMismatch(usize, usize),
    /// A verification equation does not hold. The proof is well-formed but invalid.
    InvalidProof,
    Serialization(SerializationError),
}

impl From<SerializationError> for OneOutOfManyError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
