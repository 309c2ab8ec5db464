#![cfg_attr(not(feature = "std"), no_std)]

//! One-out-of-many membership proofs following [Groth-Kohlweiss](https://eprint.iacr.org/2014/764)
//! with the n-ary generalization of [Bootle et al.](https://eprint.iacr.org/2015/643).
//!
//! Given a public list of group elements `C_0, .., C_{len-1}`, the prover shows knowledge of an
//! index `l` and randomness `r` such that `C_l` is a Pedersen commitment to 0, i.e. `C_l = h * r`,
//! without revealing `l`. An optional public offset `Z` turns the statement into
//! `C_l - Z = h * r`, which lets a caller prove that a hidden list element opens to the same
//! value as `Z` does.
//!
//! The list is treated as an `n`-ary tree of depth `m`, so a list of up to `N = n^m` elements
//! yields a proof of size `O(n*m)` and verifier cost dominated by one `O(N)` multi-scalar
//! multiplication. Lists shorter than `n^m` are padded by periodic wraparound: virtual position
//! `i >= len` denotes `C_{i mod len}`. Prover and verifier apply the same rule, so the padding
//! never needs to be materialized or transmitted.
//!
//! The proof is made non-interactive with the Fiat-Shamir heuristic; the challenge hashes the
//! setup parameters, the offset, the full commitment list and all first-round messages.

use ark_ff::PrimeField;
use digest::Digest;

use sigma_crypto_utils::hashing_utils::field_elem_from_try_and_incr;

pub mod error;
pub mod proof;
pub mod setup;

pub use error::OneOutOfManyError;
pub use proof::MembershipProof;
pub use setup::SetupParams;

/// Derive the Fiat-Shamir challenge scalar from the accumulated transcript bytes.
/// Uses try-and-increment; the transcript is public so variable time is acceptable.
pub fn compute_random_oracle_challenge<F: PrimeField, D: Digest>(challenge_bytes: &[u8]) -> F {
    field_elem_from_try_and_incr::<F, D>(challenge_bytes)
}
