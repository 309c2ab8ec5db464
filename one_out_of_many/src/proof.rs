//! Prover and verifier for the one-out-of-many relation.
//!
//! Protocol outline, for a list `C_0..C_{len-1}` padded by wraparound to `N = n^m` positions
//! and an optional public offset `Z` (write `D_i = C_{i mod len} - Z`):
//!
//! 1. The prover decomposes its secret position `l` into `m` base-`n` digits and commits to
//!    the digit indicator matrix `sigma` (`B`), to a random matrix `a` with zero-sum rows
//!    (`A`), and to the cross terms needed to show each `sigma` cell is a bit and each row
//!    sums to one (`C`, `D`).
//! 2. For each level `k < m` it commits to the degree-`k` coefficients of the index
//!    polynomials `p_i(x) = prod_j (sigma[j][i_j]*x + a[j][i_j])`, folded over the list
//!    (`Q_k`), blinded by `rho_k`.
//! 3. The Fiat-Shamir challenge `x` is hashed over the parameters, the offset, the full
//!    list and all first-round messages.
//! 4. The responses open the matrix relations at `x` and collapse the folded list:
//!    `sum_i p_i(x) * D_i - sum_k x^k * Q_k = (r*x^m - sum_k rho_k*x^k) * h`.
//!
//! Only `f[j][i]` for `i >= 1` is transmitted; the verifier reconstructs `f[j][0]` from the
//! row-sum constraint, which is what forces each `sigma` row to select exactly one digit.

use crate::{compute_random_oracle_challenge, error::OneOutOfManyError, setup::SetupParams};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, One, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    cfg_into_iter, end_timer,
    io::Write,
    rand::RngCore,
    start_timer,
    vec,
    vec::Vec,
    UniformRand,
};
use digest::Digest;
use itertools::izip;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sigma_crypto_utils::{expect_equality, misc::n_rand, serde_utils::ArkObjectBytes};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Proof that one element of a public commitment list is a commitment to 0 under the
/// parameters' randomness base, without revealing which. Constant size for a fixed `(n, m)`.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct MembershipProof<G: AffineRepr> {
    /// Length of the commitment list the proof was created over
    pub set_size: u32,
    #[serde_as(as = "ArkObjectBytes")]
    pub a: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub b: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub c: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub d: G,
    /// Blinded commitments to the index-polynomial coefficients, one per level
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub q: Vec<G>,
    /// Digit responses for digits `1..n` of each level, row-major
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub f: Vec<G::ScalarField>,
    #[serde_as(as = "ArkObjectBytes")]
    pub z_a: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub z_c: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub z: G::ScalarField,
}

impl<G: AffineRepr> MembershipProof<G> {
    /// Create a proof that `commitments[index mod len] - offset` opens to 0 with randomness
    /// `randomness` under `params.h`.
    ///
    /// `index` denotes a proof position, not necessarily a list index: positions at or past
    /// the list length refer to the wrapped element `index mod len`, and positions at or
    /// past `n^m` alias their residue mod `n^m`. A proof built for a position whose wrapped
    /// commitment the prover cannot actually open will be well-formed but will not verify.
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        commitments: &[G],
        index: usize,
        randomness: &G::ScalarField,
        offset: Option<&G>,
        params: &SetupParams<G>,
    ) -> Result<Self, OneOutOfManyError> {
        params.validate()?;
        let (n, m, capacity) = (params.n(), params.m(), params.capacity());
        let len = check_list_len(commitments, capacity)?;

        let prove_timer = start_timer!(|| "one-out-of-many prove");

        let digits = base_n_digits(index, n, m);

        // First-round randomness
        let r_a = G::ScalarField::rand(rng);
        let r_b = G::ScalarField::rand(rng);
        let r_c = G::ScalarField::rand(rng);
        let r_d = G::ScalarField::rand(rng);
        let rho: Vec<G::ScalarField> = n_rand(rng, m);

        // sigma is the digit indicator matrix; each row of `a` sums to 0 so that the
        // verifier can reconstruct the digit-0 response from the row-sum constraint
        let mut sigma = vec![G::ScalarField::zero(); m * n];
        let mut a = vec![G::ScalarField::zero(); m * n];
        for j in 0..m {
            sigma[j * n + digits[j]] = G::ScalarField::one();
            let mut row_sum = G::ScalarField::zero();
            for i in 1..n {
                let v = G::ScalarField::rand(rng);
                row_sum += v;
                a[j * n + i] = v;
            }
            a[j * n] = -row_sum;
        }

        // Cell-wise cross terms: c = a*(1 - 2*sigma) and d = -a^2 open the bit relation
        // sigma^2 = sigma at the challenge point
        let c_mat: Vec<G::ScalarField> = izip!(a.iter(), sigma.iter())
            .map(|(a, s)| *a * (G::ScalarField::one() - s.double()))
            .collect();
        let d_mat: Vec<G::ScalarField> = a.iter().map(|a| -a.square()).collect();

        let cap_a = params.com(&a, &r_a);
        let cap_b = params.com(&sigma, &r_b);
        let cap_c = params.com(&c_mat, &r_c);
        let cap_d = params.com(&d_mat, &r_d);

        // Coefficients of p_i(x) = prod_j (sigma[j][i_j]*x + a[j][i_j]) for every position.
        // Degrees 0..m-1 only; the degree-m coefficient is the index indicator and is
        // cancelled by the x^m term of the final equation instead of being committed.
        let coeffs_timer = start_timer!(|| "index polynomial coefficients");
        let coeffs: Vec<Vec<G::ScalarField>> = cfg_into_iter!(0..capacity)
            .map(|i| {
                let mut poly = Vec::with_capacity(m + 1);
                poly.push(G::ScalarField::one());
                let mut pos = i;
                for j in 0..m {
                    let digit = pos % n;
                    pos /= n;
                    let b0 = a[j * n + digit];
                    let b1 = sigma[j * n + digit];
                    let mut next = vec![G::ScalarField::zero(); poly.len() + 1];
                    for (k, coeff) in poly.iter().enumerate() {
                        next[k] += *coeff * b0;
                        next[k + 1] += *coeff * b1;
                    }
                    poly = next;
                }
                poly
            })
            .collect();
        end_timer!(coeffs_timer);

        let q_timer = start_timer!(|| "coefficient commitments");
        let q_proj: Vec<G::Group> = (0..m)
            .map(|k| {
                let mut fold = vec![G::ScalarField::zero(); len];
                let mut total = G::ScalarField::zero();
                for (i, poly) in coeffs.iter().enumerate() {
                    fold[i % len] += poly[k];
                    total += poly[k];
                }
                let mut point = G::Group::msm_unchecked(commitments, &fold) + params.h * rho[k];
                if let Some(z) = offset {
                    point -= *z * total;
                }
                point
            })
            .collect();
        end_timer!(q_timer);

        let mut first_round = G::Group::normalize_batch(&q_proj);
        first_round.extend(G::Group::normalize_batch(&[cap_a, cap_b, cap_c, cap_d]));
        let (q, abcd) = (
            first_round[..m].to_vec(),
            [
                first_round[m],
                first_round[m + 1],
                first_round[m + 2],
                first_round[m + 3],
            ],
        );

        let mut challenge_bytes = vec![];
        Self::compute_challenge_contribution(
            params,
            offset,
            commitments,
            &abcd,
            &q,
            &mut challenge_bytes,
        )?;
        let x = compute_random_oracle_challenge::<G::ScalarField, D>(&challenge_bytes);

        let mut f = Vec::with_capacity(m * (n - 1));
        for j in 0..m {
            for i in 1..n {
                f.push(sigma[j * n + i] * x + a[j * n + i]);
            }
        }
        let z_a = r_a + x * r_b;
        let z_c = x * r_c + r_d;

        let mut x_pow = G::ScalarField::one();
        let mut rho_sum = G::ScalarField::zero();
        for rho_k in &rho {
            rho_sum += *rho_k * x_pow;
            x_pow *= x;
        }
        let z = *randomness * x_pow - rho_sum;

        end_timer!(prove_timer);
        Ok(Self {
            set_size: len as u32,
            a: abcd[0],
            b: abcd[1],
            c: abcd[2],
            d: abcd[3],
            q,
            f,
            z_a,
            z_c,
            z,
        })
    }

    /// Check the proof against the list it claims to cover. Structural problems (wrong
    /// vector lengths, list/shape mismatches) and failed verification equations all surface
    /// as distinct `Err` values; nothing panics and no partial state is produced.
    pub fn verify<D: Digest>(
        &self,
        commitments: &[G],
        offset: Option<&G>,
        params: &SetupParams<G>,
    ) -> Result<(), OneOutOfManyError> {
        params.validate()?;
        let (n, m, capacity) = (params.n(), params.m(), params.capacity());
        let len = check_list_len(commitments, capacity)?;
        expect_equality!(
            self.set_size as usize,
            len,
            OneOutOfManyError::SetSizeMismatch
        );
        expect_equality!(
            self.f.len(),
            m * (n - 1),
            OneOutOfManyError::ResponseVectorLengthMismatch
        );
        expect_equality!(
            self.q.len(),
            m,
            OneOutOfManyError::CoefficientCommitmentLengthMismatch
        );

        let verify_timer = start_timer!(|| "one-out-of-many verify");

        let mut challenge_bytes = vec![];
        Self::compute_challenge_contribution(
            params,
            offset,
            commitments,
            &[self.a, self.b, self.c, self.d],
            &self.q,
            &mut challenge_bytes,
        )?;
        let x = compute_random_oracle_challenge::<G::ScalarField, D>(&challenge_bytes);

        // Reconstruct the digit-0 responses from the row-sum constraint
        let mut f_full = vec![G::ScalarField::zero(); m * n];
        for j in 0..m {
            let mut row_sum = G::ScalarField::zero();
            for i in 1..n {
                let v = self.f[j * (n - 1) + i - 1];
                row_sum += v;
                f_full[j * n + i] = v;
            }
            f_full[j * n] = x - row_sum;
        }

        // A + x*B == com(f; z_a)
        if !(params.com(&f_full, &self.z_a) - self.a.into_group() - self.b * x).is_zero() {
            end_timer!(verify_timer);
            return Err(OneOutOfManyError::InvalidProof);
        }

        // x*C + D == com(f*(x - f); z_c), the bit check for every digit cell
        let g_mat: Vec<G::ScalarField> = cfg_into_iter!(0..m * n)
            .map(|i| f_full[i] * (x - f_full[i]))
            .collect();
        if !(params.com(&g_mat, &self.z_c) - self.c * x - self.d.into_group()).is_zero() {
            end_timer!(verify_timer);
            return Err(OneOutOfManyError::InvalidProof);
        }

        // Evaluate every index polynomial at x and fold the list:
        // sum_i p_i(x)*(C_{i mod len} - Z) - sum_k x^k*Q_k == z*h
        let fold_timer = start_timer!(|| "list fold");
        let evals: Vec<G::ScalarField> = cfg_into_iter!(0..capacity)
            .map(|i| {
                let mut prod = G::ScalarField::one();
                let mut pos = i;
                for j in 0..m {
                    prod *= f_full[j * n + pos % n];
                    pos /= n;
                }
                prod
            })
            .collect();
        let mut fold = vec![G::ScalarField::zero(); len];
        let mut total = G::ScalarField::zero();
        for (i, eval) in evals.iter().enumerate() {
            fold[i % len] += *eval;
            total += *eval;
        }
        let mut lhs = G::Group::msm_unchecked(commitments, &fold);
        if let Some(z) = offset {
            lhs -= *z * total;
        }
        let mut x_pow = G::ScalarField::one();
        for q_k in &self.q {
            lhs -= *q_k * x_pow;
            x_pow *= x;
        }
        lhs -= params.h * self.z;
        end_timer!(fold_timer);
        end_timer!(verify_timer);

        if lhs.is_zero() {
            Ok(())
        } else {
            Err(OneOutOfManyError::InvalidProof)
        }
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        commitments: &[G],
        offset: Option<&G>,
        params: &SetupParams<G>,
        writer: W,
    ) -> Result<(), OneOutOfManyError> {
        Self::compute_challenge_contribution(
            params,
            offset,
            commitments,
            &[self.a, self.b, self.c, self.d],
            &self.q,
            writer,
        )
    }

    fn compute_challenge_contribution<W: Write>(
        params: &SetupParams<G>,
        offset: Option<&G>,
        commitments: &[G],
        abcd: &[G; 4],
        q: &[G],
        mut writer: W,
    ) -> Result<(), OneOutOfManyError> {
        params.challenge_contribution(&mut writer)?;
        match offset {
            Some(z) => {
                1u8.serialize_compressed(&mut writer)?;
                z.serialize_compressed(&mut writer)?;
            }
            None => 0u8.serialize_compressed(&mut writer)?,
        }
        (commitments.len() as u32).serialize_compressed(&mut writer)?;
        for c in commitments {
            c.serialize_compressed(&mut writer)?;
        }
        for p in abcd {
            p.serialize_compressed(&mut writer)?;
        }
        for q_k in q {
            q_k.serialize_compressed(&mut writer)?;
        }
        Ok(())
    }
}

fn check_list_len<G: AffineRepr>(
    commitments: &[G],
    capacity: usize,
) -> Result<usize, OneOutOfManyError> {
    let len = commitments.len();
    if len == 0 {
        return Err(OneOutOfManyError::EmptyCommitmentList);
    }
    if len > capacity {
        return Err(OneOutOfManyError::CapacityExceeded(len, capacity));
    }
    Ok(len)
}

/// Base-`n` digits of `i`, least significant first, exactly `m` of them. Values at or past
/// `n^m` alias their residue.
fn base_n_digits(mut i: usize, n: usize, m: usize) -> Vec<usize> {
    let mut digits = Vec::with_capacity(m);
    for _ in 0..m {
        digits.push(i % n);
        i /= n;
    }
    digits
}
