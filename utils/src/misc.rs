use crate::{concat_slices, hashing_utils::projective_group_elem_from_try_and_incr};
use ark_ec::{AffineRepr, CurveGroup};
use ark_std::{cfg_into_iter, rand::RngCore, vec::Vec, UniformRand};
use digest::Digest;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Generate `count` random elements using the supplied `rng`.
pub fn n_rand<T: UniformRand, R: RngCore>(rng: &mut R, count: usize) -> Vec<T> {
    (0..count).map(|_| T::rand(rng)).collect()
}

/// Derive `count` independent group elements by hashing a label and a counter. Used for
/// generator vectors where no discrete log relation may be known between any two outputs.
pub fn n_affine_group_elements<G: AffineRepr, D: Digest>(label: &[u8], count: u32) -> Vec<G> {
    G::Group::normalize_batch(
        &cfg_into_iter!(0..count)
            .map(|i| {
                projective_group_elem_from_try_and_incr::<G, D>(&concat_slices![
                    label,
                    i.to_le_bytes()
                ])
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Affine;
    use blake2::Blake2b512;

    #[test]
    fn generator_vector_has_distinct_elements() {
        let gens = n_affine_group_elements::<G1Affine, Blake2b512>(b"test-gens", 16);
        assert_eq!(gens.len(), 16);
        for i in 0..gens.len() {
            for j in i + 1..gens.len() {
                assert_ne!(gens[i], gens[j]);
            }
        }
    }
}
