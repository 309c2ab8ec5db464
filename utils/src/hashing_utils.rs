use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_std::vec::Vec;
use digest::Digest;

/// Hash bytes to a field element using try-and-increment. Variable time, only used on
/// public inputs like Fiat-Shamir challenges and setup generation.
pub fn field_elem_from_try_and_incr<F: PrimeField, D: Digest>(bytes: &[u8]) -> F {
    let mut hash = D::digest(bytes);
    let mut f = F::from_random_bytes(&hash);
    let mut j = 1u64;
    while f.is_none() {
        hash = D::digest(&attempt_bytes(bytes, j));
        f = F::from_random_bytes(&hash);
        j += 1;
    }
    f.unwrap()
}

/// Hash bytes to a point on the curve, returned in projective coordinates. Variable time,
/// only used on public inputs.
pub fn projective_group_elem_from_try_and_incr<G: AffineRepr, D: Digest>(
    bytes: &[u8],
) -> G::Group {
    let mut hash = D::digest(bytes);
    let mut g = G::from_random_bytes(&hash);
    let mut j = 1u64;
    while g.is_none() {
        hash = D::digest(&attempt_bytes(bytes, j));
        g = G::from_random_bytes(&hash);
        j += 1;
    }
    g.unwrap().mul_by_cofactor_to_group()
}

/// Hash bytes to a point on the curve, returned in affine coordinates.
pub fn affine_group_elem_from_try_and_incr<G: AffineRepr, D: Digest>(bytes: &[u8]) -> G {
    projective_group_elem_from_try_and_incr::<G, D>(bytes).into_affine()
}

fn attempt_bytes(bytes: &[u8], attempt: u64) -> Vec<u8> {
    crate::concat_slices![bytes, b"-attempt-", attempt.to_be_bytes()]
}
