//! Shared fixtures for the crate's tests.

use crate::{coin::Denomination, setup::SpendParams};
use ark_bls12_381::G1Affine;
use blake2::Blake2b512;

/// Round-trip an object through compressed, uncompressed and serde encodings.
#[macro_export]
macro_rules! test_serialization {
    ($obj_type:ty, $obj: expr) => {
        let mut serz = vec![];
        CanonicalSerialize::serialize_compressed(&$obj, &mut serz).unwrap();
        let deserz: $obj_type = CanonicalDeserialize::deserialize_compressed(&serz[..]).unwrap();
        assert_eq!(deserz, $obj);

        let mut serz = vec![];
        $obj.serialize_uncompressed(&mut serz).unwrap();
        let deserz: $obj_type = CanonicalDeserialize::deserialize_uncompressed(&serz[..]).unwrap();
        assert_eq!(deserz, $obj);

        // Test JSON serialization
        let ser = serde_json::to_string(&$obj).unwrap();
        let deser = serde_json::from_str::<$obj_type>(&ser).unwrap();
        assert_eq!($obj, deser);

        // Test Message Pack serialization
        let ser = rmp_serde::to_vec_named(&$obj).unwrap();
        let deser = rmp_serde::from_slice::<$obj_type>(&ser).unwrap();
        assert_eq!($obj, deser);
    };
}

pub const TEST_DENOMINATIONS: [u64; 3] = [1, 10, 100];

/// Parameters over BLS12-381 G1 with a `required_confirmations` of 6 and activation at 0.
pub fn test_params(n: u32, m: u32) -> SpendParams<G1Affine> {
    SpendParams::new::<Blake2b512>(
        b"coin-spend-test-params",
        n,
        m,
        TEST_DENOMINATIONS.map(Denomination).to_vec(),
        6,
        0,
    )
    .unwrap()
}
