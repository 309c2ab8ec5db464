//! End-to-end flows: mint, accumulate, spend, block validation, reorg.

use crate::{
    accumulator::CoinAccumulator,
    batch_verify::SpendBatchVerifier,
    coin::{Denomination, PrivateCoin},
    error::CoinSpendError,
    ledger::DoubleSpendLedger,
    persistence::test::{InMemoryMintState, InMemorySpendState},
    setup::SpendParams,
    spend::{create_spend, SpendMetadata, SpendProof},
    test_serialization,
    test_setup::test_params,
};
use ark_bls12_381::{Fr, G1Affine};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    rand::{rngs::StdRng, SeedableRng},
    vec::Vec,
};
use blake2::Blake2b512;
use std::{sync::Arc, time::Instant};

type Ledger = DoubleSpendLedger<Fr, Vec<u8>, InMemorySpendState<Fr>, InMemoryMintState<Vec<u8>>>;

fn new_ledger() -> Ledger {
    DoubleSpendLedger::new(InMemorySpendState::new(), InMemoryMintState::new(), 6)
}

/// Mint `count` coins of denomination 1 and accumulate them all.
fn minted_set(
    rng: &mut StdRng,
    params: &SpendParams<G1Affine>,
    count: usize,
) -> (Vec<PrivateCoin<G1Affine>>, CoinAccumulator<G1Affine>) {
    let coins: Vec<_> = (0..count)
        .map(|_| PrivateCoin::mint(rng, params, Denomination(1)).unwrap())
        .collect();
    let accumulator = CoinAccumulator::initialize(Denomination(1))
        .accumulate_batch(&coins.iter().map(|c| c.public.clone()).collect::<Vec<_>>())
        .unwrap();
    (coins, accumulator)
}

fn spend_coin(
    rng: &mut StdRng,
    params: &SpendParams<G1Affine>,
    coins: &[PrivateCoin<G1Affine>],
    accumulator: &CoinAccumulator<G1Affine>,
    index: usize,
    metadata: &SpendMetadata,
) -> SpendProof<G1Affine> {
    let witness = accumulator
        .generate_witness::<Blake2b512>(&coins[index].public)
        .unwrap();
    SpendProof::new::<_, Blake2b512>(rng, params, &coins[index], accumulator, &witness, metadata)
        .unwrap()
}

#[test]
fn spend_completeness() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let params = test_params(2, 4);
    let (coins, accumulator) = minted_set(&mut rng, &params, 10);
    let metadata = SpendMetadata::from_tx_bytes(1, b"tx-bytes");

    for index in [0usize, 4, 9] {
        let spend = spend_coin(&mut rng, &params, &coins, &accumulator, index, &metadata);
        spend
            .verify::<Blake2b512>(&params, &accumulator, &metadata)
            .unwrap();
        assert_eq!(spend.serial_number, coins[index].serial_number());
    }
}

#[test]
fn spend_survives_serialization() {
    let mut rng = StdRng::seed_from_u64(1u64);
    let params = test_params(2, 3);
    let (coins, accumulator) = minted_set(&mut rng, &params, 6);
    let metadata = SpendMetadata::from_tx_bytes(1, b"tx");

    let spend = spend_coin(&mut rng, &params, &coins, &accumulator, 2, &metadata);
    test_serialization!(SpendProof<G1Affine>, spend);
    test_serialization!(SpendMetadata, metadata);

    let mut bytes = vec![];
    spend.serialize_compressed(&mut bytes).unwrap();
    let restored = SpendProof::<G1Affine>::deserialize_compressed(&bytes[..]).unwrap();
    restored
        .verify::<Blake2b512>(&params, &accumulator, &metadata)
        .unwrap();
}

#[test]
fn spend_bound_to_transaction_metadata() {
    let mut rng = StdRng::seed_from_u64(2u64);
    let params = test_params(2, 3);
    let (coins, accumulator) = minted_set(&mut rng, &params, 8);
    let metadata = SpendMetadata::from_tx_bytes(1, b"original-tx");

    let spend = spend_coin(&mut rng, &params, &coins, &accumulator, 3, &metadata);

    let other_tx = SpendMetadata::from_tx_bytes(1, b"replayed-tx");
    assert!(spend
        .verify::<Blake2b512>(&params, &accumulator, &other_tx)
        .is_err());

    let other_epoch = SpendMetadata {
        accumulator_id: 2,
        ..metadata
    };
    assert!(spend
        .verify::<Blake2b512>(&params, &accumulator, &other_epoch)
        .is_err());
}

#[test]
fn spend_bound_to_accumulator_snapshot() {
    let mut rng = StdRng::seed_from_u64(3u64);
    let params = test_params(2, 4);
    let (coins, accumulator) = minted_set(&mut rng, &params, 9);
    let metadata = SpendMetadata::from_tx_bytes(1, b"tx");

    let spend = spend_coin(&mut rng, &params, &coins, &accumulator, 5, &metadata);

    // the accumulator advances by one coin; the old proof no longer binds
    let newcomer = PrivateCoin::mint(&mut rng, &params, Denomination(1)).unwrap();
    let advanced = accumulator.accumulate(&newcomer.public).unwrap();
    assert!(matches!(
        spend.verify::<Blake2b512>(&params, &advanced, &metadata),
        Err(CoinSpendError::AccumulatorChecksumMismatch)
    ));
}

#[test]
fn stale_witness_and_witness_mismatch() {
    let mut rng = StdRng::seed_from_u64(4u64);
    let params = test_params(2, 4);
    let (coins, accumulator) = minted_set(&mut rng, &params, 7);
    let metadata = SpendMetadata::from_tx_bytes(1, b"tx");

    // witness generated before the set advanced
    let stale = accumulator
        .generate_witness::<Blake2b512>(&coins[1].public)
        .unwrap();
    let newcomer = PrivateCoin::mint(&mut rng, &params, Denomination(1)).unwrap();
    let advanced = accumulator.accumulate(&newcomer.public).unwrap();
    assert!(matches!(
        SpendProof::new::<_, Blake2b512>(&mut rng, &params, &coins[1], &advanced, &stale, &metadata),
        Err(CoinSpendError::StaleWitness)
    ));

    // witness pointing at a different coin
    let wrong = accumulator
        .generate_witness::<Blake2b512>(&coins[2].public)
        .unwrap();
    assert!(matches!(
        SpendProof::new::<_, Blake2b512>(
            &mut rng,
            &params,
            &coins[1],
            &accumulator,
            &wrong,
            &metadata
        ),
        Err(CoinSpendError::WitnessMismatch)
    ));
}

#[test]
fn maturity_gating_end_to_end() {
    let mut rng = StdRng::seed_from_u64(5u64);
    let params = test_params(2, 3);
    let (coins, accumulator) = minted_set(&mut rng, &params, 5);
    let metadata = SpendMetadata::from_tx_bytes(1, b"tx");

    let mut ledger = new_ledger();
    let mint_height = 100u32;
    for coin in &coins {
        ledger.record_mint(coin.public.id().unwrap(), mint_height);
    }
    let witness = accumulator
        .generate_witness::<Blake2b512>(&coins[0].public)
        .unwrap();

    // fails cheaply at depths 1..=5, succeeds at depth 6
    for height in mint_height + 1..mint_height + 6 {
        assert!(matches!(
            create_spend::<_, _, Blake2b512, _, _>(
                &mut rng,
                &params,
                &ledger,
                &coins[0],
                &accumulator,
                &witness,
                &metadata,
                height,
            ),
            Err(CoinSpendError::InsufficientMaturity {
                mint_height: 100,
                ..
            })
        ));
    }
    let spend = create_spend::<_, _, Blake2b512, _, _>(
        &mut rng,
        &params,
        &ledger,
        &coins[0],
        &accumulator,
        &witness,
        &metadata,
        mint_height + 6,
    )
    .unwrap();
    spend
        .verify::<Blake2b512>(&params, &accumulator, &metadata)
        .unwrap();
}

#[test]
fn block_validation_verifies_batch_then_mutates_ledger() {
    let mut rng = StdRng::seed_from_u64(6u64);
    let params = test_params(2, 4);
    let (coins, accumulator) = minted_set(&mut rng, &params, 12);
    let mut ledger = new_ledger();

    // a block redeeming 4 coins, each in its own transaction
    let spends: Vec<(SpendProof<G1Affine>, SpendMetadata)> = (0..4)
        .map(|i| {
            let metadata = SpendMetadata::from_tx_bytes(1, &[i as u8]);
            (
                spend_coin(&mut rng, &params, &coins, &accumulator, i, &metadata),
                metadata,
            )
        })
        .collect();

    // verification fans out over the pool against a shared read-only snapshot
    let params = Arc::new(params);
    let snapshot = Arc::new(accumulator);
    let mut verifier = SpendBatchVerifier::new();
    let start = Instant::now();
    for (spend, metadata) in &spends {
        let spend = spend.clone();
        let metadata = *metadata;
        let params = Arc::clone(&params);
        let snapshot = Arc::clone(&snapshot);
        verifier.submit(move || spend.verify::<Blake2b512>(&params, &snapshot, &metadata));
    }
    verifier.wait().unwrap();
    println!("Time to verify block of 4 spends: {:?}", start.elapsed());

    // only now is the ledger touched, atomically for the whole block
    let height = 200u32;
    let block: Vec<(Fr, [u8; 32])> = spends
        .iter()
        .map(|(spend, metadata)| (spend.serial_number, metadata.tx_binding_hash))
        .collect();
    ledger.connect_block_spends(height, &block).unwrap();

    // a later block trying to redeem one of the same coins is rejected by the ledger
    let replay = SpendMetadata::from_tx_bytes(1, b"replay");
    let second = spend_coin(&mut rng, &params, &coins, &snapshot, 0, &replay);
    second
        .verify::<Blake2b512>(&params, &snapshot, &replay)
        .unwrap();
    assert!(matches!(
        ledger.record_spend(second.serial_number, height + 1, replay.tx_binding_hash),
        Err(CoinSpendError::DoubleSpend)
    ));

    // reorg: disconnecting the block frees the serials again
    ledger.disconnect_block_spends(height, &block);
    ledger
        .record_spend(second.serial_number, height + 1, replay.tx_binding_hash)
        .unwrap();
}

#[test]
fn batch_with_one_bad_spend_fails_before_ledger_mutation() {
    let mut rng = StdRng::seed_from_u64(7u64);
    let params = test_params(2, 3);
    let (coins, accumulator) = minted_set(&mut rng, &params, 6);
    let mut ledger = new_ledger();

    let metadata = SpendMetadata::from_tx_bytes(1, b"tx");
    let good = spend_coin(&mut rng, &params, &coins, &accumulator, 0, &metadata);
    let mut tampered = spend_coin(&mut rng, &params, &coins, &accumulator, 1, &metadata);
    tampered.serial_number = coins[2].serial_number();

    let params = Arc::new(params);
    let snapshot = Arc::new(accumulator);
    let mut verifier = SpendBatchVerifier::new();
    for spend in [good.clone(), tampered.clone()] {
        let params = Arc::clone(&params);
        let snapshot = Arc::clone(&snapshot);
        verifier.submit(move || spend.verify::<Blake2b512>(&params, &snapshot, &metadata));
    }
    assert!(verifier.wait().is_err());

    // the failed batch must leave the ledger untouched
    assert_eq!(ledger.spend_count(), 0);
    assert!(!ledger.is_spent(&good.serial_number));
    ledger.reset();
}

#[test]
fn spend_denomination_must_match_accumulator() {
    let mut rng = StdRng::seed_from_u64(8u64);
    let params = test_params(2, 3);
    let (coins, accumulator) = minted_set(&mut rng, &params, 5);
    let metadata = SpendMetadata::from_tx_bytes(1, b"tx");
    let spend = spend_coin(&mut rng, &params, &coins, &accumulator, 0, &metadata);

    let other_group = CoinAccumulator::<G1Affine>::initialize(Denomination(10));
    assert!(matches!(
        spend.verify::<Blake2b512>(&params, &other_group, &metadata),
        Err(CoinSpendError::DenominationMismatch(1, 10))
    ));
}
