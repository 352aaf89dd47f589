use ark_bn254::{Bn254, Fr};
use ark_ff::UniformRand;
use criterion::Criterion;
use preimage_core::{
    groth16::{
        phase2, prove, verify_prepared, Ceremony, Phase1Srs, PreparedVerifyingKey, ProverOptions,
        SetupOptions,
    },
    poseidon2::Poseidon2,
    r1cs::{poseidon2::PreimageCircuit, witness::WitnessEvaluator},
    utils::cancel::CancellationToken,
};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn benchmark_pipeline(c: &mut Criterion, msm_chunk_size: usize) {
    let mut rng = ChaCha20Rng::seed_from_u64(111111u64);
    let poseidon = Poseidon2::bn254();
    let circuit = PreimageCircuit::build(poseidon).unwrap();
    let cancel = CancellationToken::new();
    let setup_options = SetupOptions { msm_chunk_size };
    let prover_options = ProverOptions { msm_chunk_size };

    let mut phase1 = Ceremony::new(Phase1Srs::<Bn254>::new(8).unwrap());
    phase1.contribute(&mut rng, &setup_options, &cancel).unwrap();
    let pk = phase2::initialize(
        &circuit.constraint_system().to_matrices(),
        phase1.current(),
        &cancel,
    )
    .unwrap();
    let pvk = PreparedVerifyingKey::from(pk.vk.clone());

    let preimage = [Fr::rand(&mut rng), Fr::rand(&mut rng)];
    let digest = poseidon.hash(&preimage);
    let assignment = circuit.assignment(preimage, digest);

    c.bench_function("Poseidon2 hash", |b| {
        b.iter(|| poseidon.hash(&preimage));
    });
    c.bench_function("Preimage witness", |b| {
        b.iter(|| {
            let mut evaluator = WitnessEvaluator::new(circuit.constraint_system());
            evaluator.assign_all(&assignment).unwrap();
            evaluator.evaluate().unwrap()
        });
    });

    let mut evaluator = WitnessEvaluator::new(circuit.constraint_system());
    evaluator.assign_all(&assignment).unwrap();
    let witness = evaluator.evaluate().unwrap();
    c.bench_function(&format!("Groth16 prove (chunk {msm_chunk_size})"), |b| {
        b.iter(|| prove(&pk, &witness, &mut rng, &prover_options, &cancel).unwrap());
    });

    let proof = prove(&pk, &witness, &mut rng, &prover_options, &cancel).unwrap();
    c.bench_function("Groth16 verify", |b| {
        b.iter(|| verify_prepared(&pvk, &[digest], &proof).unwrap());
    });
}

fn main() {
    let mut criterion = Criterion::default()
        .configure_from_args()
        .warm_up_time(std::time::Duration::from_secs(3));

    benchmark_pipeline(&mut criterion, 1 << 12);

    criterion.final_summary();
}
