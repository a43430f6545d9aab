use criterion::{criterion_group, criterion_main, Criterion};
use powchain_core::{pow::ProofOfWork, Block, Candidate};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let payload: Vec<u8> = (0..256).map(|_| rng.gen()).collect();
    let candidate = Candidate {
        timestamp: 1_600_000_000,
        payload,
        prev_hash: Some(rng.gen()),
    };

    c.bench_function("mine_block_target_16", |b| {
        b.iter(|| {
            let pow = ProofOfWork::new(&candidate, 16).unwrap();
            let _mined = pow.run().unwrap();
        });
    });

    c.bench_function("mine_block_target_16_parallel", |b| {
        b.iter(|| {
            let pow = ProofOfWork::new(&candidate, 16).unwrap();
            let _mined = pow.run_parallel().unwrap();
        });
    });

    let (hash, nonce) = ProofOfWork::new(&candidate, 16).unwrap().run().unwrap();
    let block: Block = candidate.clone().seal(16, nonce, hash);
    c.bench_function("validate_block", |b| {
        b.iter(|| assert!(block.verify(16)));
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
