use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcgz_core::{
    lpn::{LpnEncoderConfig, LpnParams, SparseLpnEncoder},
    prg::Prg,
    Block,
};
use rand::SeedableRng;

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lpn");

    for params in &LpnParams::PRESETS[..2] {
        let mut prg = Prg::from_seed(Block::ZERO);
        let seed = prg.random_block();
        let e = prg.random_block_vec(params.k() as usize);

        for parallel in [false, true] {
            let config = LpnEncoderConfig {
                parallel,
                ..Default::default()
            };
            let encoder = SparseLpnEncoder::from_params(config, seed, params);
            let mut y = prg.random_block_vec(params.n() as usize);

            group.bench_function(
                format!("encode n={} k={} parallel={parallel}", params.n(), params.k()),
                |b| b.iter(|| encoder.encode_into(black_box(&mut y), black_box(&e))),
            );
        }
    }
}

criterion_group! {
    name = lpn;
    config = Criterion::default().sample_size(10);
    targets = criterion_benchmark
}
criterion_main!(lpn);
