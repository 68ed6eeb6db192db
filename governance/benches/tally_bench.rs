use agora_governance::{isqrt, quadratic_weight};
use agora_types::TokenAmount;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn isqrt_bench(c: &mut Criterion) {
    c.bench_function("isqrt_u128_max", |b| b.iter(|| isqrt(black_box(u128::MAX))));
    c.bench_function("isqrt_30k_tokens", |b| {
        b.iter(|| isqrt(black_box(30_000u128 * 1_000_000_000_000_000_000)))
    });
}

fn quadratic_weight_bench(c: &mut Criterion) {
    let amounts: Vec<TokenAmount> = (1..=64u128)
        .map(|i| TokenAmount::from_tokens(i * 1_337))
        .collect();

    c.bench_function("quadratic_weight_64_voters", |b| {
        b.iter(|| {
            amounts
                .iter()
                .map(|a| quadratic_weight(black_box(*a), 18))
                .fold(0u128, |acc, w| acc.saturating_add(w))
        })
    });
    c.bench_function("quadratic_weight_6_decimals", |b| {
        b.iter(|| quadratic_weight(black_box(TokenAmount::new(30_000_000_000)), 6))
    });
}

criterion_group!(benches, isqrt_bench, quadratic_weight_bench);
criterion_main!(benches);
