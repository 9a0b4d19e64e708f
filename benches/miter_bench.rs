// SPDX-License-Identifier: Apache-2.0

//! Criterion benchmarks for miter construction and solving on a ripple-carry
//! adder pair and on random netlists checked against themselves.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use g8r_lec::binding::Binding;
use g8r_lec::checker::{CheckRequest, Checker, Strategy};
use g8r_lec::diagnostics::NullSink;
use g8r_lec::fuzz_utils::{arbitrary_netlist, RandomNetlistOptions};
use g8r_lec::options::CheckerOptions;
use g8r_lec::test_utils::ripple_adder;

fn quiet_checker() -> Checker<NullSink> {
    let options = CheckerOptions {
        dump_cnf: false,
        replay_counterexamples: false,
        ..CheckerOptions::default()
    };
    Checker::with_sink(options, NullSink)
}

fn bench_adder(c: &mut Criterion) {
    let mut group = c.benchmark_group("adder_equiv");
    for bits in [8usize, 16, 32] {
        let (lhs, _) = ripple_adder("add_xor3", bits, true, None);
        let (rhs, _) = ripple_adder("add_xor2", bits, false, None);
        let inputs = Binding::zip(&lhs.inputs, &rhs.inputs);
        let outputs = Binding::zip(&lhs.outputs, &rhs.outputs);
        group.bench_with_input(BenchmarkId::from_parameter(bits), &bits, |b, _| {
            b.iter(|| {
                let verdict = quiet_checker()
                    .are_equal(&CheckRequest {
                        lhs: &lhs,
                        rhs: &rhs,
                        inputs: &inputs,
                        outputs: &outputs,
                        strategy: Strategy::Flat,
                    })
                    .unwrap();
                assert!(verdict.is_equiv());
            })
        });
    }
    group.finish();
}

fn bench_random_reflexive(c: &mut Criterion) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let options = RandomNetlistOptions {
        inputs: 16,
        gates: 400,
        outputs: 8,
        max_arity: 4,
        triggers: 0,
    };
    let net = arbitrary_netlist(&mut rng, "random", &options);
    let inputs = Binding::identity(&net.inputs);
    let outputs = Binding::identity(&net.outputs);
    c.bench_function("random_reflexive_400", |b| {
        b.iter(|| {
            quiet_checker()
                .are_equal(&CheckRequest {
                    lhs: &net,
                    rhs: &net,
                    inputs: &inputs,
                    outputs: &outputs,
                    strategy: Strategy::Flat,
                })
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_adder, bench_random_reflexive);
criterion_main!(benches);
