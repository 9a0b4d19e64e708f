// SPDX-License-Identifier: Apache-2.0

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use test_case::test_case;

use g8r_lec::binding::Binding;
use g8r_lec::checker::{equiv, CheckRequest, Checker, Strategy};
use g8r_lec::diagnostics::MemorySink;
use g8r_lec::fuzz_utils::{arbitrary_netlist, mutate_one_gate, RandomNetlistOptions};
use g8r_lec::gate::{Netlist, Signal};
use g8r_lec::gate_sim;
use g8r_lec::netlist_builder::NetlistBuilder;
use g8r_lec::options::CheckerOptions;
use g8r_lec::test_utils::{de_morgan_pair, or_and_pair, xor_chain_vs_tree, TestPair};
use g8r_lec::verdict::Verdict;

fn memory_checker() -> Checker<MemorySink> {
    let _ = env_logger::builder().is_test(true).try_init();
    Checker::with_sink(CheckerOptions::default(), MemorySink::default())
}

fn check_flat(checker: &mut Checker<MemorySink>, pair: &TestPair) -> Verdict {
    checker
        .are_equal(&CheckRequest {
            lhs: &pair.lhs,
            rhs: &pair.rhs,
            inputs: &pair.inputs,
            outputs: &pair.outputs,
            strategy: Strategy::Flat,
        })
        .unwrap()
}

fn all_assignments(width: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..(1u32 << width)).map(move |a| (0..width).map(|i| (a >> i) & 1 == 1).collect())
}

fn simulates_equal(lhs: &Netlist, rhs: &Netlist) -> bool {
    all_assignments(lhs.inputs.len()).all(|inputs| {
        gate_sim::eval(lhs, &inputs, &[]).outputs == gate_sim::eval(rhs, &inputs, &[]).outputs
    })
}

#[test_case(0; "seed 0")]
#[test_case(1; "seed 1")]
#[test_case(2; "seed 2")]
#[test_case(3; "seed 3")]
fn test_random_netlist_is_equivalent_to_itself(seed: u64) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let options = RandomNetlistOptions {
        inputs: 6,
        gates: 40,
        outputs: 4,
        ..RandomNetlistOptions::default()
    };
    let net = arbitrary_netlist(&mut rng, "random", &options);
    let inputs = Binding::identity(&net.inputs);
    let outputs = Binding::identity(&net.outputs);
    assert!(equiv(&net, &net, &inputs, &outputs).unwrap());
}

#[test_case(1)]
#[test_case(2)]
#[test_case(4)]
#[test_case(7)]
fn test_de_morgan_is_equivalent(n: usize) {
    let pair = de_morgan_pair(n);
    assert!(equiv(&pair.lhs, &pair.rhs, &pair.inputs, &pair.outputs).unwrap());
}

#[test]
fn test_or_is_not_and() {
    let pair = or_and_pair();
    let mut checker = memory_checker();
    let verdict = check_flat(&mut checker, &pair);
    let cex = verdict.counterexample().expect("OR and AND differ");
    assert_ne!(cex.inputs[0].lhs_value, cex.inputs[1].lhs_value);
    for bound in &cex.inputs {
        assert_eq!(bound.lhs_value, bound.rhs_value);
    }

    let reports = &checker.sink().reports;
    assert_eq!(reports.len(), 1);
    assert!(
        reports[0].input_line == "inputs: 0|0=1|1, 1|1=0|0"
            || reports[0].input_line == "inputs: 0|0=0|0, 1|1=1|1",
        "{}",
        reports[0].input_line
    );
    assert_eq!(reports[0].output_line, "outputs: 2|2=1|0");
}

#[test_case(2)]
#[test_case(3)]
#[test_case(5)]
#[test_case(8)]
fn test_xor_chain_matches_tree(n: usize) {
    let pair = xor_chain_vs_tree(n);
    let verdict = check_flat(&mut memory_checker(), &pair);
    assert_eq!(verdict, Verdict::Equivalent);
    assert!(simulates_equal(&pair.lhs, &pair.rhs));
}

#[test]
fn test_xor5_against_tree_under_every_fixed_input() {
    // Both sides get the assignment folded into constant gates; one spare
    // input keeps the miter non-trivial.
    let pair = xor_chain_vs_tree(5);
    for assignment in all_assignments(5) {
        let fold = |net: &Netlist| -> Netlist {
            let mut b = NetlistBuilder::new(&net.name);
            let keep = b.add_input();
            let mut value_of = Vec::with_capacity(net.gates.len());
            for gate in &net.gates {
                let id = value_of.len();
                let r = match net.inputs.iter().position(|i| i.id == id) {
                    Some(k) => b.add_const(assignment[k]),
                    None => b.add_gate(
                        gate.kind,
                        gate.inputs
                            .iter()
                            .map(|s| Signal::always(value_of[s.node.id]))
                            .collect(),
                    ),
                };
                value_of.push(r);
            }
            b.add_output(value_of[net.outputs[0].id]);
            b.add_output(keep);
            b.build()
        };
        let folded = TestPair::positional(fold(&pair.lhs), fold(&pair.rhs));
        let verdict = check_flat(&mut memory_checker(), &folded);
        assert_eq!(verdict, Verdict::Equivalent, "assignment {:?}", assignment);
    }
}

#[test_case(10)]
#[test_case(11)]
#[test_case(12)]
#[test_case(13)]
#[test_case(14)]
#[test_case(15)]
fn test_verdict_agrees_with_exhaustive_simulation(seed: u64) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let options = RandomNetlistOptions {
        inputs: 5,
        gates: 24,
        outputs: 3,
        max_arity: 3,
        triggers: 0,
    };
    let net = arbitrary_netlist(&mut rng, "random", &options);
    let mutated = mutate_one_gate(&mut rng, &net);
    let expected = simulates_equal(&net, &mutated);

    let pair = TestPair::positional(net, mutated);
    let verdict = check_flat(&mut memory_checker(), &pair);
    assert_eq!(verdict.is_equiv(), expected, "{:?}", verdict);

    if let Some(cex) = verdict.counterexample() {
        let inputs: Vec<bool> = pair
            .lhs
            .inputs
            .iter()
            .map(|i| cex.lhs_input_value(*i, 0).unwrap())
            .collect();
        assert_ne!(
            gate_sim::eval(&pair.lhs, &inputs, &[]).outputs,
            gate_sim::eval(&pair.rhs, &inputs, &[]).outputs
        );
    }
}

#[test]
fn test_inequivalent_check_is_deterministic() {
    let pair = or_and_pair();
    let mut checker = memory_checker();
    let first = check_flat(&mut checker, &pair);
    let second = check_flat(&mut checker, &pair);
    assert_eq!(first, second);
    let reports = &checker.sink().reports;
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0], reports[1]);
    assert!(!reports[0].dimacs.is_empty());
}
