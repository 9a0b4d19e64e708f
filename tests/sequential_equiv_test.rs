// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use test_case::test_case;

use g8r_lec::binding::Binding;
use g8r_lec::checker::{equiv_with_triggers, CheckRequest, Checker, Strategy};
use g8r_lec::diagnostics::MemorySink;
use g8r_lec::fuzz_utils::{arbitrary_netlist, RandomNetlistOptions};
use g8r_lec::gate::{Event, GateKind, GateRef, Netlist, Signal};
use g8r_lec::netlist_builder::NetlistBuilder;
use g8r_lec::options::CheckerOptions;
use g8r_lec::test_utils::{
    late_divergence_pair, single_register, state_machine_pair, toggle, TestPair,
};
use g8r_lec::verdict::{Mismatch, PortKind, Verdict};

fn memory_checker() -> Checker<MemorySink> {
    let _ = env_logger::builder().is_test(true).try_init();
    Checker::with_sink(CheckerOptions::default(), MemorySink::default())
}

fn check(checker: &mut Checker<MemorySink>, pair: &TestPair, strategy: Strategy) -> Verdict {
    checker
        .are_equal(&CheckRequest {
            lhs: &pair.lhs,
            rhs: &pair.rhs,
            inputs: &pair.inputs,
            outputs: &pair.outputs,
            strategy,
        })
        .unwrap()
}

fn xnor_toggle() -> Netlist {
    let mut b = NetlistBuilder::new("xnor_toggle");
    let clk = b.add_input();
    let en = b.add_input();
    let q = b.add_trigger(GateKind::Dff);
    let next = b.add_xnor(&[q, en]);
    b.connect_trigger(q, vec![Signal::always(next), Signal::posedge(clk)]);
    b.add_output(q);
    b.build()
}

#[test]
fn test_latch_against_flop_fails_fast() {
    let pair = TestPair::positional(
        single_register("latch", GateKind::Latch),
        single_register("dff", GateKind::Dff),
    );
    let triggers = Binding::zip(&pair.lhs.triggers, &pair.rhs.triggers);
    let mut checker = memory_checker();
    let verdict = check(
        &mut checker,
        &pair,
        Strategy::RegisterCut {
            triggers: &triggers,
        },
    );
    assert_eq!(
        verdict,
        Verdict::Mismatch(Mismatch::TriggerKind {
            lhs: GateRef::new(2),
            rhs: GateRef::new(2),
            lhs_kind: GateKind::Latch,
            rhs_kind: GateKind::Dff,
        })
    );
    assert!(checker.sink().reports.is_empty());
    assert!(!equiv_with_triggers(
        &pair.lhs,
        &pair.rhs,
        &pair.inputs,
        &pair.outputs,
        &triggers
    )
    .unwrap());
}

#[test]
fn test_toggle_implementations_agree_under_register_cut() {
    let pair = TestPair::positional(toggle("xor", true), toggle("gates", false));
    let triggers = Binding::zip(&pair.lhs.triggers, &pair.rhs.triggers);
    assert!(equiv_with_triggers(
        &pair.lhs,
        &pair.rhs,
        &pair.inputs,
        &pair.outputs,
        &triggers
    )
    .unwrap());
}

#[test]
fn test_register_cut_reports_next_state_difference() {
    let pair = TestPair::positional(toggle("xor", true), xnor_toggle());
    let triggers = Binding::zip(&pair.lhs.triggers, &pair.rhs.triggers);
    let mut checker = memory_checker();
    let verdict = check(
        &mut checker,
        &pair,
        Strategy::RegisterCut {
            triggers: &triggers,
        },
    );
    let cex = verdict.counterexample().expect("XOR and XNOR toggles differ");
    // The cut register is among the bound inputs.
    assert!(cex.inputs.iter().any(|v| v.lhs.gate == pair.lhs.triggers[0]));
    let differing: Vec<GateRef> = cex.differing_outputs().map(|v| v.lhs.gate).collect();
    assert_eq!(differing, vec![GateRef::new(3)]);
    assert_eq!(checker.sink().reports.len(), 1);
}

#[test]
fn test_register_cut_checks_clock_events() {
    let mut b = NetlistBuilder::new("negedge");
    let d = b.add_input();
    let clk = b.add_input();
    let q = b.add_trigger(GateKind::Dff);
    b.connect_trigger(q, vec![Signal::always(d), Signal::negedge(clk)]);
    b.add_output(q);
    let pair = TestPair::positional(single_register("posedge", GateKind::Dff), b.build());
    let triggers = Binding::zip(&pair.lhs.triggers, &pair.rhs.triggers);
    let verdict = check(
        &mut memory_checker(),
        &pair,
        Strategy::RegisterCut {
            triggers: &triggers,
        },
    );
    assert_eq!(
        verdict,
        Verdict::Mismatch(Mismatch::TriggerEvent {
            lhs: GateRef::new(2),
            rhs: GateRef::new(2),
            pin: 1,
            lhs_event: Event::Posedge,
            rhs_event: Event::Negedge,
        })
    );
}

#[test]
fn test_register_cut_trigger_count_mismatch() {
    let machines = state_machine_pair();
    let pair = TestPair::positional(single_register("one", GateKind::Dff), machines.pair.rhs);
    let triggers = Binding::new();
    let verdict = check(
        &mut memory_checker(),
        &pair,
        Strategy::RegisterCut {
            triggers: &triggers,
        },
    );
    assert_eq!(
        verdict,
        Verdict::Mismatch(Mismatch::PortCount {
            port: PortKind::Triggers,
            lhs: 1,
            rhs: 2,
        })
    );
}

#[test]
#[should_panic(expected = "both must be triggers")]
fn test_register_cut_of_non_trigger_panics() {
    let pair = TestPair::positional(toggle("a", true), toggle("b", true));
    let triggers = Binding::from(vec![(GateRef::new(3), GateRef::new(3))]);
    check(
        &mut memory_checker(),
        &pair,
        Strategy::RegisterCut {
            triggers: &triggers,
        },
    );
}

#[test]
fn test_state_bridge_accepts_matching_encodings() {
    let machines = state_machine_pair();
    let verdict = check(
        &mut memory_checker(),
        &machines.pair,
        Strategy::StateBridge {
            encoder: &machines.encoder,
            decoder: &machines.decoder,
        },
    );
    assert_eq!(verdict, Verdict::Equivalent);
}

#[test]
fn test_state_bridge_rejects_wrong_decoder() {
    let machines = state_machine_pair();
    let mut checker = memory_checker();
    let verdict = check(
        &mut checker,
        &machines.pair,
        Strategy::StateBridge {
            encoder: &machines.encoder,
            decoder: &machines.wrong_decoder,
        },
    );
    assert!(verdict.counterexample().is_some(), "{:?}", verdict);
    let report = &checker.sink().reports[0];
    // Encoder outputs live in slot 2 of the bridged miter.
    assert!(report.output_line.contains("s2."), "{}", report.output_line);
}

#[test]
fn test_state_bridge_port_mismatch() {
    let machines = state_machine_pair();
    // Swapping the translators gives the encoder two inputs for four
    // one-hot registers.
    let verdict = check(
        &mut memory_checker(),
        &machines.pair,
        Strategy::StateBridge {
            encoder: &machines.decoder,
            decoder: &machines.encoder,
        },
    );
    assert_eq!(
        verdict,
        Verdict::Mismatch(Mismatch::BindingArity {
            port: PortKind::EncoderInputs,
            expected: 4,
            actual: 2,
        })
    );
}

#[test_case(1, true)]
#[test_case(3, true)]
#[test_case(4, false)]
#[test_case(6, false)]
fn test_bounded_check_finds_late_divergence(depth: usize, expect_equiv: bool) {
    let pair = late_divergence_pair();
    let mut checker = memory_checker();
    let verdict = check(&mut checker, &pair, Strategy::Bounded { depth });
    assert_eq!(verdict.is_equiv(), expect_equiv, "{:?}", verdict);
    if let Some(cex) = verdict.counterexample() {
        let frames: Vec<usize> = cex.differing_outputs().map(|v| v.frame).collect();
        assert!(frames.contains(&3), "{:?}", frames);
        assert!(frames.iter().all(|f| f % 4 == 3));
        assert!(checker.sink().reports[0].output_line.contains("@3:"));
    }
}

#[test]
fn test_bounded_toggles_agree() {
    let pair = TestPair::positional(toggle("xor", true), toggle("gates", false));
    let verdict = check(&mut memory_checker(), &pair, Strategy::Bounded { depth: 5 });
    assert_eq!(verdict, Verdict::Equivalent);
}

#[test_case(21)]
#[test_case(22)]
#[test_case(23)]
fn test_bounded_random_sequential_is_reflexive(seed: u64) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let options = RandomNetlistOptions {
        triggers: 3,
        ..RandomNetlistOptions::default()
    };
    let net = arbitrary_netlist(&mut rng, "seq", &options);
    let pair = TestPair {
        inputs: Binding::identity(&net.inputs),
        outputs: Binding::identity(&net.outputs),
        lhs: net.clone(),
        rhs: net,
    };
    let verdict = check(&mut memory_checker(), &pair, Strategy::Bounded { depth: 4 });
    assert_eq!(verdict, Verdict::Equivalent);
}

#[test]
#[should_panic(expected = "needs depth > 0")]
fn test_bounded_zero_depth_panics() {
    let pair = late_divergence_pair();
    check(&mut memory_checker(), &pair, Strategy::Bounded { depth: 0 });
}

fn two_registers(name: &str) -> Netlist {
    let mut b = NetlistBuilder::new(name);
    let clk = b.add_input();
    let ds = b.add_inputs(2);
    for d in ds {
        let q = b.add_trigger(GateKind::Dff);
        b.connect_trigger(q, vec![Signal::always(d), Signal::posedge(clk)]);
        b.add_output(q);
    }
    b.build()
}

#[test]
fn test_register_cut_rejects_repeated_trigger() {
    let pair = TestPair::positional(two_registers("a"), two_registers("b"));
    let (l, r) = (&pair.lhs.triggers, &pair.rhs.triggers);
    let triggers = Binding::from(vec![(l[0], r[0]), (l[0], r[1])]);
    let mut checker = memory_checker();
    let verdict = check(
        &mut checker,
        &pair,
        Strategy::RegisterCut {
            triggers: &triggers,
        },
    );
    assert_eq!(
        verdict,
        Verdict::Mismatch(Mismatch::BindingArity {
            port: PortKind::Triggers,
            expected: 2,
            actual: 1,
        })
    );
    assert!(checker.sink().reports.is_empty());

    let zipped = Binding::zip(l, r);
    let verdict = check(
        &mut checker,
        &pair,
        Strategy::RegisterCut { triggers: &zipped },
    );
    assert_eq!(verdict, Verdict::Equivalent);
}
