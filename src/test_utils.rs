// SPDX-License-Identifier: Apache-2.0

//! Hand-built netlists shared by unit tests, integration tests and benches.

use crate::binding::Binding;
use crate::gate::{GateKind, GateRef, Netlist, Signal};
use crate::netlist_builder::NetlistBuilder;

/// Two designs with bindings between their inputs and outputs.
pub struct TestPair {
    pub lhs: Netlist,
    pub rhs: Netlist,
    pub inputs: Binding,
    pub outputs: Binding,
}

impl TestPair {
    /// Pairs inputs and outputs positionally.
    pub fn positional(lhs: Netlist, rhs: Netlist) -> Self {
        let inputs = Binding::zip(&lhs.inputs, &rhs.inputs);
        let outputs = Binding::zip(&lhs.outputs, &rhs.outputs);
        TestPair {
            lhs,
            rhs,
            inputs,
            outputs,
        }
    }
}

/// `NOT(OR(x1..xn))` against `AND(NOT(x1)..NOT(xn))`.
pub fn de_morgan_pair(n: usize) -> TestPair {
    let mut b = NetlistBuilder::new("not_of_or");
    let xs = b.add_inputs(n);
    let or = b.add_or(&xs);
    let y = b.add_not(or);
    b.add_output(y);
    let lhs = b.build();

    let mut b = NetlistBuilder::new("and_of_nots");
    let xs = b.add_inputs(n);
    let nots: Vec<GateRef> = xs.iter().map(|x| b.add_not(*x)).collect();
    let y = b.add_and(&nots);
    b.add_output(y);
    let rhs = b.build();

    TestPair::positional(lhs, rhs)
}

/// `OR(x1, x2)` against `AND(x1, x2)`.
pub fn or_and_pair() -> TestPair {
    let mut b = NetlistBuilder::new("or2");
    let xs = b.add_inputs(2);
    let y = b.add_or(&xs);
    b.add_output(y);
    let lhs = b.build();

    let mut b = NetlistBuilder::new("and2");
    let xs = b.add_inputs(2);
    let y = b.add_and(&xs);
    b.add_output(y);
    let rhs = b.build();

    TestPair::positional(lhs, rhs)
}

/// A single `n`-input XOR against a balanced tree of 2-input XORs.
pub fn xor_chain_vs_tree(n: usize) -> TestPair {
    let mut b = NetlistBuilder::new(&format!("xor{}", n));
    let xs = b.add_inputs(n);
    let y = b.add_xor(&xs);
    b.add_output(y);
    let lhs = b.build();

    let mut b = NetlistBuilder::new(&format!("xor{}_tree", n));
    let mut level = b.add_inputs(n);
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            match chunk {
                [x, y] => next.push(b.add_xor(&[*x, *y])),
                [x] => next.push(*x),
                _ => unreachable!(),
            }
        }
        level = next;
    }
    b.add_output(level[0]);
    let rhs = b.build();

    TestPair::positional(lhs, rhs)
}

/// One register storing input `d`; `kind` is `Latch` or `Dff`.
pub fn single_register(name: &str, kind: GateKind) -> Netlist {
    let mut b = NetlistBuilder::new(name);
    let d = b.add_input();
    let ctl = b.add_input();
    let q = b.add_trigger(kind);
    let control = match kind {
        GateKind::Latch => Signal::level1(ctl),
        _ => Signal::posedge(ctl),
    };
    b.connect_trigger(q, vec![Signal::always(d), control]);
    b.add_output(q);
    b.build()
}

/// Toggle flop `q' = q ^ en`, built either with an XOR or with AND/OR/NOT.
pub fn toggle(name: &str, with_xor: bool) -> Netlist {
    let mut b = NetlistBuilder::new(name);
    let clk = b.add_input();
    let en = b.add_input();
    let q = b.add_trigger(GateKind::Dff);
    let next = if with_xor {
        b.add_xor(&[q, en])
    } else {
        let nq = b.add_not(q);
        let nen = b.add_not(en);
        let hold = b.add_and(&[q, nen]);
        let flip = b.add_and(&[nq, en]);
        b.add_or(&[hold, flip])
    };
    b.connect_trigger(q, vec![Signal::always(next), Signal::posedge(clk)]);
    b.add_output(q);
    b.build()
}

/// Two-bit free-running counter whose output is `count == 3`, against the
/// same counter with a constant-zero output. They first differ in frame 3.
pub fn late_divergence_pair() -> TestPair {
    fn counter(name: &str, flag_last: bool) -> Netlist {
        let mut b = NetlistBuilder::new(name);
        let clk = b.add_input();
        let b0 = b.add_trigger(GateKind::Dff);
        let b1 = b.add_trigger(GateKind::Dff);
        let n0 = b.add_not(b0);
        let n1 = b.add_xor(&[b1, b0]);
        b.connect_trigger(b0, vec![Signal::always(n0), Signal::posedge(clk)]);
        b.connect_trigger(b1, vec![Signal::always(n1), Signal::posedge(clk)]);
        let out = if flag_last {
            b.add_and(&[b0, b1])
        } else {
            b.add_const(false)
        };
        b.add_output(out);
        b.build()
    }
    TestPair::positional(counter("counter", true), counter("never", false))
}

/// A four-state machine that advances when `step` is high and flags state 3,
/// stored one-hot in `lhs` and binary in `rhs`.
pub struct StateMachinePair {
    pub pair: TestPair,
    /// One-hot to binary.
    pub encoder: Netlist,
    /// Binary to one-hot.
    pub decoder: Netlist,
    /// A decoder with states 1 and 2 swapped.
    pub wrong_decoder: Netlist,
}

fn one_hot_machine() -> Netlist {
    let mut b = NetlistBuilder::new("one_hot");
    let clk = b.add_input();
    let step = b.add_input();
    let hot: Vec<GateRef> = (0..4).map(|_| b.add_trigger(GateKind::Dff)).collect();
    let idle = b.add_not(step);
    for i in 0..4 {
        let prev = hot[(i + 3) % 4];
        let advance = b.add_and(&[step, prev]);
        let hold = b.add_and(&[idle, hot[i]]);
        let next = b.add_or(&[advance, hold]);
        b.connect_trigger(hot[i], vec![Signal::always(next), Signal::posedge(clk)]);
    }
    b.add_output(hot[3]);
    b.build()
}

fn binary_machine() -> Netlist {
    let mut b = NetlistBuilder::new("binary");
    let clk = b.add_input();
    let step = b.add_input();
    let b0 = b.add_trigger(GateKind::Dff);
    let b1 = b.add_trigger(GateKind::Dff);
    let next0 = b.add_xor(&[b0, step]);
    let carry = b.add_and(&[b0, step]);
    let next1 = b.add_xor(&[b1, carry]);
    b.connect_trigger(b0, vec![Signal::always(next0), Signal::posedge(clk)]);
    b.connect_trigger(b1, vec![Signal::always(next1), Signal::posedge(clk)]);
    let last = b.add_and(&[b0, b1]);
    b.add_output(last);
    b.build()
}

fn one_hot_to_binary() -> Netlist {
    let mut b = NetlistBuilder::new("encode");
    let hot = b.add_inputs(4);
    let bit0 = b.add_or(&[hot[1], hot[3]]);
    let bit1 = b.add_or(&[hot[2], hot[3]]);
    b.add_output(bit0);
    b.add_output(bit1);
    b.build()
}

fn binary_to_one_hot(swap_middle: bool) -> Netlist {
    let mut b = NetlistBuilder::new(if swap_middle { "bad_decode" } else { "decode" });
    let bits = b.add_inputs(2);
    let n0 = b.add_not(bits[0]);
    let n1 = b.add_not(bits[1]);
    let s0 = b.add_and(&[n1, n0]);
    let s1 = b.add_and(&[n1, bits[0]]);
    let s2 = b.add_and(&[bits[1], n0]);
    let s3 = b.add_and(&[bits[1], bits[0]]);
    let order = if swap_middle {
        [s0, s2, s1, s3]
    } else {
        [s0, s1, s2, s3]
    };
    for s in order {
        b.add_output(s);
    }
    b.build()
}

pub fn state_machine_pair() -> StateMachinePair {
    StateMachinePair {
        pair: TestPair::positional(one_hot_machine(), binary_machine()),
        encoder: one_hot_to_binary(),
        decoder: binary_to_one_hot(false),
        wrong_decoder: binary_to_one_hot(true),
    }
}

/// A ripple-carry adder together with one gate group per bit, suitable for
/// `Netlist::with_subnets`.
///
/// Inputs are `a0..an, b0..bn, cin`; outputs are the sum bits then the
/// carry out. The `xor3` flavor uses a 3-input XOR and a majority OR of ANDs;
/// the other uses two 2-input XORs. Within each bit the sum gate precedes
/// the carry gate. `bug_at` replaces the carry of that bit with `a | b`.
pub fn ripple_adder(
    name: &str,
    bits: usize,
    xor3: bool,
    bug_at: Option<usize>,
) -> (Netlist, Vec<Vec<GateRef>>) {
    let mut b = NetlistBuilder::new(name);
    let a = b.add_inputs(bits);
    let bb = b.add_inputs(bits);
    let mut carry = b.add_input();
    let mut groups = Vec::with_capacity(bits);
    let mut sums = Vec::with_capacity(bits);
    for i in 0..bits {
        let first = b.gate_count();
        let (x, y) = (a[i], bb[i]);
        let sum;
        let next;
        if xor3 {
            sum = b.add_xor(&[x, y, carry]);
            let xy = b.add_and(&[x, y]);
            let xc = b.add_and(&[x, carry]);
            let yc = b.add_and(&[y, carry]);
            next = b.add_or(&[xy, xc, yc]);
        } else {
            let t = b.add_xor(&[x, y]);
            sum = b.add_xor(&[t, carry]);
            let xy = b.add_and(&[x, y]);
            let tc = b.add_and(&[t, carry]);
            next = b.add_or(&[xy, tc]);
        }
        let next = if bug_at == Some(i) {
            b.add_or(&[x, y])
        } else {
            next
        };
        groups.push((first..b.gate_count()).map(GateRef::new).collect());
        sums.push(sum);
        carry = next;
    }
    for sum in sums {
        b.add_output(sum);
    }
    b.add_output(carry);
    (b.build(), groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_sim;

    #[test]
    fn test_ripple_adder_adds() {
        let (net, groups) = ripple_adder("add3", 3, false, None);
        assert_eq!(groups.len(), 3);
        for a in 0..8u32 {
            for b in 0..8u32 {
                let mut inputs: Vec<bool> = (0..3).map(|i| (a >> i) & 1 == 1).collect();
                inputs.extend((0..3).map(|i| (b >> i) & 1 == 1));
                inputs.push(false);
                let result = gate_sim::eval(&net, &inputs, &[]);
                let got = result
                    .outputs
                    .iter()
                    .enumerate()
                    .fold(0u32, |acc, (i, v)| acc | ((*v as u32) << i));
                assert_eq!(got, a + b);
            }
        }
    }

    #[test]
    fn test_state_machines_flag_state_three() {
        let machines = state_machine_pair();
        let frames: Vec<Vec<bool>> = vec![vec![false, true]; 4];
        let one_hot = gate_sim::simulate_from_reset(&machines.pair.lhs, &frames);
        let binary = gate_sim::simulate_from_reset(&machines.pair.rhs, &frames);
        // Binary visits 0, 1, 2, 3; the one-hot machine starts outside of
        // its encoding and never flags.
        let flags: Vec<bool> = binary.iter().map(|o| o[0]).collect();
        assert_eq!(flags, vec![false, false, false, true]);
        assert!(one_hot.iter().all(|o| !o[0]));
    }
}
