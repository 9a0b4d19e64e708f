// SPDX-License-Identifier: Apache-2.0

//! Seeded random netlists for property tests and benches.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::gate::{GateKind, GateRef, Netlist, Signal};
use crate::netlist_builder::NetlistBuilder;

const COMBINATIONAL_KINDS: [GateKind; 10] = [
    GateKind::Nop,
    GateKind::Not,
    GateKind::And,
    GateKind::Nand,
    GateKind::Or,
    GateKind::Nor,
    GateKind::Xor,
    GateKind::Xnor,
    GateKind::Zero,
    GateKind::One,
];

#[derive(Debug, Clone, Copy)]
pub struct RandomNetlistOptions {
    pub inputs: usize,
    pub gates: usize,
    pub outputs: usize,
    /// Upper bound on the operand count of n-ary gates.
    pub max_arity: usize,
    /// Number of `Dff` registers; their data inputs are drawn from the
    /// combinational gates.
    pub triggers: usize,
}

impl Default for RandomNetlistOptions {
    fn default() -> Self {
        RandomNetlistOptions {
            inputs: 4,
            gates: 16,
            outputs: 2,
            max_arity: 3,
            triggers: 0,
        }
    }
}

fn arbitrary_operands<R: Rng>(
    rng: &mut R,
    kind: GateKind,
    pool: &[GateRef],
    max_arity: usize,
) -> Vec<Signal> {
    let arity = match kind.fixed_arity() {
        Some(n) => n,
        None => rng.gen_range(1..=max_arity.max(1)),
    };
    (0..arity)
        .map(|_| Signal::always(*pool.choose(rng).unwrap_or(&pool[0])))
        .collect()
}

/// Generates a random netlist. Every gate only reads gates created before it
/// (or registers), so the result is free of combinational cycles.
pub fn arbitrary_netlist<R: Rng>(
    rng: &mut R,
    name: &str,
    options: &RandomNetlistOptions,
) -> Netlist {
    assert!(options.inputs > 0, "arbitrary_netlist: need at least one input");
    let mut b = NetlistBuilder::new(name);
    let mut pool = b.add_inputs(options.inputs);
    let clk = pool[0];
    let registers: Vec<GateRef> = (0..options.triggers)
        .map(|_| b.add_trigger(GateKind::Dff))
        .collect();
    pool.extend(&registers);

    let mut created = Vec::with_capacity(options.gates);
    for _ in 0..options.gates {
        let kind = *COMBINATIONAL_KINDS.choose(rng).unwrap_or(&GateKind::And);
        let operands = arbitrary_operands(rng, kind, &pool, options.max_arity);
        let gate = b.add_gate(kind, operands);
        pool.push(gate);
        created.push(gate);
    }
    let drivers = if created.is_empty() { &pool } else { &created };
    for register in registers {
        let data = *drivers.choose(rng).unwrap_or(&clk);
        b.connect_trigger(register, vec![Signal::always(data), Signal::posedge(clk)]);
    }
    for _ in 0..options.outputs {
        let output = *drivers.choose(rng).unwrap_or(&clk);
        b.add_output(output);
    }
    b.build()
}

/// Returns a copy of `net` with one combinational gate switched to another
/// kind of the same operand count. The result may or may not be equivalent.
pub fn mutate_one_gate<R: Rng>(rng: &mut R, net: &Netlist) -> Netlist {
    let mut mutated = net.clone();
    mutated.name = format!("{}.mutated", net.name);
    let candidates: Vec<GateRef> = net
        .combinational_gates()
        .filter(|(_, g)| !g.kind.is_constant())
        .map(|(r, _)| r)
        .collect();
    let Some(target) = candidates.choose(rng) else {
        return mutated;
    };
    let gate = &mut mutated.gates[target.id];
    let alternatives: Vec<GateKind> = COMBINATIONAL_KINDS
        .iter()
        .copied()
        .filter(|k| {
            *k != gate.kind
                && !k.is_constant()
                && match k.fixed_arity() {
                    Some(n) => n == gate.inputs.len(),
                    None => true,
                }
        })
        .collect();
    if let Some(kind) = alternatives.choose(rng) {
        log::debug!(
            "mutate_one_gate: {} in `{}` {} -> {}",
            target,
            net.name,
            gate.kind,
            kind
        );
        gate.kind = *kind;
    }
    mutated.check_invariants();
    mutated
}
