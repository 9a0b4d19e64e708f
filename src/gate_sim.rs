// SPDX-License-Identifier: Apache-2.0

//! Reference boolean evaluation of a netlist.
//!
//! This is the ground truth the CNF templates are tested against, and it is
//! used to replay counterexamples produced by the miter.

use bitvec::vec::BitVec;

use crate::gate::{Gate, GateKind, Netlist, Signal};
use crate::topo::topo_sort_refs;

pub struct GateSimResult {
    /// Values of the netlist's declared outputs, in order.
    pub outputs: Vec<bool>,
    /// Value of every gate in the arena, indexed by gate id.
    pub all_values: BitVec,
}

/// Computes the value of a combinational gate from its operand values.
pub fn eval_gate(kind: GateKind, operands: &[bool]) -> bool {
    match kind {
        GateKind::Zero => false,
        GateKind::One => true,
        GateKind::Nop => operands[0],
        GateKind::Not => !operands[0],
        GateKind::And => operands.iter().all(|v| *v),
        GateKind::Nand => !operands.iter().all(|v| *v),
        GateKind::Or => operands.iter().any(|v| *v),
        GateKind::Nor => !operands.iter().any(|v| *v),
        GateKind::Xor => operands.iter().fold(false, |acc, v| acc ^ *v),
        GateKind::Xnor => !operands.iter().fold(false, |acc, v| acc ^ *v),
        GateKind::Input | GateKind::Latch | GateKind::Dff | GateKind::Dffrs => {
            panic!("eval_gate: {} has no combinational function", kind)
        }
    }
}

/// Whether a control pin is asserted given the raw value of its driver.
pub fn is_asserted(signal: &Signal, value: bool) -> bool {
    if signal.event.is_active_low() {
        !value
    } else {
        value
    }
}

/// Next-state function of a trigger: one time frame is one active clock edge
/// (flip-flops) or one observation of the enable level (latches).
pub fn next_state(gate: &Gate, current: bool, operand_values: &[bool]) -> bool {
    match gate.kind {
        GateKind::Dff => operand_values[0],
        GateKind::Latch => {
            if is_asserted(&gate.inputs[1], operand_values[1]) {
                operand_values[0]
            } else {
                current
            }
        }
        GateKind::Dffrs => {
            if is_asserted(&gate.inputs[2], operand_values[2]) {
                false
            } else if is_asserted(&gate.inputs[3], operand_values[3]) {
                true
            } else {
                operand_values[0]
            }
        }
        kind => panic!("next_state: {} is not a trigger", kind),
    }
}

/// Evaluates one time frame.
///
/// `inputs` is aligned with `net.inputs`, `state` with `net.triggers`.
pub fn eval(net: &Netlist, inputs: &[bool], state: &[bool]) -> GateSimResult {
    assert_eq!(inputs.len(), net.inputs.len());
    assert_eq!(state.len(), net.triggers.len());

    let mut all_values: BitVec = BitVec::repeat(false, net.gates.len());
    for (gate_ref, value) in net.inputs.iter().zip(inputs) {
        all_values.set(gate_ref.id, *value);
    }
    for (gate_ref, value) in net.triggers.iter().zip(state) {
        all_values.set(gate_ref.id, *value);
    }

    let mut operands: Vec<bool> = Vec::new();
    for gate_ref in topo_sort_refs(&net.gates) {
        let gate = net.get(gate_ref);
        if gate.kind.is_source() {
            continue;
        }
        operands.clear();
        operands.extend(gate.inputs.iter().map(|s| all_values[s.node.id]));
        let value = eval_gate(gate.kind, &operands);
        all_values.set(gate_ref.id, value);
    }

    let outputs = net.outputs.iter().map(|o| all_values[o.id]).collect();
    GateSimResult {
        outputs,
        all_values,
    }
}

/// Computes the trigger state after the frame described by `result`.
pub fn step(net: &Netlist, state: &[bool], result: &GateSimResult) -> Vec<bool> {
    net.triggers
        .iter()
        .zip(state)
        .map(|(t, current)| {
            let gate = net.get(*t);
            let operand_values: Vec<bool> = gate
                .inputs
                .iter()
                .map(|s| result.all_values[s.node.id])
                .collect();
            next_state(gate, *current, &operand_values)
        })
        .collect()
}

/// Runs the netlist from the all-zero state over one input vector per frame
/// and returns the outputs of every frame.
pub fn simulate_from_reset(net: &Netlist, frames: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let mut state = vec![false; net.triggers.len()];
    let mut outputs = Vec::with_capacity(frames.len());
    for inputs in frames {
        let result = eval(net, inputs, &state);
        state = step(net, &state, &result);
        outputs.push(result.outputs);
    }
    outputs
}
