// SPDX-License-Identifier: Apache-2.0

//! The `NetlistBuilder` builds up a `Netlist` arena as gates are added.
//!
//! Triggers are declared before their operands exist so that feedback loops
//! through registers can be expressed: `add_trigger` reserves the gate and
//! `connect_trigger` supplies its data and control signals later.
//!
//! Basic example usage:
//! ```
//! use g8r_lec::netlist_builder::NetlistBuilder;
//!
//! let mut builder = NetlistBuilder::new("my_and_gate");
//! let a = builder.add_input();
//! let b = builder.add_input();
//! let o = builder.add_and(&[a, b]);
//! builder.add_output(o);
//! let net = builder.build();
//! assert_eq!(net.inputs.len(), 2);
//! ```

use crate::gate::{Gate, GateKind, GateRef, Netlist, Signal};

pub struct NetlistBuilder {
    pub name: String,
    pub gates: Vec<Gate>,
    pub inputs: Vec<GateRef>,
    pub outputs: Vec<GateRef>,
    pub triggers: Vec<GateRef>,
}

impl NetlistBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            gates: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn build(self) -> Netlist {
        let net = Netlist {
            name: self.name,
            gates: self.gates,
            inputs: self.inputs,
            outputs: self.outputs,
            triggers: self.triggers,
            subnets: Vec::new(),
        };
        net.check_invariants();
        net
    }

    fn push(&mut self, gate: Gate) -> GateRef {
        let gate_ref = GateRef {
            id: self.gates.len(),
        };
        self.gates.push(gate);
        gate_ref
    }

    /// Number of gates added so far; the id the next gate will receive.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn add_input(&mut self) -> GateRef {
        let gate_ref = self.push(Gate::new(GateKind::Input, vec![]));
        self.inputs.push(gate_ref);
        gate_ref
    }

    pub fn add_inputs(&mut self, count: usize) -> Vec<GateRef> {
        (0..count).map(|_| self.add_input()).collect()
    }

    pub fn add_const(&mut self, value: bool) -> GateRef {
        let kind = if value { GateKind::One } else { GateKind::Zero };
        self.push(Gate::new(kind, vec![]))
    }

    /// Adds a combinational gate of the given kind.
    pub fn add_gate(&mut self, kind: GateKind, inputs: Vec<Signal>) -> GateRef {
        assert!(
            !kind.is_source(),
            "add_gate: {} gates must be added via add_input / add_trigger",
            kind
        );
        for signal in &inputs {
            assert!(
                signal.node.id < self.gates.len(),
                "add_gate: operand {} does not exist yet",
                signal.node
            );
        }
        self.push(Gate::new(kind, inputs))
    }

    fn add_nary(&mut self, kind: GateKind, args: &[GateRef]) -> GateRef {
        let inputs = args.iter().map(|a| Signal::always(*a)).collect();
        self.add_gate(kind, inputs)
    }

    pub fn add_nop(&mut self, arg: GateRef) -> GateRef {
        self.add_nary(GateKind::Nop, &[arg])
    }

    pub fn add_not(&mut self, arg: GateRef) -> GateRef {
        self.add_nary(GateKind::Not, &[arg])
    }

    pub fn add_and(&mut self, args: &[GateRef]) -> GateRef {
        self.add_nary(GateKind::And, args)
    }

    pub fn add_nand(&mut self, args: &[GateRef]) -> GateRef {
        self.add_nary(GateKind::Nand, args)
    }

    pub fn add_or(&mut self, args: &[GateRef]) -> GateRef {
        self.add_nary(GateKind::Or, args)
    }

    pub fn add_nor(&mut self, args: &[GateRef]) -> GateRef {
        self.add_nary(GateKind::Nor, args)
    }

    pub fn add_xor(&mut self, args: &[GateRef]) -> GateRef {
        self.add_nary(GateKind::Xor, args)
    }

    pub fn add_xnor(&mut self, args: &[GateRef]) -> GateRef {
        self.add_nary(GateKind::Xnor, args)
    }

    /// Reserves a trigger gate whose operands are supplied later via
    /// `connect_trigger`.
    pub fn add_trigger(&mut self, kind: GateKind) -> GateRef {
        assert!(kind.is_trigger(), "add_trigger: {} is not a trigger", kind);
        let gate_ref = self.push(Gate::new(kind, vec![]));
        self.triggers.push(gate_ref);
        gate_ref
    }

    pub fn connect_trigger(&mut self, trigger: GateRef, inputs: Vec<Signal>) {
        let gate = &mut self.gates[trigger.id];
        assert!(
            gate.kind.is_trigger(),
            "connect_trigger: {} is a {} gate",
            trigger,
            gate.kind
        );
        assert!(
            gate.inputs.is_empty(),
            "connect_trigger: {} is already connected",
            trigger
        );
        gate.inputs = inputs;
    }

    pub fn add_output(&mut self, gate_ref: GateRef) {
        assert!(
            gate_ref.id < self.gates.len(),
            "add_output: {} does not exist",
            gate_ref
        );
        self.outputs.push(gate_ref);
    }
}
