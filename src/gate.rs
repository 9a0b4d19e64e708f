// SPDX-License-Identifier: Apache-2.0

//! Gate-level netlist model consumed by the equivalence checker.
//!
//! A `Netlist` owns an arena of `Gate`s; a `GateRef` is a plain index into
//! that arena. The checker only ever borrows netlists, it never mutates them.

use serde::{Deserialize, Serialize};

use crate::subnet::Subnet;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GateRef {
    pub id: usize,
}

impl GateRef {
    pub fn new(id: usize) -> Self {
        GateRef { id }
    }
}

impl std::fmt::Display for GateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.id)
    }
}

/// Qualifies how a signal is observed by the gate it feeds.
///
/// Data pins use `Always`. Control pins of triggers carry a level or an edge;
/// `Level0` and `Negedge` mean the pin is active-low.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Always,
    Level0,
    Level1,
    Posedge,
    Negedge,
}

impl Event {
    pub fn is_active_low(&self) -> bool {
        matches!(self, Event::Level0 | Event::Negedge)
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub node: GateRef,
    pub event: Event,
}

impl Signal {
    pub fn always(node: GateRef) -> Self {
        Signal {
            node,
            event: Event::Always,
        }
    }

    pub fn level1(node: GateRef) -> Self {
        Signal {
            node,
            event: Event::Level1,
        }
    }

    pub fn level0(node: GateRef) -> Self {
        Signal {
            node,
            event: Event::Level0,
        }
    }

    pub fn posedge(node: GateRef) -> Self {
        Signal {
            node,
            event: Event::Posedge,
        }
    }

    pub fn negedge(node: GateRef) -> Self {
        Signal {
            node,
            event: Event::Negedge,
        }
    }
}

impl From<GateRef> for Signal {
    fn from(node: GateRef) -> Self {
        Signal::always(node)
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// Free primary input; has no operands.
    Input,
    Zero,
    One,
    Nop,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    /// Level-sensitive latch: operands `[data, enable]`.
    Latch,
    /// Edge-triggered flip-flop: operands `[data, clock]`.
    Dff,
    /// Flip-flop with reset and set: operands `[data, clock, reset, set]`.
    Dffrs,
}

impl GateKind {
    pub fn is_trigger(&self) -> bool {
        matches!(self, GateKind::Latch | GateKind::Dff | GateKind::Dffrs)
    }

    /// Sources have no combinational function: their values are either free
    /// or supplied from a previous time frame.
    pub fn is_source(&self) -> bool {
        matches!(self, GateKind::Input) || self.is_trigger()
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, GateKind::Zero | GateKind::One)
    }

    /// Returns the exact operand count for fixed-arity kinds, `None` for the
    /// n-ary AND/OR/XOR families.
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            GateKind::Input | GateKind::Zero | GateKind::One => Some(0),
            GateKind::Nop | GateKind::Not => Some(1),
            GateKind::Latch | GateKind::Dff => Some(2),
            GateKind::Dffrs => Some(4),
            GateKind::And
            | GateKind::Nand
            | GateKind::Or
            | GateKind::Nor
            | GateKind::Xor
            | GateKind::Xnor => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateKind::Input => "input",
            GateKind::Zero => "zero",
            GateKind::One => "one",
            GateKind::Nop => "nop",
            GateKind::Not => "not",
            GateKind::And => "and",
            GateKind::Nand => "nand",
            GateKind::Or => "or",
            GateKind::Nor => "nor",
            GateKind::Xor => "xor",
            GateKind::Xnor => "xnor",
            GateKind::Latch => "latch",
            GateKind::Dff => "dff",
            GateKind::Dffrs => "dffrs",
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub kind: GateKind,
    pub inputs: Vec<Signal>,
}

impl Gate {
    pub fn new(kind: GateKind, inputs: Vec<Signal>) -> Self {
        Gate { kind, inputs }
    }

    pub fn get_args(&self) -> impl Iterator<Item = GateRef> + '_ {
        self.inputs.iter().map(|s| s.node)
    }

    /// The driving signal of a trigger's next-state value.
    pub fn data_input(&self) -> Signal {
        assert!(
            self.kind.is_trigger(),
            "data_input requested for non-trigger gate kind {}",
            self.kind
        );
        self.inputs[0]
    }
}

#[derive(Debug, Clone)]
pub struct Netlist {
    pub name: String,
    pub gates: Vec<Gate>,
    pub inputs: Vec<GateRef>,
    pub outputs: Vec<GateRef>,
    pub triggers: Vec<GateRef>,
    pub subnets: Vec<Subnet>,
}

impl Netlist {
    pub fn get(&self, gate_ref: GateRef) -> &Gate {
        &self.gates[gate_ref.id]
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn is_sequential(&self) -> bool {
        !self.triggers.is_empty()
    }

    pub fn is_hierarchical(&self) -> bool {
        !self.subnets.is_empty()
    }

    pub fn is_input(&self, gate_ref: GateRef) -> bool {
        self.inputs.contains(&gate_ref)
    }

    pub fn is_output(&self, gate_ref: GateRef) -> bool {
        self.outputs.contains(&gate_ref)
    }

    /// Iterates over every gate that carries a combinational function, i.e.
    /// everything except inputs and triggers.
    pub fn combinational_gates(&self) -> impl Iterator<Item = (GateRef, &Gate)> + '_ {
        self.gates
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.kind.is_source())
            .map(|(id, g)| (GateRef { id }, g))
    }

    pub fn validate_ref(&self, gate_ref: GateRef) {
        assert!(
            gate_ref.id < self.gates.len(),
            "GateRef out of bounds for netlist `{}`: {:?} (gates.len() = {})",
            self.name,
            gate_ref,
            self.gates.len()
        );
    }

    /// Checks structural invariants, panicking if any are violated:
    /// - every referenced gate is in bounds;
    /// - fixed-arity kinds have exactly their operand count;
    /// - declared inputs are `Input` gates and declared triggers are triggers.
    pub fn check_invariants(&self) {
        for (id, gate) in self.gates.iter().enumerate() {
            if let Some(arity) = gate.kind.fixed_arity() {
                assert_eq!(
                    gate.inputs.len(),
                    arity,
                    "gate %{} of kind {} in netlist `{}` has {} operands; expected {}",
                    id,
                    gate.kind,
                    self.name,
                    gate.inputs.len(),
                    arity
                );
            }
            for operand in gate.get_args() {
                assert!(
                    operand.id < self.gates.len(),
                    "gate %{} in netlist `{}` references out-of-bounds operand {:?}",
                    id,
                    self.name,
                    operand
                );
            }
        }
        for input in &self.inputs {
            self.validate_ref(*input);
            assert_eq!(
                self.get(*input).kind,
                GateKind::Input,
                "declared input {} of netlist `{}` is not an input gate",
                input,
                self.name
            );
        }
        for output in &self.outputs {
            self.validate_ref(*output);
        }
        for trigger in &self.triggers {
            self.validate_ref(*trigger);
            assert!(
                self.get(*trigger).kind.is_trigger(),
                "declared trigger {} of netlist `{}` has kind {}",
                trigger,
                self.name,
                self.get(*trigger).kind
            );
        }
    }

    pub fn get_signature(&self) -> String {
        format!(
            "net {}(inputs: {}, outputs: {}, triggers: {}, gates: {}, subnets: {})",
            self.name,
            self.inputs.len(),
            self.outputs.len(),
            self.triggers.len(),
            self.gates.len(),
            self.subnets.len()
        )
    }

    pub fn to_string(&self) -> String {
        let mut s = format!("net {} {{\n", self.name);
        for (id, gate) in self.gates.iter().enumerate() {
            let operands = gate
                .inputs
                .iter()
                .map(|sig| match sig.event {
                    Event::Always => format!("%{}", sig.node.id),
                    event => format!("{:?}(%{})", event, sig.node.id),
                })
                .collect::<Vec<String>>()
                .join(", ");
            s.push_str(&format!("  %{} = {}({})\n", id, gate.kind, operands));
        }
        let outputs = self
            .outputs
            .iter()
            .map(|o| format!("%{}", o.id))
            .collect::<Vec<String>>()
            .join(", ");
        s.push_str(&format!("  outputs = [{}]\n}}", outputs));
        s
    }
}
