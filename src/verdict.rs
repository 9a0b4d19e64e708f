// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::gate::{Event, GateKind, GateRef};

/// A gate in one of the netlists participating in a miter; `slot` indexes
/// the miter's netlist list (0 is the left-hand design, 1 the right-hand).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Wire {
    pub slot: usize,
    pub gate: GateRef,
}

impl Wire {
    pub fn new(slot: usize, gate: GateRef) -> Self {
        Wire { slot, gate }
    }
}

/// Solver-assigned values of one bound pair in one time frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundValue {
    pub frame: usize,
    pub lhs: Wire,
    pub rhs: Wire,
    pub lhs_value: bool,
    pub rhs_value: bool,
}

impl BoundValue {
    pub fn differs(&self) -> bool {
        self.lhs_value != self.rhs_value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    pub inputs: Vec<BoundValue>,
    pub outputs: Vec<BoundValue>,
}

impl Counterexample {
    pub fn differing_outputs(&self) -> impl Iterator<Item = &BoundValue> {
        self.outputs.iter().filter(|v| v.differs())
    }

    /// Left-hand value assigned to the bound input `lhs` in `frame`.
    pub fn lhs_input_value(&self, lhs: GateRef, frame: usize) -> Option<bool> {
        self.inputs
            .iter()
            .find(|v| v.frame == frame && v.lhs.gate == lhs)
            .map(|v| v.lhs_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    Inputs,
    Outputs,
    Triggers,
    Subnets,
    EncoderInputs,
    EncoderOutputs,
    DecoderInputs,
    DecoderOutputs,
}

/// Reasons a check is answered "not equivalent" without invoking the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mismatch {
    /// The two sides declare a different number of some port.
    PortCount {
        port: PortKind,
        lhs: usize,
        rhs: usize,
    },
    /// A binding does not cover the ports it is required to cover.
    BindingArity {
        port: PortKind,
        expected: usize,
        actual: usize,
    },
    /// Bound registers are different latch/flip-flop variants.
    TriggerKind {
        lhs: GateRef,
        rhs: GateRef,
        lhs_kind: GateKind,
        rhs_kind: GateKind,
    },
    /// Bound registers observe a control pin with a different level/edge.
    TriggerEvent {
        lhs: GateRef,
        rhs: GateRef,
        pin: usize,
        lhs_event: Event,
        rhs_event: Event,
    },
    /// The subnet correspondence is not a bijection over the subnets, or it
    /// places the two sides of a bound output pair in subnets that are not
    /// compared with each other.
    SubnetCorrespondence,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::PortCount { port, lhs, rhs } => {
                write!(f, "{:?} count differs: {} vs {}", port, lhs, rhs)
            }
            Mismatch::BindingArity {
                port,
                expected,
                actual,
            } => write!(
                f,
                "{:?} binding pairs {} ports one-to-one; expected {}",
                port, actual, expected
            ),
            Mismatch::TriggerKind {
                lhs,
                rhs,
                lhs_kind,
                rhs_kind,
            } => write!(
                f,
                "bound triggers {}|{} differ in kind: {} vs {}",
                lhs, rhs, lhs_kind, rhs_kind
            ),
            Mismatch::TriggerEvent {
                lhs,
                rhs,
                pin,
                lhs_event,
                rhs_event,
            } => write!(
                f,
                "bound triggers {}|{} differ on pin {}: {:?} vs {:?}",
                lhs, rhs, pin, lhs_event, rhs_event
            ),
            Mismatch::SubnetCorrespondence => {
                write!(
                    f,
                    "subnet correspondence is not a bijection or splits a bound output pair"
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail")]
pub enum Verdict {
    Equivalent,
    Mismatch(Mismatch),
    NotEquivalent(Counterexample),
}

impl Verdict {
    pub fn is_equiv(&self) -> bool {
        matches!(self, Verdict::Equivalent)
    }

    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            Verdict::NotEquivalent(cex) => Some(cex),
            _ => None,
        }
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Verdict::Mismatch(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verdict_json_is_tagged() {
        let verdict = Verdict::Mismatch(Mismatch::PortCount {
            port: PortKind::Outputs,
            lhs: 1,
            rhs: 2,
        });
        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(
            json,
            r#"{"result":"Mismatch","detail":{"PortCount":{"port":"Outputs","lhs":1,"rhs":2}}}"#
        );
        let back: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verdict);
        assert_eq!(
            serde_json::to_string(&Verdict::Equivalent).unwrap(),
            r#"{"result":"Equivalent"}"#
        );
    }
}
