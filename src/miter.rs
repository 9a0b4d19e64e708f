// SPDX-License-Identifier: Apache-2.0

//! The miter: several netlists encoded into one SAT instance whose models are
//! exactly the input assignments under which some compared pair disagrees.
//!
//! Construction order is fixed so that the same miter always yields the same
//! CNF: input equalities, force-connections, reset constraints, every netlist
//! frame by frame, then one XOR difference variable per compared pair and a
//! single clause asserting that at least one of them is true.

use std::time::Instant;

use varisat::Lit;

use crate::binding::Binding;
use crate::ctx::VarLayout;
use crate::gate::{GateKind, Netlist};
use crate::lec_error::LecError;
use crate::tseitin::Encoder;
use crate::verdict::{BoundValue, Counterexample, Wire};

pub enum MiterOutcome {
    /// No compared pair can disagree.
    Unsat,
    Sat {
        counterexample: Counterexample,
        /// DIMACS rendering of the instance; empty unless requested.
        dimacs: String,
    },
}

pub struct Miter<'n> {
    nets: Vec<&'n Netlist>,
    frames: usize,
    /// `(driver, target)`: the target source takes the driver's value.
    connections: Vec<(Wire, Wire)>,
    inputs: Vec<(Wire, Wire)>,
    outputs: Vec<(Wire, Wire)>,
    reset_slots: Vec<usize>,
}

impl<'n> Miter<'n> {
    pub fn new(nets: Vec<&'n Netlist>) -> Self {
        assert!(!nets.is_empty(), "Miter::new: no netlists");
        Miter {
            nets,
            frames: 1,
            connections: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            reset_slots: Vec::new(),
        }
    }

    /// Unrolls every netlist over `frames` time frames. Bound inputs are tied
    /// and compared pairs are checked in every frame.
    pub fn with_frames(mut self, frames: usize) -> Self {
        assert!(frames > 0, "Miter::with_frames: need at least one frame");
        self.frames = frames;
        self
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    fn validate_wire(&self, wire: Wire) {
        assert!(
            wire.slot < self.nets.len(),
            "wire {:?} names slot {} but the miter has {} netlists",
            wire,
            wire.slot,
            self.nets.len()
        );
        self.nets[wire.slot].validate_ref(wire.gate);
    }

    /// Makes `target` take the value of `driver`. The target must be a source
    /// (an input or a trigger) so it has no defining clauses of its own.
    pub fn connect(&mut self, driver: Wire, target: Wire) {
        self.validate_wire(driver);
        self.validate_wire(target);
        let net = self.nets[target.slot];
        let kind = net.get(target.gate).kind;
        assert!(
            kind.is_source(),
            "connect: target {} in `{}` is a {} gate; only inputs and triggers can be driven",
            target.gate,
            net.name,
            kind
        );
        assert!(
            kind == GateKind::Input || self.frames == 1,
            "connect: trigger {} in `{}` cannot be driven in an unrolled miter",
            target.gate,
            net.name
        );
        self.connections.push((driver, target));
    }

    pub fn bind_input(&mut self, lhs: Wire, rhs: Wire) {
        self.validate_wire(lhs);
        self.validate_wire(rhs);
        self.inputs.push((lhs, rhs));
    }

    pub fn bind_inputs(&mut self, binding: &Binding, lhs_slot: usize, rhs_slot: usize) {
        for (l, r) in binding.iter() {
            self.bind_input(Wire::new(lhs_slot, *l), Wire::new(rhs_slot, *r));
        }
    }

    pub fn compare(&mut self, lhs: Wire, rhs: Wire) {
        self.validate_wire(lhs);
        self.validate_wire(rhs);
        self.outputs.push((lhs, rhs));
    }

    pub fn compare_all(&mut self, binding: &Binding, lhs_slot: usize, rhs_slot: usize) {
        for (l, r) in binding.iter() {
            self.compare(Wire::new(lhs_slot, *l), Wire::new(rhs_slot, *r));
        }
    }

    /// Starts the netlist in `slot` from the all-zero state.
    pub fn reset_triggers(&mut self, slot: usize) {
        assert!(slot < self.nets.len());
        self.reset_slots.push(slot);
    }

    pub fn compared_count(&self) -> usize {
        self.outputs.len()
    }

    fn describe(&self) -> String {
        self.nets
            .iter()
            .map(|n| format!("`{}`", n.name))
            .collect::<Vec<String>>()
            .join(" vs ")
    }

    pub fn solve(&self, dump_cnf: bool) -> Result<MiterOutcome, LecError> {
        if self.outputs.is_empty() {
            log::warn!(
                "miter {}: nothing to compare; trivially equivalent",
                self.describe()
            );
            return Ok(MiterOutcome::Unsat);
        }

        let sizes: Vec<usize> = self.nets.iter().map(|n| n.gate_count()).collect();
        let mut enc = Encoder::new(VarLayout::new(&sizes, self.frames));

        for frame in 0..self.frames {
            for (l, r) in &self.inputs {
                let a = enc.var_at(l.slot, frame, l.gate);
                let b = enc.var_at(r.slot, frame, r.gate);
                enc.encode_equal(a, b);
            }
            for (driver, target) in &self.connections {
                let a = enc.var_at(driver.slot, frame, driver.gate);
                let b = enc.var_at(target.slot, frame, target.gate);
                enc.encode_equal(a, b);
            }
        }
        for slot in &self.reset_slots {
            enc.fix_triggers(self.nets[*slot], *slot, 0, false);
        }
        for frame in 0..self.frames {
            for (slot, net) in self.nets.iter().enumerate() {
                enc.encode_netlist(net, slot, frame);
            }
        }

        let mut any_difference: Vec<Lit> = Vec::with_capacity(self.frames * self.outputs.len());
        for frame in 0..self.frames {
            for (l, r) in &self.outputs {
                let a = enc.var_at(l.slot, frame, l.gate);
                let b = enc.var_at(r.slot, frame, r.gate);
                any_difference.push(enc.encode_difference(a, b).positive());
            }
        }
        enc.ctx.add_clause(&any_difference);

        let clause_count = enc.ctx.clause_count();
        let start = Instant::now();
        let sat = enc.ctx.solve()?;
        log::info!(
            "miter {} over {} frame(s): {} in {:?} ({} clauses, {} fresh vars)",
            self.describe(),
            self.frames,
            if sat { "SAT" } else { "UNSAT" },
            start.elapsed(),
            clause_count,
            enc.ctx.fresh_count()
        );
        if !sat {
            return Ok(MiterOutcome::Unsat);
        }

        let values = enc.ctx.model_values();
        let value_of = |wire: &Wire, frame: usize| -> bool {
            values
                .get(enc.var_at(wire.slot, frame, wire.gate).index())
                .copied()
                .unwrap_or(false)
        };
        let collect = |pairs: &[(Wire, Wire)]| -> Vec<BoundValue> {
            let mut result = Vec::with_capacity(pairs.len() * self.frames);
            for frame in 0..self.frames {
                for (l, r) in pairs {
                    result.push(BoundValue {
                        frame,
                        lhs: *l,
                        rhs: *r,
                        lhs_value: value_of(l, frame),
                        rhs_value: value_of(r, frame),
                    });
                }
            }
            result
        };
        let counterexample = Counterexample {
            inputs: collect(&self.inputs),
            outputs: collect(&self.outputs),
        };
        let dimacs = if dump_cnf {
            enc.ctx.to_dimacs()
        } else {
            String::new()
        };
        Ok(MiterOutcome::Sat {
            counterexample,
            dimacs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{GateRef, Signal};
    use crate::netlist_builder::NetlistBuilder;

    fn single(name: &str, kind: GateKind) -> Netlist {
        let mut b = NetlistBuilder::new(name);
        let xs = b.add_inputs(2);
        let y = b.add_gate(kind, xs.iter().map(|x| Signal::always(*x)).collect());
        b.add_output(y);
        b.build()
    }

    fn two_way(lhs: &Netlist, rhs: &Netlist) -> Result<MiterOutcome, LecError> {
        let mut miter = Miter::new(vec![lhs, rhs]);
        miter.bind_inputs(&Binding::zip(&lhs.inputs, &rhs.inputs), 0, 1);
        miter.compare_all(&Binding::zip(&lhs.outputs, &rhs.outputs), 0, 1);
        miter.solve(true)
    }

    #[test]
    fn test_and_vs_nor_of_nots_is_unsat() {
        let lhs = single("and", GateKind::And);
        let mut b = NetlistBuilder::new("nor_of_nots");
        let x0 = b.add_input();
        let x1 = b.add_input();
        let n0 = b.add_not(x0);
        let n1 = b.add_not(x1);
        let y = b.add_nor(&[n0, n1]);
        b.add_output(y);
        let rhs = b.build();
        assert!(matches!(two_way(&lhs, &rhs).unwrap(), MiterOutcome::Unsat));
    }

    #[test]
    fn test_and_vs_or_reports_differing_output() {
        let lhs = single("and", GateKind::And);
        let rhs = single("or", GateKind::Or);
        match two_way(&lhs, &rhs).unwrap() {
            MiterOutcome::Sat {
                counterexample,
                dimacs,
            } => {
                assert!(dimacs.starts_with("p cnf "));
                assert_eq!(counterexample.inputs.len(), 2);
                let x0 = counterexample.inputs[0].lhs_value;
                let x1 = counterexample.inputs[1].lhs_value;
                assert_ne!(x0, x1);
                assert_eq!(counterexample.differing_outputs().count(), 1);
            }
            MiterOutcome::Unsat => panic!("AND and OR must differ"),
        }
    }

    #[test]
    fn test_no_compared_pairs_is_unsat() {
        let lhs = single("and", GateKind::And);
        let rhs = single("or", GateKind::Or);
        let miter = Miter::new(vec![&lhs, &rhs]);
        assert!(matches!(miter.solve(true).unwrap(), MiterOutcome::Unsat));
    }

    #[test]
    #[should_panic(expected = "only inputs and triggers can be driven")]
    fn test_connect_into_combinational_gate_panics() {
        let lhs = single("and", GateKind::And);
        let rhs = single("or", GateKind::Or);
        let mut miter = Miter::new(vec![&lhs, &rhs]);
        miter.connect(Wire::new(0, GateRef::new(0)), Wire::new(1, GateRef::new(2)));
    }

    #[test]
    fn test_connection_ties_inputs() {
        // With rhs inputs driven by lhs inputs, the effect equals binding them.
        let lhs = single("xor", GateKind::Xor);
        let rhs = single("xnor", GateKind::Xnor);
        let mut miter = Miter::new(vec![&lhs, &rhs]);
        for (l, r) in lhs.inputs.iter().zip(&rhs.inputs) {
            miter.connect(Wire::new(0, *l), Wire::new(1, *r));
        }
        miter.compare(Wire::new(0, lhs.outputs[0]), Wire::new(1, rhs.outputs[0]));
        assert!(matches!(
            miter.solve(false).unwrap(),
            MiterOutcome::Sat { dimacs, .. } if dimacs.is_empty()
        ));
    }
}
