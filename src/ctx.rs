// SPDX-License-Identifier: Apache-2.0

//! Variable allocation and the solver instance a single check works in.
//!
//! A gate's variable is a pure function of the current offset and its id:
//! `var = offset + gate.id`. The offset selects a (netlist slot, time frame)
//! pair through a `VarLayout`, so several netlists unrolled over several
//! frames occupy disjoint variable ranges. Fresh variables for Tseitin
//! intermediates and miter outputs are drawn from above every gate-derived
//! variable, from a counter owned by the `Ctx` instance.

use varisat::{CnfFormula, ExtendFormula, Lit, Var};

use crate::gate::{GateRef, Signal};
use crate::lec_error::LecError;

/// Assigns each (netlist slot, frame) pair a disjoint block of variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarLayout {
    slot_bases: Vec<usize>,
    frame_size: usize,
    frames: usize,
}

impl VarLayout {
    /// `arena_sizes[s]` is the number of gates in the netlist in slot `s`.
    pub fn new(arena_sizes: &[usize], frames: usize) -> Self {
        assert!(frames > 0, "VarLayout::new: need at least one frame");
        let mut slot_bases = Vec::with_capacity(arena_sizes.len());
        let mut frame_size = 0;
        for size in arena_sizes {
            slot_bases.push(frame_size);
            frame_size += size;
        }
        VarLayout {
            slot_bases,
            frame_size,
            frames,
        }
    }

    pub fn offset(&self, slot: usize, frame: usize) -> usize {
        assert!(
            frame < self.frames,
            "frame {} is outside of the {} laid-out frames",
            frame,
            self.frames
        );
        frame * self.frame_size + self.slot_bases[slot]
    }

    pub fn slot_count(&self) -> usize {
        self.slot_bases.len()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// First variable index not derived from any gate.
    pub fn gate_var_limit(&self) -> usize {
        self.frames * self.frame_size
    }
}

/// Context holding the SAT solver for one check.
///
/// Every clause is mirrored into a `CnfFormula` so the instance can be
/// rendered as DIMACS for diagnostics.
pub struct Ctx<'a> {
    pub(crate) solver: varisat::Solver<'a>,
    formula: CnfFormula,
    offset: usize,
    gate_var_limit: usize,
    next_fresh: usize,
}

impl<'a> Ctx<'a> {
    pub fn new(layout: &VarLayout) -> Self {
        let gate_var_limit = layout.gate_var_limit();
        Self {
            solver: varisat::Solver::new(),
            formula: CnfFormula::new(),
            offset: 0,
            gate_var_limit,
            next_fresh: gate_var_limit,
        }
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn var_id(&self, id: usize) -> Var {
        let index = self.offset + id;
        debug_assert!(
            index < self.gate_var_limit,
            "gate variable {} collides with the fresh variable range starting at {}",
            index,
            self.gate_var_limit
        );
        Var::from_index(index)
    }

    pub fn var(&self, gate_ref: GateRef) -> Var {
        self.var_id(gate_ref.id)
    }

    pub fn var_signal(&self, signal: &Signal) -> Var {
        self.var(signal.node)
    }

    /// Returns a variable never handed out before by this context and
    /// disjoint from every gate variable.
    pub fn new_var(&mut self) -> Var {
        let var = Var::from_index(self.next_fresh);
        self.next_fresh += 1;
        var
    }

    pub fn fresh_count(&self) -> usize {
        self.next_fresh - self.gate_var_limit
    }

    pub fn lit(var: Var, negated: bool) -> Lit {
        if negated {
            var.negative()
        } else {
            var.positive()
        }
    }

    pub fn add_clause(&mut self, clause: &[Lit]) {
        self.solver.add_clause(clause);
        self.formula.add_clause(clause);
    }

    pub fn clause_count(&self) -> usize {
        self.formula.len()
    }

    pub fn formula(&self) -> &CnfFormula {
        &self.formula
    }

    pub fn solve(&mut self) -> Result<bool, LecError> {
        Ok(self.solver.solve()?)
    }

    /// Returns the model of the last satisfiable `solve` as a dense vector
    /// indexed by variable index. Variables absent from the model read as
    /// false.
    pub fn model_values(&self) -> Vec<bool> {
        let mut values = vec![false; self.formula.var_count().max(self.next_fresh)];
        if let Some(model) = self.solver.model() {
            for lit in model {
                let index = lit.var().index();
                if index >= values.len() {
                    values.resize(index + 1, false);
                }
                values[index] = lit.is_positive();
            }
        }
        values
    }

    /// Renders the accumulated clauses in DIMACS CNF format.
    pub fn to_dimacs(&self) -> String {
        let mut s = format!(
            "p cnf {} {}\n",
            self.formula.var_count(),
            self.formula.len()
        );
        for clause in self.formula.iter() {
            for lit in clause {
                s.push_str(&lit.to_dimacs().to_string());
                s.push(' ');
            }
            s.push_str("0\n");
        }
        s
    }
}
