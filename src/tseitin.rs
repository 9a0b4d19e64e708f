// SPDX-License-Identifier: Apache-2.0

//! Tseitin encoding of netlist gates into CNF.
//!
//! Each template emits the clauses enforcing `output == f(operands)`. The
//! De Morgan duals (`And`/`Nand`, `Or`/`Nor`, `Xor`/`Xnor`, `Nop`/`Not`)
//! share one routine driven by an `invert_output` flag that complements the
//! output literal.
//!
//! Sequential elements have no combinational template. When a netlist is
//! unrolled, a trigger's variable in frame `t` is tied to its next-state
//! function over its operands in frame `t - 1`; in frame 0 triggers are
//! free state variables.

use varisat::{Lit, Var};

use crate::ctx::{Ctx, VarLayout};
use crate::gate::{GateKind, GateRef, Netlist};

// Unit clause fixing a literal.
fn add_tseitin_fix(ctx: &mut Ctx, output: Lit) {
    ctx.add_clause(&[output]);
}

// Clauses for y = x, where y is the possibly-complemented output literal:
// (!x | y) & (x | !y)
fn add_tseitin_buf(ctx: &mut Ctx, x: Lit, output: Lit) {
    ctx.add_clause(&[!x, output]);
    ctx.add_clause(&[x, !output]);
}

// Clauses for y = x1 & ... & xn:
// (y | !x1 | ... | !xn) & (!y | x1) & ... & (!y | xn)
fn add_tseitin_and(ctx: &mut Ctx, xs: &[Lit], output: Lit) {
    let mut clause = Vec::with_capacity(xs.len() + 1);
    clause.push(output);
    clause.extend(xs.iter().map(|x| !*x));
    ctx.add_clause(&clause);
    for x in xs {
        ctx.add_clause(&[!output, *x]);
    }
}

// Clauses for y = x1 | ... | xn:
// (!y | x1 | ... | xn) & (y | !x1) & ... & (y | !xn)
fn add_tseitin_or(ctx: &mut Ctx, xs: &[Lit], output: Lit) {
    let mut clause = Vec::with_capacity(xs.len() + 1);
    clause.push(!output);
    clause.extend(xs.iter().cloned());
    ctx.add_clause(&clause);
    for x in xs {
        ctx.add_clause(&[output, !*x]);
    }
}

// Clauses for m = a XOR b are:
// (!a | !b | !m) & (a | b | !m) & (a | !b | m) & (!a | b | m)
fn add_tseitin_xor2(ctx: &mut Ctx, a: Lit, b: Lit, output: Lit) {
    ctx.add_clause(&[!a, !b, !output]);
    ctx.add_clause(&[a, b, !output]);
    ctx.add_clause(&[a, !b, output]);
    ctx.add_clause(&[!a, b, output]);
}

// n-ary XOR as a left-leaning chain of 2-input XORs: `n - 2` fresh
// intermediates, the last step writes the output directly.
fn add_tseitin_xor(ctx: &mut Ctx, xs: &[Lit], output: Lit) {
    match xs.len() {
        0 => add_tseitin_fix(ctx, !output),
        1 => add_tseitin_buf(ctx, xs[0], output),
        n => {
            let mut acc = xs[0];
            for x in &xs[1..n - 1] {
                let t = ctx.new_var().positive();
                add_tseitin_xor2(ctx, acc, *x, t);
                acc = t;
            }
            add_tseitin_xor2(ctx, acc, xs[n - 1], output);
        }
    }
}

// q = en ? d : prev
fn add_tseitin_mux(ctx: &mut Ctx, en: Lit, d: Lit, prev: Lit, output: Lit) {
    ctx.add_clause(&[!en, !d, output]);
    ctx.add_clause(&[!en, d, !output]);
    ctx.add_clause(&[en, !prev, output]);
    ctx.add_clause(&[en, prev, !output]);
}

// q = rst ? 0 : (set ? 1 : d)
fn add_tseitin_reset_set(ctx: &mut Ctx, rst: Lit, set: Lit, d: Lit, output: Lit) {
    ctx.add_clause(&[!rst, !output]);
    ctx.add_clause(&[rst, !set, output]);
    ctx.add_clause(&[rst, set, !d, output]);
    ctx.add_clause(&[rst, set, d, !output]);
}

/// Owns the `Ctx` of one check and knows how netlist slots and time frames
/// map onto variables.
pub struct Encoder<'a> {
    pub ctx: Ctx<'a>,
    layout: VarLayout,
}

impl<'a> Encoder<'a> {
    pub fn new(layout: VarLayout) -> Self {
        Encoder {
            ctx: Ctx::new(&layout),
            layout,
        }
    }

    pub fn layout(&self) -> &VarLayout {
        &self.layout
    }

    /// Points the context at the variable block of `(slot, frame)`.
    pub fn select(&mut self, slot: usize, frame: usize) {
        self.ctx.set_offset(self.layout.offset(slot, frame));
    }

    /// Variable of `gate_ref` in the given slot and frame, independent of the
    /// currently selected offset.
    pub fn var_at(&self, slot: usize, frame: usize, gate_ref: GateRef) -> Var {
        Var::from_index(self.layout.offset(slot, frame) + gate_ref.id)
    }

    /// Ties two variables together: `b == a`.
    pub fn encode_equal(&mut self, a: Var, b: Var) {
        add_tseitin_buf(&mut self.ctx, a.positive(), b.positive());
    }

    /// Returns a fresh variable constrained to `a XOR b`.
    pub fn encode_difference(&mut self, a: Var, b: Var) -> Var {
        let d = self.ctx.new_var();
        add_tseitin_xor2(&mut self.ctx, a.positive(), b.positive(), d.positive());
        d
    }

    /// Forces a variable to a constant.
    pub fn encode_constant(&mut self, var: Var, value: bool) {
        add_tseitin_fix(&mut self.ctx, Ctx::lit(var, !value));
    }

    /// Emits the clauses defining one combinational gate at the currently
    /// selected offset. Inputs produce no clauses.
    pub fn encode_gate(&mut self, net: &Netlist, gate_ref: GateRef) {
        let gate = net.get(gate_ref);
        if let Some(arity) = gate.kind.fixed_arity() {
            assert_eq!(
                gate.inputs.len(),
                arity,
                "encode_gate: gate {} of kind {} in `{}` has {} operands; expected {}",
                gate_ref,
                gate.kind,
                net.name,
                gate.inputs.len(),
                arity
            );
        }
        let y = self.ctx.var(gate_ref);
        let xs: Vec<Lit> = gate
            .inputs
            .iter()
            .map(|s| self.ctx.var_signal(s).positive())
            .collect();
        let ctx = &mut self.ctx;
        match gate.kind {
            GateKind::Input => {}
            GateKind::Zero => add_tseitin_fix(ctx, y.negative()),
            GateKind::One => add_tseitin_fix(ctx, y.positive()),
            GateKind::Nop => add_tseitin_buf(ctx, xs[0], y.positive()),
            GateKind::Not => add_tseitin_buf(ctx, xs[0], y.negative()),
            GateKind::And => add_tseitin_and(ctx, &xs, y.positive()),
            GateKind::Nand => add_tseitin_and(ctx, &xs, y.negative()),
            GateKind::Or => add_tseitin_or(ctx, &xs, y.positive()),
            GateKind::Nor => add_tseitin_or(ctx, &xs, y.negative()),
            GateKind::Xor => add_tseitin_xor(ctx, &xs, y.positive()),
            GateKind::Xnor => add_tseitin_xor(ctx, &xs, y.negative()),
            GateKind::Latch | GateKind::Dff | GateKind::Dffrs => panic!(
                "encode_gate: trigger {} ({}) in `{}` has no combinational encoding",
                gate_ref, gate.kind, net.name
            ),
        }
    }

    /// Encodes every combinational gate of `net` in `(slot, frame)`, and for
    /// `frame > 0` links each trigger to its next-state function over frame
    /// `frame - 1`.
    pub fn encode_netlist(&mut self, net: &Netlist, slot: usize, frame: usize) {
        let clauses_before = self.ctx.clause_count();
        let fresh_before = self.ctx.fresh_count();
        self.select(slot, frame);
        for (gate_ref, _) in net.combinational_gates() {
            self.encode_gate(net, gate_ref);
        }
        if frame > 0 {
            self.encode_next_state(net, slot, frame);
        }
        log::debug!(
            "encode_netlist: `{}` slot {} frame {}: {} clauses, {} fresh vars",
            net.name,
            slot,
            frame,
            self.ctx.clause_count() - clauses_before,
            self.ctx.fresh_count() - fresh_before
        );
    }

    fn encode_next_state(&mut self, net: &Netlist, slot: usize, frame: usize) {
        let prev_offset = self.layout.offset(slot, frame - 1);
        let at_prev = |gate_ref: GateRef| Var::from_index(prev_offset + gate_ref.id).positive();
        for trigger in &net.triggers {
            let gate = net.get(*trigger);
            let q = self.var_at(slot, frame, *trigger).positive();
            let operands: Vec<Lit> = gate.inputs.iter().map(|s| at_prev(s.node)).collect();
            // Control pins are normalized to active-high.
            let control = |i: usize| {
                if gate.inputs[i].event.is_active_low() {
                    !operands[i]
                } else {
                    operands[i]
                }
            };
            match gate.kind {
                GateKind::Dff => add_tseitin_buf(&mut self.ctx, operands[0], q),
                GateKind::Latch => {
                    let held = at_prev(*trigger);
                    add_tseitin_mux(&mut self.ctx, control(1), operands[0], held, q);
                }
                GateKind::Dffrs => {
                    add_tseitin_reset_set(&mut self.ctx, control(2), control(3), operands[0], q)
                }
                kind => panic!(
                    "encode_next_state: declared trigger {} in `{}` has kind {}",
                    trigger, net.name, kind
                ),
            }
        }
    }

    /// Forces every trigger of `net` in `(slot, frame)` to `value`.
    pub fn fix_triggers(&mut self, net: &Netlist, slot: usize, frame: usize, value: bool) {
        for trigger in &net.triggers {
            let var = self.var_at(slot, frame, *trigger);
            self.encode_constant(var, value);
        }
    }
}
