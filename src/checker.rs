// SPDX-License-Identifier: Apache-2.0

//! Equivalence checking entry point.
//!
//! A `CheckRequest` names the two designs, their input/output bindings and
//! the `Strategy` used to compare them. `Checker::are_equal` runs structural
//! checks first (port counts, binding arities, register kinds) and answers
//! `Verdict::Mismatch` without touching the solver when they fail; otherwise
//! it builds one or more miters and reports the first counterexample through
//! its `DiagnosticSink`.

use std::collections::{HashMap, HashSet};

use crate::binding::Binding;
use crate::diagnostics::{ConsoleSink, DiagnosticSink, MismatchReport};
use crate::gate::{GateRef, Netlist};
use crate::gate_sim;
use crate::lec_error::LecError;
use crate::miter::{Miter, MiterOutcome};
use crate::options::CheckerOptions;
use crate::verdict::{Counterexample, Mismatch, PortKind, Verdict, Wire};

/// How two designs are compared.
#[derive(Debug, Clone)]
pub enum Strategy<'a> {
    /// One combinational miter over both designs.
    Flat,
    /// Registers paired one-to-one are cut: each pair becomes a shared free
    /// input and the logic driving the pair's operands is compared.
    RegisterCut { triggers: &'a Binding },
    /// The designs keep different state encodings; `encoder` maps the
    /// left-hand state to the right-hand one and `decoder` maps it back.
    ///
    /// The right-hand state is left free and `decoder` derives the left-hand
    /// state from it, so the decoder is assumed correct. Under that state
    /// both designs run one frame on the bound inputs; the bound outputs are
    /// compared and so is `encoder` applied to the left-hand next state
    /// against the right-hand next state. The encoder is therefore checked
    /// only on next states reached from decoded states.
    StateBridge {
        encoder: &'a Netlist,
        decoder: &'a Netlist,
    },
    /// Subnet `lhs.subnets[i]` is compared against `rhs.subnets[j]` for every
    /// `(i, j)` in `subnets`.
    Hierarchical { subnets: Vec<(usize, usize)> },
    /// Both designs run from the all-zero state for `depth` frames.
    Bounded { depth: usize },
}

pub struct CheckRequest<'a> {
    pub lhs: &'a Netlist,
    pub rhs: &'a Netlist,
    pub inputs: &'a Binding,
    pub outputs: &'a Binding,
    pub strategy: Strategy<'a>,
}

// How a counterexample of a two-netlist miter can be re-simulated.
#[derive(Debug, Clone, Copy)]
enum Replay {
    None,
    /// One frame; trigger values are taken from the bound inputs.
    CutState,
    FromReset { frames: usize },
}

fn port_count(port: PortKind, lhs: usize, rhs: usize) -> Option<Mismatch> {
    if lhs == rhs {
        None
    } else {
        Some(Mismatch::PortCount { port, lhs, rhs })
    }
}

fn binding_arity(port: PortKind, expected: usize, actual: usize) -> Option<Mismatch> {
    if expected == actual {
        None
    } else {
        Some(Mismatch::BindingArity {
            port,
            expected,
            actual,
        })
    }
}

// Every port on both sides must appear in exactly one pair of `binding`.
fn binding_cover(
    port: PortKind,
    binding: &Binding,
    lhs_gates: &[GateRef],
    rhs_gates: &[GateRef],
) -> Option<Mismatch> {
    if binding.is_one_to_one_over(lhs_gates, rhs_gates) {
        return None;
    }
    let actual = if binding.len() == lhs_gates.len() {
        binding.distinct_cover(lhs_gates, rhs_gates)
    } else {
        binding.len()
    };
    Some(Mismatch::BindingArity {
        port,
        expected: lhs_gates.len(),
        actual,
    })
}

fn assert_combinational(net: &Netlist, strategy: &str) {
    assert!(
        !net.is_sequential(),
        "{} check of `{}` which has {} triggers; use RegisterCut, StateBridge or Bounded",
        strategy,
        net.name,
        net.triggers.len()
    );
}

// Value the counterexample assigns to `gate` of the netlist in `slot`, if it
// appears among the bound inputs of `frame`.
fn bound_input_value(cex: &Counterexample, frame: usize, slot: usize, gate: GateRef) -> bool {
    cex.inputs
        .iter()
        .filter(|v| v.frame == frame)
        .find_map(|v| {
            if v.lhs.slot == slot && v.lhs.gate == gate {
                Some(v.lhs_value)
            } else if v.rhs.slot == slot && v.rhs.gate == gate {
                Some(v.rhs_value)
            } else {
                None
            }
        })
        .unwrap_or(false)
}

/// Re-simulates a two-netlist counterexample and returns whether the
/// simulation shows a compared pair disagreeing.
fn replay_reproduces(
    lhs: &Netlist,
    rhs: &Netlist,
    cex: &Counterexample,
    frames: usize,
    from_reset: bool,
) -> bool {
    let nets = [lhs, rhs];
    let mut states: Vec<Vec<bool>> = nets
        .iter()
        .enumerate()
        .map(|(slot, net)| {
            net.triggers
                .iter()
                .map(|t| !from_reset && bound_input_value(cex, 0, slot, *t))
                .collect()
        })
        .collect();
    for frame in 0..frames {
        let results: Vec<gate_sim::GateSimResult> = nets
            .iter()
            .enumerate()
            .map(|(slot, net)| {
                let inputs: Vec<bool> = net
                    .inputs
                    .iter()
                    .map(|i| bound_input_value(cex, frame, slot, *i))
                    .collect();
                gate_sim::eval(net, &inputs, &states[slot])
            })
            .collect();
        let differs = cex.outputs.iter().filter(|v| v.frame == frame).any(|v| {
            results[v.lhs.slot].all_values[v.lhs.gate.id]
                != results[v.rhs.slot].all_values[v.rhs.gate.id]
        });
        if differs {
            return true;
        }
        for (slot, net) in nets.iter().enumerate() {
            states[slot] = gate_sim::step(net, &states[slot], &results[slot]);
        }
    }
    false
}

pub struct Checker<S: DiagnosticSink = ConsoleSink> {
    options: CheckerOptions,
    sink: S,
}

impl Checker<ConsoleSink> {
    /// Creates a checker that reports counterexamples on stdout and dumps the
    /// CNF into the current directory.
    pub fn new(options: CheckerOptions) -> Self {
        let sink = ConsoleSink::in_current_dir(&options.cnf_file_name);
        Checker { options, sink }
    }
}

impl<S: DiagnosticSink> Checker<S> {
    pub fn with_sink(options: CheckerOptions, sink: S) -> Self {
        Checker { options, sink }
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn are_equal(&mut self, request: &CheckRequest) -> Result<Verdict, LecError> {
        let CheckRequest {
            lhs,
            rhs,
            inputs,
            outputs,
            strategy,
        } = request;
        inputs.validate_against(lhs, rhs);
        outputs.validate_against(lhs, rhs);
        for (l, r) in inputs.iter() {
            assert!(
                lhs.is_input(*l) && rhs.is_input(*r),
                "input binding pairs {}|{} but both must be declared inputs of `{}` and `{}`",
                l,
                r,
                lhs.name,
                rhs.name
            );
        }

        let structural = port_count(PortKind::Inputs, lhs.inputs.len(), rhs.inputs.len())
            .or_else(|| port_count(PortKind::Outputs, lhs.outputs.len(), rhs.outputs.len()))
            .or_else(|| binding_cover(PortKind::Inputs, inputs, &lhs.inputs, &rhs.inputs));
        if let Some(mismatch) = structural {
            return Ok(self.structural_mismatch(lhs, rhs, mismatch));
        }

        match strategy {
            Strategy::Flat => {
                assert_combinational(lhs, "Flat");
                assert_combinational(rhs, "Flat");
                self.check_flat(lhs, rhs, inputs, outputs)
            }
            Strategy::RegisterCut { triggers } => {
                self.check_register_cut(lhs, rhs, inputs, outputs, triggers)
            }
            Strategy::StateBridge { encoder, decoder } => {
                self.check_state_bridge(lhs, rhs, inputs, outputs, encoder, decoder)
            }
            Strategy::Hierarchical { subnets } => {
                self.check_hierarchical(lhs, rhs, inputs, outputs, subnets)
            }
            Strategy::Bounded { depth } => self.check_bounded(lhs, rhs, inputs, outputs, *depth),
        }
    }

    fn structural_mismatch(&self, lhs: &Netlist, rhs: &Netlist, mismatch: Mismatch) -> Verdict {
        log::info!(
            "`{}` vs `{}`: structural mismatch: {}",
            lhs.name,
            rhs.name,
            mismatch
        );
        Verdict::Mismatch(mismatch)
    }

    fn conclude(
        &mut self,
        lhs: &Netlist,
        rhs: &Netlist,
        miter: &Miter,
        replay: Replay,
    ) -> Result<Verdict, LecError> {
        let (counterexample, dimacs) = match miter.solve(self.options.dump_cnf)? {
            MiterOutcome::Unsat => return Ok(Verdict::Equivalent),
            MiterOutcome::Sat {
                counterexample,
                dimacs,
            } => (counterexample, dimacs),
        };
        if self.options.replay_counterexamples {
            let reproduced = match replay {
                Replay::None => true,
                Replay::CutState => replay_reproduces(lhs, rhs, &counterexample, 1, false),
                Replay::FromReset { frames } => {
                    replay_reproduces(lhs, rhs, &counterexample, frames, true)
                }
            };
            if !reproduced {
                log::warn!(
                    "counterexample for `{}` vs `{}` does not reproduce in simulation",
                    lhs.name,
                    rhs.name
                );
            }
        }
        let report = MismatchReport::new(counterexample, dimacs);
        self.sink.on_not_equivalent(&report)?;
        Ok(Verdict::NotEquivalent(report.counterexample))
    }

    fn check_flat(
        &mut self,
        lhs: &Netlist,
        rhs: &Netlist,
        inputs: &Binding,
        outputs: &Binding,
    ) -> Result<Verdict, LecError> {
        let mut miter = Miter::new(vec![lhs, rhs]);
        miter.bind_inputs(inputs, 0, 1);
        miter.compare_all(outputs, 0, 1);
        self.conclude(lhs, rhs, &miter, Replay::CutState)
    }

    fn check_register_cut(
        &mut self,
        lhs: &Netlist,
        rhs: &Netlist,
        inputs: &Binding,
        outputs: &Binding,
        triggers: &Binding,
    ) -> Result<Verdict, LecError> {
        triggers.validate_against(lhs, rhs);
        for (l, r) in triggers.iter() {
            let lk = lhs.get(*l).kind;
            let rk = rhs.get(*r).kind;
            assert!(
                lk.is_trigger() && rk.is_trigger(),
                "trigger binding pairs {} ({}) with {} ({}); both must be triggers",
                l,
                lk,
                r,
                rk
            );
        }
        let structural = port_count(PortKind::Triggers, lhs.triggers.len(), rhs.triggers.len())
            .or_else(|| {
                binding_cover(PortKind::Triggers, triggers, &lhs.triggers, &rhs.triggers)
            });
        if let Some(mismatch) = structural {
            return Ok(self.structural_mismatch(lhs, rhs, mismatch));
        }

        let mut miter = Miter::new(vec![lhs, rhs]);
        miter.bind_inputs(inputs, 0, 1);
        miter.compare_all(outputs, 0, 1);
        for (l, r) in triggers.iter() {
            let lg = lhs.get(*l);
            let rg = rhs.get(*r);
            if lg.kind != rg.kind {
                let mismatch = Mismatch::TriggerKind {
                    lhs: *l,
                    rhs: *r,
                    lhs_kind: lg.kind,
                    rhs_kind: rg.kind,
                };
                return Ok(self.structural_mismatch(lhs, rhs, mismatch));
            }
            for (pin, (ls, rs)) in lg.inputs.iter().zip(&rg.inputs).enumerate() {
                if ls.event != rs.event {
                    let mismatch = Mismatch::TriggerEvent {
                        lhs: *l,
                        rhs: *r,
                        pin,
                        lhs_event: ls.event,
                        rhs_event: rs.event,
                    };
                    return Ok(self.structural_mismatch(lhs, rhs, mismatch));
                }
                miter.compare(Wire::new(0, ls.node), Wire::new(1, rs.node));
            }
            miter.bind_input(Wire::new(0, *l), Wire::new(1, *r));
        }
        self.conclude(lhs, rhs, &miter, Replay::CutState)
    }

    fn check_state_bridge(
        &mut self,
        lhs: &Netlist,
        rhs: &Netlist,
        inputs: &Binding,
        outputs: &Binding,
        encoder: &Netlist,
        decoder: &Netlist,
    ) -> Result<Verdict, LecError> {
        assert_combinational(encoder, "StateBridge encoder");
        assert_combinational(decoder, "StateBridge decoder");
        let structural = binding_arity(
            PortKind::EncoderInputs,
            lhs.triggers.len(),
            encoder.inputs.len(),
        )
        .or_else(|| {
            binding_arity(
                PortKind::EncoderOutputs,
                rhs.triggers.len(),
                encoder.outputs.len(),
            )
        })
        .or_else(|| {
            binding_arity(
                PortKind::DecoderInputs,
                rhs.triggers.len(),
                decoder.inputs.len(),
            )
        })
        .or_else(|| {
            binding_arity(
                PortKind::DecoderOutputs,
                lhs.triggers.len(),
                decoder.outputs.len(),
            )
        });
        if let Some(mismatch) = structural {
            return Ok(self.structural_mismatch(lhs, rhs, mismatch));
        }

        const A: usize = 0;
        const B: usize = 1;
        const ENCODER: usize = 2;
        const DECODER: usize = 3;
        let mut miter = Miter::new(vec![lhs, rhs, encoder, decoder]);
        miter.bind_inputs(inputs, A, B);
        miter.compare_all(outputs, A, B);
        // B's state is free; the decoder derives A's state from it.
        for (state, input) in rhs.triggers.iter().zip(&decoder.inputs) {
            miter.connect(Wire::new(B, *state), Wire::new(DECODER, *input));
        }
        for (output, state) in decoder.outputs.iter().zip(&lhs.triggers) {
            miter.connect(Wire::new(DECODER, *output), Wire::new(A, *state));
        }
        // A's next state, re-encoded, must be B's next state.
        for (state, input) in lhs.triggers.iter().zip(&encoder.inputs) {
            let next = lhs.get(*state).data_input();
            miter.connect(Wire::new(A, next.node), Wire::new(ENCODER, *input));
        }
        for (output, state) in encoder.outputs.iter().zip(&rhs.triggers) {
            let next = rhs.get(*state).data_input();
            miter.compare(Wire::new(ENCODER, *output), Wire::new(B, next.node));
        }
        self.conclude(lhs, rhs, &miter, Replay::None)
    }

    fn check_bounded(
        &mut self,
        lhs: &Netlist,
        rhs: &Netlist,
        inputs: &Binding,
        outputs: &Binding,
        depth: usize,
    ) -> Result<Verdict, LecError> {
        assert!(depth > 0, "Bounded check of `{}` needs depth > 0", lhs.name);
        let mut miter = Miter::new(vec![lhs, rhs]).with_frames(depth);
        miter.reset_triggers(0);
        miter.reset_triggers(1);
        miter.bind_inputs(inputs, 0, 1);
        miter.compare_all(outputs, 0, 1);
        self.conclude(lhs, rhs, &miter, Replay::FromReset { frames: depth })
    }

    fn check_hierarchical(
        &mut self,
        lhs: &Netlist,
        rhs: &Netlist,
        inputs: &Binding,
        outputs: &Binding,
        subnets: &[(usize, usize)],
    ) -> Result<Verdict, LecError> {
        assert!(
            !lhs.is_sequential() && !rhs.is_sequential(),
            "hierarchical check of sequential netlists `{}` and `{}` is not implemented",
            lhs.name,
            rhs.name
        );
        if let Some(mismatch) =
            port_count(PortKind::Subnets, lhs.subnets.len(), rhs.subnets.len())
        {
            return Ok(self.structural_mismatch(lhs, rhs, mismatch));
        }
        let lhs_used: HashSet<usize> = subnets.iter().map(|(i, _)| *i).collect();
        let rhs_used: HashSet<usize> = subnets.iter().map(|(_, j)| *j).collect();
        let is_bijection = subnets.len() == lhs.subnets.len()
            && lhs_used.len() == subnets.len()
            && rhs_used.len() == subnets.len()
            && subnets
                .iter()
                .all(|(i, j)| *i < lhs.subnets.len() && *j < rhs.subnets.len());
        if !is_bijection {
            return Ok(self.structural_mismatch(lhs, rhs, Mismatch::SubnetCorrespondence));
        }

        let largest = lhs.gate_count().max(rhs.gate_count());
        let passthrough = outputs
            .iter()
            .any(|(l, r)| lhs.is_input(*l) || rhs.is_input(*r));
        if !lhs.is_hierarchical() || largest <= self.options.hierarchy_threshold || passthrough {
            log::debug!(
                "`{}` vs `{}`: checking flat ({} gates, threshold {})",
                lhs.name,
                rhs.name,
                largest,
                self.options.hierarchy_threshold
            );
            return self.check_flat(lhs, rhs, inputs, outputs);
        }

        // Partner of every boundary signal of `lhs` checked so far.
        let mut inner: HashMap<GateRef, GateRef> = HashMap::new();
        let rhs_bound: HashSet<GateRef> = outputs.iter().map(|(_, r)| *r).collect();
        for (i, j) in subnets {
            let sa = &lhs.subnets[*i];
            let sb = &rhs.subnets[*j];

            let mut local_inputs = Binding::new();
            for (local, parent) in sa.net.inputs.iter().zip(&sa.input_links) {
                let partner = if lhs.is_input(*parent) {
                    inputs.rhs_of(*parent)
                } else {
                    inner.get(parent).copied()
                };
                let partner = partner.unwrap_or_else(|| {
                    panic!(
                        "subnet `{}` reads {} which has no partner yet; subnets must be checked in topological order",
                        sa.net.name, parent
                    )
                });
                let rhs_local = sb.input_fed_by(partner).unwrap_or_else(|| {
                    panic!(
                        "subnet `{}` reads {} but its counterpart `{}` does not read partner {}",
                        sa.net.name, parent, sb.net.name, partner
                    )
                });
                local_inputs.push(*local, rhs_local);
            }

            // Bound primary outputs pair with their bound partner, which must
            // be exported by the corresponding subnet. The remaining outputs
            // pair by position with the outputs of `sb` no bound pair claims.
            let mut claimed = vec![false; sb.net.outputs.len()];
            let mut local_outputs = Binding::new();
            let mut unbound: Vec<(GateRef, GateRef)> = Vec::new();
            for (local, parent) in sa.net.outputs.iter().zip(&sa.output_links) {
                let partner = if lhs.is_output(*parent) {
                    outputs.rhs_of(*parent)
                } else {
                    None
                };
                let Some(partner) = partner else {
                    unbound.push((*local, *parent));
                    continue;
                };
                match sb.output_links.iter().position(|l| *l == partner) {
                    Some(index) if !claimed[index] => {
                        claimed[index] = true;
                        inner.insert(*parent, partner);
                        local_outputs.push(*local, sb.net.outputs[index]);
                    }
                    _ => {
                        log::info!(
                            "`{}` vs `{}`: output {}|{} is not exported by subnets `{}` and `{}`",
                            lhs.name,
                            rhs.name,
                            parent,
                            partner,
                            sa.net.name,
                            sb.net.name
                        );
                        return Ok(self.structural_mismatch(
                            lhs,
                            rhs,
                            Mismatch::SubnetCorrespondence,
                        ));
                    }
                }
            }
            let mut free = (0..sb.net.outputs.len()).filter(|index| {
                !claimed[*index] && !rhs_bound.contains(&sb.output_links[*index])
            });
            for (local, parent) in unbound {
                if let Some(index) = free.next() {
                    inner.insert(parent, sb.output_links[index]);
                    local_outputs.push(local, sb.net.outputs[index]);
                }
            }
            // Unequal export counts are reported by the recursive check.
            if sa.net.outputs.len() == sb.net.outputs.len()
                && local_outputs.len() != sa.net.outputs.len()
            {
                return Ok(self.structural_mismatch(lhs, rhs, Mismatch::SubnetCorrespondence));
            }

            let strategy = if sa.net.is_hierarchical() && sb.net.is_hierarchical() {
                Strategy::Hierarchical {
                    subnets: (0..sa.net.subnets.len()).map(|s| (s, s)).collect(),
                }
            } else {
                Strategy::Flat
            };
            let verdict = self.are_equal(&CheckRequest {
                lhs: &sa.net,
                rhs: &sb.net,
                inputs: &local_inputs,
                outputs: &local_outputs,
                strategy,
            })?;
            if !verdict.is_equiv() {
                log::info!(
                    "`{}` vs `{}`: subnets `{}` and `{}` differ",
                    lhs.name,
                    rhs.name,
                    sa.net.name,
                    sb.net.name
                );
                return Ok(verdict);
            }
        }
        Ok(Verdict::Equivalent)
    }
}

/// Flat combinational equivalence with the default options, reporting
/// counterexamples on stdout and in `miter.cnf`.
pub fn equiv(
    lhs: &Netlist,
    rhs: &Netlist,
    inputs: &Binding,
    outputs: &Binding,
) -> Result<bool, LecError> {
    let mut checker = Checker::new(CheckerOptions::default());
    let verdict = checker.are_equal(&CheckRequest {
        lhs,
        rhs,
        inputs,
        outputs,
        strategy: Strategy::Flat,
    })?;
    Ok(verdict.is_equiv())
}

/// Register-cut sequential equivalence with the default options.
pub fn equiv_with_triggers(
    lhs: &Netlist,
    rhs: &Netlist,
    inputs: &Binding,
    outputs: &Binding,
    triggers: &Binding,
) -> Result<bool, LecError> {
    let mut checker = Checker::new(CheckerOptions::default());
    let verdict = checker.are_equal(&CheckRequest {
        lhs,
        rhs,
        inputs,
        outputs,
        strategy: Strategy::RegisterCut { triggers },
    })?;
    Ok(verdict.is_equiv())
}
