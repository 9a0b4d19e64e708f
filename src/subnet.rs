// SPDX-License-Identifier: Apache-2.0

//! Hierarchical designs: a netlist partitioned into subnets.
//!
//! Each `Subnet` owns a self-contained `Netlist` (its own arena and ids) and
//! records how its boundary connects to the parent: `net.inputs[i]` is fed by
//! parent gate `input_links[i]`, and `net.outputs[k]` computes the value of
//! parent gate `output_links[k]`. The parent keeps its full flat arena, so a
//! hierarchical design can always be checked flat as well.

use std::collections::{HashMap, HashSet};

use crate::gate::{Gate, GateKind, GateRef, Netlist, Signal};

#[derive(Debug, Clone)]
pub struct Subnet {
    pub net: Netlist,
    pub input_links: Vec<GateRef>,
    pub output_links: Vec<GateRef>,
}

impl Subnet {
    /// Parent gate feeding the given subnet input, if `local` is an input.
    pub fn parent_of_input(&self, local: GateRef) -> Option<GateRef> {
        self.net
            .inputs
            .iter()
            .position(|i| *i == local)
            .map(|index| self.input_links[index])
    }

    /// Local input fed by the given parent gate, if any.
    pub fn input_fed_by(&self, parent: GateRef) -> Option<GateRef> {
        self.input_links
            .iter()
            .position(|l| *l == parent)
            .map(|index| self.net.inputs[index])
    }
}

/// Collects the gates of `parent` in `members` into a standalone subnet.
///
/// `is_exported[id]` says whether parent gate `id` is observed outside of
/// this group (by another group or as a primary output).
fn extract_subnet(
    parent: &Netlist,
    name: String,
    members: &[GateRef],
    is_exported: &[bool],
) -> Subnet {
    let mut sorted_members = members.to_vec();
    sorted_members.sort();

    let member_set: HashSet<GateRef> = sorted_members.iter().cloned().collect();

    // Operands from outside of the group become subnet inputs, in first-use
    // order.
    let mut input_links: Vec<GateRef> = Vec::new();
    for member in &sorted_members {
        for operand in parent.get(*member).get_args() {
            if !member_set.contains(&operand) && !input_links.contains(&operand) {
                input_links.push(operand);
            }
        }
    }

    let mut local_of: HashMap<GateRef, GateRef> = HashMap::new();
    let mut gates: Vec<Gate> = Vec::with_capacity(input_links.len() + sorted_members.len());
    let mut inputs = Vec::with_capacity(input_links.len());
    for link in &input_links {
        let local = GateRef { id: gates.len() };
        gates.push(Gate::new(GateKind::Input, vec![]));
        local_of.insert(*link, local);
        inputs.push(local);
    }
    for member in &sorted_members {
        local_of.insert(*member, GateRef { id: gates.len() });
        // Placeholder; operands are remapped once every member has an id.
        gates.push(parent.get(*member).clone());
    }

    let mut triggers = Vec::new();
    let mut outputs = Vec::new();
    let mut output_links = Vec::new();
    for member in &sorted_members {
        let local = local_of[member];
        let gate = &mut gates[local.id];
        gate.inputs = gate
            .inputs
            .iter()
            .map(|s| Signal {
                node: local_of[&s.node],
                event: s.event,
            })
            .collect();
        if gate.kind.is_trigger() {
            triggers.push(local);
        }
        if is_exported[member.id] {
            outputs.push(local);
            output_links.push(*member);
        }
    }

    Subnet {
        net: Netlist {
            name,
            gates,
            inputs,
            outputs,
            triggers,
            subnets: Vec::new(),
        },
        input_links,
        output_links,
    }
}

impl Netlist {
    /// Returns a copy of this netlist partitioned into the given groups of
    /// gates, one subnet per group.
    ///
    /// Every non-input gate must belong to exactly one group and inputs must
    /// not be listed; violations panic.
    pub fn with_subnets(&self, groups: &[Vec<GateRef>]) -> Netlist {
        let mut group_of: Vec<Option<usize>> = vec![None; self.gates.len()];
        for (group_index, group) in groups.iter().enumerate() {
            for member in group {
                self.validate_ref(*member);
                assert!(
                    self.get(*member).kind != GateKind::Input,
                    "with_subnets: input {} cannot be placed in a subnet",
                    member
                );
                assert!(
                    group_of[member.id].is_none(),
                    "with_subnets: gate {} appears in more than one group",
                    member
                );
                group_of[member.id] = Some(group_index);
            }
        }
        for (id, gate) in self.gates.iter().enumerate() {
            assert!(
                gate.kind == GateKind::Input || group_of[id].is_some(),
                "with_subnets: gate %{} ({}) is not covered by any group",
                id,
                gate.kind
            );
        }

        let mut is_exported = vec![false; self.gates.len()];
        for output in &self.outputs {
            is_exported[output.id] = true;
        }
        for (id, gate) in self.gates.iter().enumerate() {
            for operand in gate.get_args() {
                if group_of[operand.id].is_some() && group_of[operand.id] != group_of[id] {
                    is_exported[operand.id] = true;
                }
            }
        }

        let subnets = groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                extract_subnet(self, format!("{}.sub{}", self.name, i), group, &is_exported)
            })
            .collect();
        log::debug!(
            "with_subnets: partitioned `{}` ({} gates) into {} subnets",
            self.name,
            self.gates.len(),
            groups.len()
        );

        Netlist {
            subnets,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist_builder::NetlistBuilder;

    #[test]
    fn test_partition_links_boundaries() {
        let mut b = NetlistBuilder::new("two_stage");
        let xs = b.add_inputs(3);
        let a = b.add_and(&[xs[0], xs[1]]);
        let n = b.add_not(a);
        let o = b.add_or(&[n, xs[2]]);
        b.add_output(o);
        let net = b.build().with_subnets(&[vec![a, n], vec![o]]);

        assert_eq!(net.subnets.len(), 2);
        let first = &net.subnets[0];
        assert_eq!(first.input_links, vec![xs[0], xs[1]]);
        assert_eq!(first.output_links, vec![n]);
        assert_eq!(first.net.gates.len(), 4);

        let second = &net.subnets[1];
        assert_eq!(second.input_links, vec![n, xs[2]]);
        assert_eq!(second.output_links, vec![o]);
        assert_eq!(second.input_fed_by(n), Some(second.net.inputs[0]));
        assert_eq!(second.parent_of_input(second.net.inputs[1]), Some(xs[2]));
    }

    #[test]
    #[should_panic(expected = "is not covered by any group")]
    fn test_partition_must_cover_all_gates() {
        let mut b = NetlistBuilder::new("uncovered");
        let x = b.add_input();
        let n = b.add_not(x);
        let m = b.add_not(n);
        b.add_output(m);
        b.build().with_subnets(&[vec![n]]);
    }
}
