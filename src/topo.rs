// SPDX-License-Identifier: Apache-2.0

use crate::gate::{Gate, GateRef};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Returns every gate in an order where each combinational gate comes after
/// all of its operands.
///
/// Inputs and triggers are sources: their operands (a trigger's next-state
/// drivers) are not dependencies within a single time frame, which is what
/// lets feedback through registers be ordered at all. A purely combinational
/// cycle panics.
pub fn topo_sort_refs(gates: &[Gate]) -> Vec<GateRef> {
    let mut marks = vec![Mark::Unvisited; gates.len()];
    let mut postorder = Vec::with_capacity(gates.len());
    let mut worklist: Vec<(usize, usize)> = Vec::new();

    for root in 0..gates.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        worklist.push((root, 0));
        marks[root] = Mark::OnStack;
        while let Some((current, next_operand)) = worklist.pop() {
            let gate = &gates[current];
            let deps: &[_] = if gate.kind.is_source() {
                &[]
            } else {
                &gate.inputs
            };
            if next_operand < deps.len() {
                // Revisit after this dependency.
                worklist.push((current, next_operand + 1));
                let dep = deps[next_operand].node.id;
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::OnStack;
                        worklist.push((dep, 0));
                    }
                    Mark::OnStack => panic!(
                        "combinational cycle through gate %{} (reached from %{})",
                        dep, current
                    ),
                    Mark::Done => {}
                }
            } else {
                marks[current] = Mark::Done;
                postorder.push(GateRef { id: current });
            }
        }
    }
    postorder
}
