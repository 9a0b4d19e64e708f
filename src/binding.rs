// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::gate::{GateRef, Netlist};

/// An ordered pairing of gates in a left-hand netlist with gates in a
/// right-hand netlist.
///
/// The same structure serves input bindings (values are tied together),
/// output bindings (values are compared) and trigger bindings (registers are
/// assumed to correspond). Bindings are supplied by the caller; the checker
/// never infers them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pairs: Vec<(GateRef, GateRef)>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every gate to itself.
    pub fn identity(gates: &[GateRef]) -> Self {
        Binding {
            pairs: gates.iter().map(|g| (*g, *g)).collect(),
        }
    }

    /// Pairs `lhs[i]` with `rhs[i]`; the slices must have the same length.
    pub fn zip(lhs: &[GateRef], rhs: &[GateRef]) -> Self {
        assert_eq!(
            lhs.len(),
            rhs.len(),
            "Binding::zip: sides have different lengths"
        );
        Binding {
            pairs: lhs.iter().cloned().zip(rhs.iter().cloned()).collect(),
        }
    }

    pub fn push(&mut self, lhs: GateRef, rhs: GateRef) {
        self.pairs.push((lhs, rhs));
    }

    pub fn extend(&mut self, other: &Binding) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(GateRef, GateRef)> {
        self.pairs.iter()
    }

    pub fn pairs(&self) -> &[(GateRef, GateRef)] {
        &self.pairs
    }

    /// Returns the right-hand partner of `lhs`, if bound.
    pub fn rhs_of(&self, lhs: GateRef) -> Option<GateRef> {
        self.pairs.iter().find(|(l, _)| *l == lhs).map(|(_, r)| *r)
    }

    /// Number of ports paired one-to-one: the smaller of the distinct
    /// members of `lhs_gates` and of `rhs_gates` that appear on their side.
    pub fn distinct_cover(&self, lhs_gates: &[GateRef], rhs_gates: &[GateRef]) -> usize {
        let lhs_set: HashSet<GateRef> = lhs_gates.iter().cloned().collect();
        let rhs_set: HashSet<GateRef> = rhs_gates.iter().cloned().collect();
        let lhs_seen: HashSet<GateRef> = self
            .pairs
            .iter()
            .map(|(l, _)| *l)
            .filter(|l| lhs_set.contains(l))
            .collect();
        let rhs_seen: HashSet<GateRef> = self
            .pairs
            .iter()
            .map(|(_, r)| *r)
            .filter(|r| rhs_set.contains(r))
            .collect();
        lhs_seen.len().min(rhs_seen.len())
    }

    /// Whether every gate of `lhs_gates` and every gate of `rhs_gates`
    /// appears in exactly one pair, and no other gate does.
    pub fn is_one_to_one_over(&self, lhs_gates: &[GateRef], rhs_gates: &[GateRef]) -> bool {
        lhs_gates.len() == rhs_gates.len()
            && self.pairs.len() == lhs_gates.len()
            && self.distinct_cover(lhs_gates, rhs_gates) == lhs_gates.len()
    }

    /// Panics if any pair references a gate outside of its netlist.
    pub fn validate_against(&self, lhs: &Netlist, rhs: &Netlist) {
        for (l, r) in &self.pairs {
            lhs.validate_ref(*l);
            rhs.validate_ref(*r);
        }
    }
}

impl From<Vec<(GateRef, GateRef)>> for Binding {
    fn from(pairs: Vec<(GateRef, GateRef)>) -> Self {
        Binding { pairs }
    }
}

impl FromIterator<(GateRef, GateRef)> for Binding {
    fn from_iter<T: IntoIterator<Item = (GateRef, GateRef)>>(iter: T) -> Self {
        Binding {
            pairs: iter.into_iter().collect(),
        }
    }
}
