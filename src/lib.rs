// SPDX-License-Identifier: Apache-2.0

//! SAT-based logic equivalence checking for gate-level netlists.
//!
//! Two netlists are compared by encoding both into one CNF instance (a
//! miter) together with clauses asserting that some bound output pair
//! differs; the netlists are equivalent under the bindings iff the instance
//! is unsatisfiable. Sequential designs are handled by cutting paired
//! registers, by bridging differing state encodings through caller-supplied
//! encoder/decoder netlists, or by bounded unrolling from reset. Hierarchical
//! designs are checked subnet by subnet.
//!
//! ```
//! use g8r_lec::binding::Binding;
//! use g8r_lec::checker::equiv;
//! use g8r_lec::netlist_builder::NetlistBuilder;
//!
//! let mut b = NetlistBuilder::new("nand");
//! let xs = b.add_inputs(2);
//! let y = b.add_nand(&xs);
//! b.add_output(y);
//! let lhs = b.build();
//!
//! let mut b = NetlistBuilder::new("or_of_nots");
//! let xs = b.add_inputs(2);
//! let n0 = b.add_not(xs[0]);
//! let n1 = b.add_not(xs[1]);
//! let y = b.add_or(&[n0, n1]);
//! b.add_output(y);
//! let rhs = b.build();
//!
//! let inputs = Binding::zip(&lhs.inputs, &rhs.inputs);
//! let outputs = Binding::zip(&lhs.outputs, &rhs.outputs);
//! assert!(equiv(&lhs, &rhs, &inputs, &outputs).unwrap());
//! ```

pub mod binding;
pub mod checker;
pub mod ctx;
pub mod diagnostics;
pub mod fuzz_utils;
pub mod gate;
pub mod gate_sim;
pub mod lec_error;
pub mod miter;
pub mod netlist_builder;
pub mod options;
pub mod subnet;
pub mod test_utils;
pub mod topo;
pub mod tseitin;
pub mod verdict;
