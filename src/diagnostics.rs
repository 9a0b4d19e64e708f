// SPDX-License-Identifier: Apache-2.0

//! Reporting of counterexamples.
//!
//! When a miter is satisfiable the checker hands a `MismatchReport` to a
//! caller-supplied `DiagnosticSink`. `ConsoleSink` prints the bound input and
//! output values to stdout and writes the CNF instance to `miter.cnf`;
//! `MemorySink` keeps reports for inspection, `NullSink` drops them.

use std::path::PathBuf;

use crate::lec_error::LecError;
use crate::verdict::{BoundValue, Counterexample, Wire};

fn wire_to_string(wire: &Wire) -> String {
    // Slots 0 and 1 are the designs under comparison; anything else is an
    // auxiliary netlist spliced into the miter.
    if wire.slot > 1 {
        format!("s{}.{}", wire.slot, wire.gate.id)
    } else {
        format!("{}", wire.gate.id)
    }
}

/// Formats bound pairs as `idA|idB=valA|valB`, joined by `, `. Pairs from
/// frames after the first are prefixed with `@frame:`.
pub fn format_bound_values(values: &[BoundValue]) -> String {
    values
        .iter()
        .map(|v| {
            let prefix = if v.frame > 0 {
                format!("@{}:", v.frame)
            } else {
                String::new()
            };
            format!(
                "{}{}|{}={}|{}",
                prefix,
                wire_to_string(&v.lhs),
                wire_to_string(&v.rhs),
                v.lhs_value as u8,
                v.rhs_value as u8
            )
        })
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchReport {
    /// DIMACS rendering of the miter; empty when dumping is disabled.
    pub dimacs: String,
    pub input_line: String,
    pub output_line: String,
    pub counterexample: Counterexample,
}

impl MismatchReport {
    pub fn new(counterexample: Counterexample, dimacs: String) -> Self {
        let input_line = format!("inputs: {}", format_bound_values(&counterexample.inputs));
        let output_line = format!("outputs: {}", format_bound_values(&counterexample.outputs));
        MismatchReport {
            dimacs,
            input_line,
            output_line,
            counterexample,
        }
    }
}

pub trait DiagnosticSink {
    fn on_not_equivalent(&mut self, report: &MismatchReport) -> Result<(), LecError>;
}

/// Prints the value lines to stdout and persists the CNF to a file.
pub struct ConsoleSink {
    dir: PathBuf,
    cnf_file_name: String,
}

impl ConsoleSink {
    pub fn new(dir: PathBuf, cnf_file_name: &str) -> Self {
        ConsoleSink {
            dir,
            cnf_file_name: cnf_file_name.to_string(),
        }
    }

    /// Writes the dump into the process's current working directory.
    pub fn in_current_dir(cnf_file_name: &str) -> Self {
        Self::new(PathBuf::from("."), cnf_file_name)
    }

    pub fn cnf_path(&self) -> PathBuf {
        self.dir.join(&self.cnf_file_name)
    }
}

impl DiagnosticSink for ConsoleSink {
    fn on_not_equivalent(&mut self, report: &MismatchReport) -> Result<(), LecError> {
        println!("{}", report.input_line);
        println!("{}", report.output_line);
        if !report.dimacs.is_empty() {
            let path = self.cnf_path();
            std::fs::write(&path, &report.dimacs)?;
            log::info!("Wrote miter CNF to {}", path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub reports: Vec<MismatchReport>,
}

impl DiagnosticSink for MemorySink {
    fn on_not_equivalent(&mut self, report: &MismatchReport) -> Result<(), LecError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn on_not_equivalent(&mut self, _report: &MismatchReport) -> Result<(), LecError> {
        Ok(())
    }
}
