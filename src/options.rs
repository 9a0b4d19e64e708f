// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::lec_error::LecError;

/// Tunables for a `Checker`.
///
/// Can be read from a TOML table; absent keys take their default values:
/// ```
/// use g8r_lec::options::CheckerOptions;
///
/// let options = CheckerOptions::from_toml_str("hierarchy_threshold = 8").unwrap();
/// assert_eq!(options.hierarchy_threshold, 8);
/// assert!(options.dump_cnf);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerOptions {
    /// Hierarchical designs with at most this many gates (on the larger
    /// side) are checked as one flat miter.
    pub hierarchy_threshold: usize,
    /// Render the miter as DIMACS when reporting a counterexample.
    pub dump_cnf: bool,
    /// File name the console sink writes the DIMACS dump to.
    pub cnf_file_name: String,
    /// Re-simulate counterexamples of two-netlist miters and warn if the
    /// simulation does not reproduce the difference.
    pub replay_counterexamples: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions {
            hierarchy_threshold: 256,
            dump_cnf: true,
            cnf_file_name: "miter.cnf".to_string(),
            replay_counterexamples: true,
        }
    }
}

impl CheckerOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, LecError> {
        toml::from_str(text).map_err(|e| LecError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading checker options from {}", path.display()))?;
        let options = Self::from_toml_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing checker options in {}: {}", path.display(), e))?;
        log::info!("Loaded checker options from {}: {:?}", path.display(), options);
        Ok(options)
    }
}
