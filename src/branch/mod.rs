//! Concurrency analysis over branch-path labelled nodes.
//!
//! A branch path label such as `"0_1_0"` encodes the position of a node in the tree
//! of branching decisions: each `_`-delimited segment is the arm taken at one
//! decision. Fan-out records are nodes reached after a decision; merge records are
//! points where arms reconverge.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

mod path;

pub use path::{PathMatching, parent};

/// A node tagged with its branch path label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchRecord {
    pub branch: String,
    #[serde(alias = "nodeId")]
    pub node_id: String,
}

impl BranchRecord {
    pub fn new(branch: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            node_id: node_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub matching: PathMatching,
}

/// Decides which fan-out nodes may execute concurrently.
#[derive(Debug, Clone, Default)]
pub struct BranchClassifier {
    config: ClassifierConfig,
}

pub struct ClassifierBuilder {
    config: ClassifierConfig,
}

impl ClassifierBuilder {
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_matching(mut self, matching: PathMatching) -> Self {
        self.config.matching = matching;
        self
    }

    pub fn build(self) -> BranchClassifier {
        BranchClassifier {
            config: self.config,
        }
    }
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::new()
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    /// Every pair of fan-out records that may run concurrently, in input order.
    pub fn concurrent_pairs<'r>(
        &self,
        fan_out: &'r [BranchRecord],
        merge: &[BranchRecord],
    ) -> Vec<(&'r BranchRecord, &'r BranchRecord)> {
        // Shallow merge points first: they are reached before deeper ones.
        let mut merges: Vec<&BranchRecord> = merge.iter().collect();
        merges.sort_by_key(|m| m.branch.len());

        let pairs: Vec<_> = fan_out
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| self.is_concurrent(a, b, &merges))
            .collect();

        debug!(
            fan_out = fan_out.len(),
            merge = merges.len(),
            pairs = pairs.len(),
            "classified concurrent branches"
        );
        pairs
    }

    /// Node ids of every fan-out record that is part of some concurrent pair,
    /// de-duplicated in first-seen order.
    pub fn classify(&self, fan_out: &[BranchRecord], merge: &[BranchRecord]) -> Vec<String> {
        self.concurrent_pairs(fan_out, merge)
            .into_iter()
            .flat_map(|(a, b)| [a.node_id.as_str(), b.node_id.as_str()])
            .unique()
            .map(str::to_string)
            .collect()
    }

    fn is_concurrent(&self, a: &BranchRecord, b: &BranchRecord, merges: &[&BranchRecord]) -> bool {
        let matching = self.config.matching;

        if matching.is_prefix(&a.branch, &b.branch) || matching.is_prefix(&b.branch, &a.branch) {
            trace!(a = %a.node_id, b = %b.node_id, "same lineage");
            return false;
        }

        let parent_a = parent(&a.branch);
        if parent_a == parent(&b.branch) {
            if merges.iter().any(|m| m.branch == parent_a) {
                trace!(a = %a.node_id, b = %b.node_id, parent = parent_a, "siblings already merged");
                return false;
            }
        } else if merges.iter().any(|m| {
            matching.is_prefix(&m.branch, &a.branch) && matching.is_prefix(&m.branch, &b.branch)
        }) {
            trace!(a = %a.node_id, b = %b.node_id, "both downstream of a shared merge");
            return false;
        }

        true
    }
}

/// Classifies with the default (literal prefix) matching.
pub fn classify_concurrent_branches(fan_out: &[BranchRecord], merge: &[BranchRecord]) -> Vec<String> {
    BranchClassifier::new().classify(fan_out, merge)
}
