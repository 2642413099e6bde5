use serde::{Deserialize, Serialize};

/// How one branch path label is tested as a prefix of another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatching {
    /// Plain string prefix. `"0_1"` counts as a prefix of `"0_10"`.
    #[default]
    Literal,
    /// Whole `_`-delimited segments. `"0_1"` is a prefix of `"0_1_0"` but not of `"0_10"`.
    Segmented,
}

impl PathMatching {
    /// Whether `prefix` lies on the lineage of `path` (or equals it).
    pub fn is_prefix(self, prefix: &str, path: &str) -> bool {
        match self {
            PathMatching::Literal => path.starts_with(prefix),
            PathMatching::Segmented => {
                let mut segments = path.split('_');
                prefix.is_empty()
                    || prefix
                        .split('_')
                        .all(|segment| segments.next() == Some(segment))
            }
        }
    }
}

/// The label of the decision point that spawned `path`.
///
/// A single-segment label has the empty root as its parent.
pub fn parent(path: &str) -> &str {
    path.rsplit_once('_').map_or("", |(parent, _)| parent)
}
