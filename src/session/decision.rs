//! Operator decisions fed into a commit.

use crate::merge::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision applies one action to the previewed item with the given key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The transport form of an identity key, as shown in the preview.
    pub key: String,
    pub action: Action,
}

impl Decision {
    /// Creates a new decision.
    pub fn new(key: impl Into<String>, action: Action) -> Self {
        Decision {
            key: key.into(),
            action,
        }
    }

    /// Decodes a JSON list of decisions.
    pub fn list_from_json(json: &str) -> Result<Vec<Decision>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.key, self.action)
    }
}

/// CommitPlan says how the decisions of a commit are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitPlan {
    /// Explicit per-item decisions.
    Decisions(Vec<Decision>),
    /// One action for every surfaced entry, in preview order.
    Auto(Action),
}

impl From<Vec<Decision>> for CommitPlan {
    fn from(decisions: Vec<Decision>) -> Self {
        CommitPlan::Decisions(decisions)
    }
}

impl From<Action> for CommitPlan {
    fn from(action: Action) -> Self {
        CommitPlan::Auto(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decisions_from_json_accept_merge_alias() {
        let decisions = Decision::list_from_json(
            r#"[{"key":"blog/en/a","action":"incoming"},{"key":"blog/en/b","action":"merge"}]"#,
        )
        .unwrap();
        assert_eq!(
            decisions,
            vec![
                Decision::new("blog/en/a", Action::Incoming),
                Decision::new("blog/en/b", Action::Both),
            ]
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(Decision::list_from_json(r#"[{"key":"k","action":"theirs"}]"#).is_err());
    }
}
