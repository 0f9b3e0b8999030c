use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioning action requested by the orchestrating caller.
///
/// CREATE, UPDATE and DELETE may span several invocations of the hosting
/// process; READ and LIST must complete within a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Action {
    /// Whether this action may legitimately return IN_PROGRESS and be
    /// re-invoked later.
    pub fn is_mutating(self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::Delete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::List => "LIST",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutating_actions() {
        assert!(Action::Create.is_mutating());
        assert!(Action::Update.is_mutating());
        assert!(Action::Delete.is_mutating());
        assert!(!Action::Read.is_mutating());
        assert!(!Action::List.is_mutating());
    }

    #[test]
    fn test_wire_casing() {
        assert_eq!(serde_json::to_string(&Action::Create).unwrap(), "\"CREATE\"");
        let action: Action = serde_json::from_str("\"LIST\"").unwrap();
        assert_eq!(action, Action::List);
    }
}
