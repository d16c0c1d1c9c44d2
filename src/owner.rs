//! Owner references as stored in the document store
//!
//! Historically the store has held owners in two representations: a raw user
//! id string, and a richer account reference that also carries the billing
//! account. Progress queries must match both, so equality for counting goes
//! through [`OwnerRef::user_id`] rather than structural equality.

use serde::{Deserialize, Serialize};

/// Owner of a collection, cook attempt, or generation record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OwnerRef {
    /// Richer account reference
    Account { user_id: String, account_id: String },
    /// Legacy raw user id
    User(String),
}

impl OwnerRef {
    /// Create an owner from a raw user id
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User(user_id.into())
    }

    /// Create an owner carrying a billing account reference
    pub fn account(user_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::Account {
            user_id: user_id.into(),
            account_id: account_id.into(),
        }
    }

    /// The user id, regardless of representation
    pub fn user_id(&self) -> &str {
        match self {
            OwnerRef::Account { user_id, .. } => user_id,
            OwnerRef::User(user_id) => user_id,
        }
    }

    /// Whether this owner is the given user, matching either representation
    pub fn matches_user(&self, user_id: &str) -> bool {
        self.user_id() == user_id
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_representations_match_the_same_user() {
        let raw = OwnerRef::user("user-1");
        let rich = OwnerRef::account("user-1", "acct-7");
        assert!(raw.matches_user("user-1"));
        assert!(rich.matches_user("user-1"));
        assert!(!rich.matches_user("user-2"));
    }

    #[test]
    fn serde_roundtrips_both_shapes() {
        let raw: OwnerRef = serde_json::from_str("\"user-1\"").unwrap();
        assert_eq!(raw, OwnerRef::user("user-1"));

        let rich: OwnerRef =
            serde_json::from_str(r#"{"user_id":"user-1","account_id":"acct-7"}"#).unwrap();
        assert_eq!(rich, OwnerRef::account("user-1", "acct-7"));
    }
}
