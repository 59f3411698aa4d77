//! Content digests for token sets.
//!
//! Two token sets with the same digest declare the same names with the same
//! values. Provenance (file, line) and category are excluded.

use crate::token::Token;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenDigest(pub String);

impl TokenDigest {
    /// Digest of the canonical `name=value` listing, sorted by name.
    pub fn of_tokens(tokens: &BTreeMap<String, Token>) -> Self {
        let mut hasher = Sha256::new();
        for (name, token) in tokens {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(token.value.as_bytes());
            hasher.update(b"\n");
        }
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_tokens;

    #[test]
    fn digest_ignores_provenance_and_order() {
        let a = extract_tokens("a.css", "--x: 1;\n--y: 2;").token_map();
        let b = extract_tokens("b.css", "\n\n--y: 2; --x: 1;").token_map();
        assert_eq!(TokenDigest::of_tokens(&a), TokenDigest::of_tokens(&b));
    }

    #[test]
    fn digest_changes_with_values() {
        let a = extract_tokens("a.css", "--x: 1;").token_map();
        let b = extract_tokens("a.css", "--x: 2;").token_map();
        assert_ne!(TokenDigest::of_tokens(&a), TokenDigest::of_tokens(&b));
    }
}
