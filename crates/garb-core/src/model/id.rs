//! Typed entity ids.
//!
//! Every persisted entity carries an opaque text id with a type prefix
//! (`gm-` garment, `tg-` tag, `cl-` collection) followed by 8 lowercase hex
//! characters. The prefix makes ids self-describing in logs and JSON output
//! and lets the schema enforce `CHECK (id LIKE 'gm-%')` per table.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

fn random_suffix() -> String {
    let n: u32 = rand::thread_rng().r#gen();
    format!("{n:08x}")
}

fn valid_suffix(s: &str) -> bool {
    s.len() == 8 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

macro_rules! entity_id {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Id prefix including the trailing dash.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}{}", $prefix, random_suffix()))
            }

            /// Parse and validate an id string.
            ///
            /// # Errors
            ///
            /// Returns the offending string when the prefix or suffix is wrong.
            pub fn parse(s: &str) -> Result<Self, String> {
                match s.strip_prefix($prefix) {
                    Some(suffix) if valid_suffix(suffix) => Ok(Self(s.to_string())),
                    _ => Err(format!(
                        "expected '{}' followed by 8 lowercase hex chars, got '{s}'",
                        $prefix
                    )),
                }
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(GarmentId, "gm-", "Id of a cataloged garment.");
entity_id!(TagId, "tg-", "Id of a user-defined tag.");
entity_id!(CollectionId, "cl-", "Id of a collection (manual or smart).");

/// Opaque authenticated user identifier, supplied by the boundary layer.
///
/// The core never invents one: constructing a `UserId` from empty input is
/// rejected so an unauthenticated request can't silently fall through to a
/// guest scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an authenticated user identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when the identifier is empty or whitespace-only.
    pub fn new(s: impl Into<String>) -> Result<Self, crate::Error> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(crate::Error::Unauthorized(
                "user identifier is empty".into(),
            ));
        }
        Ok(Self(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionId, GarmentId, TagId, UserId};

    #[test]
    fn generated_ids_parse_back() {
        for _ in 0..32 {
            let id = GarmentId::generate();
            assert_eq!(GarmentId::parse(id.as_str()), Ok(id));
        }
        let tag = TagId::generate();
        assert!(tag.as_str().starts_with("tg-"));
        let col = CollectionId::generate();
        assert!(col.as_str().starts_with("cl-"));
    }

    #[test]
    fn parse_rejects_wrong_prefix_and_shape() {
        assert!(GarmentId::parse("tg-0011aabb").is_err());
        assert!(GarmentId::parse("gm-0011AABB").is_err());
        assert!(GarmentId::parse("gm-123").is_err());
        assert!(GarmentId::parse("gm-zzzzzzzz").is_err());
        assert!(GarmentId::parse("").is_err());
    }

    #[test]
    fn empty_user_is_unauthorized() {
        assert!(UserId::new("  ").is_err());
        assert!(UserId::new("ana").is_ok());
    }
}
