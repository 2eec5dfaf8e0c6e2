//! Error taxonomy for the catalog core.
//!
//! Two layers:
//! - [`Error`] is the typed failure returned by core operations, so the
//!   boundary layer can map each class (unauthorized / not-found /
//!   validation / conflict / internal) to a distinct response.
//! - [`ErrorCode`] is the stable machine-readable code (`E####`) carried by
//!   each variant, for logs and JSON error output.

use std::fmt;

/// Result alias used across the core.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Typed failures surfaced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No authenticated user identity was supplied.
    #[error("no acting user: {0}")]
    Unauthorized(String),

    /// An entity was absent, or present but owned by a different user.
    /// Ownership misses are deliberately indistinguishable from absence.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A structurally invalid rule, name, or request payload, with the
    /// specific violated constraint.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A uniqueness violation (currently only duplicate tag names).
    #[error("{kind} already exists: {name}")]
    Conflict { kind: &'static str, name: String },

    /// The target collection is not a smart collection (or vice versa:
    /// a manual-membership operation hit a smart collection).
    #[error("collection {id} is not a smart collection")]
    NotSmart { id: String },

    /// Storage-level or otherwise unexpected failure, surfaced generically.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Construct a [`Error::NotFound`] for an entity kind and id.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Construct a [`Error::Validation`] with the violated constraint.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// The stable machine code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Conflict { .. } => ErrorCode::DuplicateName,
            Self::NotSmart { .. } => ErrorCode::NotSmartCollection,
            Self::Internal(_) => ErrorCode::InternalUnexpected,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Internal(anyhow::Error::new(e).context("catalog storage"))
    }
}

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    Unauthorized,
    NotFound,
    ValidationFailed,
    DuplicateName,
    NotSmartCollection,
    InvalidRule,
    CorruptCatalog,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::Unauthorized => "E1003",
            Self::NotFound => "E2001",
            Self::ValidationFailed => "E2002",
            Self::DuplicateName => "E2003",
            Self::NotSmartCollection => "E2004",
            Self::InvalidRule => "E2005",
            Self::CorruptCatalog => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Catalog not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::Unauthorized => "No acting user",
            Self::NotFound => "Entity not found",
            Self::ValidationFailed => "Validation failed",
            Self::DuplicateName => "Name already in use",
            Self::NotSmartCollection => "Not a smart collection",
            Self::InvalidRule => "Invalid smart-collection rule",
            Self::CorruptCatalog => "Corrupt catalog database",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `gb init` to create a catalog here."),
            Self::ConfigParseError => Some("Fix syntax in .garb/config.toml and retry."),
            Self::Unauthorized => Some("Set --user, GARB_USER, or user.name in config."),
            Self::NotFound => None,
            Self::ValidationFailed => None,
            Self::DuplicateName => Some("Pick a different name, or reuse the existing one."),
            Self::NotSmartCollection => {
                Some("Use `gb collection add/remove` for manual collections.")
            }
            Self::InvalidRule => {
                Some("Use a known field and operator; run `gb rule fields` to list them.")
            }
            Self::CorruptCatalog => Some("Delete .garb/garb.db and re-run `gb init`."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
