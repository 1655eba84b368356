//! Authenticated identity and the scope vocabulary routes declare.

/// Scope names routes require (spec.md §4.7).
pub mod scope {
    /// Read access to function metadata.
    pub const FUNCTIONS_READ: &str = "functions:read";
    /// Create or update function definitions.
    pub const FUNCTIONS_WRITE: &str = "functions:write";
    /// Deploy a new version to an existing function.
    pub const FUNCTIONS_DEPLOY: &str = "functions:deploy";
}

/// The caller a request's credentials resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable identifier for the caller (subject, API key owner, etc.).
    pub id: String,
    /// Scopes granted to this caller.
    pub scopes: Vec<String>,
}

impl Principal {
    /// Construct a principal with the given id and scopes.
    pub fn new(id: impl Into<String>, scopes: Vec<String>) -> Self {
        Self { id: id.into(), scopes }
    }

    /// Whether this principal carries `scope`.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}
