//! Capability descriptors
//!
//! Every adapter type declares who it is (name, version), which licensing
//! tier it belongs to and which optional behaviors it offers. Capability
//! tokens are opaque strings tested for exact membership.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Licensing/feature class of an adapter. Informational only to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Available to everyone
    #[default]
    Free,
    /// Mid tier
    Value,
    /// Top tier
    Flagship,
}

impl Tier {
    /// Lowercase name, as used in log context.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Value => "value",
            Self::Flagship => "flagship",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of an adapter type.
///
/// # Example
///
/// ```rust
/// use adapterkit::{CapabilityDescriptor, Tier};
///
/// let info = CapabilityDescriptor::new("acme-cms", "1.2.0", Tier::Value)
///     .with_capabilities(["publish", "schedule"]);
///
/// assert!(info.supports("publish"));
/// assert!(!info.supports("Publish"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Adapter name
    pub name: String,
    /// Adapter version
    pub version: String,
    /// Licensing tier
    pub tier: Tier,
    /// Capability tokens
    pub capabilities: BTreeSet<String>,
}

impl CapabilityDescriptor {
    /// Create a descriptor with no capabilities.
    pub fn new(name: impl Into<String>, version: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tier,
            capabilities: BTreeSet::new(),
        }
    }

    /// Add one capability token.
    pub fn with_capability(mut self, token: impl Into<String>) -> Self {
        self.capabilities.insert(token.into());
        self
    }

    /// Add several capability tokens.
    pub fn with_capabilities<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Exact, case-sensitive membership test.
    pub fn supports(&self, token: &str) -> bool {
        self.capabilities.contains(token)
    }
}
