//! Verifier configuration.
//!
//! With the `serde` feature enabled the configuration can be read from and
//! written to TOML, e.g.
//!
//! ```toml
//! max_arguments = 16
//! require_namespaced_attrs = true
//! max_errors = 0
//! ```
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::utils::Error;

/// Limits and rules applied by the module verifier on top of the structural
/// checks every function-like entity gets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VerifierConfig {
    /// Upper bound on signature inputs. `None` means unlimited.
    pub max_arguments: Option<usize>,

    /// Upper bound on signature outputs. `None` means unlimited.
    pub max_results: Option<usize>,

    /// Upper bound on the number of blocks of a body. `None` means unlimited.
    pub max_blocks: Option<usize>,

    /// Require every argument/result attribute key to be dialect-prefixed
    /// (`"llvm.noalias"` rather than `"noalias"`).
    pub require_namespaced_attrs: bool,

    /// Stop collecting once this many errors are reported. `0` collects all.
    pub max_errors: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_arguments: None,
            max_results: None,
            max_blocks: None,
            require_namespaced_attrs: false,
            max_errors: 0,
        }
    }
}

impl VerifierConfig {
    /// Default limits with namespaced attribute keys required.
    pub fn strict() -> Self {
        Self {
            require_namespaced_attrs: true,
            ..Default::default()
        }
    }

    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        toml::from_str(source).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Load the configuration from a TOML file.
    #[cfg(feature = "serde")]
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("Failed to read `{}`: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }
}
