//! Symbol naming and linkage information for module-level entities.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An entity registered in a module symbol table.
///
/// The name is the key the symbol table validates for uniqueness; it does not
/// change once the entity is registered.
pub trait Symbol {
    fn name(&self) -> &str;

    fn visibility(&self) -> Visibility {
        Visibility::default()
    }
}

/// Visibility of a symbol outside of its module.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Visibility {
    /// Visible to other modules and may be overridden in shared libraries.
    Public,

    /// Only referenced from within the defining module.
    #[default]
    Private,

    /// Visible to the module nest it is defined in, but not exported.
    Nested,
}

/// Where the definition of a declared symbol comes from.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Linkage {
    /// Resolved by the linker against another module.
    #[default]
    External,

    /// May be absent at link time; unresolved references become null.
    ExternalWeak,

    /// Resolved at load time against a dynamic library.
    Dynamic,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Nested => write!(f, "nested"),
        }
    }
}

impl std::fmt::Display for Linkage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Linkage::External => write!(f, "external"),
            Linkage::ExternalWeak => write!(f, "extern_weak"),
            Linkage::Dynamic => write!(f, "dynamic"),
        }
    }
}
