//! Types module
//!
//! The type descriptor model used by function-like entities. Types are plain
//! values: two types are the same iff they compare equal, which is all the
//! verification layer relies on.
//!
//! - Primary types: integers, floats, pointers and `index` (see `primary.rs`).
//! - Function types: signatures with input/output lists (see `function.rs`).
//! - Opaque types: dialect-defined types this layer never looks into.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::types::primary::{FType, IType, IndexType, PtrType};

pub mod function;
pub mod primary;

pub use function::{CallingConvention, FunctionType, TypeList};

/// A dialect-defined type, only compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpaqueType {
    pub dialect: String,
    pub name: String,
}

impl std::fmt::Display for OpaqueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}.{}", self.dialect, self.name)
    }
}

/// Any type that can appear in a signature or as a block argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    Int(IType),
    Float(FType),
    Ptr(PtrType),
    Index(IndexType),
    Opaque(OpaqueType),
    /// A function value, e.g. a function pointer passed as an argument.
    Function(Box<FunctionType>),
}

macro_rules! type_from {
    ($typ:ty, $variant:ident) => {
        impl From<$typ> for Type {
            fn from(value: $typ) -> Self {
                Type::$variant(value)
            }
        }
    };
}

type_from! { IType, Int }
type_from! { FType, Float }
type_from! { PtrType, Ptr }
type_from! { IndexType, Index }
type_from! { OpaqueType, Opaque }

impl From<FunctionType> for Type {
    fn from(value: FunctionType) -> Self {
        Type::Function(Box::new(value))
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int(ty) => write!(f, "{}", ty),
            Type::Float(ty) => write!(f, "{}", ty),
            Type::Ptr(ty) => write!(f, "{}", ty),
            Type::Index(ty) => write!(f, "{}", ty),
            Type::Opaque(ty) => write!(f, "{}", ty),
            Type::Function(ty) => write!(f, "{}", ty),
        }
    }
}
