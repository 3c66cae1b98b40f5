//! Hyfunc: the function-like abstraction of a compiler IR.
//!
//! A function-like entity owns a signature ([`types::FunctionType`]), a body
//! made of basic blocks ([`region::Region`]) and one attribute dictionary per
//! argument and per result ([`attributes::AttrSeq`]). The [`FunctionLike`]
//! trait keeps the three in sync across structured signature edits; concrete
//! entities live in [`modules::func`] and are owned by a [`Module`].
//!
//! Example
//! ```
//! use hyfunc::prelude::*;
//!
//! let ty = FunctionType::new([IType::I32.into()], [IType::I32.into()]);
//! let mut foo = Func::new("foo", ty);
//! foo.add_entry_block()?;
//!
//! foo.insert_argument(1, FType::Fp32.into(), AttrDict::new(), Location::Unknown)?;
//! assert_eq!(foo.function_type().to_string(), "(i32, f32) -> i32");
//! assert_eq!(foo.arguments().len(), 2);
//! foo.verify_body()?;
//!
//! let mut module = Module::new();
//! module.insert(foo)?;
//! module.verify()?;
//! # Ok::<(), hyfunc::utils::Error>(())
//! ```

/// Attribute values, dictionaries and per-slot sequences.
pub mod attributes;
/// Verifier limits and rules, optionally loaded from TOML.
pub mod config;
/// The [`FunctionLike`] capability contract.
pub mod interface;
/// Source locations.
pub mod location;
/// Concrete entities and the module symbol table.
pub mod modules;
/// Blocks, block arguments and operations.
pub mod region;
/// Type descriptors.
pub mod types;
/// Error and shared enumerations.
pub mod utils;
/// Module verification driver.
pub mod verify;

pub use interface::FunctionLike;
pub use modules::Module;
pub use utils::Error;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::attributes::{AttrDict, AttrSeq, Attribute};
    pub use crate::config::VerifierConfig;
    pub use crate::interface::FunctionLike;
    pub use crate::location::Location;
    pub use crate::modules::{
        AnyFunction, FunctionKind, Module,
        func::{Closure, ExternFunc, Func, Kernel},
        symbol::{Linkage, Symbol, Visibility},
    };
    pub use crate::region::{BlockId, OperationState, Region, ValueId, WalkOrder};
    pub use crate::types::{
        CallingConvention, FunctionType, OpaqueType, Type, TypeList,
        primary::{FType, IType, IndexType, PtrType},
    };
    pub use crate::utils::{Error, SignatureSlot};
    pub use crate::verify::VerificationReport;
}
