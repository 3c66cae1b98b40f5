//! Module: the symbol table owning function-like entities.
//!
//! Entities are registered under a fresh [`Uuid`] and a unique name. The
//! concrete kinds known to the module are the variants of [`AnyFunction`];
//! everything past registration goes through [`FunctionLike`].
use std::collections::BTreeMap;

use log::{debug, info};
use strum::{EnumDiscriminants, EnumIs, EnumTryAs};
use uuid::Uuid;

use crate::{
    config::VerifierConfig,
    interface::FunctionLike,
    modules::func::{Closure, ExternFunc, Func, Kernel},
    utils::Error,
    verify::{VerificationReport, verify_function},
};

pub mod func;
pub mod symbol;

/// Any function-like entity a module can hold.
#[derive(Debug, Clone, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(FunctionKind), derive(Hash))]
pub enum AnyFunction {
    Func(Func),
    Extern(ExternFunc),
    Closure(Closure),
    Kernel(Kernel),
}

impl AnyFunction {
    pub fn as_function(&self) -> &dyn FunctionLike {
        match self {
            AnyFunction::Func(f) => f,
            AnyFunction::Extern(f) => f,
            AnyFunction::Closure(f) => f,
            AnyFunction::Kernel(f) => f,
        }
    }

    pub fn as_function_mut(&mut self) -> &mut dyn FunctionLike {
        match self {
            AnyFunction::Func(f) => f,
            AnyFunction::Extern(f) => f,
            AnyFunction::Closure(f) => f,
            AnyFunction::Kernel(f) => f,
        }
    }

    pub fn kind(&self) -> FunctionKind {
        self.into()
    }

    pub fn name(&self) -> &str {
        self.as_function().name()
    }
}

macro_rules! define_any_function_from {
    ($typ:ty, $variant:ident) => {
        impl From<$typ> for AnyFunction {
            fn from(function: $typ) -> Self {
                AnyFunction::$variant(function)
            }
        }
    };
}

define_any_function_from!(Func, Func);
define_any_function_from!(ExternFunc, Extern);
define_any_function_from!(Closure, Closure);
define_any_function_from!(Kernel, Kernel);

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::Func => write!(f, "func"),
            FunctionKind::Extern => write!(f, "extern"),
            FunctionKind::Closure => write!(f, "closure"),
            FunctionKind::Kernel => write!(f, "kernel"),
        }
    }
}

/// A compilation unit holding uniquely named function-like entities.
#[derive(Debug, Clone, Default)]
pub struct Module {
    functions: BTreeMap<Uuid, AnyFunction>,
    symbols: BTreeMap<String, Uuid>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Register `function`. Fails if its name is already taken.
    pub fn insert(&mut self, function: impl Into<AnyFunction>) -> Result<Uuid, Error> {
        let function = function.into();
        let name = function.name().to_string();
        if self.symbols.contains_key(&name) {
            return Err(Error::DuplicateSymbol { name });
        }

        let uuid = Uuid::new_v4();
        debug!("Registered {} `{}` as {}.", function.kind(), name, uuid);
        self.symbols.insert(name, uuid);
        self.functions.insert(uuid, function);
        Ok(uuid)
    }

    pub fn get(&self, uuid: Uuid) -> Option<&AnyFunction> {
        self.functions.get(&uuid)
    }

    /// Mutable access goes through [`FunctionLike`] so a registered entity
    /// cannot be swapped for one with another name.
    pub fn get_mut(&mut self, uuid: Uuid) -> Option<&mut dyn FunctionLike> {
        self.functions.get_mut(&uuid).map(AnyFunction::as_function_mut)
    }

    pub fn uuid_of(&self, name: &str) -> Option<Uuid> {
        self.symbols.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&AnyFunction> {
        self.get(self.uuid_of(name)?)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut dyn FunctionLike> {
        let uuid = self.uuid_of(name)?;
        self.get_mut(uuid)
    }

    /// Unregister and return the entity; dropping it releases its body.
    pub fn remove(&mut self, uuid: Uuid) -> Option<AnyFunction> {
        let function = self.functions.remove(&uuid)?;
        self.symbols.remove(function.name());
        debug!("Removed {} `{}`.", function.kind(), function.name());
        Some(function)
    }

    pub fn remove_by_name(&mut self, name: &str) -> Option<AnyFunction> {
        let uuid = self.uuid_of(name)?;
        self.remove(uuid)
    }

    /// Entities ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (Uuid, &AnyFunction)> {
        self.symbols
            .values()
            .filter_map(|uuid| self.functions.get(uuid).map(|f| (*uuid, f)))
    }

    pub fn functions(&self) -> impl Iterator<Item = &dyn FunctionLike> {
        self.iter().map(|(_, f)| f.as_function())
    }

    /// Verify every entity with the default configuration, stopping at the
    /// first failure.
    pub fn verify(&self) -> Result<(), Error> {
        self.verify_with(&VerifierConfig::default())
    }

    pub fn verify_with(&self, config: &VerifierConfig) -> Result<(), Error> {
        let single = VerifierConfig {
            max_errors: 1,
            ..config.clone()
        };
        self.verify_all(&single).into_result()
    }

    /// Verify every entity and collect all failures, up to `config.max_errors`.
    pub fn verify_all(&self, config: &VerifierConfig) -> VerificationReport {
        let mut report = VerificationReport::default();
        for function in self.functions() {
            verify_function(function, config, &mut report);
            if report.is_full(config) {
                break;
            }
        }
        info!(
            "Verified {} function(s): {} error(s).",
            self.len(),
            report.len()
        );
        report
    }
}
