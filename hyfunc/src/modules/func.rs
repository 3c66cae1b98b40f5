//! Concrete function-like entities.
//!
//! Each kind stores its state in a [`FunctionData`] and implements
//! [`FunctionLike`] through `impl_function_like!`, overriding only the hooks
//! it needs:
//!
//! - [`Func`]: a function defined in the module.
//! - [`ExternFunc`]: a declaration resolved at link or load time.
//! - [`Closure`]: a function whose leading inputs are captured values.
//! - [`Kernel`]: a device entry point launched by the host.
use crate::{
    attributes::{AttrDict, AttrSeq},
    interface::FunctionLike,
    location::Location,
    modules::symbol::{Linkage, Symbol, Visibility},
    region::Region,
    types::{CallingConvention, FunctionType, Type, TypeList},
    utils::Error,
};

/// State shared by every function-like entity.
#[derive(Debug, Clone, Default)]
pub struct FunctionData {
    name: String,
    ty: FunctionType,
    body: Region,
    arg_attrs: AttrSeq,
    result_attrs: AttrSeq,
    attributes: AttrDict,
    location: Location,
}

impl FunctionData {
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Self {
            name: name.into(),
            ty,
            ..Default::default()
        }
    }
}

macro_rules! impl_function_like {
    ($entity:ty { $($hooks:tt)* }) => {
        impl FunctionLike for $entity {
            fn function_type(&self) -> &FunctionType {
                &self.data.ty
            }

            fn set_type(&mut self, ty: FunctionType) {
                self.data.ty = ty;
            }

            fn body(&self) -> &Region {
                &self.data.body
            }

            fn body_mut(&mut self) -> &mut Region {
                &mut self.data.body
            }

            fn arg_attr_seq(&self) -> &AttrSeq {
                &self.data.arg_attrs
            }

            fn arg_attr_seq_mut(&mut self) -> &mut AttrSeq {
                &mut self.data.arg_attrs
            }

            fn result_attr_seq(&self) -> &AttrSeq {
                &self.data.result_attrs
            }

            fn result_attr_seq_mut(&mut self) -> &mut AttrSeq {
                &mut self.data.result_attrs
            }

            fn attributes(&self) -> &AttrDict {
                &self.data.attributes
            }

            fn attributes_mut(&mut self) -> &mut AttrDict {
                &mut self.data.attributes
            }

            fn location(&self) -> &Location {
                &self.data.location
            }

            $($hooks)*
        }

        impl $entity {
            /// Set the declared location of the entity.
            pub fn with_location(mut self, location: Location) -> Self {
                self.data.location = location;
                self
            }
        }
    };
}

/// A function defined within the module.
#[derive(Debug, Clone)]
pub struct Func {
    data: FunctionData,
    visibility: Visibility,
}

impl Func {
    /// Create a function without body. Call [`FunctionLike::add_entry_block`]
    /// to start defining it.
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Self {
            data: FunctionData::new(name, ty),
            visibility: Visibility::default(),
        }
    }

    /// Create a function together with its entry block.
    pub fn with_entry_block(name: impl Into<String>, ty: FunctionType, location: Location) -> Self {
        let mut func = Self::new(name, ty).with_location(location);
        // A new function has no body, so this cannot fail
        let _ = func.add_entry_block();
        func
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl Symbol for Func {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl_function_like!(Func {});

/// A function declared here but defined elsewhere. It never has a body.
#[derive(Debug, Clone)]
pub struct ExternFunc {
    data: FunctionData,
    linkage: Linkage,
}

impl ExternFunc {
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Self {
            data: FunctionData::new(name, ty),
            linkage: Linkage::default(),
        }
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }
}

impl Symbol for ExternFunc {
    fn name(&self) -> &str {
        &self.data.name
    }
}

impl_function_like!(ExternFunc {
    fn verify_type(&self) -> Result<(), Error> {
        if !self.is_external() {
            return Err(Error::DeclarationHasBody {
                function: self.data.name.clone(),
            });
        }
        Ok(())
    }
});

/// A function whose first inputs are the values it captured.
///
/// The signature is `(captures..., params...) -> results`. Structured edits
/// may change the parameters freely; touching the captured prefix is caught
/// by [`FunctionLike::verify_type`].
#[derive(Debug, Clone)]
pub struct Closure {
    data: FunctionData,
    captures: TypeList,
}

impl Closure {
    pub fn new(
        name: impl Into<String>,
        captures: impl IntoIterator<Item = Type>,
        params: impl IntoIterator<Item = Type>,
        results: impl IntoIterator<Item = Type>,
    ) -> Self {
        let captures: TypeList = captures.into_iter().collect();
        let inputs = captures.iter().cloned().chain(params);
        Self {
            data: FunctionData::new(name, FunctionType::new(inputs, results)),
            captures,
        }
    }

    pub fn captures(&self) -> &[Type] {
        &self.captures
    }

    /// Inputs after the captured prefix.
    pub fn params(&self) -> &[Type] {
        let inputs = self.data.ty.inputs();
        &inputs[self.captures.len().min(inputs.len())..]
    }
}

impl Symbol for Closure {
    fn name(&self) -> &str {
        &self.data.name
    }
}

impl_function_like!(Closure {
    fn verify_type(&self) -> Result<(), Error> {
        let ty = &self.data.ty;
        if ty.is_variadic() {
            return Err(Error::InvalidSignature {
                function: self.data.name.clone(),
                reason: "closures cannot be variadic".to_string(),
            });
        }
        if !ty.inputs().starts_with(&self.captures) {
            return Err(Error::InvalidSignature {
                function: self.data.name.clone(),
                reason: format!(
                    "the first {} input(s) must be the captured values",
                    self.captures.len()
                ),
            });
        }
        Ok(())
    }
});

/// A device entry point. Kernels take inputs only and always use the kernel
/// calling convention.
#[derive(Debug, Clone)]
pub struct Kernel {
    data: FunctionData,
    workgroup_size: [u32; 3],
}

impl Kernel {
    pub fn new(name: impl Into<String>, inputs: impl IntoIterator<Item = Type>) -> Self {
        let ty = FunctionType::new(inputs, []).with_cconv(CallingConvention::KernelC);
        Self {
            data: FunctionData::new(name, ty),
            workgroup_size: [1, 1, 1],
        }
    }

    pub fn with_workgroup_size(mut self, workgroup_size: [u32; 3]) -> Self {
        self.workgroup_size = workgroup_size;
        self
    }

    pub fn workgroup_size(&self) -> [u32; 3] {
        self.workgroup_size
    }
}

impl Symbol for Kernel {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn visibility(&self) -> Visibility {
        Visibility::Public
    }
}

impl_function_like!(Kernel {
    fn clone_type_with(&self, inputs: TypeList, outputs: TypeList) -> FunctionType {
        self.data
            .ty
            .clone_with(inputs, outputs)
            .with_cconv(CallingConvention::KernelC)
    }

    fn verify_type(&self) -> Result<(), Error> {
        let ty = &self.data.ty;
        let reason = if ty.num_outputs() != 0 {
            "kernels cannot return values"
        } else if ty.is_variadic() {
            "kernels cannot be variadic"
        } else if ty.cconv() != CallingConvention::KernelC {
            "kernels must use the kernel calling convention"
        } else if self.workgroup_size.contains(&0) {
            "workgroup dimensions must be non-zero"
        } else {
            return Ok(());
        };
        Err(Error::InvalidSignature {
            function: self.data.name.clone(),
            reason: reason.to_string(),
        })
    }
});
