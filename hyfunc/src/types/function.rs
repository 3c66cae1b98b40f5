//! Function signature types.
//!
//! A [`FunctionType`] is the source of truth for the arity and typing of a
//! function-like entity. Besides its input and output lists it carries "shape"
//! markers (calling convention, variadic flag) which survive every structured
//! edit made through [`FunctionType::clone_with`].
use bit_set::BitSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::Type;

/// Inline storage for the inputs or outputs of a signature.
pub type TypeList = SmallVec<[Type; 4]>;

/// Calling convention attached to a signature.
///
/// The convention of a caller/callee pair must match. It is a shape marker of
/// the signature and is never altered by argument or result edits.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CallingConvention {
    /// The target C calling convention. Supports varargs.
    #[default]
    C,

    /// Make calls as fast as possible, no fixed ABI. Does not support varargs.
    FastC,

    /// Optimise the caller under the assumption that the call is rarely executed.
    ColdC,

    /// Like `FastC` but guarantees tail call optimization when possible.
    TailC,

    /// Device entry convention used by hardware kernels.
    KernelC,

    /// Target-specific convention referenced by number.
    Numbered(u32),
}

impl std::fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallingConvention::C => write!(f, "ccc"),
            CallingConvention::FastC => write!(f, "fastcc"),
            CallingConvention::ColdC => write!(f, "coldcc"),
            CallingConvention::TailC => write!(f, "tailcc"),
            CallingConvention::KernelC => write!(f, "kernelcc"),
            CallingConvention::Numbered(n) => write!(f, "cc {}", n),
        }
    }
}

/// Signature of a function-like entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionType {
    inputs: TypeList,
    outputs: TypeList,
    cconv: CallingConvention,
    variadic: bool,
}

impl FunctionType {
    /// Create a signature with the default calling convention.
    pub fn new(
        inputs: impl IntoIterator<Item = Type>,
        outputs: impl IntoIterator<Item = Type>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
            cconv: CallingConvention::default(),
            variadic: false,
        }
    }

    pub fn with_cconv(mut self, cconv: CallingConvention) -> Self {
        self.cconv = cconv;
        self
    }

    pub fn with_variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }

    #[inline]
    pub fn inputs(&self) -> &[Type] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[Type] {
        &self.outputs
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    #[inline]
    pub fn cconv(&self) -> CallingConvention {
        self.cconv
    }

    #[inline]
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Return a copy of this signature with replaced input and output lists.
    ///
    /// Calling convention and variadic flag are kept.
    pub fn clone_with(&self, inputs: TypeList, outputs: TypeList) -> Self {
        Self {
            inputs,
            outputs,
            cconv: self.cconv,
            variadic: self.variadic,
        }
    }
}

impl std::fmt::Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        write_type_list(f, &self.inputs)?;
        if self.variadic {
            if self.inputs.is_empty() {
                write!(f, "...")?;
            } else {
                write!(f, ", ...")?;
            }
        }
        write!(f, ") -> ")?;

        // A single non-function output is printed bare
        match self.outputs.as_slice() {
            [single] if !single.is_function() => write!(f, "{}", single),
            outputs => {
                write!(f, "(")?;
                write_type_list(f, outputs)?;
                write!(f, ")")
            }
        }
    }
}

fn write_type_list(f: &mut std::fmt::Formatter<'_>, types: &[Type]) -> std::fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

/// Insert `new_types` into `types` at the given positions.
///
/// `indices` refer to positions in the original list and must be sorted
/// ascending. Several new types sharing an index are inserted in list order.
/// Callers validate `indices` beforehand.
pub(crate) fn insert_types(types: &[Type], indices: &[usize], new_types: &[Type]) -> TypeList {
    debug_assert_eq!(indices.len(), new_types.len());
    let mut result = TypeList::with_capacity(types.len() + new_types.len());
    let mut old_idx = 0;
    for (&index, ty) in indices.iter().zip(new_types) {
        result.extend(types[old_idx..index].iter().cloned());
        old_idx = index;
        result.push(ty.clone());
    }
    result.extend(types[old_idx..].iter().cloned());
    result
}

/// Return `types` without the positions set in `indices`.
pub(crate) fn filter_types(types: &[Type], indices: &BitSet) -> TypeList {
    types
        .iter()
        .enumerate()
        .filter(|(i, _)| !indices.contains(*i))
        .map(|(_, ty)| ty.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::primary::{FType, IType};

    #[test]
    fn insert_types_keeps_list_order_for_duplicates() {
        let old = [Type::from(IType::I8), Type::from(IType::I64)];
        let result = insert_types(
            &old,
            &[1, 1, 2],
            &[FType::Fp32.into(), FType::Fp64.into(), IType::I1.into()],
        );
        assert_eq!(
            result.as_slice(),
            &[
                Type::from(IType::I8),
                FType::Fp32.into(),
                FType::Fp64.into(),
                IType::I64.into(),
                IType::I1.into(),
            ]
        );
    }

    #[test]
    fn clone_with_preserves_shape() {
        let ty = FunctionType::new([IType::I32.into()], [])
            .with_cconv(CallingConvention::TailC)
            .with_variadic(true);
        let cloned = ty.clone_with(TypeList::new(), [Type::from(IType::I1)].into_iter().collect());
        assert_eq!(cloned.cconv(), CallingConvention::TailC);
        assert!(cloned.is_variadic());
        assert_eq!(cloned.num_inputs(), 0);
        assert_eq!(cloned.outputs(), &[Type::from(IType::I1)]);
    }

    #[test]
    fn display_matches_arity() {
        let single = FunctionType::new([IType::I32.into()], [IType::I32.into()]);
        assert_eq!(single.to_string(), "(i32) -> i32");

        let pair = FunctionType::new([IType::I32.into()], [IType::I32.into(), IType::I32.into()]);
        assert_eq!(pair.to_string(), "(i32) -> (i32, i32)");

        let none = FunctionType::new([], []).with_variadic(true);
        assert_eq!(none.to_string(), "(...) -> ()");
    }
}
