//! Primitive value types usable as function inputs and outputs.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents an integer type with a specific bit width.
///
/// Signedness is not represented here; operations interpret the bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct IType {
    num_bits: u32,
}

impl IType {
    pub const I1: Self = Self { num_bits: 1 };
    pub const I8: Self = Self { num_bits: 8 };
    pub const I16: Self = Self { num_bits: 16 };
    pub const I32: Self = Self { num_bits: 32 };
    pub const I64: Self = Self { num_bits: 64 };
    pub const I128: Self = Self { num_bits: 128 };
    pub const MAX_BITS: u32 = (1 << 23) - 1;

    /// Creates a new integer type, `None` if `num_bits` is zero or above [`Self::MAX_BITS`].
    #[inline]
    pub const fn new(num_bits: u32) -> Option<Self> {
        if num_bits >= 1 && num_bits <= Self::MAX_BITS {
            Some(Self { num_bits })
        } else {
            None
        }
    }

    #[inline]
    pub const fn num_bits(&self) -> u32 {
        self.num_bits
    }
}

impl std::fmt::Display for IType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.num_bits)
    }
}

/// Floating-point formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FType {
    /// IEEE-754 binary16
    Fp16,
    /// bfloat16, same exponent range as [`FType::Fp32`] with a 7-bit significand
    Bf16,
    /// IEEE-754 binary32
    Fp32,
    /// IEEE-754 binary64
    Fp64,
    /// IEEE-754 binary128
    Fp128,
}

impl std::fmt::Display for FType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FType::Fp16 => "f16",
            FType::Bf16 => "bf16",
            FType::Fp32 => "f32",
            FType::Fp64 => "f64",
            FType::Fp128 => "f128",
        };
        write!(f, "{}", s)
    }
}

/// Opaque pointer type. Pointers carry no pointee type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PtrType;

impl std::fmt::Display for PtrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ptr")
    }
}

/// Target-sized integer used for indexing and loop induction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexType;

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "index")
    }
}
