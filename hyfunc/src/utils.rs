use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

use crate::{region::BlockId, types::Type};

/// Which side of a signature an index or attribute sequence refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum SignatureSlot {
    Argument,
    Result,
}

impl std::fmt::Display for SignatureSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureSlot::Argument => write!(f, "argument"),
            SignatureSlot::Result => write!(f, "result"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// `add_entry_block` was called on a function that already has a body.
    #[error("Function `{function}` already has an entry block.")]
    EntryBlockAlreadyExists { function: String },

    /// A block operation requires an entry block but the function is external.
    #[error(
        "Function `{function}` has no entry block. Blocks cannot be added to an external function before its entry block."
    )]
    MissingEntryBlock { function: String },

    /// A block handle does not belong to the region it was used with.
    #[error("The block `{0}` is not part of this region.")]
    UnknownBlock(BlockId),

    /// An argument or result index exceeds the current arity.
    #[error(
        "Function `{function}` has {count} {slot}(s); {slot} index {index} is out of range."
    )]
    IndexOutOfRange {
        function: String,
        slot: SignatureSlot,
        index: usize,
        count: usize,
    },

    /// A full attribute sequence does not have one dictionary per argument/result.
    #[error(
        "Function `{function}` expects {expected} {slot} attribute dictionaries, but {found} were provided."
    )]
    AttrCountMismatch {
        function: String,
        slot: SignatureSlot,
        expected: usize,
        found: usize,
    },

    /// Parallel lists given to a structured edit have different lengths.
    #[error("Function `{function}` edit expects {expected} {what}, but {found} were provided.")]
    LengthMismatch {
        function: String,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Insertion indices must be sorted ascending.
    #[error("Function `{function}`: {slot} insertion indices must be sorted in ascending order.")]
    UnsortedIndices {
        function: String,
        slot: SignatureSlot,
    },

    /// An entry block argument scheduled for removal is still used by an operation.
    #[error("Function `{function}`: argument #{index} cannot be erased while it still has uses.")]
    ArgumentInUse { function: String, index: usize },

    /// The entry block arity disagrees with the signature.
    #[error(
        "Entry block of function `{function}` must have {expected} arguments to match the function signature, but has {found}."
    )]
    EntryBlockArgCount {
        function: String,
        expected: usize,
        found: usize,
    },

    /// An entry block argument type disagrees with the signature.
    #[error(
        "Type of entry block argument #{index} ({found}) of function `{function}` must match the type of the corresponding argument in the function signature ({expected})."
    )]
    EntryBlockArgType {
        function: String,
        index: usize,
        expected: Type,
        found: Type,
    },

    /// More attribute dictionaries are stored than the signature has slots.
    #[error(
        "Function `{function}` stores {len} {slot} attribute dictionaries but only has {count} {slot}(s)."
    )]
    AttrSeqTooLong {
        function: String,
        slot: SignatureSlot,
        len: usize,
        count: usize,
    },

    /// Argument/result attribute keys must carry a dialect prefix.
    #[error(
        "Function `{function}`: {slot} #{index} carries attribute `{key}`, but {slot}s may only have dialect (namespaced) attributes."
    )]
    AttrNotNamespaced {
        function: String,
        slot: SignatureSlot,
        index: usize,
        key: String,
    },

    /// Function exceeds maximum allowed number of arguments.
    #[error(
        "Function `{function}` contains {count} arguments, exceeding the maximum allowed of {max}."
    )]
    FunctionTooManyArguments {
        function: String,
        count: usize,
        max: usize,
    },

    /// Function exceeds maximum allowed number of results.
    #[error("Function `{function}` contains {count} results, exceeding the maximum allowed of {max}.")]
    FunctionTooManyResults {
        function: String,
        count: usize,
        max: usize,
    },

    /// Function exceeds maximum allowed number of blocks.
    #[error("Function `{function}` contains {count} blocks, exceeding the maximum allowed of {max}.")]
    FunctionTooManyBlocks {
        function: String,
        count: usize,
        max: usize,
    },

    /// Entity-specific signature check failed.
    #[error("Function `{function}` has an invalid signature: {reason}")]
    InvalidSignature { function: String, reason: String },

    /// An external declaration carries a body.
    #[error("`{function}` is declared external and must not have a body.")]
    DeclarationHasBody { function: String },

    /// A symbol with the same name is already registered in the module.
    #[error("A symbol named `{name}` is already defined in the module.")]
    DuplicateSymbol { name: String },

    /// Configuration could not be loaded.
    #[error("Invalid verifier configuration: {0}")]
    InvalidConfig(String),
}
