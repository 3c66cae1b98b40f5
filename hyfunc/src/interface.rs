//! The function capability contract.
//!
//! [`FunctionLike`] is implemented by every function-like entity (defined
//! functions, external declarations, closures, kernels, ...). An implementor
//! only exposes its storage (signature, body, attribute sequences, location)
//! and may override two hooks:
//!
//! - [`FunctionLike::clone_type_with`] builds a signature with new input and
//!   output lists but the same shape as the current one;
//! - [`FunctionLike::verify_type`] adds entity-specific signature checks.
//!
//! Everything else (body management, attribute access, structured signature
//! edits and body verification) is provided once in terms of those.
//!
//! # Keeping the entity consistent
//! The signature, the per-argument/per-result attribute sequences and the
//! entry block arguments must agree. Structured edits (`insert_*`, `erase_*`)
//! validate all their inputs before writing anything and then update the three
//! together, so a failed edit leaves the entity untouched.
//!
//! [`FunctionLike::set_type`] is the exception: it replaces the signature and
//! nothing else. Callers doing bulk rewrites through it are responsible for
//! fixing entry block arguments and attribute sequences themselves, and should
//! run [`FunctionLike::verify_body`] (or the module verifier) once done.
use bit_set::BitSet;
use log::{debug, trace};

use crate::{
    attributes::{AttrDict, AttrSeq, Attribute, EMPTY_DICT},
    location::Location,
    modules::symbol::Symbol,
    region::{Block, BlockArgument, BlockId, Region},
    types::{
        FunctionType, Type, TypeList,
        function::{filter_types, insert_types},
    },
    utils::{Error, SignatureSlot},
};

pub trait FunctionLike: Symbol {
    /// Current signature.
    fn function_type(&self) -> &FunctionType;

    /// Replace the signature without touching anything else.
    ///
    /// This is unchecked: entry block arguments and attribute sequences are
    /// not reconciled with the new type. The caller restores consistency and
    /// verifies afterwards.
    fn set_type(&mut self, ty: FunctionType);

    fn body(&self) -> &Region;

    fn body_mut(&mut self) -> &mut Region;

    /// Per-argument attribute dictionaries.
    fn arg_attr_seq(&self) -> &AttrSeq;

    fn arg_attr_seq_mut(&mut self) -> &mut AttrSeq;

    /// Per-result attribute dictionaries.
    fn result_attr_seq(&self) -> &AttrSeq;

    fn result_attr_seq_mut(&mut self) -> &mut AttrSeq;

    /// Entity-level attributes.
    fn attributes(&self) -> &AttrDict;

    fn attributes_mut(&mut self) -> &mut AttrDict;

    /// Declared source location, also used for synthesized entry block arguments.
    fn location(&self) -> &Location;

    /// Build a signature with the given lists and the shape of the current one.
    fn clone_type_with(&self, inputs: TypeList, outputs: TypeList) -> FunctionType {
        self.function_type().clone_with(inputs, outputs)
    }

    /// Entity-specific signature checks, run before [`Self::verify_body`].
    fn verify_type(&self) -> Result<(), Error> {
        Ok(())
    }

    fn num_arguments(&self) -> usize {
        self.function_type().num_inputs()
    }

    fn num_results(&self) -> usize {
        self.function_type().num_outputs()
    }

    fn argument_types(&self) -> &[Type] {
        self.function_type().inputs()
    }

    fn result_types(&self) -> &[Type] {
        self.function_type().outputs()
    }

    fn slot_count(&self, slot: SignatureSlot) -> usize {
        match slot {
            SignatureSlot::Argument => self.num_arguments(),
            SignatureSlot::Result => self.num_results(),
        }
    }

    /// A function without blocks is a declaration.
    fn is_external(&self) -> bool {
        self.body().is_empty()
    }

    /// The body, or `None` for an external function.
    fn callable_region(&self) -> Option<&Region> {
        if self.is_external() {
            None
        } else {
            Some(self.body())
        }
    }

    fn entry_block(&self) -> Option<&Block> {
        self.body().entry_block()
    }

    /// Entry block arguments, empty for an external function.
    fn arguments(&self) -> &[BlockArgument] {
        self.entry_block().map(Block::arguments).unwrap_or(&[])
    }

    /// Create the entry block with one argument per signature input, each
    /// located at the function's location.
    fn add_entry_block(&mut self) -> Result<BlockId, Error> {
        if !self.is_external() {
            return Err(Error::EntryBlockAlreadyExists {
                function: self.name().to_string(),
            });
        }

        let loc = self.location().clone();
        let arguments: Vec<_> = self
            .argument_types()
            .iter()
            .map(|ty| (ty.clone(), loc.clone()))
            .collect();
        let id = self.body_mut().push_block(arguments);
        trace!("Created entry block {} of `{}`.", id, self.name());
        Ok(id)
    }

    /// Append an empty block after the last one. Requires an entry block.
    fn add_block(&mut self) -> Result<BlockId, Error> {
        if self.is_external() {
            return Err(Error::MissingEntryBlock {
                function: self.name().to_string(),
            });
        }
        Ok(self.body_mut().push_block([]))
    }

    /// Drop every block. The function becomes external.
    fn erase_body(&mut self) {
        debug!("Erasing body of `{}` ({} blocks).", self.name(), self.body().len());
        self.body_mut().clear();
    }

    fn slot_attrs(&self, slot: SignatureSlot) -> &AttrSeq {
        match slot {
            SignatureSlot::Argument => self.arg_attr_seq(),
            SignatureSlot::Result => self.result_attr_seq(),
        }
    }

    fn slot_attrs_mut(&mut self, slot: SignatureSlot) -> &mut AttrSeq {
        match slot {
            SignatureSlot::Argument => self.arg_attr_seq_mut(),
            SignatureSlot::Result => self.result_attr_seq_mut(),
        }
    }

    fn check_index(&self, slot: SignatureSlot, index: usize) -> Result<(), Error> {
        let count = self.slot_count(slot);
        if index >= count {
            return Err(Error::IndexOutOfRange {
                function: self.name().to_string(),
                slot,
                index,
                count,
            });
        }
        Ok(())
    }

    /// Dictionary of argument/result `index`, empty when nothing is stored.
    fn attr_dict(&self, slot: SignatureSlot, index: usize) -> Result<&AttrDict, Error> {
        self.check_index(slot, index)?;
        Ok(self.slot_attrs(slot).get(index).unwrap_or(&EMPTY_DICT))
    }

    fn attr(&self, slot: SignatureSlot, index: usize, key: &str) -> Result<Option<&Attribute>, Error> {
        Ok(self.attr_dict(slot, index)?.get(key))
    }

    /// Replace the dictionary of `index`. An empty dictionary removes the entry.
    fn set_attr_dict(&mut self, slot: SignatureSlot, index: usize, dict: AttrDict) -> Result<(), Error> {
        self.check_index(slot, index)?;
        let count = self.slot_count(slot);
        self.slot_attrs_mut(slot).set(index, count, dict);
        Ok(())
    }

    /// Upsert `key` in the dictionary of `index`, returning the previous value.
    fn set_attr(
        &mut self,
        slot: SignatureSlot,
        index: usize,
        key: &str,
        value: Attribute,
    ) -> Result<Option<Attribute>, Error> {
        self.check_index(slot, index)?;
        let count = self.slot_count(slot);
        Ok(self.slot_attrs_mut(slot).set_attr(index, count, key, value))
    }

    fn remove_attr(&mut self, slot: SignatureSlot, index: usize, key: &str) -> Result<Option<Attribute>, Error> {
        self.check_index(slot, index)?;
        Ok(self.slot_attrs_mut(slot).remove_attr(index, key))
    }

    /// Replace all dictionaries of one side. Needs exactly one per slot.
    fn set_all_attr_dicts(&mut self, slot: SignatureSlot, dicts: Vec<AttrDict>) -> Result<(), Error> {
        let expected = self.slot_count(slot);
        if dicts.len() != expected {
            return Err(Error::AttrCountMismatch {
                function: self.name().to_string(),
                slot,
                expected,
                found: dicts.len(),
            });
        }
        self.slot_attrs_mut(slot).set_all(dicts);
        Ok(())
    }

    fn arg_attr_dict(&self, index: usize) -> Result<&AttrDict, Error> {
        self.attr_dict(SignatureSlot::Argument, index)
    }

    fn arg_attr(&self, index: usize, key: &str) -> Result<Option<&Attribute>, Error> {
        self.attr(SignatureSlot::Argument, index, key)
    }

    /// Stored argument dictionaries; empty when no argument has attributes.
    fn arg_attr_dicts(&self) -> &[AttrDict] {
        self.arg_attr_seq().as_slice()
    }

    fn set_arg_attr_dict(&mut self, index: usize, dict: AttrDict) -> Result<(), Error> {
        self.set_attr_dict(SignatureSlot::Argument, index, dict)
    }

    fn set_arg_attr(&mut self, index: usize, key: &str, value: Attribute) -> Result<Option<Attribute>, Error> {
        self.set_attr(SignatureSlot::Argument, index, key, value)
    }

    fn remove_arg_attr(&mut self, index: usize, key: &str) -> Result<Option<Attribute>, Error> {
        self.remove_attr(SignatureSlot::Argument, index, key)
    }

    fn set_all_arg_attr_dicts(&mut self, dicts: Vec<AttrDict>) -> Result<(), Error> {
        self.set_all_attr_dicts(SignatureSlot::Argument, dicts)
    }

    fn result_attr_dict(&self, index: usize) -> Result<&AttrDict, Error> {
        self.attr_dict(SignatureSlot::Result, index)
    }

    fn result_attr(&self, index: usize, key: &str) -> Result<Option<&Attribute>, Error> {
        self.attr(SignatureSlot::Result, index, key)
    }

    /// Stored result dictionaries; empty when no result has attributes.
    fn result_attr_dicts(&self) -> &[AttrDict] {
        self.result_attr_seq().as_slice()
    }

    fn set_result_attr_dict(&mut self, index: usize, dict: AttrDict) -> Result<(), Error> {
        self.set_attr_dict(SignatureSlot::Result, index, dict)
    }

    fn set_result_attr(&mut self, index: usize, key: &str, value: Attribute) -> Result<Option<Attribute>, Error> {
        self.set_attr(SignatureSlot::Result, index, key, value)
    }

    fn remove_result_attr(&mut self, index: usize, key: &str) -> Result<Option<Attribute>, Error> {
        self.remove_attr(SignatureSlot::Result, index, key)
    }

    fn set_all_result_attr_dicts(&mut self, dicts: Vec<AttrDict>) -> Result<(), Error> {
        self.set_all_attr_dicts(SignatureSlot::Result, dicts)
    }

    /// Validate the parallel lists of an insertion on `slot`.
    ///
    /// `attrs` and `locs` may be empty (no attributes, default locations).
    fn check_insertion(
        &self,
        slot: SignatureSlot,
        indices: &[usize],
        num_types: usize,
        num_attrs: usize,
        num_locs: usize,
    ) -> Result<(), Error> {
        let mismatch = |what, found| Error::LengthMismatch {
            function: self.name().to_string(),
            what,
            expected: indices.len(),
            found,
        };
        if num_types != indices.len() {
            return Err(mismatch("types", num_types));
        }
        if num_attrs != 0 && num_attrs != indices.len() {
            return Err(mismatch("attribute dictionaries", num_attrs));
        }
        if num_locs != 0 && num_locs != indices.len() {
            return Err(mismatch("locations", num_locs));
        }
        if indices.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::UnsortedIndices {
                function: self.name().to_string(),
                slot,
            });
        }

        // Inserting at `count` appends
        let count = self.slot_count(slot);
        if let Some(&index) = indices.last().filter(|&&index| index > count) {
            return Err(Error::IndexOutOfRange {
                function: self.name().to_string(),
                slot,
                index,
                count,
            });
        }
        Ok(())
    }

    fn check_erasure(&self, slot: SignatureSlot, indices: &BitSet) -> Result<(), Error> {
        let count = self.slot_count(slot);
        match indices.iter().find(|&index| index >= count) {
            Some(index) => Err(Error::IndexOutOfRange {
                function: self.name().to_string(),
                slot,
                index,
                count,
            }),
            None => Ok(()),
        }
    }

    /// Insert arguments at the given positions of the current signature.
    ///
    /// `indices` must be sorted ascending; several new arguments at the same
    /// index are inserted in list order. `attrs` and `locs` are either empty or
    /// parallel to `types`; missing locations default to the function's. When
    /// the function has a body the entry block receives matching arguments.
    fn insert_arguments(
        &mut self,
        indices: &[usize],
        types: &[Type],
        attrs: &[AttrDict],
        locs: &[Location],
    ) -> Result<(), Error> {
        self.check_insertion(
            SignatureSlot::Argument,
            indices,
            types.len(),
            attrs.len(),
            locs.len(),
        )?;
        if indices.is_empty() {
            return Ok(());
        }

        let count = self.num_arguments();
        let inputs = insert_types(self.argument_types(), indices, types);
        let outputs = self.result_types().iter().cloned().collect();
        let new_type = self.clone_type_with(inputs, outputs);
        let new_attrs = self.arg_attr_seq().with_inserted(count, indices, attrs);
        let entry = self.body().entry_id();
        let default_loc = self.location().clone();

        debug!(
            "Inserting {} argument(s) into `{}`: {} -> {}.",
            indices.len(),
            self.name(),
            self.function_type(),
            new_type
        );
        self.set_type(new_type);
        *self.arg_attr_seq_mut() = new_attrs;
        if let Some(entry) = entry {
            for (i, (&index, ty)) in indices.iter().zip(types).enumerate() {
                let loc = locs.get(i).cloned().unwrap_or_else(|| default_loc.clone());
                self.body_mut().insert_argument(entry, index + i, ty.clone(), loc)?;
            }
        }
        Ok(())
    }

    fn insert_argument(&mut self, index: usize, ty: Type, attrs: AttrDict, loc: Location) -> Result<(), Error> {
        self.insert_arguments(&[index], &[ty], &[attrs], &[loc])
    }

    /// Insert results at the given positions of the current signature. Same
    /// rules as [`Self::insert_arguments`]; the body is not touched.
    fn insert_results(&mut self, indices: &[usize], types: &[Type], attrs: &[AttrDict]) -> Result<(), Error> {
        self.check_insertion(SignatureSlot::Result, indices, types.len(), attrs.len(), 0)?;
        if indices.is_empty() {
            return Ok(());
        }

        let count = self.num_results();
        let inputs = self.argument_types().iter().cloned().collect();
        let outputs = insert_types(self.result_types(), indices, types);
        let new_type = self.clone_type_with(inputs, outputs);
        let new_attrs = self.result_attr_seq().with_inserted(count, indices, attrs);

        debug!(
            "Inserting {} result(s) into `{}`: {} -> {}.",
            indices.len(),
            self.name(),
            self.function_type(),
            new_type
        );
        self.set_type(new_type);
        *self.result_attr_seq_mut() = new_attrs;
        Ok(())
    }

    fn insert_result(&mut self, index: usize, ty: Type, attrs: AttrDict) -> Result<(), Error> {
        self.insert_results(&[index], &[ty], &[attrs])
    }

    /// Erase the arguments in `indices`, together with their attributes and
    /// entry block arguments. Fails if an erased block argument still has uses.
    fn erase_arguments(&mut self, indices: &BitSet) -> Result<(), Error> {
        self.check_erasure(SignatureSlot::Argument, indices)?;
        if indices.is_empty() {
            return Ok(());
        }

        if let Some(entry) = self.entry_block() {
            for index in indices.iter() {
                let used = entry
                    .argument(index)
                    .is_some_and(|arg| self.body().has_uses(arg.id()));
                if used {
                    return Err(Error::ArgumentInUse {
                        function: self.name().to_string(),
                        index,
                    });
                }
            }
        }

        let inputs = filter_types(self.argument_types(), indices);
        let outputs = self.result_types().iter().cloned().collect();
        let new_type = self.clone_type_with(inputs, outputs);
        let new_attrs = self.arg_attr_seq().without(indices);
        let entry = self.body().entry_id();

        debug!(
            "Erasing {} argument(s) from `{}`: {} -> {}.",
            indices.iter().count(),
            self.name(),
            self.function_type(),
            new_type
        );
        self.set_type(new_type);
        *self.arg_attr_seq_mut() = new_attrs;
        if let Some(entry) = entry {
            self.body_mut().erase_arguments(entry, indices)?;
        }
        Ok(())
    }

    fn erase_argument(&mut self, index: usize) -> Result<(), Error> {
        let mut indices = BitSet::new();
        indices.insert(index);
        self.erase_arguments(&indices)
    }

    /// Erase the results in `indices` together with their attributes.
    fn erase_results(&mut self, indices: &BitSet) -> Result<(), Error> {
        self.check_erasure(SignatureSlot::Result, indices)?;
        if indices.is_empty() {
            return Ok(());
        }

        let inputs = self.argument_types().iter().cloned().collect();
        let outputs = filter_types(self.result_types(), indices);
        let new_type = self.clone_type_with(inputs, outputs);
        let new_attrs = self.result_attr_seq().without(indices);

        debug!(
            "Erasing {} result(s) from `{}`: {} -> {}.",
            indices.iter().count(),
            self.name(),
            self.function_type(),
            new_type
        );
        self.set_type(new_type);
        *self.result_attr_seq_mut() = new_attrs;
        Ok(())
    }

    fn erase_result(&mut self, index: usize) -> Result<(), Error> {
        let mut indices = BitSet::new();
        indices.insert(index);
        self.erase_results(&indices)
    }

    /// Signature obtained by inserting arguments and results, without
    /// modifying the function.
    fn type_with_args_and_results(
        &self,
        arg_indices: &[usize],
        arg_types: &[Type],
        result_indices: &[usize],
        result_types: &[Type],
    ) -> Result<FunctionType, Error> {
        self.check_insertion(SignatureSlot::Argument, arg_indices, arg_types.len(), 0, 0)?;
        self.check_insertion(SignatureSlot::Result, result_indices, result_types.len(), 0, 0)?;
        Ok(self.clone_type_with(
            insert_types(self.argument_types(), arg_indices, arg_types),
            insert_types(self.result_types(), result_indices, result_types),
        ))
    }

    /// Signature obtained by erasing arguments and results, without modifying
    /// the function.
    fn type_without_args_and_results(
        &self,
        arg_indices: &BitSet,
        result_indices: &BitSet,
    ) -> Result<FunctionType, Error> {
        self.check_erasure(SignatureSlot::Argument, arg_indices)?;
        self.check_erasure(SignatureSlot::Result, result_indices)?;
        Ok(self.clone_type_with(
            filter_types(self.argument_types(), arg_indices),
            filter_types(self.result_types(), result_indices),
        ))
    }

    /// Check that the entry block arguments match the signature inputs.
    ///
    /// Succeeds trivially for an external function. Never called implicitly.
    fn verify_body(&self) -> Result<(), Error> {
        let Some(entry) = self.entry_block() else {
            return Ok(());
        };

        let expected = self.argument_types();
        if entry.num_arguments() != expected.len() {
            return Err(Error::EntryBlockArgCount {
                function: self.name().to_string(),
                expected: expected.len(),
                found: entry.num_arguments(),
            });
        }

        for (index, (found, expected)) in entry.argument_types().zip(expected).enumerate() {
            if found != expected {
                return Err(Error::EntryBlockArgType {
                    function: self.name().to_string(),
                    index,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }
}
