//! Nested scope graph of a function-like entity.
//!
//! A [`Region`] owns an ordered list of [`Block`]s. The first block is the
//! entry block. Blocks are addressed through stable [`BlockId`] handles, which
//! is also how block arguments and successor lists refer back to blocks: the
//! region owns its blocks, everything else only holds handles.
//!
//! Operations are opaque to this layer. They are kept so that uses of block
//! arguments and cross-block references can be tracked and dropped.
use bit_set::BitSet;
use either::Either;
use log::trace;
use slotmap::{Key, SlotMap, new_key_type};

use crate::{attributes::AttrDict, location::Location, types::Type, utils::Error};

new_key_type! {
    /// Stable handle to a block inside its owning [`Region`].
    pub struct BlockId;
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "^bb{:?}", self.data())
    }
}

/// SSA value defined inside a region, either a block argument or an operation result.
///
/// Ids are never reused within a region, so they survive insertion and removal
/// of neighbouring arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(u32);

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Where a [`ValueId`] is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOwner {
    BlockArgument {
        block: BlockId,
        index: usize,
    },
    OpResult {
        block: BlockId,
        operation: usize,
        index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockArgument {
    id: ValueId,
    ty: Type,
    loc: Location,
    owner: BlockId,
}

impl BlockArgument {
    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn location(&self) -> &Location {
        &self.loc
    }

    /// Block this argument belongs to.
    pub fn owner(&self) -> BlockId {
        self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpResult {
    id: ValueId,
    ty: Type,
}

impl OpResult {
    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// Description of an operation to append with [`Region::append_operation`].
#[derive(Debug, Clone, Default)]
pub struct OperationState {
    name: String,
    operands: Vec<ValueId>,
    successors: Vec<BlockId>,
    result_types: Vec<Type>,
    attributes: AttrDict,
    location: Location,
}

impl OperationState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn operands(mut self, operands: impl IntoIterator<Item = ValueId>) -> Self {
        self.operands.extend(operands);
        self
    }

    pub fn successors(mut self, successors: impl IntoIterator<Item = BlockId>) -> Self {
        self.successors.extend(successors);
        self
    }

    pub fn results(mut self, types: impl IntoIterator<Item = Type>) -> Self {
        self.result_types.extend(types);
        self
    }

    pub fn attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::attributes::Attribute>,
    ) -> Self {
        self.attributes.set(key, value);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// An opaque operation inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    operands: Vec<ValueId>,
    successors: Vec<BlockId>,
    results: Vec<OpResult>,
    attributes: AttrDict,
    location: Location,
}

impl Operation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operands(&self) -> &[ValueId] {
        &self.operands
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn results(&self) -> &[OpResult] {
        &self.results
    }

    pub fn attributes(&self) -> &AttrDict {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttrDict {
        &mut self.attributes
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    fn drop_references(&mut self) {
        self.operands.clear();
        self.successors.clear();
    }
}

/// A block: typed arguments followed by operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    arguments: Vec<BlockArgument>,
    operations: Vec<Operation>,
}

impl Block {
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn arguments(&self) -> &[BlockArgument] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&BlockArgument> {
        self.arguments.get(index)
    }

    pub fn num_arguments(&self) -> usize {
        self.arguments.len()
    }

    pub fn argument_types(&self) -> impl ExactSizeIterator<Item = &Type> + Clone {
        self.arguments.iter().map(|arg| &arg.ty)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut [Operation] {
        &mut self.operations
    }
}

/// Direction of a block walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WalkOrder {
    #[default]
    Forward,
    Reverse,
}

/// Ordered collection of blocks forming the body of a function-like entity.
#[derive(Debug, Clone, Default)]
pub struct Region {
    blocks: SlotMap<BlockId, Block>,
    order: Vec<BlockId>,
    next_value: u32,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Block handles in storage order.
    pub fn block_ids(&self) -> &[BlockId] {
        &self.order
    }

    pub fn entry_id(&self) -> Option<BlockId> {
        self.order.first().copied()
    }

    pub fn entry_block(&self) -> Option<&Block> {
        self.entry_id().and_then(|id| self.blocks.get(id))
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.order.last().and_then(|id| self.blocks.get(*id))
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    /// Blocks in storage order. Call `.rev()` for a reverse walk; the iterator
    /// is cheap to clone, so a walk can be restarted from any saved point.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> + ExactSizeIterator + Clone {
        self.order.iter().map(|id| &self.blocks[*id])
    }

    /// Blocks in the requested direction.
    pub fn walk(&self, order: WalkOrder) -> impl Iterator<Item = &Block> + Clone {
        match order {
            WalkOrder::Forward => Either::Left(self.iter()),
            WalkOrder::Reverse => Either::Right(self.iter().rev()),
        }
    }

    fn next_value_id(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Append a block with the given arguments after the current last block.
    pub fn push_block(&mut self, arguments: impl IntoIterator<Item = (Type, Location)>) -> BlockId {
        let arguments: Vec<_> = arguments.into_iter().collect();
        let mut ids = Vec::with_capacity(arguments.len());
        for _ in 0..arguments.len() {
            ids.push(self.next_value_id());
        }

        let id = self.blocks.insert_with_key(|owner| Block {
            id: owner,
            arguments: arguments
                .into_iter()
                .zip(ids)
                .map(|((ty, loc), id)| BlockArgument { id, ty, loc, owner })
                .collect(),
            operations: Vec::new(),
        });
        self.order.push(id);
        trace!(
            "Appended block {} ({} arguments) at position {}.",
            id,
            self.blocks[id].arguments.len(),
            self.order.len() - 1
        );
        id
    }

    /// Insert a new argument at `position` of `block`.
    pub fn insert_argument(
        &mut self,
        block: BlockId,
        position: usize,
        ty: Type,
        loc: Location,
    ) -> Result<ValueId, Error> {
        if !self.blocks.contains_key(block) {
            return Err(Error::UnknownBlock(block));
        }
        let id = self.next_value_id();
        let arguments = &mut self.blocks[block].arguments;
        let position = position.min(arguments.len());
        arguments.insert(
            position,
            BlockArgument {
                id,
                ty,
                loc,
                owner: block,
            },
        );
        Ok(id)
    }

    /// Append a new argument to `block`.
    pub fn add_argument(&mut self, block: BlockId, ty: Type, loc: Location) -> Result<ValueId, Error> {
        let position = self.block(block).ok_or(Error::UnknownBlock(block))?.num_arguments();
        self.insert_argument(block, position, ty, loc)
    }

    /// Remove the arguments of `block` whose positions are in `indices`.
    ///
    /// Uses are not checked here; the function layer refuses to erase used
    /// arguments before calling this.
    pub fn erase_arguments(&mut self, block: BlockId, indices: &BitSet) -> Result<(), Error> {
        let block = self.blocks.get_mut(block).ok_or(Error::UnknownBlock(block))?;
        let mut position = 0;
        block.arguments.retain(|_| {
            let keep = !indices.contains(position);
            position += 1;
            keep
        });
        Ok(())
    }

    /// Append an operation at the end of `block`, returning its position.
    pub fn append_operation(&mut self, block: BlockId, state: OperationState) -> Result<usize, Error> {
        if !self.blocks.contains_key(block) {
            return Err(Error::UnknownBlock(block));
        }
        if let Some(unknown) = state
            .successors
            .iter()
            .find(|succ| !self.blocks.contains_key(**succ))
        {
            return Err(Error::UnknownBlock(*unknown));
        }

        let mut results = Vec::with_capacity(state.result_types.len());
        for ty in state.result_types {
            results.push(OpResult {
                id: self.next_value_id(),
                ty,
            });
        }

        let operations = &mut self.blocks[block].operations;
        operations.push(Operation {
            name: state.name,
            operands: state.operands,
            successors: state.successors,
            results,
            attributes: state.attributes,
            location: state.location,
        });
        Ok(operations.len() - 1)
    }

    /// Locate the definition of `value`.
    pub fn owner_of(&self, value: ValueId) -> Option<ValueOwner> {
        for block in self.iter() {
            if let Some(index) = block.arguments.iter().position(|arg| arg.id == value) {
                return Some(ValueOwner::BlockArgument {
                    block: block.id,
                    index,
                });
            }
            for (operation, op) in block.operations.iter().enumerate() {
                if let Some(index) = op.results.iter().position(|res| res.id == value) {
                    return Some(ValueOwner::OpResult {
                        block: block.id,
                        operation,
                        index,
                    });
                }
            }
        }
        None
    }

    pub fn value_type(&self, value: ValueId) -> Option<&Type> {
        match self.owner_of(value)? {
            ValueOwner::BlockArgument { block, index } => Some(&self.blocks[block].arguments[index].ty),
            ValueOwner::OpResult {
                block,
                operation,
                index,
            } => Some(&self.blocks[block].operations[operation].results[index].ty),
        }
    }

    /// Whether any operation of the region uses `value` as an operand.
    pub fn has_uses(&self, value: ValueId) -> bool {
        self.iter()
            .flat_map(|block| block.operations.iter())
            .any(|op| op.operands.contains(&value))
    }

    /// Clear the operands and successors of every operation so no block
    /// refers to another one anymore.
    pub fn drop_all_references(&mut self) {
        for block in self.blocks.values_mut() {
            for op in &mut block.operations {
                op.drop_references();
            }
        }
    }

    /// Drop every reference then release every block.
    pub fn clear(&mut self) {
        self.drop_all_references();
        trace!("Releasing {} blocks.", self.order.len());
        self.order.clear();
        self.blocks.clear();
    }
}
