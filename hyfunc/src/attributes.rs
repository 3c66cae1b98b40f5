//! Attribute dictionaries.
//!
//! Metadata is attached to entities, arguments and results as string-keyed
//! dictionaries of [`Attribute`] values. Keys are kept sorted so iteration
//! (and therefore any diagnostic output) is deterministic.
//!
//! Per-argument and per-result dictionaries are stored in an [`AttrSeq`]. The
//! sequence is only materialized once some slot carries a non-empty
//! dictionary; a function without argument metadata pays for an empty `Vec`.
use std::collections::BTreeMap;

use bit_set::BitSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::types::Type;

/// A typed attribute value. The function layer never interprets values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Attribute {
    /// Presence-only marker.
    Unit,
    Bool(bool),
    Int(i64),
    Str(String),
    Type(Type),
    Array(Vec<Attribute>),
    Dict(AttrDict),
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Int(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Str(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::Str(value)
    }
}

impl From<Type> for Attribute {
    fn from(value: Type) -> Self {
        Attribute::Type(value)
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attribute::Unit => write!(f, "unit"),
            Attribute::Bool(b) => write!(f, "{}", b),
            Attribute::Int(i) => write!(f, "{}", i),
            Attribute::Str(s) => write!(f, "{:?}", s),
            Attribute::Type(ty) => write!(f, "{}", ty),
            Attribute::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Attribute::Dict(dict) => write!(f, "{}", dict),
        }
    }
}

/// String-keyed attribute dictionary with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AttrDict {
    entries: BTreeMap<String, Attribute>,
}

/// Shared empty dictionary handed out for slots without stored attributes.
pub(crate) static EMPTY_DICT: AttrDict = AttrDict::new();

impl AttrDict {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Attribute>) -> Option<Attribute> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Attribute>> FromIterator<(K, V)> for AttrDict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl std::fmt::Display for AttrDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Attribute::Unit => write!(f, "{}", key)?,
                value => write!(f, "{} = {}", key, value)?,
            }
        }
        write!(f, "}}")
    }
}

/// Per-argument or per-result dictionaries of one function.
///
/// Either empty (no slot has attributes) or holding exactly one dictionary per
/// slot. Index bounds are checked by the owning function, which knows the arity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AttrSeq {
    dicts: Vec<AttrDict>,
}

impl AttrSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of materialized dictionaries, zero when no slot carries attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.dicts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dicts.is_empty()
    }

    pub fn as_slice(&self) -> &[AttrDict] {
        &self.dicts
    }

    /// Stored dictionary for `index`, `None` when not materialized.
    pub fn get(&self, index: usize) -> Option<&AttrDict> {
        self.dicts.get(index)
    }

    /// Replace the dictionary of slot `index` in a sequence of `count` slots.
    /// An index past `count` is ignored; the owning function reports it.
    pub(crate) fn set(&mut self, index: usize, count: usize, dict: AttrDict) {
        if index >= count || (self.dicts.is_empty() && dict.is_empty()) {
            return;
        }
        self.materialize(count);
        self.dicts[index] = dict;
        self.compact();
    }

    /// Upsert a single entry of slot `index` in a sequence of `count` slots.
    pub(crate) fn set_attr(
        &mut self,
        index: usize,
        count: usize,
        key: impl Into<String>,
        value: impl Into<Attribute>,
    ) -> Option<Attribute> {
        if index >= count {
            return None;
        }
        self.materialize(count);
        self.dicts[index].set(key, value)
    }

    pub fn remove_attr(&mut self, index: usize, key: &str) -> Option<Attribute> {
        let removed = self.dicts.get_mut(index)?.remove(key);
        if removed.is_some() {
            self.compact();
        }
        removed
    }

    /// Replace every dictionary at once. Callers check the length.
    pub fn set_all(&mut self, dicts: Vec<AttrDict>) {
        self.dicts = dicts;
        self.compact();
    }

    /// Build the sequence obtained by inserting `new_dicts` at `indices` of a
    /// sequence of `count` slots. `new_dicts` may be empty, meaning no
    /// attributes for the inserted slots.
    pub(crate) fn with_inserted(
        &self,
        count: usize,
        indices: &[usize],
        new_dicts: &[AttrDict],
    ) -> AttrSeq {
        if self.dicts.is_empty() && new_dicts.is_empty() {
            return AttrSeq::default();
        }

        let mut dicts = Vec::with_capacity(count + indices.len());
        let mut old_idx = 0;
        let mut migrate = |dicts: &mut Vec<AttrDict>, until: usize| {
            dicts.extend((old_idx..until).map(|j| self.dicts.get(j).cloned().unwrap_or_default()));
            old_idx = until;
        };

        for (i, &index) in indices.iter().enumerate() {
            migrate(&mut dicts, index);
            dicts.push(new_dicts.get(i).cloned().unwrap_or_default());
        }
        migrate(&mut dicts, count);

        AttrSeq { dicts }
    }

    /// Build the sequence without the slots in `indices`, preserving the order
    /// of the survivors.
    pub(crate) fn without(&self, indices: &BitSet) -> AttrSeq {
        let dicts = self
            .dicts
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(*i))
            .map(|(_, d)| d.clone())
            .collect();
        let mut seq = AttrSeq { dicts };
        seq.compact();
        seq
    }

    fn materialize(&mut self, count: usize) {
        if self.dicts.len() < count {
            self.dicts.resize_with(count, AttrDict::default);
        }
    }

    /// Drop the whole sequence once every dictionary is empty.
    fn compact(&mut self) {
        if self.dicts.iter().all(AttrDict::is_empty) {
            self.dicts.clear();
        }
    }
}
