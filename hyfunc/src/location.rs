//! Source locations attached to entities and block arguments.
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIs;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Location {
    #[default]
    Unknown,

    /// A position inside a source file. Lines and columns start at 1.
    FileLineCol { file: Arc<str>, line: u32, col: u32 },

    /// A named location wrapping another one, e.g. the name of an inlined callee.
    Named { name: Arc<str>, child: Box<Location> },
}

impl Location {
    pub fn file_line_col(file: impl Into<Arc<str>>, line: u32, col: u32) -> Self {
        Location::FileLineCol {
            file: file.into(),
            line,
            col,
        }
    }

    pub fn named(name: impl Into<Arc<str>>, child: Location) -> Self {
        Location::Named {
            name: name.into(),
            child: Box::new(child),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Unknown => write!(f, "loc(unknown)"),
            Location::FileLineCol { file, line, col } => {
                write!(f, "loc(\"{}\":{}:{})", file, line, col)
            }
            Location::Named { name, child } => write!(f, "loc(\"{}\"({}))", name, child),
        }
    }
}
