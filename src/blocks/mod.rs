//! Block handlers for the NEXUS block types this crate understands.
//!
//! Each handler parses eagerly on construction from the raw lines the
//! block splitter hands it, and exposes a read-only data model plus
//! explicit mutators. Blocks without a dedicated handler are kept in a
//! [GenericBlock] and round-trip verbatim.

pub mod data;
pub mod generic;
pub mod taxa;
pub mod trees;

pub use data::{DataBlock, FormatValue, SiteValue};
pub use generic::{GenericBlock, remove_comments};
pub use taxa::TaxaBlock;
pub use trees::{Tree, TreeBlock, TranslationTable};

use crate::error::NexusError;

// =#========================================================================#=
// BLOCK
// =#========================================================================$=
/// One parsed NEXUS block, dispatched by block name.
///
/// `data` and `characters` blocks share the [DataBlock] handler; every
/// other unrecognized block name lands in [`Block::Generic`].
#[derive(Debug, Clone)]
pub enum Block {
    /// A `TAXA` block.
    Taxa(TaxaBlock),
    /// A `DATA` or `CHARACTERS` block.
    Data(DataBlock),
    /// A `TREES` block.
    Trees(TreeBlock),
    /// Any block without a dedicated handler.
    Generic(GenericBlock),
}

impl Block {
    /// Constructs the handler matching `name` from raw block lines.
    pub(crate) fn parse(name: &str, lines: Vec<String>) -> Result<Block, NexusError> {
        Ok(match name {
            "taxa" => Block::Taxa(TaxaBlock::parse(name, lines)?),
            "data" | "characters" => Block::Data(DataBlock::parse(name, lines)?),
            "trees" => Block::Trees(TreeBlock::parse(name, lines)?),
            _ => Block::Generic(GenericBlock::new(name, lines)),
        })
    }

    /// Serializes the block back to NEXUS text.
    pub fn write(&self) -> String {
        match self {
            Block::Taxa(b) => b.write(),
            Block::Data(b) => b.write(),
            Block::Trees(b) => b.write(),
            Block::Generic(b) => b.write(),
        }
    }
}
