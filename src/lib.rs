//! Nexfile is a library to read, manipulate and write NEXUS-format
//! phylogenetic data files.
//!
//! This crate parses the block-structured NEXUS dialects found in the wild
//! (standard NEXUS, MrBayes, BEAST, Mesquite, APE/R output) into a uniform
//! data model and serializes that model back to well-formed NEXUS text.
//! Core functionality provided:
//! - Block splitting: tolerant `BEGIN <name>;` / `END;` scanning, missing
//!   `END;` accepted, unknown blocks preserved verbatim.
//! - Taxa blocks: ordered `TAXLABELS` lists with annotations, placeholders
//!   and quoting.
//! - Data/characters blocks: simple, interleaved and wrapped matrix
//!   layouts, multistate parenthetical groups, `FORMAT` attributes and
//!   `CHARSTATELABELS`.
//! - Trees blocks: `TRANSLATE` tables, verbatim tree statements, and
//!   detranslation of numeric-indexed Newick strings back to full taxon
//!   names — including the BEAST dialect where every leaf carries metadata
//!   comments on both sides of the colon.
//! - Writing: round-trip serialization of parsed files and
//!   [NexusWriter] for building matrices from scratch.
//!
//! Limitations:
//! - Input is plain UTF-8 text (a leading BOM is tolerated); compressed
//!   files must be decompressed by the caller.
//! - Tree statements are kept as text; this is not a tree model or an
//!   inference engine.
//!
//! # Usage patterns
//! Files can be read in two main ways:
//! 1. The quick-access functions [read_file] and [read_str].
//! 2. [NexusReader] directly, for access to the full block map.
//!
//! ## Example
//!
//! Parse a trees block and expand its translate table:
//! ```
//! use nexfile::read_str;
//!
//! let mut nex = read_str(concat!(
//!     "#NEXUS\n",
//!     "begin trees;\n",
//!     "translate\n",
//!     "1 Chris,\n",
//!     "2 Bruce,\n",
//!     "3 Tom;\n",
//!     "tree a = ((1:0.1,2:0.2):0.3,3:0.4);\n",
//!     "end;",
//! ))?;
//!
//! let trees = nex.trees_mut().unwrap();
//! trees.detranslate()?;
//! assert_eq!(
//!     trees.trees()[0].as_str(),
//!     "tree a = ((Chris:0.1,Bruce:0.2):0.3,Tom:0.4);"
//! );
//! # Ok::<(), nexfile::NexusError>(())
//! ```

pub mod blocks;
pub mod error;
mod newick;
pub mod reader;
pub mod writer;

pub use crate::blocks::{
    Block, DataBlock, FormatValue, GenericBlock, SiteValue, TaxaBlock, TranslationTable, Tree,
    TreeBlock,
};
pub use crate::error::NexusError;
pub use crate::reader::NexusReader;
pub use crate::writer::NexusWriter;

use std::path::Path;

// ============================================================================
// Quick API
// ============================================================================
/// Reads and parses a NEXUS file using default settings.
///
/// See [`NexusReader::from_file`] for full documentation.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<NexusReader, NexusError> {
    NexusReader::from_file(path)
}

/// Parses NEXUS text using default settings.
///
/// See [`NexusReader::read_str`] for full documentation.
pub fn read_str<S: AsRef<str>>(text: S) -> Result<NexusReader, NexusError> {
    NexusReader::read_str(text.as_ref())
}
