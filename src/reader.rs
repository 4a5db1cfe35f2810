//! Block splitter and [NexusReader].
//!
//! The splitter scans raw text lines for `BEGIN <name>;` / `END;`
//! boundaries (tolerant of a missing `END;`) and yields one raw-lines list
//! per named block. The reader assembles those lists into an ordered block
//! map, constructing the matching handler for each block eagerly.

use crate::blocks::{Block, DataBlock, GenericBlock, TaxaBlock, TreeBlock};
use crate::error::NexusError;
use indexmap::IndexMap;
use indexmap::map::Entry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// `begin <word>[ <optional bracket comment>];`, case-insensitive.
static BEGIN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*begin\s+(\w+)\s*(\[[^\]]*\])?\s*;").unwrap());
/// `end;` (or `endblock;`), case-insensitive, surrounding whitespace
/// ignored.
static END_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*end(block)?\s*;\s*$").unwrap());

// ============================================================================
// Block splitting
// ============================================================================
/// Splits raw text lines into `(block_name, lines)` pairs.
///
/// Block names are lowercased. Every line inside a block — the `BEGIN` and
/// `END` lines included — lands in the block's raw storage; handlers skip
/// what they don't need. Between blocks, blank lines, full-line comments
/// and the `#NEXUS` header are discarded.
///
/// A `BEGIN` while a block is still open flushes the open block first, so
/// a missing `END;` is non-fatal; the same happens at end of input. The
/// splitter permits duplicate names — the reader rejects them when it
/// assembles its block map.
pub(crate) fn split_blocks(lines: &[&str]) -> Vec<(String, Vec<String>)> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in lines {
        if let Some(caps) = BEGIN_LINE.captures(line) {
            if let Some(open) = current.take() {
                blocks.push(open);
            }
            let name = caps[1].to_lowercase();
            current = Some((name, vec![line.to_string()]));
            continue;
        }

        // Header, blank lines and comments before the first BEGIN fall
        // through untouched
        if let Some((_, acc)) = &mut current {
            acc.push(line.to_string());
        }
        if END_LINE.is_match(line)
            && let Some(open) = current.take()
        {
            blocks.push(open);
        }
    }
    if let Some(open) = current.take() {
        blocks.push(open);
    }
    blocks
}

// =#========================================================================#=
// NEXUS READER
// =#========================================================================$=
/// Parsed view of one NEXUS file.
///
/// Construction parses everything eagerly: the input is split into blocks
/// and every block's handler runs during [`read_str`](Self::read_str) /
/// [`from_file`](Self::from_file). A failed parse yields no reader — there
/// is no partial-result mode.
///
/// # Example
/// ```
/// use nexfile::NexusReader;
///
/// let nex = NexusReader::read_str(
///     "#NEXUS\nbegin trees;\ntree a = ((A,B),C);\nend;",
/// )?;
/// assert_eq!(nex.trees().unwrap().ntrees(), 1);
/// # Ok::<(), nexfile::NexusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NexusReader {
    /// Blocks in file order, keyed by lowercased block name.
    blocks: IndexMap<String, Block>,
}

// ============================================================================
// Construction (pub)
// ============================================================================
impl NexusReader {
    /// Reads and parses a NEXUS file.
    ///
    /// The file is read fully into memory as UTF-8 (a leading BOM is
    /// tolerated) before any block splitting begins.
    ///
    /// # Errors
    /// [`NexusError::Io`] if the file cannot be read, otherwise any parse
    /// error of the contained blocks.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, NexusError> {
        let text = fs::read_to_string(path)?;
        Self::read_str(&text)
    }

    /// Parses NEXUS text.
    ///
    /// # Errors
    /// [`NexusError::Format`] on duplicate block names, plus any parse
    /// error of the contained blocks.
    pub fn read_str(text: &str) -> Result<Self, NexusError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().collect();

        let mut blocks: IndexMap<String, Block> = IndexMap::new();
        for (name, raw_lines) in split_blocks(&lines) {
            tracing::debug!(block = %name, lines = raw_lines.len(), "found block");
            match blocks.entry(name) {
                Entry::Vacant(slot) => {
                    let block = Block::parse(slot.key(), raw_lines)?;
                    slot.insert(block);
                }
                // Repeats of unhandled block types are folded together;
                // a repeated handled block means the file cannot be trusted
                Entry::Occupied(mut slot) => {
                    let name = slot.key().clone();
                    match slot.get_mut() {
                        Block::Generic(existing) => {
                            let mut merged = existing.lines().to_vec();
                            merged.extend(raw_lines);
                            *existing = GenericBlock::new(&name, merged);
                        }
                        _ => {
                            return Err(NexusError::format(format!(
                                "Duplicate '{name}' block"
                            )));
                        }
                    }
                }
            }
        }

        Ok(NexusReader { blocks })
    }
}

// ============================================================================
// Accessors (pub)
// ============================================================================
impl NexusReader {
    /// The `TAXA` block, if present.
    pub fn taxa(&self) -> Option<&TaxaBlock> {
        match self.blocks.get("taxa") {
            Some(Block::Taxa(b)) => Some(b),
            _ => None,
        }
    }

    /// Mutable access to the `TAXA` block.
    pub fn taxa_mut(&mut self) -> Option<&mut TaxaBlock> {
        match self.blocks.get_mut("taxa") {
            Some(Block::Taxa(b)) => Some(b),
            _ => None,
        }
    }

    /// The `DATA` block, falling back to a `CHARACTERS` block when no
    /// separate `DATA` block exists.
    pub fn data(&self) -> Option<&DataBlock> {
        let block = self.blocks.get("data").or_else(|| self.blocks.get("characters"));
        match block {
            Some(Block::Data(b)) => Some(b),
            _ => None,
        }
    }

    /// Mutable access to the `DATA` (or aliased `CHARACTERS`) block.
    pub fn data_mut(&mut self) -> Option<&mut DataBlock> {
        let key = if self.blocks.contains_key("data") {
            "data"
        } else {
            "characters"
        };
        match self.blocks.get_mut(key) {
            Some(Block::Data(b)) => Some(b),
            _ => None,
        }
    }

    /// The `TREES` block, if present.
    pub fn trees(&self) -> Option<&TreeBlock> {
        match self.blocks.get("trees") {
            Some(Block::Trees(b)) => Some(b),
            _ => None,
        }
    }

    /// Mutable access to the `TREES` block.
    pub fn trees_mut(&mut self) -> Option<&mut TreeBlock> {
        match self.blocks.get_mut("trees") {
            Some(Block::Trees(b)) => Some(b),
            _ => None,
        }
    }

    /// Iterates all blocks in file order as `(name, block)` pairs.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ============================================================================
// Serialization (pub)
// ============================================================================
impl NexusReader {
    /// Serializes the whole file back to NEXUS text: the `#NEXUS` header
    /// followed by each block's serialization in stored order.
    pub fn write(&self) -> String {
        let mut out = String::from("#NEXUS\n\n");
        for block in self.blocks.values() {
            out.push_str(&block.write());
            out.push('\n');
        }
        // No trailing blank line after the last block
        out.truncate(out.trim_end_matches('\n').len());
        out.push('\n');
        out
    }

    /// Writes the serialized file to `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NexusError> {
        fs::write(path, self.write())?;
        Ok(())
    }
}
