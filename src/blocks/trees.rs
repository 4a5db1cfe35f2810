//! TREES block handler and translation engine.
//!
//! Parses `TRANSLATE` tables and `tree <name> = [&R|&U] <newick>;`
//! statements, and implements detranslation: rewriting compact
//! numeric-indexed Newick strings into fully-named ones. Tree statements
//! are stored verbatim, so an unmutated block round-trips its original
//! formatting through the writer.

use crate::blocks::generic::GenericBlock;
use crate::blocks::taxa::strip_quotes;
use crate::error::NexusError;
use crate::newick::{self, Dialect};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// The `translate` keyword alone on a line.
static TRANSLATE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*translate\s*$").unwrap());
/// One translate entry: `<index> <quoted-or-bare-name>[,;]?`.
static TRANSLATE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(\S+)\s+('[^']*'|"[^"]*"|[^,;]+?)\s*[,;]?\s*$"#).unwrap()
});
/// A full tree statement line.
static TREE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*tree\s+.*=.*;").unwrap());

// =#========================================================================#=
// TREE
// =#========================================================================$=
/// One tree statement, stored verbatim (possibly still translated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree(String);

impl Tree {
    /// Wraps a verbatim tree statement.
    pub fn new(statement: impl Into<String>) -> Self {
        Tree(statement.into())
    }

    /// The verbatim statement text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tree name from `tree <name> = ...`, comments ignored.
    pub fn name(&self) -> Option<String> {
        let (preamble, _) = newick::split_preamble(&self.0).ok()?;
        let clean = newick::strip_comments(preamble);
        let clean = clean.trim_end_matches('=').trim();
        let mut words = clean.split_whitespace();
        let keyword = words.next()?;
        if !keyword.eq_ignore_ascii_case("tree") {
            return None;
        }
        words.next().map(|name| strip_quotes(name))
    }

    /// Whether the tree is marked rooted (`[&R]`), unrooted (`[&U]`), or
    /// unmarked (`None`).
    pub fn rooted(&self) -> Option<bool> {
        let (_, body) = newick::split_preamble(&self.0).ok()?;
        let marker = body.trim_start();
        if marker.starts_with("[&R]") || marker.starts_with("[&r]") {
            Some(true)
        } else if marker.starts_with("[&U]") || marker.starts_with("[&u]") {
            Some(false)
        } else {
            None
        }
    }

    /// The Newick payload after the `=`, rooting marker and comments kept.
    pub fn newick(&self) -> &str {
        match newick::split_preamble(&self.0) {
            Ok((_, body)) => body.trim(),
            Err(_) => &self.0,
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tree {
    fn from(statement: &str) -> Self {
        Tree::new(statement)
    }
}

// =#========================================================================#=
// TRANSLATION TABLE
// =#========================================================================$=
/// Mapping from short taxon-index token to full taxon name, declared once
/// per trees block.
///
/// Insertion rejects duplicate indices and duplicate names (case-sensitive
/// exact match) — entries are never silently overwritten.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: IndexMap<String, String>,
}

impl TranslationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one `index → name` entry.
    ///
    /// # Errors
    /// Returns [`NexusError::Translate`] on a duplicate index or name.
    pub fn insert(&mut self, index: &str, name: &str) -> Result<(), NexusError> {
        if self.entries.contains_key(index) {
            return Err(NexusError::translate(format!(
                "Duplicate translate index '{index}'"
            )));
        }
        if self.entries.values().any(|n| n == name) {
            return Err(NexusError::translate(format!(
                "Duplicate translate name '{name}'"
            )));
        }
        self.entries.insert(index.to_string(), name.to_string());
        Ok(())
    }

    /// The full taxon name for `index`, if any.
    pub fn get(&self, index: &str) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =#========================================================================#=
// TREE BLOCK
// =#========================================================================$=
/// Handler for a `TREES` block.
///
/// If the block carries no `TRANSLATE` table but holds at least one tree,
/// the table is inferred from the first tree's leaf set in left-to-right
/// order, and the block counts as already detranslated — the "indices" are
/// the real names.
///
/// # Example
/// ```
/// use nexfile::read_str;
///
/// let mut nex = read_str(concat!(
///     "#NEXUS\nbegin trees;\n",
///     "translate\n1 Chris,\n2 Bruce,\n3 Tom;\n",
///     "tree a = ((1:0.1,2:0.2):0.3,3:0.4);\n",
///     "end;",
/// ))?;
/// let trees = nex.trees_mut().unwrap();
/// trees.detranslate()?;
/// assert!(trees.trees()[0].as_str().contains("Chris:0.1"));
/// # Ok::<(), nexfile::NexusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeBlock {
    block: GenericBlock,
    /// Index → taxon name mapping, explicit or inferred.
    translators: TranslationTable,
    /// Tree statements in file order.
    trees: Vec<Tree>,
    /// Whether an explicit `TRANSLATE` table was present.
    was_translated: bool,
    /// Whether the stored trees currently hold names rather than indices.
    been_detranslated: bool,
}

// ============================================================================
// Construction (pub(crate))
// ============================================================================
impl TreeBlock {
    /// Parses a TREES block from its raw lines.
    ///
    /// # Errors
    /// * [`NexusError::Translate`] on duplicate translate indices or names
    /// * [`NexusError::Format`] if a tree statement appears while the
    ///   translate table is still unterminated
    pub(crate) fn parse(name: &str, lines: Vec<String>) -> Result<Self, NexusError> {
        let block = GenericBlock::new(name, lines);
        let mut translators = TranslationTable::new();
        let mut trees = Vec::new();
        let mut in_translate = false;

        for line in block.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || GenericBlock::is_whole_line_comment(trimmed)
                || GenericBlock::is_attribute_line(trimmed)
            {
                continue;
            }
            if GenericBlock::is_block_delimiter(trimmed) {
                continue;
            }

            if in_translate {
                if TREE_LINE.is_match(trimmed) {
                    return Err(NexusError::format(
                        "Tree block has incomplete translate table",
                    ));
                }
                parse_translate_line(trimmed, &mut translators)?;
                if trimmed.ends_with(';') {
                    in_translate = false;
                }
            } else if TRANSLATE_KEYWORD.is_match(trimmed) {
                in_translate = true;
            } else if TREE_LINE.is_match(trimmed) {
                trees.push(Tree::new(trimmed));
            }
        }

        let was_translated = !translators.is_empty();
        let mut been_detranslated = false;

        // No table declared: infer one from the first tree's leaves; the
        // trees already hold real names, so nothing is left to translate.
        if !was_translated && !trees.is_empty() {
            let (_, body) = newick::split_preamble(trees[0].as_str())?;
            for (i, leaf) in newick::leaf_names(body).iter().enumerate() {
                translators.insert(&(i + 1).to_string(), leaf)?;
            }
            been_detranslated = true;
        }

        Ok(TreeBlock {
            block,
            translators,
            trees,
            was_translated,
            been_detranslated,
        })
    }
}

/// Parses the translate entries on one line (`<index> <name>[,;]?`,
/// possibly the final entry terminated by `;`).
fn parse_translate_line(
    line: &str,
    table: &mut TranslationTable,
) -> Result<(), NexusError> {
    // Several entries may share a line, comma-separated
    for part in split_entries(line) {
        let part = part.trim().trim_end_matches([',', ';']).trim_end();
        if part.is_empty() || part == ";" {
            continue;
        }
        let Some(caps) = TRANSLATE_ENTRY.captures(part) else {
            return Err(NexusError::translate(format!(
                "Malformed translate entry: {part}"
            )));
        };
        table.insert(&caps[1], &strip_quotes(&caps[2]))?;
    }
    Ok(())
}

/// Splits a translate line on commas outside quotes.
fn split_entries(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match c {
            '\'' | '"' => match quote {
                Some(q) if q == c => quote = None,
                None => quote = Some(c),
                _ => {}
            },
            ',' if quote.is_none() => {
                parts.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&line[start..]);
    parts
}

// ============================================================================
// Accessors & Mutators (pub)
// ============================================================================
impl TreeBlock {
    /// The tree statements in file order.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Number of trees.
    pub fn ntrees(&self) -> usize {
        self.trees.len()
    }

    /// Replaces the stored tree list.
    pub fn set_trees(&mut self, trees: Vec<Tree>) {
        self.trees = trees;
    }

    /// The translation table, explicit or inferred.
    pub fn translators(&self) -> &TranslationTable {
        &self.translators
    }

    /// Whether the stored trees currently hold taxon names rather than
    /// translate indices.
    pub fn been_detranslated(&self) -> bool {
        self.been_detranslated
    }

    /// The underlying generic block (raw lines, comments, attributes).
    pub fn generic(&self) -> &GenericBlock {
        &self.block
    }

    /// The taxa named by the translation table, in declaration order.
    pub fn taxa(&self) -> Vec<&str> {
        self.translators.iter().map(|(_, name)| name).collect()
    }
}

// ============================================================================
// Detranslation (pub)
// ============================================================================
impl TreeBlock {
    /// Rewrites every stored tree from index form to name form.
    ///
    /// Idempotent: a no-op if the block is already detranslated. The
    /// rewrite is atomic — the stored list is only replaced once every
    /// tree was detranslated successfully, so a failure leaves the block
    /// indistinguishable from "not yet attempted".
    ///
    /// # Errors
    /// Returns [`NexusError::Translate`] when a tree does not account for
    /// every table entry, and [`NexusError::Format`] on a malformed tree
    /// statement.
    pub fn detranslate(&mut self) -> Result<(), NexusError> {
        if self.been_detranslated {
            return Ok(());
        }
        let mut detranslated = Vec::with_capacity(self.trees.len());
        for tree in &self.trees {
            detranslated.push(Tree::new(self.detranslate_tree(tree.as_str())?));
        }
        self.trees = detranslated;
        self.been_detranslated = true;
        Ok(())
    }

    /// Rewrites one tree statement, substituting each translated taxon
    /// token while preserving attached comments and branch lengths.
    ///
    /// Works on exact chunk spans rather than textual search-and-replace,
    /// so an index that is a numeric substring of another token or of a
    /// branch length cannot be corrupted. After scanning, the number of
    /// chunks matched against a non-empty table must equal the table size.
    fn detranslate_tree(&self, statement: &str) -> Result<String, NexusError> {
        let (preamble, body) = newick::split_preamble(statement)?;
        let dialect = Dialect::detect(body);

        let mut out = String::with_capacity(statement.len() * 2);
        out.push_str(preamble);
        let mut last = 0;
        let mut matched = 0usize;
        for chunk in newick::scan_taxon_chunks(body, dialect) {
            let Some(name) = self.translators.get(&chunk.taxon) else {
                continue;
            };
            matched += 1;
            out.push_str(&body[last..chunk.start]);
            out.push_str(name);
            // Everything after the token (comments, colon, branch) verbatim
            out.push_str(&body[chunk.token_end..chunk.end]);
            last = chunk.end;
        }
        out.push_str(&body[last..]);

        if !self.translators.is_empty() && matched != self.translators.len() {
            return Err(NexusError::translate(format!(
                "Detranslation matched {} of {} table entries in: {}",
                matched,
                self.translators.len(),
                statement
            )));
        }
        Ok(out)
    }
}

// ============================================================================
// Serialization (pub)
// ============================================================================
impl TreeBlock {
    /// Serializes the block back to NEXUS text.
    ///
    /// If the block was translated and has not been detranslated, the
    /// `translate` sub-block is re-emitted with the terminating `;` on its
    /// own line (some downstream tools choke on a trailing semicolon
    /// attached to the final entry). Tree statements are emitted as stored.
    pub fn write(&self) -> String {
        let mut out = String::from("begin trees;\n");
        for attr in self.block.attributes() {
            out.push('\t');
            out.push_str(attr);
            out.push('\n');
        }
        if self.was_translated && !self.been_detranslated {
            out.push_str("\ttranslate\n");
            let last = self.translators.len().saturating_sub(1);
            for (i, (index, name)) in self.translators.iter().enumerate() {
                let quoted = if name.contains(char::is_whitespace) {
                    format!("'{name}'")
                } else {
                    name.to_string()
                };
                let sep = if i == last { "" } else { "," };
                out.push_str(&format!("\t\t{index} {quoted}{sep}\n"));
            }
            out.push_str("\t;\n");
        }
        for tree in &self.trees {
            out.push('\t');
            out.push_str(tree.as_str());
            out.push('\n');
        }
        out.push_str("end;\n");
        out
    }
}
