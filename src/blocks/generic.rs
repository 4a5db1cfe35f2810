//! Generic block container.
//!
//! Every block handler is built on top of [GenericBlock], which owns the
//! raw lines of one `BEGIN ... END;` region, collects full-line bracket
//! comments, and captures mesquite-style metadata attribute lines
//! (`TITLE ...;`, `LINK ... = ...;`) for faithful re-emission on write.

use once_cell::sync::Lazy;
use regex::Regex;

/// A line that is nothing but one bracketed comment.
static WHOLE_LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[[^\]]*\]\s*$").unwrap());

/// Mesquite metadata attribute line (`TITLE ...;` or `LINK ... = ...;`).
static MESQUITE_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(TITLE\s+.*|LINK\s+.*=.*)\s*;\s*$").unwrap());

/// One or more inline bracket-comment runs, non-greedy.
static INLINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*?\]").unwrap());

/// A full `begin <name>;` statement line.
static BEGIN_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*begin\s+\w+\s*(\[[^\]]*\])?\s*;").unwrap());

/// A full `end;` (or `endblock;`) statement line.
static END_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*end(block)?\s*;\s*$").unwrap());

// =#========================================================================#=
// GENERIC BLOCK
// =#========================================================================$=
/// Container for one named NEXUS block.
///
/// Stores the block's raw lines verbatim (including the `BEGIN`/`END`
/// lines), so a block without a dedicated handler round-trips unchanged
/// through [NexusReader::write()](crate::NexusReader::write).
///
/// Construction extracts two derived views:
/// - `comments` — lines that are entirely one bracketed comment
/// - `attributes` — mesquite `TITLE`/`LINK` metadata lines
///
/// Inline comments inside other lines are *not* removed here; handlers that
/// need that call [`remove_comments`].
#[derive(Debug, Clone)]
pub struct GenericBlock {
    /// Block name, lowercased.
    name: String,
    /// Raw lines of the block, verbatim.
    lines: Vec<String>,
    /// Full-line bracket comments found among the raw lines.
    comments: Vec<String>,
    /// Mesquite-style metadata lines, trimmed.
    attributes: Vec<String>,
}

// ============================================================================
// Construction (pub)
// ============================================================================
impl GenericBlock {
    /// Creates a block container from the raw lines of one `BEGIN...END`
    /// region.
    ///
    /// # Arguments
    /// * `name` - The block name, already lowercased by the splitter
    /// * `lines` - All raw lines of the region, `BEGIN`/`END` included
    pub fn new(name: &str, lines: Vec<String>) -> Self {
        let comments = lines
            .iter()
            .filter(|line| WHOLE_LINE_COMMENT.is_match(line))
            .map(|line| line.trim().to_string())
            .collect();
        let attributes = lines
            .iter()
            .filter(|line| MESQUITE_ATTRIBUTE.is_match(line))
            .map(|line| line.trim().to_string())
            .collect();

        GenericBlock {
            name: name.to_string(),
            lines,
            comments,
            attributes,
        }
    }
}

// ============================================================================
// Accessors (pub)
// ============================================================================
impl GenericBlock {
    /// The block name, lowercased.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw lines of the block, verbatim.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full-line bracket comments found in the block.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Mesquite `TITLE`/`LINK` attribute lines, trimmed.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Whether `line` is a mesquite attribute line.
    pub(crate) fn is_attribute_line(line: &str) -> bool {
        MESQUITE_ATTRIBUTE.is_match(line)
    }

    /// Whether `line` is entirely one bracketed comment.
    pub(crate) fn is_whole_line_comment(line: &str) -> bool {
        WHOLE_LINE_COMMENT.is_match(line)
    }

    /// Whether `line` is a `BEGIN`/`END` statement delimiting the block.
    ///
    /// Matches the full statement, never a mere prefix: a taxon named
    /// `Endler` or `Beginner` is content, not a delimiter.
    pub(crate) fn is_block_delimiter(line: &str) -> bool {
        BEGIN_STATEMENT.is_match(line) || END_STATEMENT.is_match(line)
    }

    /// Serializes the block by re-emitting its raw lines verbatim.
    pub fn write(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// Shared helpers
// ============================================================================
/// Strips every inline `[...]` comment run from `line`.
///
/// Non-greedy, repeated; shared by the handlers that need mid-line comment
/// removal.
pub fn remove_comments(line: &str) -> String {
    INLINE_COMMENT.replace_all(line, "").into_owned()
}
