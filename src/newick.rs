//! Newick-string scanning utilities.
//!
//! This module provides the low-level scanners the tree-block engine is
//! built on: bracket-comment handling, leaf-label walking, and the
//! taxon-chunk tokenizer that drives detranslation.
//!
//! A Newick body is scanned character by character rather than with
//! regexes: every leaf label sits directly after a `(` or `,` boundary, and
//! everything attached to it (an optional bracket comment, a colon, an
//! optional second bracket comment in the BEAST dialect, a branch length)
//! forms one [TaxonChunk] with an exact byte span in the body. Replacing
//! spans instead of doing textual search-and-replace means a taxon token
//! that happens to be a numeric substring of another token or of a branch
//! length can never be corrupted.

use crate::error::NexusError;

/// Characters that terminate an unquoted Newick label.
const LABEL_DELIMITERS: &[char] = &['(', ')', ',', ':', ';', '[', ']', '{', '}'];

// =#========================================================================#=
// TAXON CHUNK
// =#========================================================================$=
/// One leaf occurrence inside a Newick body, with its exact byte span.
///
/// For the standard dialect a chunk covers `taxon[comment]:branch`; in the
/// BEAST dialect every leaf additionally carries a comment after the colon,
/// `taxon[comment]:[comment2]branch`. All decorations are optional; the
/// span `token_end..end` holds them verbatim so a substitution can splice
/// `name + body[token_end..end]` without touching them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TaxonChunk {
    /// Byte offset of the first character of the taxon token.
    pub start: usize,
    /// Byte offset one past the taxon token (quotes included).
    pub token_end: usize,
    /// Byte offset one past the last character belonging to this chunk.
    pub end: usize,
    /// The taxon token, quotes stripped.
    pub taxon: String,
}

// =#========================================================================#=
// NEWICK DIALECT
// =#========================================================================$=
/// Newick dialect of one tree statement, chosen once per tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Dialect {
    /// Plain Newick, optionally with one comment per leaf before the colon.
    Standard,
    /// BEAST output: every leaf carries a comment both before and after the
    /// colon (e.g. `1[&height=0.1]:[&rate=0.5]0.2`).
    Beast,
}

impl Dialect {
    /// Detects the dialect of a Newick body.
    ///
    /// The presence of both `{` and `[` is the cheap heuristic for BEAST
    /// output (set-valued annotations like `{0.1,0.2}` only occur there).
    pub fn detect(body: &str) -> Dialect {
        if body.contains('{') && body.contains('[') {
            Dialect::Beast
        } else {
            Dialect::Standard
        }
    }
}

// ============================================================================
// Comment scanning
// ============================================================================
/// Returns the byte offset one past the `]` matching the `[` at `start`,
/// accounting for nested brackets, or `None` if the comment never closes.
pub(crate) fn comment_end(s: &str, start: usize) -> Option<usize> {
    debug_assert!(s[start..].starts_with('['));
    let mut depth = 0usize;
    for (i, c) in s[start..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Removes every bracketed comment run from `s`, nesting respected.
///
/// Unclosed trailing comments are dropped to the end of the string.
pub(crate) fn strip_comments(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        let c = rest.chars().next().unwrap();
        if c == '[' {
            match comment_end(s, i) {
                Some(end) => i = end,
                None => break,
            }
        } else {
            out.push(c);
            i += c.len_utf8();
        }
    }
    out
}

// ============================================================================
// Preamble splitting
// ============================================================================
/// Splits a tree statement at the first `=` that is not nested inside a
/// bracket comment, returning `(preamble, body)` where the preamble still
/// includes the `=` itself.
///
/// Guards against `=` characters inside BEAST metadata comments appearing
/// earlier in the line (e.g. `tree STATE_0 [&lnP=-123.4] = ...`).
///
/// # Errors
/// Returns [`NexusError::Format`] if no un-bracketed `=` exists.
pub(crate) fn split_preamble(statement: &str) -> Result<(&str, &str), NexusError> {
    let mut depth = 0usize;
    for (i, c) in statement.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                return Ok((&statement[..=i], &statement[i + 1..]));
            }
            _ => {}
        }
    }
    Err(NexusError::format(format!(
        "Tree statement has no '=' outside comments: {statement}"
    )))
}

// ============================================================================
// Chunk scanning
// ============================================================================
/// Scans a Newick body for [TaxonChunk]s in left-to-right order.
///
/// A taxon token starts directly after a `(` or `,` boundary (interior
/// whitespace tolerated); positions after `)` carry internal-node labels or
/// support values and are deliberately not scanned. Comments outside chunks
/// are skipped wholesale.
///
/// # Arguments
/// * `body` - The Newick body (everything after the `=` of a tree statement)
/// * `dialect` - Whether to expect a post-colon comment on each leaf
pub(crate) fn scan_taxon_chunks(body: &str, dialect: Dialect) -> Vec<TaxonChunk> {
    let mut chunks = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let c = body[i..].chars().next().unwrap();
        match c {
            '[' => {
                // Comment not belonging to any leaf (e.g. the [&R] marker)
                i = comment_end(body, i).unwrap_or(body.len());
            }
            '(' | ',' => {
                i += 1;
                // Tolerate whitespace between boundary and label
                while body[i..].starts_with(' ') || body[i..].starts_with('\t') {
                    i += 1;
                }
                if let Some(chunk) = scan_chunk_at(body, i, dialect) {
                    i = chunk.end;
                    chunks.push(chunk);
                }
            }
            _ => i += c.len_utf8(),
        }
    }
    chunks
}

/// Scans a single [TaxonChunk] starting at byte offset `start`, or `None`
/// if no taxon token begins there (e.g. a nested `(` follows).
fn scan_chunk_at(body: &str, start: usize, dialect: Dialect) -> Option<TaxonChunk> {
    let (taxon, token_end) = scan_label(body, start)?;
    let mut i = token_end;

    // Optional comment directly after the token
    if body[i..].starts_with('[') {
        i = comment_end(body, i)?;
    }

    // Optional colon with branch length (and, for BEAST, a second comment)
    if body[i..].starts_with(':') {
        i += 1;
        if dialect == Dialect::Beast && body[i..].starts_with('[') {
            i = comment_end(body, i)?;
        }
        while i < body.len() {
            let c = body[i..].chars().next()?;
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
                i += 1;
            } else {
                break;
            }
        }
    }

    Some(TaxonChunk {
        start,
        token_end,
        end: i,
        taxon,
    })
}

/// Scans one label (quoted or bare) at `start`, returning the unquoted text
/// and the offset one past its end, or `None` if no label starts there.
fn scan_label(body: &str, start: usize) -> Option<(String, usize)> {
    let first = body[start..].chars().next()?;
    if first == '\'' {
        // Quoted label; doubled quotes escape a literal quote
        let mut label = String::new();
        let mut i = start + 1;
        loop {
            let c = body[i..].chars().next()?;
            if c == '\'' {
                if body[i + 1..].starts_with('\'') {
                    label.push('\'');
                    i += 2;
                } else {
                    return Some((label, i + 1));
                }
            } else {
                label.push(c);
                i += c.len_utf8();
            }
        }
    } else {
        let mut i = start;
        while i < body.len() {
            let c = body[i..].chars().next().unwrap();
            if LABEL_DELIMITERS.contains(&c) || c.is_whitespace() {
                break;
            }
            i += c.len_utf8();
        }
        if i == start {
            None
        } else {
            Some((body[start..i].to_string(), i))
        }
    }
}

// ============================================================================
// Leaf walking
// ============================================================================
/// Returns the leaf labels of a Newick body in left-to-right encounter
/// order, comments stripped, duplicates removed.
///
/// Used to infer a translation table when a trees block carries no
/// `TRANSLATE` command.
pub(crate) fn leaf_names(body: &str) -> Vec<String> {
    let clean = strip_comments(body);
    let mut names = Vec::new();
    for chunk in scan_taxon_chunks(&clean, Dialect::Standard) {
        if !names.contains(&chunk.taxon) {
            names.push(chunk.taxon);
        }
    }
    names
}
