//! TAXA block handler.
//!
//! Parses `TAXLABELS` lists, tolerating space- or newline-delimited
//! entries, numbered-comment placeholders (`[1] Name`), quoted labels and
//! per-taxon trailing annotations (`Name[&...]`).

use crate::blocks::generic::GenericBlock;
use crate::error::NexusError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static NTAX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ntax\s*=\s*(\d+)").unwrap());
static TAXLABELS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*taxlabels\b").unwrap());
/// Numbered placeholder comment preceding a label, e.g. `[1]`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d+\]\s*").unwrap());
/// Trailing bracket annotation attached to a label, e.g. `Name[&x=1]`.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[.*\])\s*$").unwrap());

// =#========================================================================#=
// TAXA BLOCK
// =#========================================================================$=
/// Handler for a `TAXA` block.
///
/// Holds an ordered, de-duplicated taxon list plus a side table of
/// per-taxon annotations. The declared `NTAX` must match the parsed count;
/// a mismatch is a hard [`NexusError::Format`] — unlike the
/// [DataBlock](crate::blocks::DataBlock), which only warns on dimension
/// mismatches. The two handlers differ deliberately.
///
/// # Example
/// ```
/// use nexfile::read_str;
///
/// let nex = read_str(
///     "#NEXUS\nbegin taxa;\ndimensions ntax=2;\ntaxlabels\nHarry Simon\n;\nend;",
/// )?;
/// let taxa = nex.taxa().unwrap();
/// assert_eq!(taxa.taxa(), ["Harry", "Simon"]);
/// # Ok::<(), nexfile::NexusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TaxaBlock {
    block: GenericBlock,
    /// Ordered taxon names, unique, insertion order preserved.
    taxa: Vec<String>,
    /// Trailing bracket annotations keyed by cleaned taxon name.
    annotations: IndexMap<String, String>,
    /// `NTAX` value captured from the `DIMENSIONS` line, if any.
    declared_ntax: Option<usize>,
}

// ============================================================================
// Construction (pub(crate))
// ============================================================================
impl TaxaBlock {
    /// Parses a TAXA block from its raw lines.
    ///
    /// # Errors
    /// Returns [`NexusError::Format`] if a declared `NTAX` disagrees with
    /// the number of distinct taxa actually parsed.
    pub(crate) fn parse(name: &str, lines: Vec<String>) -> Result<Self, NexusError> {
        let block = GenericBlock::new(name, lines);
        let mut taxa = Vec::new();
        let mut annotations = IndexMap::new();
        let mut declared_ntax = None;
        let mut in_labels = false;

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
            let lower = trimmed.to_lowercase();
            if lower.starts_with("dimensions") {
                if let Some(caps) = NTAX.captures(trimmed) {
                    declared_ntax = caps[1].parse::<usize>().ok();
                }
                continue;
            }

            let mut rest = trimmed;
            if let Some(m) = TAXLABELS.find(trimmed) {
                // Keyword may stand alone or prefix the first entry line
                in_labels = true;
                rest = trimmed[m.end()..].trim_start();
            }
            if !in_labels {
                continue;
            }

            let terminal = rest.contains(';');
            let rest = rest.trim_end_matches(';').trim_end();
            for token in tokenize_labels(rest) {
                push_taxon(&token, &mut taxa, &mut annotations);
            }
            if terminal {
                in_labels = false;
            }
        }

        if let Some(ntax) = declared_ntax
            && ntax != taxa.len()
        {
            return Err(NexusError::format(format!(
                "Taxa block declares ntax={} but {} taxa were found",
                ntax,
                taxa.len()
            )));
        }

        Ok(TaxaBlock {
            block,
            taxa,
            annotations,
            declared_ntax,
        })
    }
}

/// Splits a TAXLABELS entry run into candidate tokens.
///
/// Whitespace separates tokens, except inside quotes or brackets, so
/// `'Harry the Hutt'` and `Simon[&status=extinct]` each stay one token.
fn tokenize_labels(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match c {
            '\'' | '"' if depth == 0 => {
                current.push(c);
                match quote {
                    Some(q) if q == c => quote = None,
                    None => quote = Some(c),
                    _ => {}
                }
            }
            '[' if quote.is_none() => {
                depth += 1;
                current.push(c);
            }
            ']' if quote.is_none() => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 && quote.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Cleans one candidate token and appends it to the taxa list.
///
/// Strips a leading `[n]` placeholder, captures a trailing bracket
/// annotation into the side table, and strips surrounding quotes. A
/// repeated name is dropped wholesale, annotation included; the first
/// occurrence wins.
fn push_taxon(token: &str, taxa: &mut Vec<String>, annotations: &mut IndexMap<String, String>) {
    // A standalone `[n]` placeholder carries no label at all
    let stripped = PLACEHOLDER.replace(token, "");
    let mut name = stripped.trim().to_string();
    if name.is_empty() || name.starts_with('[') {
        return;
    }

    let mut annotation = None;
    if let Some(caps) = ANNOTATION.captures(&name) {
        let ann = caps.get(1).unwrap();
        annotation = Some(ann.as_str().to_string());
        name.truncate(ann.start());
        name.truncate(name.trim_end().len());
    }

    let name = strip_quotes(&name);
    if name.is_empty() || taxa.contains(&name) {
        return;
    }
    if let Some(ann) = annotation {
        annotations.insert(name.clone(), ann);
    }
    taxa.push(name);
}

/// Strips one layer of matching surrounding quotes.
pub(crate) fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 {
        let first = s.chars().next().unwrap();
        if (first == '\'' || first == '"') && s.ends_with(first) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

// ============================================================================
// Accessors & Mutators (pub)
// ============================================================================
impl TaxaBlock {
    /// The ordered taxon names.
    pub fn taxa(&self) -> &[String] {
        &self.taxa
    }

    /// Number of taxa.
    pub fn ntaxa(&self) -> usize {
        self.taxa.len()
    }

    /// The `NTAX` value declared on the `DIMENSIONS` line, if any.
    ///
    /// Matches [`ntaxa`](Self::ntaxa) for parsed blocks (a mismatch fails
    /// the parse); may diverge after mutation.
    pub fn declared_ntax(&self) -> Option<usize> {
        self.declared_ntax
    }

    /// The annotation stored for `taxon`, brackets included, if any.
    pub fn annotation(&self, taxon: &str) -> Option<&str> {
        self.annotations.get(taxon).map(String::as_str)
    }

    /// The underlying generic block (raw lines, comments, attributes).
    pub fn generic(&self) -> &GenericBlock {
        &self.block
    }

    /// Appends a taxon unless already present.
    pub fn add_taxon(&mut self, taxon: &str) {
        if !self.taxa.iter().any(|t| t == taxon) {
            self.taxa.push(taxon.to_string());
        }
    }

    /// Removes a taxon and its annotation. No-op if the taxon is absent.
    pub fn del_taxon(&mut self, taxon: &str) {
        self.taxa.retain(|t| t != taxon);
        self.annotations.shift_remove(taxon);
    }
}

// ============================================================================
// Serialization (pub)
// ============================================================================
impl TaxaBlock {
    /// Serializes the block back to NEXUS text.
    ///
    /// Emits attributes, `dimensions ntax=N;`, `taxlabels`, one
    /// `\t[index] name` line per taxon (1-based index, names quoted only
    /// when they contain whitespace, annotations re-attached), and the
    /// closing `;`/`end;`.
    pub fn write(&self) -> String {
        let mut out = String::from("begin taxa;\n");
        for attr in self.block.attributes() {
            out.push('\t');
            out.push_str(attr);
            out.push('\n');
        }
        out.push_str(&format!("\tdimensions ntax={};\n", self.taxa.len()));
        out.push_str("\ttaxlabels\n");
        for (i, taxon) in self.taxa.iter().enumerate() {
            let quoted = if taxon.contains(char::is_whitespace) {
                format!("'{taxon}'")
            } else {
                taxon.clone()
            };
            out.push_str(&format!("\t[{}] {}", i + 1, quoted));
            if let Some(ann) = self.annotations.get(taxon) {
                out.push_str(ann);
            }
            out.push('\n');
        }
        out.push_str(";\nend;\n");
        out
    }
}
