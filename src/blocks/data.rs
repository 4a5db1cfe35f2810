//! DATA / CHARACTERS block handler.
//!
//! Parses character-matrix blocks in both simple and wrapped/interleaved
//! layouts, a multi-line `FORMAT` statement, parenthetical multistate
//! groups, and an optional `CHARSTATELABELS` sub-block.

use crate::blocks::generic::{GenericBlock, remove_comments};
use crate::blocks::taxa::strip_quotes;
use crate::error::NexusError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

static NTAX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ntax\s*=\s*(\d+)").unwrap());
static NCHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)nchar\s*=\s*(\d+)").unwrap());
/// `FORMAT ...;` statement, possibly spanning physical lines.
static FORMAT_STMT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ims)^\s*format\b([^;]*);").unwrap());
/// `CHARSTATELABELS ...;` sub-block, possibly spanning physical lines.
static CHARSTATELABELS_STMT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ims)^\s*charstatelabels\b([^;]*);").unwrap());
/// One `key=value` (value optionally quoted) or bare `key` token.
static FORMAT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z0-9_]+)\s*=\s*("[^"]*"|'[^']*'|\S+)|([a-zA-Z0-9_]+)"#).unwrap()
});

// =#========================================================================#=
// SITE VALUE
// =#========================================================================$=
/// One site (alignment column entry) of one taxon.
///
/// Most sites are a single state symbol; a parenthetical group like `(0,1)`
/// or `(12)` collapses into one [`SiteValue::Ambiguous`] value holding all
/// states the taxon was coded with at that site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SiteValue {
    /// A single state symbol.
    Single(char),
    /// A polymorphic/multistate group.
    Ambiguous {
        /// The individual state tokens, in source order.
        states: Vec<String>,
        /// Whether the source group was comma-separated (`(0,1)` vs `(01)`),
        /// preserved so the two notations round-trip distinctly.
        comma_separated: bool,
    },
}

impl SiteValue {
    /// The individual state tokens of this site.
    pub fn states(&self) -> Vec<String> {
        match self {
            SiteValue::Single(c) => vec![c.to_string()],
            SiteValue::Ambiguous { states, .. } => states.clone(),
        }
    }

    /// Whether this site holds more than one state.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SiteValue::Ambiguous { .. })
    }

    /// The site value as a bare string (`"0"`, `"4,5"`, `"12"`), without
    /// surrounding parentheses.
    pub fn value(&self) -> String {
        match self {
            SiteValue::Single(c) => c.to_string(),
            SiteValue::Ambiguous {
                states,
                comma_separated,
            } => {
                if *comma_separated {
                    states.join(",")
                } else {
                    states.concat()
                }
            }
        }
    }
}

impl fmt::Display for SiteValue {
    /// Matrix notation: ambiguous values are wrapped in parentheses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteValue::Single(c) => write!(f, "{c}"),
            SiteValue::Ambiguous { .. } => write!(f, "({})", self.value()),
        }
    }
}

// =#========================================================================#=
// FORMAT VALUE
// =#========================================================================$=
/// Value of one `FORMAT` line attribute: either `key=value` text or a bare
/// flag token (`interleave`, `transpose`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatValue {
    /// A `key=value` attribute, quotes stripped.
    Text(String),
    /// A bare flag key with no value.
    Flag,
}

impl FormatValue {
    /// The text of a [`FormatValue::Text`], if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormatValue::Text(s) => Some(s),
            FormatValue::Flag => None,
        }
    }
}

// =#========================================================================#=
// DATA BLOCK
// =#========================================================================$=
/// Handler for a `DATA` or `CHARACTERS` block.
///
/// The matrix maps each taxon name to its ordered site sequence. Interleaved
/// matrices are supported naturally: when a taxon name reappears in a later
/// block of rows, its tokenized sites are concatenated in encounter order.
///
/// A declared `NTAX`/`NCHAR` that disagrees with the parsed matrix emits a
/// `tracing` warning and parsing continues with the parsed values as ground
/// truth — deliberately lenient, in contrast to the hard-failing
/// [TaxaBlock](crate::blocks::TaxaBlock).
///
/// Derived views (`ntaxa`, `nchar`, `taxa`, `symbols`, `characters`) are
/// recomputed on access, so direct mutation of the matrix never leaves a
/// stale cache behind.
///
/// # Example
/// ```
/// use nexfile::read_str;
///
/// let nex = read_str(concat!(
///     "#NEXUS\nbegin data;\n",
///     "dimensions ntax=2 nchar=3;\n",
///     "format datatype=standard;\nmatrix\n",
///     "Harry 001\nSimon 011\n;\nend;",
/// ))?;
/// let data = nex.data().unwrap();
/// assert_eq!(data.nchar(), 3);
/// assert_eq!(data.symbols().len(), 2);
/// # Ok::<(), nexfile::NexusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DataBlock {
    block: GenericBlock,
    /// `FORMAT` attributes, lower-cased keys, `None` if no FORMAT statement.
    format: Option<IndexMap<String, FormatValue>>,
    /// `CHARSTATELABELS` entries, zero-based site index → label.
    charlabels: BTreeMap<usize, String>,
    /// Taxon name → ordered site sequence, encounter order preserved.
    matrix: IndexMap<String, Vec<SiteValue>>,
}

// ============================================================================
// Construction (pub(crate))
// ============================================================================
impl DataBlock {
    /// Parses a DATA/CHARACTERS block from its raw lines.
    pub(crate) fn parse(name: &str, lines: Vec<String>) -> Result<Self, NexusError> {
        let block = GenericBlock::new(name, lines);
        let text = block.lines().join("\n");

        // FORMAT and CHARSTATELABELS statements may span physical lines, so
        // they are captured over the joined text and removed before the
        // line-oriented matrix pass.
        let format = parse_format(&text);
        let charlabels = parse_charstatelabels(&text)?;
        let text = FORMAT_STMT.replace_all(&text, "");
        let text = CHARSTATELABELS_STMT.replace_all(&text, "");

        let mut declared_ntax = None;
        let mut declared_nchar = None;
        let mut matrix: IndexMap<String, Vec<SiteValue>> = IndexMap::new();
        let mut site_cache: HashMap<String, Vec<SiteValue>> = HashMap::new();

        // Primary pass: one `taxon sites` split per line
        let mut content_lines: Vec<&str> = Vec::new();
        for line in text.lines() {
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
                if let Some(caps) = NCHAR.captures(trimmed) {
                    declared_nchar = caps[1].parse::<usize>().ok();
                }
                continue;
            }
            if lower == "matrix" || lower == "matrix;" {
                continue;
            }
            content_lines.push(trimmed);
        }

        let mut splits = 0usize;
        for line in &content_lines {
            let clean = remove_comments(line);
            let clean = clean.trim().trim_end_matches(';').trim_end();
            if clean.is_empty() {
                continue;
            }
            if let Some((taxon, sites_text)) = split_row(clean) {
                let sites = parse_sites(sites_text, &mut site_cache);
                matrix.entry(taxon).or_default().extend(sites);
                splits += 1;
            }
        }

        // Fallback "wrapped matrix" mode: taxon name alone on one line, its
        // sequence spread over the following lines. Without a declared nchar
        // there is no way to tell a continuation line from the next taxon
        // name, so the fallback is refused outright.
        if splits == 0
            && !content_lines.is_empty()
            && let Some(nchar) = declared_nchar
        {
            parse_wrapped(&content_lines, nchar, &mut matrix, &mut site_cache);
        }

        // Lenient dimension policy: warn and trust the parsed actuals
        if let Some(ntax) = declared_ntax
            && ntax != matrix.len()
        {
            tracing::warn!(
                declared = ntax,
                parsed = matrix.len(),
                "ntax does not match parsed taxon count"
            );
        }
        let parsed_nchar = matrix.values().next().map_or(0, Vec::len);
        if let Some(nchar) = declared_nchar
            && !matrix.is_empty()
            && nchar != parsed_nchar
        {
            tracing::warn!(
                declared = nchar,
                parsed = parsed_nchar,
                "nchar does not match parsed site count"
            );
        }

        Ok(DataBlock {
            block,
            format,
            charlabels,
            matrix,
        })
    }
}

/// Splits a matrix row into `(taxon, sites_text)` on the first whitespace
/// run, honoring a quoted taxon token.
fn split_row(line: &str) -> Option<(String, &str)> {
    let first = line.chars().next()?;
    if first == '\'' || first == '"' {
        let close = line[1..].find(first)? + 1;
        let taxon = line[1..close].to_string();
        let rest = line[close + 1..].trim_start();
        if rest.is_empty() {
            return None;
        }
        return Some((taxon, rest));
    }
    let split = line.find(char::is_whitespace)?;
    let taxon = strip_quotes(&line[..split]);
    let rest = line[split..].trim_start();
    if rest.is_empty() {
        return None;
    }
    Some((taxon, rest))
}

/// Second-chance pass for matrices where each taxon name stands alone on
/// its own line and the sequence follows on subsequent lines.
///
/// A line with no internal whitespace starts a new taxon when the previous
/// taxon has accumulated the declared `nchar` sites; `nchar` must be
/// declared for this pass to run at all.
fn parse_wrapped(
    lines: &[&str],
    nchar: usize,
    matrix: &mut IndexMap<String, Vec<SiteValue>>,
    cache: &mut HashMap<String, Vec<SiteValue>>,
) {
    let mut current: Option<String> = None;
    for line in lines {
        let clean = remove_comments(line);
        let clean = clean.trim().trim_end_matches(';').trim_end();
        if clean.is_empty() {
            continue;
        }

        let taxon_complete = match &current {
            None => true,
            Some(taxon) => matrix.get(taxon).map_or(0, Vec::len) >= nchar,
        };

        if taxon_complete {
            // Candidate taxon name; refuse anything with internal whitespace
            if !clean.contains(char::is_whitespace) {
                let taxon = strip_quotes(clean);
                matrix.entry(taxon.clone()).or_default();
                current = Some(taxon);
            }
        } else if let Some(taxon) = &current
            && let Some(row) = matrix.get_mut(taxon)
        {
            let sites = parse_sites(clean, cache);
            row.extend(sites);
        }
    }
}

/// Extracts the `FORMAT` attribute mapping, or `None` if the block carries
/// no FORMAT statement.
fn parse_format(text: &str) -> Option<IndexMap<String, FormatValue>> {
    let caps = FORMAT_STMT.captures(text)?;
    let body = remove_comments(&caps[1]);
    let mut map = IndexMap::new();
    for token in FORMAT_TOKEN.captures_iter(&body) {
        if let (Some(key), Some(value)) = (token.get(1), token.get(2)) {
            map.insert(
                key.as_str().to_lowercase(),
                FormatValue::Text(strip_quotes(value.as_str())),
            );
        } else if let Some(flag) = token.get(3) {
            map.insert(flag.as_str().to_lowercase(), FormatValue::Flag);
        }
    }
    Some(map)
}

/// Extracts `CHARSTATELABELS` entries (`<1-based-index> <label>,` repeated)
/// into a zero-based label map.
fn parse_charstatelabels(text: &str) -> Result<BTreeMap<usize, String>, NexusError> {
    let mut labels = BTreeMap::new();
    let Some(caps) = CHARSTATELABELS_STMT.captures(text) else {
        return Ok(labels);
    };
    for entry in caps[1].split(',') {
        let entry = remove_comments(entry);
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some(split) = entry.find(char::is_whitespace) else {
            return Err(NexusError::format(format!(
                "Malformed charstatelabels entry: {entry}"
            )));
        };
        let index: usize = entry[..split].parse().map_err(|_| {
            NexusError::format(format!("Malformed charstatelabels index: {entry}"))
        })?;
        if index == 0 {
            return Err(NexusError::format(
                "charstatelabels indices are 1-based; found 0",
            ));
        }
        let label = strip_quotes(entry[split..].trim());
        labels.insert(index - 1, label);
    }
    Ok(labels)
}

/// Tokenizes a run of per-site symbols, collapsing parenthetical groups.
///
/// `"123"` → `1 2 3`; `"1(12)"` → `1 12`; `"123(4,5)56"` → `1 2 3 4,5 5 6`.
/// Memoized by verbatim input to skip reparsing repeated row patterns.
fn parse_sites(input: &str, cache: &mut HashMap<String, Vec<SiteValue>>) -> Vec<SiteValue> {
    let key: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_end_matches(';')
        .to_string();
    if let Some(cached) = cache.get(&key) {
        return cached.clone();
    }

    let mut out = Vec::with_capacity(key.len());
    if !key.contains('(') {
        out.extend(key.chars().map(SiteValue::Single));
    } else {
        let mut chars = key.chars();
        while let Some(c) = chars.next() {
            if c == '(' {
                let mut inner = String::new();
                for g in chars.by_ref() {
                    if g == ')' {
                        break;
                    }
                    inner.push(g);
                }
                let comma_separated = inner.contains(',');
                let states = if comma_separated {
                    inner.split(',').map(str::to_string).collect()
                } else {
                    inner.chars().map(|s| s.to_string()).collect()
                };
                out.push(SiteValue::Ambiguous {
                    states,
                    comma_separated,
                });
            } else {
                out.push(SiteValue::Single(c));
            }
        }
    }

    cache.insert(key, out.clone());
    out
}

// ============================================================================
// Accessors & Mutators (pub)
// ============================================================================
impl DataBlock {
    /// Number of taxa in the matrix.
    pub fn ntaxa(&self) -> usize {
        self.matrix.len()
    }

    /// Number of sites, taken from the first taxon's sequence.
    ///
    /// Assumes uniform row length; dimension mismatches were warned about
    /// at parse time.
    pub fn nchar(&self) -> usize {
        self.matrix.values().next().map_or(0, Vec::len)
    }

    /// Taxon names in matrix encounter order.
    pub fn taxa(&self) -> Vec<&str> {
        self.matrix.keys().map(String::as_str).collect()
    }

    /// The site sequence of one taxon.
    pub fn sites(&self, taxon: &str) -> Option<&[SiteValue]> {
        self.matrix.get(taxon).map(Vec::as_slice)
    }

    /// The full matrix, taxon → site sequence.
    pub fn matrix(&self) -> &IndexMap<String, Vec<SiteValue>> {
        &self.matrix
    }

    /// Mutable access to the matrix for direct cell manipulation.
    ///
    /// Derived views are recomputed on access, so no rebuild step is needed
    /// afterwards.
    pub fn matrix_mut(&mut self) -> &mut IndexMap<String, Vec<SiteValue>> {
        &mut self.matrix
    }

    /// The `FORMAT` attribute mapping, if the block had a FORMAT statement.
    pub fn format(&self) -> Option<&IndexMap<String, FormatValue>> {
        self.format.as_ref()
    }

    /// The `CHARSTATELABELS` map, zero-based site index → label.
    pub fn charlabels(&self) -> &BTreeMap<usize, String> {
        &self.charlabels
    }

    /// Set union of every site value across every taxon, recomputed on
    /// demand.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.matrix
            .values()
            .flatten()
            .map(SiteValue::value)
            .collect()
    }

    /// Transposed view: character label (or index, when unlabelled) →
    /// taxon → site value string.
    pub fn characters(&self) -> IndexMap<String, IndexMap<String, String>> {
        let mut out: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        for (taxon, sites) in &self.matrix {
            for (i, site) in sites.iter().enumerate() {
                let key = self
                    .charlabels
                    .get(&i)
                    .cloned()
                    .unwrap_or_else(|| i.to_string());
                out.entry(key)
                    .or_default()
                    .insert(taxon.clone(), site.value());
            }
        }
        out
    }

    /// The underlying generic block (raw lines, comments, attributes).
    pub fn generic(&self) -> &GenericBlock {
        &self.block
    }

    /// Adds (or replaces) a taxon with the given site sequence.
    pub fn add_taxon(&mut self, taxon: &str, sites: Vec<SiteValue>) {
        self.matrix.insert(taxon.to_string(), sites);
    }

    /// Removes a taxon from the matrix. No-op if absent.
    pub fn del_taxon(&mut self, taxon: &str) {
        self.matrix.shift_remove(taxon);
    }
}

// ============================================================================
// Serialization (pub)
// ============================================================================
impl DataBlock {
    /// Serializes the block back to NEXUS text.
    ///
    /// `datatype` is forced first on the format line (downstream tools
    /// refuse files otherwise), `interleave` is dropped (the matrix is
    /// always flattened on write), and `symbols` is recomputed from the
    /// current data excluding the gap and missing symbols.
    pub fn write(&self) -> String {
        let gap = self.format_text("gap").unwrap_or_else(|| "-".into());
        let missing = self.format_text("missing").unwrap_or_else(|| "?".into());

        let mut out = String::from("begin data;\n");
        for attr in self.block.attributes() {
            out.push('\t');
            out.push_str(attr);
            out.push('\n');
        }
        out.push_str(&format!(
            "\tdimensions ntax={} nchar={};\n",
            self.ntaxa(),
            self.nchar()
        ));
        out.push_str(&self.write_format_line(&gap, &missing));
        if let Some(last) = self.charlabels.keys().next_back().copied() {
            out.push_str("\tcharstatelabels\n");
            for (index, label) in &self.charlabels {
                let sep = if *index == last { "" } else { "," };
                out.push_str(&format!("\t\t{} {}{}\n", index + 1, label, sep));
            }
            out.push_str("\t;\n");
        }
        out.push_str("\tmatrix\n");

        let width = self.matrix.keys().map(String::len).max().unwrap_or(0);
        let mut taxa: Vec<&String> = self.matrix.keys().collect();
        taxa.sort();
        for taxon in taxa {
            let sites: String = self.matrix[taxon].iter().map(|s| s.to_string()).collect();
            out.push_str(&format!("{taxon:<width$} {sites}\n"));
        }
        out.push_str(";\nend;\n");
        out
    }

    /// Builds the format line, `datatype` first, `interleave`/`symbols`
    /// replaced as documented on [`write`](Self::write).
    fn write_format_line(&self, gap: &str, missing: &str) -> String {
        let datatype = self
            .format_text("datatype")
            .unwrap_or_else(|| "standard".into());

        // Symbol alphabet from individual state tokens, gap/missing excluded
        let alphabet: BTreeSet<String> = self
            .matrix
            .values()
            .flatten()
            .flat_map(|site| site.states())
            .filter(|s| s != gap && s != missing)
            .collect();
        let symbols: String = alphabet.iter().map(String::as_str).collect();

        let mut line = format!("\tformat datatype={datatype} symbols=\"{symbols}\"");
        if let Some(fmt) = &self.format {
            for (key, value) in fmt {
                if matches!(key.as_str(), "datatype" | "symbols" | "interleave") {
                    continue;
                }
                match value {
                    FormatValue::Text(text) => {
                        if text.contains(char::is_whitespace) {
                            line.push_str(&format!(" {key}=\"{text}\""));
                        } else {
                            line.push_str(&format!(" {key}={text}"));
                        }
                    }
                    FormatValue::Flag => line.push_str(&format!(" {key}")),
                }
            }
        }
        line.push_str(";\n");
        line
    }

    /// Text value of one format key, if present.
    fn format_text(&self, key: &str) -> Option<String> {
        self.format
            .as_ref()?
            .get(key)?
            .as_text()
            .map(str::to_string)
    }
}

// =#========================================================================#=
// TESTS
// =#========================================================================$=
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> DataBlock {
        DataBlock::parse("data", lines.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn site_strings(block: &DataBlock, taxon: &str) -> Vec<String> {
        block
            .sites(taxon)
            .unwrap()
            .iter()
            .map(SiteValue::value)
            .collect()
    }

    #[test]
    fn test_parse_sites_boundaries() {
        let mut cache = HashMap::new();
        let vals = |s: &str, cache: &mut HashMap<_, _>| -> Vec<String> {
            parse_sites(s, cache).iter().map(SiteValue::value).collect()
        };
        assert_eq!(vals("123", &mut cache), ["1", "2", "3"]);
        assert_eq!(vals("1(12)", &mut cache), ["1", "12"]);
        assert_eq!(
            vals("123(4,5)56", &mut cache),
            ["1", "2", "3", "4,5", "5", "6"]
        );
        assert_eq!(vals("ACGTU?", &mut cache), ["A", "C", "G", "T", "U", "?"]);
    }

    #[test]
    fn test_parse_sites_memoized() {
        let mut cache = HashMap::new();
        parse_sites("0011", &mut cache);
        assert!(cache.contains_key("0011"));
        // repeated row pattern hits the cache
        let again = parse_sites("0011", &mut cache);
        assert_eq!(again.len(), 4);
    }

    #[test]
    fn test_simple_matrix() {
        let b = parse(&[
            "begin data;",
            "dimensions ntax=2 nchar=4;",
            "format datatype=standard symbols=\"01\";",
            "matrix",
            "Harry 0010",
            "Simon 0011",
            ";",
            "end;",
        ]);
        assert_eq!(b.ntaxa(), 2);
        assert_eq!(b.nchar(), 4);
        assert_eq!(b.taxa(), ["Harry", "Simon"]);
        assert_eq!(site_strings(&b, "Harry"), ["0", "0", "1", "0"]);
    }

    #[test]
    fn test_interleaved_concatenation() {
        let b = parse(&[
            "begin data;",
            "dimensions ntax=1 nchar=20;",
            "format interleave;",
            "matrix",
            "Harry AACGATTCGT",
            "Harry TTTTCGAAGC",
            ";",
            "end;",
        ]);
        assert_eq!(b.nchar(), 20);
        assert_eq!(b.sites("Harry").unwrap().len(), 20);
    }

    #[test]
    fn test_format_attributes() {
        let b = parse(&[
            "begin data;",
            "format datatype=dna gap=- missing=? interleave;",
            "matrix",
            "Harry ACGT",
            ";",
            "end;",
        ]);
        let fmt = b.format().unwrap();
        assert_eq!(fmt["datatype"], FormatValue::Text("dna".into()));
        assert_eq!(fmt["gap"], FormatValue::Text("-".into()));
        assert_eq!(fmt["interleave"], FormatValue::Flag);
        assert!(!fmt.contains_key("matrix"));
    }

    #[test]
    fn test_no_format_statement() {
        let b = parse(&["begin data;", "matrix", "Harry 01", ";", "end;"]);
        assert!(b.format().is_none());
    }

    #[test]
    fn test_multiline_format() {
        let b = parse(&[
            "begin data;",
            "format datatype=standard",
            "gap=-",
            "missing=?;",
            "matrix",
            "Harry 01",
            ";",
            "end;",
        ]);
        let fmt = b.format().unwrap();
        assert_eq!(fmt["gap"], FormatValue::Text("-".into()));
        // format continuation lines must not leak into the matrix
        assert_eq!(b.taxa(), ["Harry"]);
    }

    #[test]
    fn test_charstatelabels() {
        let b = parse(&[
            "begin characters;",
            "dimensions nchar=2;",
            "charstatelabels",
            "1 head,",
            "2 'long tail'",
            ";",
            "matrix",
            "Harry 01",
            ";",
            "end;",
        ]);
        assert_eq!(b.charlabels()[&0], "head");
        assert_eq!(b.charlabels()[&1], "long tail");
    }

    #[test]
    fn test_multistate_groups() {
        let b = parse(&[
            "begin data;",
            "matrix",
            "Harry 1(4,5)0",
            ";",
            "end;",
        ]);
        let sites = b.sites("Harry").unwrap();
        assert_eq!(sites.len(), 3);
        assert!(sites[1].is_ambiguous());
        assert_eq!(sites[1].value(), "4,5");
        assert_eq!(sites[1].states(), ["4", "5"]);
    }

    #[test]
    fn test_wrapped_matrix_fallback() {
        let b = parse(&[
            "begin data;",
            "dimensions ntax=2 nchar=6;",
            "matrix",
            "Harry",
            "001",
            "110",
            "Simon",
            "010",
            "101",
            ";",
            "end;",
        ]);
        assert_eq!(b.ntaxa(), 2);
        assert_eq!(b.nchar(), 6);
        assert_eq!(
            site_strings(&b, "Simon"),
            ["0", "1", "0", "1", "0", "1"]
        );
    }

    #[test]
    fn test_taxon_names_with_keyword_prefixes() {
        // Endler/Beginner are rows, not BEGIN/END statement lines
        let b = parse(&[
            "begin data;",
            "dimensions ntax=3 nchar=4;",
            "matrix",
            "Harry    0011",
            "Endler   0101",
            "Beginner 1100",
            ";",
            "end;",
        ]);
        assert_eq!(b.taxa(), ["Harry", "Endler", "Beginner"]);
        assert_eq!(site_strings(&b, "Endler"), ["0", "1", "0", "1"]);
    }

    #[test]
    fn test_wrapped_fallback_requires_declared_nchar() {
        // Without nchar a continuation line is indistinguishable from a
        // taxon name, so nothing may be guessed into the matrix
        let b = parse(&[
            "begin data;",
            "matrix",
            "Harry",
            "001",
            "110",
            ";",
            "end;",
        ]);
        assert_eq!(b.ntaxa(), 0);
    }

    #[test]
    fn test_dimension_mismatch_warns_not_fails() {
        // ntax=5 declared, one taxon present: parse must still succeed
        let b = parse(&[
            "begin data;",
            "dimensions ntax=5 nchar=2;",
            "matrix",
            "Harry 01",
            ";",
            "end;",
        ]);
        assert_eq!(b.ntaxa(), 1);
    }

    #[test]
    fn test_symbols_derived_fresh() {
        let mut b = parse(&["begin data;", "matrix", "Harry 01", ";", "end;"]);
        assert_eq!(b.symbols().len(), 2);
        b.matrix_mut().get_mut("Harry").unwrap()[0] = SiteValue::Single('2');
        assert!(b.symbols().contains("2"));
        assert!(!b.symbols().contains("0"));
    }

    #[test]
    fn test_characters_transposed_view() {
        let b = parse(&[
            "begin data;",
            "charstatelabels 1 head, 2 tail;",
            "matrix",
            "Harry 01",
            "Simon 11",
            ";",
            "end;",
        ]);
        let chars = b.characters();
        assert_eq!(chars["head"]["Harry"], "0");
        assert_eq!(chars["tail"]["Simon"], "1");
    }

    #[test]
    fn test_write_symbols_exclude_gap_missing() {
        let b = parse(&[
            "begin data;",
            "format datatype=standard gap=- missing=?;",
            "matrix",
            "Harry 01-?",
            ";",
            "end;",
        ]);
        let text = b.write();
        assert!(text.contains("symbols=\"01\""), "{text}");
    }

    #[test]
    fn test_write_datatype_first_interleave_dropped() {
        let b = parse(&[
            "begin data;",
            "format gap=- interleave datatype=dna;",
            "matrix",
            "Harry ACGT",
            ";",
            "end;",
        ]);
        let text = b.write();
        assert!(text.contains("\tformat datatype=dna "), "{text}");
        assert!(!text.contains("interleave"));
    }

    #[test]
    fn test_write_rows_sorted_and_padded() {
        let b = parse(&[
            "begin data;",
            "matrix",
            "Zebedee 01",
            "Al 10",
            ";",
            "end;",
        ]);
        let text = b.write();
        let al = text.lines().position(|l| l.starts_with("Al")).unwrap();
        let zeb = text.lines().position(|l| l.starts_with("Zebedee")).unwrap();
        assert!(al < zeb);
        assert!(text.contains("Al      10"));
    }
}
