//! NEXUS file writer.
//!
//! [NexusWriter] builds a well-formed NEXUS data file from a sparse
//! `character → taxon → value` table, the inverse of what the
//! [DataBlock](crate::blocks::DataBlock) handler parses. Cells never set
//! default to the configured missing symbol.

use crate::error::NexusError;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Default missing-cell symbol.
const DEFAULT_MISSING: char = '?';
/// Default `datatype` token on the format line.
const DEFAULT_DATATYPE: &str = "standard";

// =#========================================================================#=
// NEXUS WRITER
// =#========================================================================$=
/// Builder-style writer producing a NEXUS data file.
///
/// Characters and taxa appear in the output in first-[`add`](Self::add)
/// order for characters and sorted order for taxon rows. The `FORMAT`
/// line always carries `datatype` as its first attribute (SplitsTree
/// rejects files otherwise) and a symbol alphabet computed from the values
/// actually present, gap (`-`) and missing excluded.
///
/// # Example
/// ```
/// use nexfile::NexusWriter;
///
/// let mut writer = NexusWriter::new();
/// writer.add("Harry", "leg_count", "4");
/// writer.add("Simon", "leg_count", "2");
/// let text = writer.write();
/// assert!(text.contains("format datatype=standard"));
/// ```
#[derive(Debug, Clone)]
pub struct NexusWriter {
    /// Character → taxon → value.
    data: IndexMap<String, IndexMap<String, String>>,
    missing: char,
    datatype: String,
    /// Emit one block of rows per character instead of concatenated rows.
    interleave: bool,
    /// Emit a `charstatelabels` sub-block naming each character.
    charblock: bool,
}

impl Default for NexusWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NexusWriter {
    /// Creates an empty writer with default settings: missing symbol `?`,
    /// datatype `standard`, concatenated matrix, no character labels.
    pub fn new() -> Self {
        NexusWriter {
            data: IndexMap::new(),
            missing: DEFAULT_MISSING,
            datatype: DEFAULT_DATATYPE.to_string(),
            interleave: false,
            charblock: false,
        }
    }

    /// Configures the missing-cell symbol.
    pub fn with_missing(mut self, missing: char) -> Self {
        self.missing = missing;
        self
    }

    /// Configures the `datatype` token on the format line.
    pub fn with_datatype(mut self, datatype: &str) -> Self {
        self.datatype = datatype.to_string();
        self
    }

    /// Configures interleaved-by-character matrix layout.
    pub fn with_interleave(mut self) -> Self {
        self.interleave = true;
        self
    }

    /// Configures emission of a `charstatelabels` sub-block.
    pub fn with_charblock(mut self) -> Self {
        self.charblock = true;
        self
    }
}

// ============================================================================
// Data Entry & Accessors (pub)
// ============================================================================
impl NexusWriter {
    /// Sets the value of one cell.
    ///
    /// # Arguments
    /// * `taxon` - Row key
    /// * `character` - Column key (label or index)
    /// * `value` - State value; multi-symbol values are parenthesized on
    ///   output
    pub fn add(&mut self, taxon: &str, character: &str, value: &str) {
        self.data
            .entry(character.to_string())
            .or_default()
            .insert(taxon.to_string(), value.to_string());
    }

    /// Removes one cell, if set.
    pub fn remove(&mut self, taxon: &str, character: &str) {
        if let Some(col) = self.data.get_mut(character) {
            col.shift_remove(taxon);
        }
    }

    /// All taxa seen so far, sorted.
    pub fn taxa(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .data
            .values()
            .flat_map(|col| col.keys().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    /// All characters seen so far, in first-`add` order.
    pub fn characters(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    /// The symbol alphabet: distinct value symbols present, gap and
    /// missing excluded, sorted.
    pub fn symbols(&self) -> BTreeSet<char> {
        // ',' separates states inside a polymorphic cell, not a symbol
        self.data
            .values()
            .flat_map(|col| col.values())
            .flat_map(|v| v.chars())
            .filter(|c| !matches!(c, '-' | ',') && *c != self.missing)
            .collect()
    }
}

// ============================================================================
// Serialization (pub)
// ============================================================================
impl NexusWriter {
    /// Builds the NEXUS file text.
    pub fn write(&self) -> String {
        let taxa = self.taxa();
        let characters = self.characters();
        let symbols: String = self.symbols().into_iter().collect();

        let mut out = String::from("#NEXUS\n\nbegin data;\n");
        out.push_str(&format!(
            "\tdimensions ntax={} nchar={};\n",
            taxa.len(),
            characters.len()
        ));
        out.push_str(&format!(
            "\tformat datatype={} symbols=\"{}\" gap=- missing={}{};\n",
            self.datatype,
            symbols,
            self.missing,
            if self.interleave { " interleave" } else { "" }
        ));
        if self.charblock {
            out.push_str("\tcharstatelabels\n");
            for (i, character) in characters.iter().enumerate() {
                let sep = if i + 1 == characters.len() { "" } else { "," };
                out.push_str(&format!("\t\t{} {}{}\n", i + 1, character, sep));
            }
            out.push_str("\t;\n");
        }
        out.push_str("\tmatrix\n");
        if self.interleave {
            self.write_interleaved(&mut out, &taxa, &characters);
        } else {
            self.write_concatenated(&mut out, &taxa, &characters);
        }
        out.push_str(";\nend;\n");
        out
    }

    /// Writes the matrix to `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NexusError> {
        fs::write(path, self.write())?;
        Ok(())
    }

    /// One row per taxon, all characters concatenated.
    fn write_concatenated(&self, out: &mut String, taxa: &[&str], characters: &[&str]) {
        let width = taxa.iter().map(|t| t.len()).max().unwrap_or(0);
        for taxon in taxa {
            let row: String = characters
                .iter()
                .map(|character| self.cell(taxon, character))
                .collect();
            out.push_str(&format!("{taxon:<width$} {row}\n"));
        }
    }

    /// One block of rows per character, blocks separated by a blank line.
    fn write_interleaved(&self, out: &mut String, taxa: &[&str], characters: &[&str]) {
        let width = taxa.iter().map(|t| t.len()).max().unwrap_or(0);
        for (i, character) in characters.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for taxon in taxa {
                let value = self.cell(taxon, character);
                out.push_str(&format!("{taxon:<width$} {value}\n"));
            }
        }
    }

    /// One cell in output notation: missing symbol when unset, parentheses
    /// around multi-symbol values.
    fn cell(&self, taxon: &str, character: &str) -> String {
        match self.data.get(character).and_then(|col| col.get(taxon)) {
            None => self.missing.to_string(),
            Some(value) if value.chars().count() > 1 => format!("({value})"),
            Some(value) => value.clone(),
        }
    }
}

// =#========================================================================#=
// TESTS
// =#========================================================================$=
#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> NexusWriter {
        let mut w = NexusWriter::new();
        w.add("Harry", "c1", "0");
        w.add("Harry", "c2", "1");
        w.add("Simon", "c1", "1");
        w.add("Simon", "c2", "1");
        w
    }

    #[test]
    fn test_datatype_first_on_format_line() {
        let text = two_by_two().write();
        let format_line = text.lines().find(|l| l.contains("format")).unwrap();
        assert!(format_line.trim_start().starts_with("format datatype="));
    }

    #[test]
    fn test_dimensions_and_rows() {
        let text = two_by_two().write();
        assert!(text.contains("dimensions ntax=2 nchar=2;"));
        assert!(text.contains("Harry 01\n"));
        assert!(text.contains("Simon 11\n"));
    }

    #[test]
    fn test_missing_cells_filled() {
        let mut w = NexusWriter::new();
        w.add("Harry", "c1", "0");
        w.add("Simon", "c2", "1");
        let text = w.write();
        assert!(text.contains("Harry 0?\n"));
        assert!(text.contains("Simon ?1\n"));
    }

    #[test]
    fn test_polymorphic_cell_parenthesized() {
        let mut w = NexusWriter::new();
        w.add("Harry", "c1", "4,5");
        w.add("Simon", "c1", "1");
        let text = w.write();
        assert!(text.contains("Harry (4,5)\n"));
    }

    #[test]
    fn test_symbols_exclude_gap_and_missing() {
        let mut w = NexusWriter::new();
        w.add("A", "c1", "0");
        w.add("B", "c1", "1");
        w.add("A", "c2", "-");
        w.add("B", "c2", "?");
        assert_eq!(w.symbols().into_iter().collect::<String>(), "01");
        assert!(w.write().contains("symbols=\"01\""));
    }

    #[test]
    fn test_interleaved_layout() {
        let text = two_by_two().with_interleave().write();
        assert!(text.contains(" interleave;"));
        // one block per character, taxon repeated in each
        assert_eq!(text.matches("Harry ").count(), 2);
    }

    #[test]
    fn test_charblock() {
        let text = two_by_two().with_charblock().write();
        assert!(text.contains("\tcharstatelabels\n"));
        assert!(text.contains("\t\t1 c1,\n"));
        assert!(text.contains("\t\t2 c2\n"));
    }

    #[test]
    fn test_round_trips_through_reader() {
        let text = two_by_two().write();
        let nex = crate::NexusReader::read_str(&text).unwrap();
        let data = nex.data().unwrap();
        assert_eq!(data.ntaxa(), 2);
        assert_eq!(data.nchar(), 2);
        assert_eq!(data.symbols().len(), 2);
    }
}
