use nexfile::{NexusWriter, read_file, read_str};

fn beetles() -> NexusWriter {
    let mut writer = NexusWriter::new();
    writer.add("Harry", "leg_count", "6");
    writer.add("Simon", "leg_count", "6");
    writer.add("Harry", "wing_count", "4");
    writer.add("Simon", "wing_count", "2");
    writer
}

#[test]
fn test_basic_output_shape() {
    let text = beetles().write();
    assert!(text.starts_with("#NEXUS\n\nbegin data;\n"));
    assert!(text.contains("\tdimensions ntax=2 nchar=2;\n"));
    assert!(text.contains("Harry 64\n"));
    assert!(text.contains("Simon 62\n"));
    assert!(text.ends_with(";\nend;\n"));
}

#[test]
fn test_format_line_datatype_first() {
    let text = beetles().with_datatype("dna").write();
    let format_line = text.lines().find(|l| l.contains("format")).unwrap();
    assert!(format_line.trim_start().starts_with("format datatype=dna "));
    assert!(format_line.contains("gap=-"));
    assert!(format_line.contains("missing=?"));
}

#[test]
fn test_symbols_computed_from_values() {
    let mut writer = beetles();
    writer.add("Peter", "leg_count", "-");
    writer.add("Peter", "wing_count", "?");
    assert_eq!(writer.symbols().into_iter().collect::<String>(), "246");
    assert!(writer.write().contains("symbols=\"246\""));
}

#[test]
fn test_unset_cells_get_missing_symbol() {
    let mut writer = NexusWriter::new().with_missing('x');
    writer.add("Harry", "c1", "0");
    writer.add("Simon", "c2", "1");
    let text = writer.write();
    assert!(text.contains("Harry 0x\n"));
    assert!(text.contains("Simon x1\n"));
}

#[test]
fn test_remove_cell() {
    let mut writer = beetles();
    writer.remove("Simon", "wing_count");
    assert!(writer.write().contains("Simon 6?\n"));
    // removing the last cell of a taxon drops the row entirely
    writer.remove("Simon", "leg_count");
    assert_eq!(writer.taxa(), ["Harry"]);
}

#[test]
fn test_interleaved_blocks() {
    let text = beetles().with_interleave().write();
    assert!(text.contains(" interleave;"));
    let matrix: Vec<&str> = text
        .lines()
        .skip_while(|l| !l.contains("matrix"))
        .skip(1)
        .take_while(|l| *l != ";")
        .collect();
    // two characters, two taxa each, one blank separator line
    assert_eq!(matrix, ["Harry 6", "Simon 6", "", "Harry 4", "Simon 2"]);
}

#[test]
fn test_charblock_labels() {
    let text = beetles().with_charblock().write();
    assert!(text.contains("\tcharstatelabels\n"));
    assert!(text.contains("\t\t1 leg_count,\n"));
    assert!(text.contains("\t\t2 wing_count\n"));
}

#[test]
fn test_round_trip_through_reader() {
    let text = beetles().with_charblock().write();
    let nex = read_str(&text).unwrap();
    let data = nex.data().unwrap();
    assert_eq!(data.ntaxa(), 2);
    assert_eq!(data.nchar(), 2);
    let chars = data.characters();
    assert_eq!(chars["leg_count"]["Harry"], "6");
    assert_eq!(chars["wing_count"]["Simon"], "2");
}

#[test]
fn test_polymorphic_value_round_trip() {
    let mut writer = NexusWriter::new();
    writer.add("Harry", "c1", "4,5");
    writer.add("Simon", "c1", "1");
    let text = writer.write();
    assert!(text.contains("Harry (4,5)\n"));

    let nex = read_str(&text).unwrap();
    let site = &nex.data().unwrap().sites("Harry").unwrap()[0];
    assert!(site.is_ambiguous());
    assert_eq!(site.states(), ["4", "5"]);
}

#[test]
fn test_write_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beetles.nex");
    beetles().write_to_file(&path).unwrap();
    let nex = read_file(&path).unwrap();
    assert_eq!(nex.data().unwrap().taxa(), ["Harry", "Simon"]);
}
