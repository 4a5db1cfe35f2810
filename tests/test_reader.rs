use nexfile::{Block, NexusError, NexusReader, read_file, read_str};
use std::io::Write;

const SIMPLE: &str = "#NEXUS

begin taxa;
dimensions ntax=3;
taxlabels Harry Simon Peter;
end;

begin trees;
tree a = ((Harry,Simon),Peter);
end;
";

#[test]
fn test_read_str_block_map() {
    let nex = read_str(SIMPLE).unwrap();
    assert!(nex.taxa().is_some());
    assert!(nex.trees().is_some());
    assert!(nex.data().is_none());

    let names: Vec<&str> = nex.blocks().map(|(name, _)| name).collect();
    assert_eq!(names, ["taxa", "trees"]);
}

#[test]
fn test_read_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SIMPLE.as_bytes()).unwrap();
    let nex = read_file(file.path()).unwrap();
    assert_eq!(nex.taxa().unwrap().ntaxa(), 3);
}

#[test]
fn test_read_file_missing_is_io_error() {
    let err = read_file("definitely/not/here.nex").unwrap_err();
    assert!(matches!(err, NexusError::Io(_)));
}

#[test]
fn test_missing_end_tolerated() {
    let nex = read_str("#NEXUS\nbegin trees;\ntree a = (A,B);").unwrap();
    assert_eq!(nex.trees().unwrap().ntrees(), 1);
}

#[test]
fn test_missing_header_tolerated() {
    let nex = read_str("begin trees;\ntree a = (A,B);\nend;").unwrap();
    assert_eq!(nex.trees().unwrap().ntrees(), 1);
}

#[test]
fn test_duplicate_data_block_rejected() {
    let text = "#NEXUS
begin data;
matrix
Harry 01
;
end;
begin data;
matrix
Harry 10
;
end;
";
    let err = read_str(text).unwrap_err();
    assert!(matches!(err, NexusError::Format(_)));
}

#[test]
fn test_characters_alias() {
    let text = "#NEXUS
begin characters;
dimensions nchar=2;
matrix
Harry 01
;
end;
";
    let nex = read_str(text).unwrap();
    // Exposed as data when no separate data block exists
    assert_eq!(nex.data().unwrap().nchar(), 2);
}

#[test]
fn test_unknown_block_kept_verbatim() {
    let text = "#NEXUS

begin sets;
charset one = 1-5;
end;
";
    let nex = read_str(text).unwrap();
    let (_, block) = nex.blocks().next().unwrap();
    match block {
        Block::Generic(generic) => {
            assert_eq!(generic.lines()[1], "charset one = 1-5;");
        }
        other => panic!("expected generic block, got {other:?}"),
    }
    // and it survives a write untouched
    assert!(nex.write().contains("charset one = 1-5;\n"));
}

#[test]
fn test_write_starts_with_header() {
    let nex = read_str(SIMPLE).unwrap();
    let out = nex.write();
    assert!(out.starts_with("#NEXUS\n\n"));
    // written output parses again
    let again = NexusReader::read_str(&out).unwrap();
    assert_eq!(again.taxa().unwrap().ntaxa(), 3);
    assert_eq!(again.trees().unwrap().ntrees(), 1);
}

#[test]
fn test_write_to_file() {
    let nex = read_str(SIMPLE).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.nex");
    nex.write_to_file(&path).unwrap();
    let again = read_file(&path).unwrap();
    assert_eq!(again.taxa().unwrap().ntaxa(), 3);
}
