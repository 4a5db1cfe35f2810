use nexfile::{NexusError, read_str};

#[test]
fn test_taxlabels_one_line() {
    let nex = read_str(
        "#NEXUS
begin taxa;
dimensions ntax=3;
taxlabels Harry Simon Peter;
end;
",
    )
    .unwrap();
    let taxa = nex.taxa().unwrap();
    assert_eq!(taxa.taxa(), ["Harry", "Simon", "Peter"]);
    assert_eq!(taxa.ntaxa(), 3);
}

#[test]
fn test_taxlabels_newline_delimited() {
    let nex = read_str(
        "#NEXUS
begin taxa;
dimensions ntax=3;
taxlabels
    [1] Harry
    [2] 'Simon says'
    [3] Peter[&loc=UK]
;
end;
",
    )
    .unwrap();
    let taxa = nex.taxa().unwrap();
    assert_eq!(taxa.taxa(), ["Harry", "Simon says", "Peter"]);
    assert_eq!(taxa.annotation("Peter"), Some("[&loc=UK]"));
    assert_eq!(taxa.annotation("Harry"), None);
}

#[test]
fn test_label_named_endymion() {
    let nex = read_str(
        "#NEXUS
begin taxa;
dimensions ntax=3;
taxlabels
Harry
Endymion
Simon
;
end;
",
    )
    .unwrap();
    assert_eq!(nex.taxa().unwrap().taxa(), ["Harry", "Endymion", "Simon"]);
}

#[test]
fn test_ntax_mismatch_fails_parse() {
    let err = read_str(
        "#NEXUS
begin taxa;
dimensions ntax=5;
taxlabels Harry Simon;
end;
",
    )
    .unwrap_err();
    match err {
        NexusError::Format(msg) => assert!(msg.contains("ntax=5"), "{msg}"),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn test_write_round_trip() {
    let text = "#NEXUS
begin taxa;
dimensions ntax=2;
taxlabels Harry 'Simon says';
end;
";
    let nex = read_str(text).unwrap();
    let written = nex.write();
    assert!(written.contains("\t[1] Harry\n"));
    assert!(written.contains("\t[2] 'Simon says'\n"));

    let again = read_str(&written).unwrap();
    assert_eq!(again.taxa().unwrap().taxa(), ["Harry", "Simon says"]);
}

#[test]
fn test_mutators_keep_count_consistent() {
    let mut nex = read_str(
        "#NEXUS
begin taxa;
dimensions ntax=2;
taxlabels Harry Simon;
end;
",
    )
    .unwrap();
    let taxa = nex.taxa_mut().unwrap();
    taxa.add_taxon("Peter");
    taxa.del_taxon("Harry");
    taxa.del_taxon("nobody"); // absent, must not panic
    assert_eq!(taxa.taxa(), ["Simon", "Peter"]);
    // written dimensions track the current list, not the parsed declaration
    assert!(taxa.write().contains("dimensions ntax=2;"));
}
