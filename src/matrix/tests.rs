use crate::matrix::{check_lengths, Base, Call, Isolate, Selection, SequenceMatrix};
use crate::{toy1, AnnotationSchema, Error};
use color_eyre::eyre::{Report, Result};
use isomut_table::Table;
use std::io::Write;

fn from_text(text: &str) -> Result<SequenceMatrix, Report> {
    let table = Table::from_reader(text.as_bytes(), '\t')?;
    SequenceMatrix::from_table(&table, &AnnotationSchema::default(), false)
}

#[test]
fn toy1_layout() -> Result<(), Report> {
    let matrix = toy1::matrix()?;

    assert_eq!(matrix.markers, ["M1", "M2", "M3", "M4", "M5"]);
    assert_eq!(matrix.root, ["A", "C", "G", "T", "A"].map(Call::parse));
    assert_eq!(matrix.isolates.len(), 6);
    assert_eq!(matrix.groups(), ["L1", "L2"]);
    assert_eq!(matrix.quality.as_ref().map(|q| q.len()), Some(5));
    assert_eq!(matrix.annotations.len(), 4);

    let isolate = matrix.get_isolate("I5").expect("I5 is in toy1");
    assert_eq!(isolate.group.as_deref(), Some("L2"));
    assert_eq!(isolate.calls[2], Call::Other("N".to_string()));
    assert!(matrix.get_isolate("root").is_none());

    Ok(())
}

#[test]
fn no_group_column() -> Result<(), Report> {
    let matrix = from_text("Isolate\tM1\tM2\nroot\tA\tC\nI1\tA\tG\n")?;
    assert_eq!(matrix.markers, ["M1", "M2"]);
    assert_eq!(matrix.isolates, [Isolate::new("I1", None, &["A", "G"])]);
    assert!(matrix.groups().is_empty());
    assert_eq!(matrix.quality, None);
    assert!(matrix.annotations.is_empty());
    Ok(())
}

#[test]
fn group_nan_is_ungrouped() -> Result<(), Report> {
    let matrix = from_text("Isolate\tgroup\tM1\nroot\tnan\tA\nI1\tnan\tA\nI2\tL1\tC\nI3\t\tC\n")?;
    let groups = matrix.isolates.iter().map(|i| i.group.as_deref()).collect::<Vec<_>>();
    assert_eq!(groups, [None, Some("L1"), None]);
    Ok(())
}

#[test]
fn missing_root() {
    assert!(from_text("Isolate\tGroup\tM1\nI1\tL1\tA\n").is_err());
}

#[test]
fn no_markers() {
    assert!(from_text("Isolate\tGroup\nroot\tnan\n").is_err());
}

#[test]
fn ragged_row() {
    assert!(from_text("Isolate\tGroup\tM1\tM2\nroot\tnan\tA\tC\nI1\tL1\tA\n").is_err());
}

#[test]
fn duplicate_isolate() {
    assert!(from_text("Isolate\tM1\nroot\tA\nI1\tA\nI1\tC\n").is_err());
}

#[test]
fn duplicate_reserved_row() {
    let text = "Isolate\tM1\tM2\nroot\tA\tC\nroot\tG\tC\nI1\tA\tC\n";
    let err = from_text(text).expect_err("second root row");
    assert!(err.to_string().contains("Duplicate \"root\" row on line 3"));

    let text = "Isolate\tM1\nroot\tA\nMQ\t60\nMQ\t30\nI1\tA\n";
    assert!(from_text(text).is_err());

    let text = "Isolate\tM1\nroot\tA\nannotation\trpoB\nannotation\tkatG\nI1\tA\n";
    assert!(from_text(text).is_err());
}

#[test]
fn duplicate_marker() {
    let err = from_text("Isolate\tGroup\tM1\tM2\tM1\nroot\tnan\tA\tC\tG\nI1\tL1\tA\tC\tG\n")
        .expect_err("M1 twice");
    assert!(err.to_string().contains("Duplicate marker column \"M1\""));
}

#[test]
fn restrict_markers() -> Result<(), Report> {
    let text = "Isolate\tgyrA_1\trpoB_1\trpoB_2\nroot\tA\tC\tG\nMQ\t60\t30\t20\nI1\tT\tC\tA\n";
    let matrix = from_text(text)?;
    assert_eq!(matrix.search_markers("rpoB"), ["rpoB_1", "rpoB_2"]);

    let narrow = matrix.restrict_markers("rpoB")?;
    assert_eq!(narrow.markers, ["rpoB_1", "rpoB_2"]);
    assert_eq!(narrow.root, ["C", "G"].map(Call::parse));
    assert_eq!(narrow.isolates[0].calls, ["C", "A"].map(Call::parse));
    assert_eq!(narrow.quality, Some(vec!["30".to_string(), "20".to_string()]));

    let err = matrix.restrict_markers("katG").expect_err("no katG marker");
    assert!(err.to_string().contains("katG"));
    Ok(())
}

#[test]
fn strict_annotation_is_propagated() -> Result<(), Report> {
    let text = "Isolate\tM1\nroot\tA\nannotation\trpoB,missense\nI1\tA\n";
    let table = Table::from_reader(text.as_bytes(), '\t')?;
    let schema = AnnotationSchema::default();

    let lenient = SequenceMatrix::from_table(&table, &schema, false)?;
    assert_eq!(lenient.annotations.lookup("M1").gene, "missense");

    let strict = SequenceMatrix::from_table(&table, &schema, true);
    assert!(strict.is_err());
    Ok(())
}

#[test]
fn read_tsv() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("matrix.tsv");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(toy1::MATRIX.as_bytes())?;

    let observed = SequenceMatrix::read(&path, &AnnotationSchema::default(), false)?;
    let expected = toy1::matrix()?;
    assert_eq!(observed.markers, expected.markers);
    assert_eq!(observed.isolates, expected.isolates);
    assert_eq!(observed.annotations, expected.annotations);
    Ok(())
}

#[test]
fn select_groups() -> Result<(), Report> {
    let matrix = toy1::matrix()?;

    let subset = matrix.select(&Selection::Groups(vec!["L1".into()]))?;
    let ids = subset.iter().map(|i| i.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["I1", "I2", "I3"]);

    let subset = matrix.select(&Selection::Groups(vec!["L2".into(), "All".into()]))?;
    assert_eq!(subset.len(), 6);

    let result = matrix.select(&Selection::Groups(vec!["L3".into()]));
    assert_eq!(result, Err(Error::UnknownGroup("L3".into())));
    Ok(())
}

#[test]
fn select_isolates_unknown() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    for id in ["MQ", "annotation", "I7"] {
        let result = matrix.select(&Selection::Isolates(vec!["I1".into(), id.into()]));
        assert_eq!(result, Err(Error::UnknownIsolate(id.into())));
    }
    Ok(())
}

#[test]
fn lengths() {
    let markers = vec!["M1".to_string(), "M2".to_string()];
    let root = vec![Call::Base(Base::A), Call::Base(Base::C)];
    let good = Isolate::new("I1", None, &["A", "C"]);
    let bad = Isolate::new("I2", None, &["A"]);

    assert_eq!(check_lengths(&markers, &root, &[&good]), Ok(()));
    assert_eq!(
        check_lengths(&markers, &root, &[&good, &bad]),
        Err(Error::LengthMismatch { id: "I2".into(), expected: 2, found: 1 })
    );
    assert_eq!(
        check_lengths(&markers, &root[..1], &[&good]),
        Err(Error::LengthMismatch { id: "root".into(), expected: 2, found: 1 })
    );
}
