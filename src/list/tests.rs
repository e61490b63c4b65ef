use crate::list::{groups, list, ListArgs, UNGROUPED};
use crate::{toy1, AnnotationSchema, SequenceMatrix};
use color_eyre::eyre::{Report, Result};
use isomut_table::Table;

#[test]
fn list_toy1() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("toy1.tsv");
    std::fs::write(&input, toy1::MATRIX)?;

    let table = list(&ListArgs { input })?;
    // header, L1, L2, All
    assert_eq!(table.count_rows(), 4);
    assert_eq!(table.count_columns(), 3);
    assert!(!table.to_string().contains(UNGROUPED));
    Ok(())
}

#[test]
fn list_ungrouped() -> Result<(), Report> {
    let text = "Isolate,Group,M1\nroot,nan,A\nI1,L1,A\nI2,,C\nI3,nan,C\n";
    let table = Table::from_reader(text.as_bytes(), ',')?;
    let matrix = SequenceMatrix::from_table(&table, &AnnotationSchema::default(), false)?;

    let table = groups(&matrix);
    assert_eq!(table.count_rows(), 4);
    assert!(table.to_string().contains(UNGROUPED));
    Ok(())
}
