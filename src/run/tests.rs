use crate::run::{analyze, RunArgs};
use crate::{toy1, AnnotationSchema, Error, Selection};
use color_eyre::eyre::{Report, Result};
use isomut_table::Table;
use std::str::FromStr;

#[test]
fn selection_precedence() {
    let args = RunArgs {
        isolates: Some(vec!["I1".into()]),
        groups: Some(vec!["L1".into()]),
        ..Default::default()
    };
    assert_eq!(args.selection(), Selection::Isolates(vec!["I1".into()]));
}

#[test]
fn analyze_invalid_threshold() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let args = RunArgs { threshold: 1.5, ..Default::default() };
    let error = analyze(&matrix, &args).unwrap_err();
    assert_eq!(error.downcast_ref::<Error>(), Some(&Error::InvalidThreshold(1.5)));
    Ok(())
}

#[test]
fn analyze_unknown_group() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let args = RunArgs { groups: Some(vec!["L9".into()]), ..Default::default() };
    let error = analyze(&matrix, &args).unwrap_err();
    assert_eq!(error.downcast_ref::<Error>(), Some(&Error::UnknownGroup("L9".into())));
    Ok(())
}

#[test]
fn analyze_marker_pattern() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let args = RunArgs { markers: Some("M5".into()), ..Default::default() };
    let reports = analyze(&matrix, &args)?;

    let markers = reports.mismatch.rows.iter().map(|row| row.marker.as_str()).collect::<Vec<_>>();
    assert_eq!(markers, ["M5"]);
    assert_eq!(reports.mutation_summary.len(), 1);
    let ratios = reports.ratios.rows.iter().map(|r| (r.nonsynonymous, r.synonymous)).collect::<Vec<_>>();
    assert_eq!(ratios, [(1, 0), (1, 0)]);

    let args = RunArgs { markers: Some("X".into()), ..Default::default() };
    assert!(analyze(&matrix, &args).is_err());
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn run_toy1() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("toy1.tsv");
    std::fs::write(&input, toy1::MATRIX)?;

    let args = RunArgs {
        input,
        output_dir: dir.path().join("output"),
        annotation_schema: AnnotationSchema::from_str("mutation,gene,locus,substitution")?,
        ..Default::default()
    };
    let reports = crate::run::run(&args)?;
    assert_eq!(reports.mutation_summary.len(), 2);

    for file_name in ["mismatch.tsv", "base_frequency.tsv", "mutation_summary.tsv", "snp_types.tsv", "dnds.tsv"] {
        assert!(args.output_dir.join(file_name).exists(), "{file_name}");
    }

    let dnds = Table::read(&args.output_dir.join("dnds.tsv"), None)?;
    assert_eq!(dnds.rows, [["L1", "1", "1", "1.00"], ["L2", "2", "0", "inf"]]);

    let summary = Table::read(&args.output_dir.join("mutation_summary.tsv"), None)?;
    assert_eq!(summary.get(&"Substitution".to_string(), 0)?, "synonymous");

    assert_eq!(RunArgs::read(&args.output_dir.join("run_args.json"))?, args);
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn run_missing_input() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = RunArgs {
        input: dir.path().join("missing.tsv"),
        output_dir: dir.path().join("output"),
        ..Default::default()
    };
    assert!(crate::run::run(&args).is_err());
    Ok(())
}
