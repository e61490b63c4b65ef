use crate::matrix::{Isolate, Selection};
use crate::mismatch::compute_mismatch_report;
use crate::{toy1, Call, Error};
use color_eyre::eyre::{Report, Result};

#[test]
fn mismatch_group() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let report = matrix.mismatch_report(&Selection::Groups(vec!["L2".into()]))?;

    let observed = report.rows.iter().map(|r| (r.marker.as_str(), r.mismatches)).collect::<Vec<_>>();
    assert_eq!(observed, [("M1", 2), ("M2", 0), ("M3", 1), ("M4", 1), ("M5", 2)]);
    assert!(report.rows.iter().all(|r| r.total == 3));
    Ok(())
}

#[test]
fn mismatch_bounds() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let report = matrix.mismatch_report(&Selection::All)?;

    let sum: usize = report.rows.iter().map(|r| r.mismatches).sum();
    assert!(sum <= matrix.isolates.len() * matrix.markers.len());
    assert!(report.rows.iter().all(|r| (0.0..=1.0).contains(&r.fraction)));
    Ok(())
}

#[test]
fn mismatch_is_case_sensitive() -> Result<(), Report> {
    let markers = vec!["M1".to_string()];
    let root = vec![Call::from("A")];
    let isolates = [Isolate::new("I1", None, &["a"]), Isolate::new("I2", None, &["A"])];
    let subset = isolates.iter().collect::<Vec<_>>();

    let report = compute_mismatch_report(&markers, &root, &subset)?;
    assert_eq!(report.rows[0].mismatches, 1);
    Ok(())
}

#[test]
fn mismatch_empty() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let result = compute_mismatch_report(&matrix.markers, &matrix.root, &[]);
    assert_eq!(result, Err(Error::EmptySubset));
    Ok(())
}

#[test]
fn mismatch_length() {
    let markers = vec!["M1".to_string(), "M2".to_string()];
    let root = vec![Call::from("A"), Call::from("C")];
    let isolate = Isolate::new("I1", None, &["A"]);

    let result = compute_mismatch_report(&markers, &root, &[&isolate]);
    let expected = Error::LengthMismatch { id: "I1".into(), expected: 2, found: 1 };
    assert_eq!(result, Err(expected));
}

#[test]
fn mismatch_table() -> Result<(), Report> {
    let matrix = toy1::matrix()?;
    let table = matrix.mismatch_report(&Selection::Isolates(vec!["I1".into(), "I4".into()]))?.to_table()?;

    assert_eq!(table.headers, ["Marker", "Mismatches", "Total Isolates", "Mismatch Fraction"]);
    assert_eq!(table.rows[0], ["M1", "1", "2", "0.5"]);
    assert_eq!(table.rows[3], ["M4", "0", "2", "0"]);
    Ok(())
}
