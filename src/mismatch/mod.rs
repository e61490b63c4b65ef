//! Per-marker mismatches between an isolate subset and the root sequence.

#[cfg(test)]
mod tests;

use crate::matrix::{check_lengths, Call, Isolate, Selection, SequenceMatrix};
use crate::Error;

use color_eyre::eyre::Report;
use isomut_table::Table;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mismatch counts of a single marker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerMismatch {
    pub marker: String,
    /// Number of isolates whose call differs from the root call.
    pub mismatches: usize,
    /// Number of isolates in the subset.
    pub total: usize,
    /// `mismatches / total`
    pub fraction: f64,
}

/// Mismatch counts of every marker, in genomic order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MismatchReport {
    pub rows: Vec<MarkerMismatch>,
}

impl MismatchReport {
    /// Convert the report into a [`Table`] with columns `Marker`, `Mismatches`, `Total Isolates`, `Mismatch Fraction`.
    pub fn to_table(&self) -> Result<Table<String>, Report> {
        let mut table = Table::new();
        table.headers = ["Marker", "Mismatches", "Total Isolates", "Mismatch Fraction"]
            .map(String::from)
            .to_vec();
        for row in &self.rows {
            table.add_row([
                row.marker.clone(),
                row.mismatches.to_string(),
                row.total.to_string(),
                row.fraction.to_string(),
            ])?;
        }
        Ok(table)
    }
}

/// Count, for every marker, the isolates of a subset whose call differs from the root.
///
/// Comparison is exact: a missing call (`N`) or a lower-case base is a mismatch.
///
/// ## Examples
///
/// ```rust
/// use isomut::{compute_mismatch_report, Call, Error, Isolate};
///
/// let markers = ["M1".to_string(), "M2".to_string()];
/// let root = [Call::from("A"), Call::from("C")];
/// let i1 = Isolate::new("I1", None, &["A", "T"]);
/// let i2 = Isolate::new("I2", None, &["N", "T"]);
///
/// let report = compute_mismatch_report(&markers, &root, &[&i1, &i2])?;
/// assert_eq!(report.rows[0].mismatches, 1);
/// assert_eq!(report.rows[0].fraction, 0.5);
/// assert_eq!(report.rows[1].mismatches, 2);
///
/// assert_eq!(compute_mismatch_report(&markers, &root, &[]), Err(Error::EmptySubset));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn compute_mismatch_report(
    markers: &[String],
    root: &[Call],
    subset: &[&Isolate],
) -> Result<MismatchReport, Error> {
    if subset.is_empty() {
        return Err(Error::EmptySubset);
    }
    check_lengths(markers, root, subset)?;

    let total = subset.len();
    let rows = markers
        .iter()
        .zip(root)
        .enumerate()
        .map(|(i, (marker, root_call))| {
            let mismatches = subset.iter().filter(|isolate| &isolate.calls[i] != root_call).count();
            MarkerMismatch {
                marker: marker.clone(),
                mismatches,
                total,
                fraction: mismatches as f64 / total as f64,
            }
        })
        .collect();

    Ok(MismatchReport { rows })
}

impl SequenceMatrix {
    /// Returns the [`MismatchReport`] of the isolates picked by a [`Selection`].
    ///
    /// ```rust
    /// use isomut::Selection;
    ///
    /// let matrix = isomut::toy1::matrix()?;
    /// let report = matrix.mismatch_report(&Selection::All)?;
    /// let mismatches = report.rows.iter().map(|r| r.mismatches).collect::<Vec<_>>();
    /// assert_eq!(mismatches, [2, 3, 2, 1, 4]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn mismatch_report(&self, selection: &Selection) -> Result<MismatchReport, Error> {
        let subset = self.select(selection)?;
        compute_mismatch_report(&self.markers, &self.root, &subset)
    }
}
