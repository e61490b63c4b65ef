//! Threshold-driven summary of the mutant bases of an isolate subset.
//!
//! For every marker, the canonical bases of a subset are tallied and split in two buckets:
//!
//! - **mutant**: frequency at or above the threshold, and different from the root base.
//! - **other**: everything else, including the root base at any frequency.
//!
//! Only markers with at least one mutant base are reported. Each reported marker is joined
//! with its [`AnnotationEntry`].


use crate::annotation::{AnnotationEntry, AnnotationIndex};
use crate::matrix::{check_lengths, Base, Call, Isolate, Selection, SequenceMatrix};
use crate::Error;

use color_eyre::eyre::Report;
use isomut_table::Table;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Column headers of [`MutationSummary::to_table`].
pub const HEADERS: [&str; 10] = [
    "Location",
    "Root Base",
    "Mutant Base",
    "Frequency",
    "Count",
    "Other Bases Below Threshold (Frequency and Count)",
    "Mutation",
    "Gene",
    "Locus",
    "Substitution",
];

// ----------------------------------------------------------------------------
// Base Tally
// ----------------------------------------------------------------------------

/// Number of occurrences of a base at one marker.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaseTally {
    pub base: Base,
    /// `count / isolate_count`, full precision.
    pub frequency: f64,
    pub count: usize,
}

impl Display for BaseTally {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.2} (Count: {})", self.base, self.frequency, self.count)
    }
}

// ----------------------------------------------------------------------------
// Mutation Summary
// ----------------------------------------------------------------------------

/// One marker with at least one mutant base.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MutationSummaryRow {
    /// Marker name.
    pub location: String,
    pub root_base: Call,
    /// Bases at or above the threshold that differ from the root, in frequency-scan order.
    pub mutant: Vec<BaseTally>,
    /// Remaining canonical bases, in frequency-scan order.
    pub other: Vec<BaseTally>,
    pub annotation: AnnotationEntry,
}

impl MutationSummaryRow {
    pub fn mutant_bases(&self) -> Vec<Base> {
        self.mutant.iter().map(|t| t.base).collect()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.mutant.iter().map(|t| t.frequency).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.mutant.iter().map(|t| t.count).collect()
    }

    /// Returns the substitution class of the marker annotation.
    pub fn substitution_class(&self) -> &str {
        &self.annotation.substitution_class
    }

    /// Returns the bases below threshold, formatted as `"{base}: {freq} (Count: {count})"`.
    pub fn other_bases_summary(&self) -> String {
        self.other.iter().join(", ")
    }
}

/// Mutant markers of one isolate subset, in genomic order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MutationSummary {
    pub threshold: f64,
    /// Frequency denominator.
    pub isolate_count: usize,
    pub rows: Vec<MutationSummaryRow>,
}

impl MutationSummary {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert into a [`Table`] with the columns in [`HEADERS`].
    ///
    /// ```rust
    /// use isomut::Selection;
    ///
    /// let matrix = isomut::toy1::matrix()?;
    /// let table = matrix.mutation_summary(&Selection::All, 0.5)?.to_table()?;
    /// assert_eq!(
    ///     table.rows[0],
    ///     ["M2", "C", "G", "0.50", "3", "C: 0.50 (Count: 3)", "p.Gly10Gly", "katG", "Rv1908c", "synonymous"]
    /// );
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn to_table(&self) -> Result<Table<String>, Report> {
        let mut table = Table::new();
        table.headers = HEADERS.map(String::from).to_vec();
        for row in &self.rows {
            table.add_row([
                row.location.clone(),
                row.root_base.to_string(),
                row.mutant_bases().iter().join(", "),
                row.frequencies().iter().map(|f| format!("{f:.2}")).join(", "),
                row.counts().iter().join(", "),
                row.other_bases_summary(),
                row.annotation.mutation_name.clone(),
                row.annotation.gene.clone(),
                row.annotation.locus.clone(),
                row.annotation.substitution_class.clone(),
            ])?;
        }
        Ok(table)
    }
}

/// Returns an error if a threshold is outside of `[0, 1]`, or is NaN.
pub fn validate_threshold(threshold: f64) -> Result<(), Error> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(Error::InvalidThreshold(threshold))
    }
}

/// Summarize the mutant bases of an isolate subset.
///
/// ## Arguments
///
/// - `markers` - Marker names, in genomic order.
/// - `root` - Root call of each marker.
/// - `subset` - Isolates to tally.
/// - `isolate_count` - Frequency denominator, usually the subset size.
/// - `threshold` - Minimum frequency of a mutant base, in `[0, 1]`.
/// - `annotations` - Marker annotations to join.
///
/// Non-base calls (`N`, `-`, ...) are dropped from both buckets, but still count towards
/// `isolate_count`.
///
/// ## Examples
///
/// ```rust
/// use isomut::{compute_mutation_summary, AnnotationIndex, Base, Call, Isolate};
///
/// let markers = ["M1".to_string()];
/// let root = [Call::from("A")];
/// let isolates = [
///     Isolate::new("I1", None, &["A"]),
///     Isolate::new("I2", None, &["G"]),
///     Isolate::new("I3", None, &["G"]),
///     Isolate::new("I4", None, &["G"]),
/// ];
/// let subset = isolates.iter().collect::<Vec<_>>();
/// let annotations = AnnotationIndex::default();
///
/// let summary = compute_mutation_summary(&markers, &root, &subset, 4, 0.5, &annotations)?;
/// assert_eq!(summary.rows[0].mutant_bases(), [Base::G]);
/// assert_eq!(summary.rows[0].frequencies(), [0.75]);
/// assert_eq!(summary.rows[0].counts(), [3]);
///
/// let summary = compute_mutation_summary(&markers, &root, &subset, 4, 0.8, &annotations)?;
/// assert!(summary.is_empty());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn compute_mutation_summary(
    markers: &[String],
    root: &[Call],
    subset: &[&Isolate],
    isolate_count: usize,
    threshold: f64,
    annotations: &AnnotationIndex,
) -> Result<MutationSummary, Error> {
    validate_threshold(threshold)?;
    if isolate_count == 0 || subset.is_empty() {
        return Err(Error::EmptySubset);
    }
    check_lengths(markers, root, subset)?;

    let n = isolate_count as f64;
    let rows = markers
        .par_iter()
        .enumerate()
        .filter_map(|(i, marker)| {
            let root_base = root[i].base();
            let (mutant, other): (Vec<_>, Vec<_>) = tally_bases(subset, i)
                .into_iter()
                .map(|(base, count)| BaseTally { base, frequency: count as f64 / n, count })
                .partition(|t| t.frequency >= threshold && Some(t.base) != root_base);

            (!mutant.is_empty()).then(|| MutationSummaryRow {
                location: marker.clone(),
                root_base: root[i].clone(),
                mutant,
                other,
                annotation: annotations.lookup(marker),
            })
        })
        .collect::<Vec<_>>();

    debug!("{} of {} markers have a mutant base at threshold {threshold}.", rows.len(), markers.len());

    Ok(MutationSummary { threshold, isolate_count, rows })
}

/// Count the canonical bases of one marker, in order of first appearance, then by descending count.
fn tally_bases(subset: &[&Isolate], marker_i: usize) -> Vec<(Base, usize)> {
    let mut tally: Vec<(Base, usize)> = Vec::new();
    subset.iter().filter_map(|isolate| isolate.calls[marker_i].base()).for_each(|base| {
        match tally.iter_mut().find(|(b, _)| *b == base) {
            Some((_, count)) => *count += 1,
            None => tally.push((base, 1)),
        }
    });
    // stable, ties keep first appearance
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
}

impl SequenceMatrix {
    /// Returns the [`MutationSummary`] of the isolates picked by a [`Selection`].
    ///
    /// The frequency denominator is the number of selected isolates.
    pub fn mutation_summary(
        &self,
        selection: &Selection,
        threshold: f64,
    ) -> Result<MutationSummary, Error> {
        validate_threshold(threshold)?;
        let subset = self.select(selection)?;
        compute_mutation_summary(
            &self.markers,
            &self.root,
            &subset,
            subset.len(),
            threshold,
            &self.annotations,
        )
    }
}
