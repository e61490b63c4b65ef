//! Base composition of the markers that vary within an isolate subset.


use crate::annotation::{AnnotationEntry, AnnotationIndex};
use crate::matrix::{Base, Isolate, Selection, SequenceMatrix};
use crate::Error;

use color_eyre::eyre::Report;
use isomut_table::Table;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bases reported by [`compute_base_frequencies`], in column order.
pub const FREQUENCY_BASES: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

/// Base percentages of one variable marker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaseFrequencyRow {
    pub marker: String,
    /// Percentage of `A`, `T`, `C`, `G` calls, parallel to [`FREQUENCY_BASES`].
    pub percentages: [f64; 4],
    pub annotation: AnnotationEntry,
}

impl BaseFrequencyRow {
    /// Returns the percentage of a single base.
    pub fn percentage(&self, base: Base) -> f64 {
        FREQUENCY_BASES
            .iter()
            .position(|b| *b == base)
            .map(|i| self.percentages[i])
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaseFrequencyTable {
    pub rows: Vec<BaseFrequencyRow>,
}

impl BaseFrequencyTable {
    /// Convert into a [`Table`] with columns `Marker`, `A`, `T`, `C`, `G`, `Mutation`, `Gene`.
    ///
    /// Percentages are formatted with two decimals.
    pub fn to_table(&self) -> Result<Table<String>, Report> {
        let mut table = Table::new();
        table.headers = std::iter::once("Marker".to_string())
            .chain(FREQUENCY_BASES.iter().map(|b| b.to_string()))
            .chain(["Mutation".to_string(), "Gene".to_string()])
            .collect();
        for row in &self.rows {
            let values = row.percentages.iter().map(|p| format!("{p:.2}"));
            let annotation = [row.annotation.mutation_name.clone(), row.annotation.gene.clone()];
            table.add_row(std::iter::once(row.marker.clone()).chain(values).chain(annotation))?;
        }
        Ok(table)
    }
}

/// Returns the base percentages of every marker with more than one distinct call in the subset.
///
/// The denominator is the subset size, so non-base calls (`N`, `-`, ...) lower the percentages of
/// the canonical bases without being reported themselves. Each row carries the marker's annotation.
///
/// ## Examples
///
/// ```rust
/// use isomut::{compute_base_frequencies, AnnotationIndex, Base, Isolate};
///
/// let markers = ["M1".to_string(), "M2".to_string()];
/// let i1 = Isolate::new("I1", None, &["A", "C"]);
/// let i2 = Isolate::new("I2", None, &["G", "C"]);
/// let i3 = Isolate::new("I3", None, &["N", "C"]);
/// let i4 = Isolate::new("I4", None, &["G", "C"]);
///
/// let table = compute_base_frequencies(&markers, &[&i1, &i2, &i3, &i4], &AnnotationIndex::default())?;
/// assert_eq!(table.rows.len(), 1);
/// assert_eq!(table.rows[0].marker, "M1");
/// assert_eq!(table.rows[0].percentage(Base::G), 50.0);
/// assert_eq!(table.rows[0].percentage(Base::T), 0.0);
/// assert_eq!(table.rows[0].annotation.gene, "Not annotated");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn compute_base_frequencies(
    markers: &[String],
    subset: &[&Isolate],
    annotations: &AnnotationIndex,
) -> Result<BaseFrequencyTable, Error> {
    if subset.is_empty() {
        return Err(Error::EmptySubset);
    }
    let expected = markers.len();
    if let Some(isolate) = subset.iter().find(|isolate| isolate.calls.len() != expected) {
        return Err(Error::LengthMismatch {
            id: isolate.id.clone(),
            expected,
            found: isolate.calls.len(),
        });
    }

    let n = subset.len() as f64;
    let rows = markers
        .iter()
        .enumerate()
        .filter(|(i, _)| subset.iter().map(|isolate| &isolate.calls[*i]).unique().count() > 1)
        .map(|(i, marker)| {
            let counts = subset.iter().filter_map(|isolate| isolate.calls[i].base()).counts();
            let percentages = FREQUENCY_BASES
                .map(|base| counts.get(&base).copied().unwrap_or_default() as f64 * 100.0 / n);
            let annotation = annotations.lookup(marker);
            BaseFrequencyRow { marker: marker.clone(), percentages, annotation }
        })
        .collect();

    Ok(BaseFrequencyTable { rows })
}

impl SequenceMatrix {
    /// Returns the [`BaseFrequencyTable`] of the isolates picked by a [`Selection`].
    pub fn base_frequencies(&self, selection: &Selection) -> Result<BaseFrequencyTable, Error> {
        let subset = self.select(selection)?;
        compute_base_frequencies(&self.markers, &subset, &self.annotations)
    }
}
