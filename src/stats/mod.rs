//! Substitution class distributions and dN/dS ratios of lineage groups.


use crate::annotation::NOT_ANNOTATED;
use crate::matrix::SequenceMatrix;
use crate::summary::{compute_mutation_summary, validate_threshold, MutationSummary};
use crate::Error;

use color_eyre::eyre::Report;
use isomut_table::Table;
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Synthetic substitution class holding the number of mutant markers.
pub const TOTAL: &str = "Total";

// ----------------------------------------------------------------------------
// Mutation Type
// ----------------------------------------------------------------------------

/// Coarse effect of a substitution class on the encoded protein.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MutationType {
    Nonsynonymous,
    Synonymous,
    Other,
}

impl Display for MutationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MutationType::Nonsynonymous => "nonsynonymous",
            MutationType::Synonymous => "synonymous",
            MutationType::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Classify a substitution class name by keyword.
///
/// Names containing `non` or `missense` are nonsynonymous, otherwise names containing `syn` or
/// `silent` are synonymous. Case is ignored. The `non` inside the word `synonymous` does not count.
///
/// ```rust
/// use isomut::stats::{classify_substitution, MutationType};
///
/// assert_eq!(classify_substitution("nonsynonymous SNV"), MutationType::Nonsynonymous);
/// assert_eq!(classify_substitution("Missense_variant"), MutationType::Nonsynonymous);
/// assert_eq!(classify_substitution("synonymous"), MutationType::Synonymous);
/// assert_eq!(classify_substitution("Synonymous SNV"), MutationType::Synonymous);
/// assert_eq!(classify_substitution("silent"), MutationType::Synonymous);
/// assert_eq!(classify_substitution("intergenic"), MutationType::Other);
/// ```
pub fn classify_substitution(name: &str) -> MutationType {
    let name = name.to_lowercase();
    // "synonymous" itself contains "non"
    let stem = name.replace("synonymous", "syn");
    if stem.contains("non") || stem.contains("missense") {
        MutationType::Nonsynonymous
    } else if name.contains("syn") || name.contains("silent") {
        MutationType::Synonymous
    } else {
        MutationType::Other
    }
}

// ----------------------------------------------------------------------------
// Group Stats
// ----------------------------------------------------------------------------

/// Substitution class distribution of one group's [`MutationSummary`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupStats {
    /// Number of mutant markers per substitution class, plus [`TOTAL`].
    pub substitution_counts: BTreeMap<String, usize>,
    /// Share of each class, formatted with one decimal (`"33.3%"`). [`TOTAL`] is always `"100%"`.
    pub substitution_percentages: BTreeMap<String, String>,
}

impl GroupStats {
    /// Returns the count of a class, zero if absent.
    pub fn count(&self, class: &str) -> usize {
        self.substitution_counts.get(class).copied().unwrap_or_default()
    }

    /// Returns the percentage of a class, `"0.0%"` if absent.
    pub fn percentage(&self, class: &str) -> String {
        self.substitution_percentages.get(class).cloned().unwrap_or_else(|| "0.0%".to_string())
    }

    /// Returns the summed counts of the nonsynonymous and synonymous classes.
    ///
    /// [`NOT_ANNOTATED`] and [`TOTAL`] never take part.
    pub fn mutation_type_counts(&self) -> (usize, usize) {
        self.substitution_counts
            .iter()
            .filter(|(class, _)| *class != NOT_ANNOTATED && *class != TOTAL)
            .fold((0, 0), |(non, syn), (class, count)| match classify_substitution(class) {
                MutationType::Nonsynonymous => (non + count, syn),
                MutationType::Synonymous => (non, syn + count),
                MutationType::Other => (non, syn),
            })
    }
}

/// Count the rows of a [`MutationSummary`] per substitution class.
///
/// ## Examples
///
/// ```rust
/// use isomut::{compute_snp_type_stats, Selection};
///
/// let matrix = isomut::toy1::matrix()?;
/// let summary = matrix.mutation_summary(&Selection::All, 0.5)?;
/// let stats = compute_snp_type_stats(&summary);
///
/// assert_eq!(stats.count("synonymous"), 1);
/// assert_eq!(stats.count("Total"), 2);
/// assert_eq!(stats.percentage("synonymous"), "50.0%");
/// assert_eq!(stats.percentage("Total"), "100%");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn compute_snp_type_stats(summary: &MutationSummary) -> GroupStats {
    let total = summary.len();
    let mut substitution_counts: BTreeMap<String, usize> = summary
        .rows
        .iter()
        .map(|row| match row.substitution_class() {
            "" => NOT_ANNOTATED.to_string(),
            class => class.to_string(),
        })
        .counts()
        .into_iter()
        .collect();

    let mut substitution_percentages: BTreeMap<String, String> = substitution_counts
        .iter()
        .map(|(class, count)| (class.clone(), format_percentage(*count, total)))
        .collect();

    substitution_counts.insert(TOTAL.to_string(), total);
    substitution_percentages.insert(TOTAL.to_string(), "100%".to_string());

    GroupStats { substitution_counts, substitution_percentages }
}

fn format_percentage(count: usize, total: usize) -> String {
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}

// ----------------------------------------------------------------------------
// Substitution Matrix
// ----------------------------------------------------------------------------

/// Substitution class counts and percentages of several groups, over the union of their classes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubstitutionMatrix {
    /// Regular classes alphabetically, then [`NOT_ANNOTATED`], then [`TOTAL`].
    pub classes: Vec<String>,
    pub groups: Vec<String>,
    /// `counts[class][group]`
    pub counts: Vec<Vec<usize>>,
    /// `percentages[class][group]`
    pub percentages: Vec<Vec<String>>,
}

impl SubstitutionMatrix {
    /// Convert into a [`Table`].
    ///
    /// The first column is `Substitution`, followed by one `"<group> Count"` column per group, then
    /// one `"<group> %"` column per group.
    pub fn to_table(&self) -> Result<Table<String>, Report> {
        let mut table = Table::new();
        table.headers = std::iter::once("Substitution".to_string())
            .chain(self.groups.iter().map(|g| format!("{g} Count")))
            .chain(self.groups.iter().map(|g| format!("{g} %")))
            .collect();

        for ((class, counts), percentages) in
            self.classes.iter().zip(&self.counts).zip(&self.percentages)
        {
            let row = std::iter::once(class.clone())
                .chain(counts.iter().map(|c| c.to_string()))
                .chain(percentages.iter().cloned());
            table.add_row(row)?;
        }
        Ok(table)
    }
}

// ----------------------------------------------------------------------------
// Ratio Table
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RatioRow {
    pub lineage: String,
    pub nonsynonymous: usize,
    pub synonymous: usize,
    /// `nonsynonymous / synonymous`, [`f64::INFINITY`] when there are no synonymous mutations.
    pub ratio: f64,
}

/// dN/dS ratios per group.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RatioTable {
    pub rows: Vec<RatioRow>,
}

impl RatioTable {
    /// Convert into a [`Table`] with columns `Lineage`, `Non-synonymous`, `Synonymous`, `Ratio (dN/dS)`.
    pub fn to_table(&self) -> Result<Table<String>, Report> {
        let mut table = Table::new();
        table.headers = ["Lineage", "Non-synonymous", "Synonymous", "Ratio (dN/dS)"]
            .map(String::from)
            .to_vec();
        for row in &self.rows {
            table.add_row([
                row.lineage.clone(),
                row.nonsynonymous.to_string(),
                row.synonymous.to_string(),
                format!("{:.2}", row.ratio),
            ])?;
        }
        Ok(table)
    }
}

/// Returns the ratio of nonsynonymous to synonymous counts, rounded to two decimals.
///
/// Ties round half to even on the binary value, so `1/8` is `0.12`.
///
/// ```rust
/// use isomut::stats::dnds_ratio;
///
/// assert_eq!(dnds_ratio(6, 3), 2.0);
/// assert_eq!(dnds_ratio(1, 3), 0.33);
/// assert_eq!(dnds_ratio(1, 8), 0.12);
/// assert_eq!(dnds_ratio(4, 0), f64::INFINITY);
/// assert_eq!(dnds_ratio(0, 0), f64::INFINITY);
/// ```
pub fn dnds_ratio(nonsynonymous: usize, synonymous: usize) -> f64 {
    if synonymous == 0 {
        return f64::INFINITY;
    }
    let ratio = nonsynonymous as f64 / synonymous as f64;
    format!("{ratio:.2}").parse().unwrap_or(ratio)
}

// ----------------------------------------------------------------------------
// Aggregation
// ----------------------------------------------------------------------------

/// Combine the [`GroupStats`] of several groups into a [`SubstitutionMatrix`] and a [`RatioTable`].
///
/// Group order is preserved. A class missing from a group counts as `0` (`"0.0%"`).
///
/// ## Examples
///
/// ```rust
/// use isomut::{aggregate_group_stats, compute_group_stats};
///
/// let matrix = isomut::toy1::matrix()?;
/// let stats = compute_group_stats(&matrix, 0.5)?;
/// let (substitutions, ratios) = aggregate_group_stats(&stats);
///
/// assert_eq!(substitutions.classes, ["missense", "nonsynonymous SNV", "synonymous", "Not annotated", "Total"]);
/// assert_eq!(substitutions.counts[0], [0, 1]);
/// assert_eq!(ratios.rows[0].ratio, 1.0);
/// assert_eq!(ratios.rows[1].ratio, f64::INFINITY);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn aggregate_group_stats(groups: &[(String, GroupStats)]) -> (SubstitutionMatrix, RatioTable) {
    let regular: BTreeSet<&str> = groups
        .iter()
        .flat_map(|(_, stats)| stats.substitution_counts.keys())
        .map(String::as_str)
        .filter(|class| *class != NOT_ANNOTATED && *class != TOTAL)
        .collect();
    let classes = regular
        .into_iter()
        .chain([NOT_ANNOTATED, TOTAL])
        .map(String::from)
        .collect_vec();

    let counts = classes
        .iter()
        .map(|class| groups.iter().map(|(_, stats)| stats.count(class)).collect())
        .collect();
    let percentages = classes
        .iter()
        .map(|class| groups.iter().map(|(_, stats)| stats.percentage(class)).collect())
        .collect();

    let matrix = SubstitutionMatrix {
        classes,
        groups: groups.iter().map(|(group, _)| group.clone()).collect(),
        counts,
        percentages,
    };

    let rows = groups
        .iter()
        .map(|(group, stats)| {
            let (nonsynonymous, synonymous) = stats.mutation_type_counts();
            RatioRow {
                lineage: group.clone(),
                nonsynonymous,
                synonymous,
                ratio: dnds_ratio(nonsynonymous, synonymous),
            }
        })
        .collect();

    (matrix, RatioTable { rows })
}

/// Returns the [`GroupStats`] of every group in the matrix, in order of first appearance.
///
/// Each group is summarized on its own, with the group size as the frequency denominator.
/// Ungrouped isolates take no part.
pub fn compute_group_stats(
    matrix: &SequenceMatrix,
    threshold: f64,
) -> Result<Vec<(String, GroupStats)>, Error> {
    validate_threshold(threshold)?;
    let groups = matrix.groups();
    info!("Summarizing {} groups at threshold {threshold}.", groups.len());

    groups
        .par_iter()
        .filter_map(|group| {
            let subset = matrix
                .isolates
                .iter()
                .filter(|isolate| isolate.group.as_deref() == Some(*group))
                .collect_vec();
            if subset.is_empty() {
                debug!("Skipping group {group}, it has no isolates.");
                return None;
            }
            let summary = compute_mutation_summary(
                &matrix.markers,
                &matrix.root,
                &subset,
                subset.len(),
                threshold,
                &matrix.annotations,
            );
            Some(summary.map(|summary| (group.to_string(), compute_snp_type_stats(&summary))))
        })
        .collect()
}
