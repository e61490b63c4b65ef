//! List the groups of a sequence matrix.

#[cfg(test)]
mod tests;

use crate::annotation::AnnotationSchema;
use crate::matrix::{SequenceMatrix, ALL_GROUPS};

#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{Report, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tabled::Table;

/// Label of isolates without a group.
pub const UNGROUPED: &str = "Ungrouped";

/// Arguments for listing groups.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListArgs {
    /// Input sequence matrix (.tsv, .txt, or .csv).
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,
}

/// Returns a [`Table`] of isolate counts per group, read from the input matrix.
pub fn list(args: &ListArgs) -> Result<Table, Report> {
    let matrix = SequenceMatrix::read(&args.input, &AnnotationSchema::default(), false)?;
    Ok(groups(&matrix))
}

/// Returns a [`Table`] of isolate and marker counts per group.
///
/// Isolates without a group are counted under [`UNGROUPED`]. The last row counts every isolate.
///
/// ```rust
/// let matrix = isomut::toy1::matrix()?;
/// let table = isomut::list::groups(&matrix);
/// assert_eq!(table.count_rows(), 4);
/// assert!(table.to_string().contains("L2"));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn groups(matrix: &SequenceMatrix) -> Table {
    let markers = matrix.markers.len().to_string();
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Group", "Isolates", "Markers"]);

    let count = |group: Option<&str>| {
        matrix.isolates.iter().filter(|isolate| isolate.group.as_deref() == group).count()
    };

    matrix.groups().into_iter().for_each(|group| {
        builder.push_record([group.to_string(), count(Some(group)).to_string(), markers.clone()]);
    });

    let ungrouped = count(None);
    if ungrouped > 0 {
        builder.push_record([UNGROUPED.to_string(), ungrouped.to_string(), markers.clone()]);
    }
    builder.push_record([ALL_GROUPS.to_string(), matrix.isolates.len().to_string(), markers]);

    builder.build()
}
