//! Run every analysis on a sequence matrix and write the reports.

#[cfg(test)]
mod tests;

use crate::annotation::AnnotationSchema;
use crate::frequency::BaseFrequencyTable;
use crate::matrix::{Selection, SequenceMatrix};
use crate::mismatch::MismatchReport;
use crate::stats::{aggregate_group_stats, compute_group_stats, RatioTable, SubstitutionMatrix};
use crate::summary::{validate_threshold, MutationSummary};

#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use log::{info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Debug;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

// ----------------------------------------------------------------------------
// RunArgs
// ----------------------------------------------------------------------------

/// Summarize the mutations of isolates against the root sequence.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunArgs {
    /// Input sequence matrix (.tsv, .txt, or .csv).
    ///
    /// One row per isolate plus the reserved rows 'root', 'MQ', and 'annotation'.
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,

    /// Restrict the analysis to these isolates.
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ',', conflicts_with = "groups"))]
    pub isolates: Option<Vec<String>>,

    /// Restrict the analysis to the isolates of these groups.
    ///
    /// Use 'All' to select every isolate.
    #[cfg_attr(feature = "cli", arg(short = 'g', long, value_delimiter = ','))]
    pub groups: Option<Vec<String>>,

    /// Restrict the analysis to markers whose name contains this pattern.
    #[cfg_attr(feature = "cli", arg(short = 'm', long))]
    pub markers: Option<String>,

    /// Minimum frequency of a mutant base, between 0 and 1.
    #[cfg_attr(feature = "cli", arg(short = 't', long, default_value_t = RunArgs::default().threshold))]
    pub threshold: f64,

    /// Order of the comma-separated fields in the annotation row.
    #[cfg_attr(feature = "cli", arg(short = 'a', long, default_value_t = RunArgs::default().annotation_schema))]
    pub annotation_schema: AnnotationSchema,

    /// Fail on annotations that are not exactly 4 fields, instead of filling in 'Not annotated'.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = RunArgs::default().strict_annotations))]
    pub strict_annotations: bool,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, required = true))]
    pub output_dir: PathBuf,
}

impl Default for RunArgs {
    fn default() -> Self {
        RunArgs {
            input: PathBuf::new(),
            isolates: None,
            groups: None,
            markers: None,
            threshold: 0.5,
            annotation_schema: AnnotationSchema::default(),
            strict_annotations: false,
            output_dir: PathBuf::new(),
        }
    }
}

impl RunArgs {
    /// Returns the [`Selection`] described by the `isolates` and `groups` arguments.
    ///
    /// ```rust
    /// use isomut::{RunArgs, Selection};
    ///
    /// let args = RunArgs { groups: Some(vec!["L1".into()]), ..Default::default() };
    /// assert_eq!(args.selection(), Selection::Groups(vec!["L1".into()]));
    /// assert_eq!(RunArgs::default().selection(), Selection::All);
    /// ```
    pub fn selection(&self) -> Selection {
        match (&self.isolates, &self.groups) {
            (Some(isolates), _) => Selection::Isolates(isolates.clone()),
            (None, Some(groups)) => Selection::Groups(groups.clone()),
            (None, None) => Selection::All,
        }
    }

    /// Reads [`RunArgs`] from a JSON file.
    #[cfg(feature = "serde")]
    pub fn read<P>(path: &P) -> Result<RunArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read run arguments: {path:?}."))?;
        let run_args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize run arguments: {input}"))?;
        Ok(run_args)
    }

    /// Write [`RunArgs`] to a JSON file.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use isomut::RunArgs;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("run_args.json");
    /// let args = RunArgs { threshold: 0.8, ..Default::default() };
    /// args.write(&path)?;
    /// assert_eq!(RunArgs::read(&path)?, args);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    #[cfg(feature = "serde")]
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let output = serde_json::to_string_pretty(self)
            .wrap_err(format!("Failed to serialize run arguments: {self:?}"))?;
        std::fs::write(path, output)
            .wrap_err(format!("Failed to write run arguments: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Reports
// ----------------------------------------------------------------------------

/// Every report of one run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reports {
    /// Mismatches of the selected isolates.
    pub mismatch: MismatchReport,
    /// Base composition of the variable markers of the selected isolates.
    pub base_frequency: BaseFrequencyTable,
    /// Mutant markers of the selected isolates.
    pub mutation_summary: MutationSummary,
    /// Substitution classes of every group.
    pub substitutions: SubstitutionMatrix,
    /// dN/dS ratio of every group.
    pub ratios: RatioTable,
}

impl Reports {
    /// Write every report as a TSV file into a directory.
    pub fn write<P>(&self, dir: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let dir = dir.as_ref();
        let outputs = [
            ("mismatch.tsv", self.mismatch.to_table()?),
            ("base_frequency.tsv", self.base_frequency.to_table()?),
            ("mutation_summary.tsv", self.mutation_summary.to_table()?),
            ("snp_types.tsv", self.substitutions.to_table()?),
            ("dnds.tsv", self.ratios.to_table()?),
        ];
        for (file_name, table) in outputs {
            let path = dir.join(file_name);
            info!("Writing: {path:?}");
            table.write(&path, None)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the [`Reports`] of a loaded [`SequenceMatrix`].
///
/// ## Examples
///
/// ```rust
/// use isomut::{analyze, RunArgs};
///
/// let matrix = isomut::toy1::matrix()?;
/// let args = RunArgs { groups: Some(vec!["L1".into()]), ..Default::default() };
/// let reports = analyze(&matrix, &args)?;
///
/// assert_eq!(reports.mismatch.rows.len(), 5);
/// assert_eq!(reports.mutation_summary.len(), 2);
/// assert_eq!(reports.ratios.rows.len(), 2);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn analyze(matrix: &SequenceMatrix, args: &RunArgs) -> Result<Reports, Report> {
    validate_threshold(args.threshold)?;
    let matrix = match &args.markers {
        Some(pattern) => Cow::Owned(matrix.restrict_markers(pattern)?),
        None => Cow::Borrowed(matrix),
    };
    let matrix = matrix.as_ref();
    let selection = args.selection();
    let subset = matrix.select(&selection)?;
    info!("Selected {} of {} isolates: {selection:?}", subset.len(), matrix.isolates.len());

    let mismatch = matrix.mismatch_report(&selection)?;
    let base_frequency = matrix.base_frequencies(&selection)?;
    let mutation_summary = matrix.mutation_summary(&selection, args.threshold)?;
    info!("Markers with a mutant base: {}", mutation_summary.len());

    let group_stats = compute_group_stats(matrix, args.threshold)?;
    if group_stats.is_empty() {
        warn!("No grouped isolates, substitution and dN/dS tables will be empty.");
    }
    let (substitutions, ratios) = aggregate_group_stats(&group_stats);

    Ok(Reports { mismatch, base_frequency, mutation_summary, substitutions, ratios })
}

/// Read the input matrix, run every analysis, and write the reports to the output directory.
#[cfg(feature = "serde")]
pub fn run(args: &RunArgs) -> Result<Reports, Report> {
    if args.output_dir.exists() {
        warn!("Proceed with caution! --output-dir {:?} already exists.", args.output_dir);
    } else {
        info!("Creating output directory: {:?}", &args.output_dir);
        create_dir_all(&args.output_dir)
            .wrap_err_with(|| eyre!("Failed to create output directory: {:?}", args.output_dir))?;
    }

    let matrix =
        SequenceMatrix::read(&args.input, &args.annotation_schema, args.strict_annotations)?;
    let reports = analyze(&matrix, args)?;
    reports.write(&args.output_dir)?;

    let path = args.output_dir.join("run_args.json");
    info!("Writing: {path:?}");
    args.write(&path)?;

    info!("Done.");
    Ok(reports)
}
