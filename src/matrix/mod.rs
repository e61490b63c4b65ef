//! Typed view of the isolate [`SequenceMatrix`] and [`Selection`] of isolate subsets.

#[cfg(test)]
mod tests;

use crate::annotation::{AnnotationIndex, AnnotationSchema};
use crate::Error;

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use isomut_table::Table;
use itertools::Itertools;
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use strum::EnumIter;

/// Identifier of the reserved row holding the root (reference) sequence.
pub const ROOT: &str = "root";
/// Identifier of the reserved row holding mapping quality values.
pub const MQ: &str = "MQ";
/// Identifier of the reserved row holding per-marker annotations.
pub const ANNOTATION: &str = "annotation";
/// Reserved row identifiers, these are never isolates.
pub const RESERVED: [&str; 3] = [ROOT, MQ, ANNOTATION];
/// Group label that selects every isolate.
pub const ALL_GROUPS: &str = "All";

// ----------------------------------------------------------------------------
// Base
// ----------------------------------------------------------------------------

/// One of the four canonical nucleotide bases.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    /// Returns the single character representation of the [`Base`].
    pub fn as_char(&self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
        }
    }
}

impl Display for Base {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Base {
    type Err = Report;

    /// Returns a [`Base`] from an exact, upper-case [`str`].
    ///
    /// ```rust
    /// use isomut::Base;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(Base::from_str("G")?, Base::G);
    /// assert!(Base::from_str("g").is_err());
    /// assert!(Base::from_str("N").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_str(base: &str) -> Result<Self, Report> {
        let base = match base {
            "A" => Base::A,
            "C" => Base::C,
            "G" => Base::G,
            "T" => Base::T,
            _ => Err(eyre!("Unknown base: {base:?}")).suggestion("Options: A, C, G, or T")?,
        };
        Ok(base)
    }
}

// ----------------------------------------------------------------------------
// Call
// ----------------------------------------------------------------------------

/// The value of one isolate at one marker.
///
/// Anything that is not exactly `A`, `C`, `G`, or `T` is kept verbatim as [`Call::Other`], so that
/// comparisons against the root stay exact string comparisons.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Call {
    /// A canonical base.
    Base(Base),
    /// Missing data, ambiguity codes, deletions, lower-case bases, etc.
    Other(String),
}

impl Call {
    /// Parse a raw cell into a [`Call`].
    ///
    /// ```rust
    /// use isomut::{Base, Call};
    ///
    /// assert_eq!(Call::parse("A"), Call::Base(Base::A));
    /// assert_eq!(Call::parse("N"), Call::Other("N".to_string()));
    /// assert_ne!(Call::parse("a"), Call::parse("A"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        match Base::from_str(raw) {
            Ok(base) => Call::Base(base),
            Err(_) => Call::Other(raw.to_string()),
        }
    }

    /// Returns the canonical [`Base`], if this call is one.
    pub fn base(&self) -> Option<Base> {
        match self {
            Call::Base(base) => Some(*base),
            Call::Other(_) => None,
        }
    }
}

impl From<Base> for Call {
    fn from(base: Base) -> Self {
        Call::Base(base)
    }
}

impl From<&str> for Call {
    fn from(raw: &str) -> Self {
        Call::parse(raw)
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Call::Base(base) => write!(f, "{base}"),
            Call::Other(raw) => write!(f, "{raw}"),
        }
    }
}

// ----------------------------------------------------------------------------
// Isolate
// ----------------------------------------------------------------------------

/// One sampled genome: an identifier, an optional lineage group, and one [`Call`] per marker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Isolate {
    pub id: String,
    pub group: Option<String>,
    pub calls: Vec<Call>,
}

impl Isolate {
    /// Create an [`Isolate`] from raw call strings.
    ///
    /// ```rust
    /// use isomut::{Base, Call, Isolate};
    ///
    /// let isolate = Isolate::new("I1", Some("L1"), &["A", "N"]);
    /// assert_eq!(isolate.calls, [Call::Base(Base::A), Call::Other("N".into())]);
    /// ```
    pub fn new(id: &str, group: Option<&str>, calls: &[&str]) -> Self {
        Isolate {
            id: id.to_string(),
            group: group.map(String::from),
            calls: calls.iter().map(|c| Call::parse(c)).collect(),
        }
    }
}

// ----------------------------------------------------------------------------
// Selection
// ----------------------------------------------------------------------------

/// Which isolates an analysis runs on.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selection {
    /// Every isolate in the matrix.
    #[default]
    All,
    /// Individually chosen isolates, by identifier.
    Isolates(Vec<String>),
    /// Every isolate of the chosen groups. The label [`ALL_GROUPS`] selects every isolate.
    Groups(Vec<String>),
}

// ----------------------------------------------------------------------------
// SequenceMatrix
// ----------------------------------------------------------------------------

/// Aligned marker calls of isolates, compared against a root sequence.
///
/// The reserved rows of the input table are split out: the root row becomes [`root`](Self::root),
/// the mapping quality row becomes [`quality`](Self::quality), and the annotation row becomes the
/// [`AnnotationIndex`]. Marker order is genomic order and is preserved by every analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceMatrix {
    /// Marker (column) names, in genomic order.
    pub markers: Vec<String>,
    /// Root sequence, one [`Call`] per marker.
    pub root: Vec<Call>,
    /// Isolates in input order, reserved rows excluded.
    pub isolates: Vec<Isolate>,
    /// Raw mapping quality row, if present.
    ///
    /// Kept verbatim for callers. No analysis reads it.
    pub quality: Option<Vec<String>>,
    /// Per-marker annotations.
    pub annotations: AnnotationIndex,
}

impl SequenceMatrix {
    /// Returns a [`SequenceMatrix`] read from a delimited text file.
    ///
    /// See [`SequenceMatrix::from_table`] for the expected layout.
    pub fn read<P>(path: &P, schema: &AnnotationSchema, strict: bool) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        info!("Reading sequence matrix: {path:?}");
        let table = Table::read(path, None)?;
        let matrix = SequenceMatrix::from_table(&table, schema, strict)
            .wrap_err_with(|| eyre!("Failed to load sequence matrix: {path:?}"))?;
        info!(
            "Loaded {} isolates, {} groups, and {} markers.",
            matrix.isolates.len(),
            matrix.groups().len(),
            matrix.markers.len()
        );
        Ok(matrix)
    }

    /// Returns a [`SequenceMatrix`] built from a [`Table`].
    ///
    /// - Column 0 holds the isolate identifier.
    /// - Column 1 holds the group label when its header is `Group` (any case), otherwise all isolates are ungrouped.
    /// - All remaining columns are markers.
    /// - The `root` row is required, the `MQ` and `annotation` rows are optional.
    /// - Empty and `nan` group labels mean ungrouped.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use isomut::{AnnotationSchema, SequenceMatrix};
    /// use isomut_table::Table;
    ///
    /// let text = "Isolate,Group,M1,M2\nroot,nan,A,C\nI1,L1,A,G\nI2,nan,T,C\n";
    /// let table = Table::from_reader(text.as_bytes(), ',')?;
    /// let matrix = SequenceMatrix::from_table(&table, &AnnotationSchema::default(), false)?;
    ///
    /// assert_eq!(matrix.markers, ["M1", "M2"]);
    /// assert_eq!(matrix.isolates.len(), 2);
    /// assert_eq!(matrix.groups(), ["L1"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn from_table(
        table: &Table<String>,
        schema: &AnnotationSchema,
        strict: bool,
    ) -> Result<Self, Report> {
        let path = &table.path;
        let width = table.headers.len();

        // column 1 is the group label when present
        let has_group = table.headers.get(1).is_some_and(|h| h.eq_ignore_ascii_case("group"));
        let first_marker = if has_group { 2 } else { 1 };
        if width <= first_marker {
            return Err(eyre!("Sequence table has no marker columns: {path:?}"))
                .suggestion("The first column is the isolate, optionally followed by a 'Group' column, then one column per marker.");
        }
        let markers = table.headers[first_marker..].to_vec();
        if let Some(marker) = markers.iter().duplicates().next() {
            return Err(eyre!("Duplicate marker column {marker:?}: {path:?}"))
                .suggestion("Marker names must be unique.");
        }
        debug!("Group column: {has_group}, markers: {}", markers.len());

        let mut root = None;
        let mut quality = None;
        let mut annotation = None;
        let mut isolates = Vec::new();
        let mut seen = HashSet::new();

        for (i, row) in table.rows.iter().enumerate() {
            // 1-based line numbers, after the header line
            let line = i + 2;
            if row.len() != width {
                return Err(eyre!(
                    "Line {line} has {} columns, but the header has {width}: {path:?}",
                    row.len()
                ))
                .suggestion("Is every row of the table the same width?");
            }

            let id = row[0].as_str();
            let cells = &row[first_marker..];
            let reserved = match id {
                ROOT => root.is_some(),
                MQ => quality.is_some(),
                ANNOTATION => annotation.is_some(),
                _ => false,
            };
            if reserved {
                return Err(eyre!("Duplicate {id:?} row on line {line}: {path:?}"))
                    .suggestion(format!("The table may hold at most one {id:?} row."));
            }

            match id {
                ROOT => root = Some(cells.iter().map(|c| Call::parse(c)).collect_vec()),
                MQ => quality = Some(cells.to_vec()),
                ANNOTATION => annotation = Some(cells.to_vec()),
                "" => return Err(eyre!("Line {line} has an empty isolate identifier: {path:?}")),
                _ => {
                    if !seen.insert(id) {
                        return Err(eyre!("Duplicate isolate identifier on line {line}: {id:?}"))
                            .suggestion("Isolate identifiers must be unique.");
                    }
                    let group = if has_group { parse_group(&row[1]) } else { None };
                    let calls = cells.iter().map(|c| Call::parse(c)).collect();
                    isolates.push(Isolate { id: id.to_string(), group, calls });
                }
            }
        }

        let root = match root {
            Some(root) => root,
            None => Err(eyre!("Sequence table has no {ROOT:?} row: {path:?}"))
                .suggestion(format!("Add a row whose first column is {ROOT:?} holding the reference calls."))?,
        };

        let annotations = match annotation {
            Some(cells) => AnnotationIndex::parse(&markers, &cells, schema, strict)?,
            None => {
                debug!("Sequence table has no {ANNOTATION:?} row, markers are not annotated.");
                AnnotationIndex::default()
            }
        };

        Ok(SequenceMatrix { markers, root, isolates, quality, annotations })
    }

    /// Returns the distinct group labels, in order of first appearance.
    pub fn groups(&self) -> Vec<&str> {
        self.isolates.iter().filter_map(|isolate| isolate.group.as_deref()).unique().collect()
    }

    /// Returns the [`Isolate`] with this identifier.
    pub fn get_isolate(&self, id: &str) -> Option<&Isolate> {
        self.isolates.iter().find(|isolate| isolate.id == id)
    }

    /// Returns the isolates picked by a [`Selection`], in matrix order.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use isomut::{toy1, Error, Selection};
    ///
    /// let matrix = toy1::matrix()?;
    /// let ids = |s: &Selection| -> Result<Vec<String>, Error> {
    ///     Ok(matrix.select(s)?.iter().map(|i| i.id.clone()).collect())
    /// };
    ///
    /// assert_eq!(ids(&Selection::Isolates(vec!["I3".into(), "I1".into()]))?, ["I1", "I3"]);
    /// assert_eq!(ids(&Selection::Groups(vec!["L2".into()]))?, ["I4", "I5", "I6"]);
    /// assert_eq!(ids(&Selection::All)?.len(), 6);
    /// assert_eq!(ids(&Selection::Isolates(vec!["root".into()])), Err(Error::UnknownIsolate("root".into())));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn select(&self, selection: &Selection) -> Result<Vec<&Isolate>, Error> {
        match selection {
            Selection::All => Ok(self.isolates.iter().collect()),
            Selection::Isolates(ids) => {
                if let Some(unknown) = ids.iter().find(|id| self.get_isolate(id).is_none()) {
                    return Err(Error::UnknownIsolate(unknown.clone()));
                }
                Ok(self.isolates.iter().filter(|isolate| ids.contains(&isolate.id)).collect())
            }
            Selection::Groups(labels) => {
                if labels.iter().any(|label| label == ALL_GROUPS) {
                    return Ok(self.isolates.iter().collect());
                }
                let groups = self.groups();
                if let Some(unknown) = labels.iter().find(|label| !groups.contains(&label.as_str())) {
                    return Err(Error::UnknownGroup(unknown.clone()));
                }
                let subset = self
                    .isolates
                    .iter()
                    .filter(|isolate| isolate.group.as_ref().is_some_and(|g| labels.contains(g)))
                    .collect();
                Ok(subset)
            }
        }
    }

    /// Returns the markers whose name contains `pattern`, in genomic order.
    ///
    /// ```rust
    /// let matrix = isomut::toy1::matrix()?;
    /// assert_eq!(matrix.search_markers("M"), ["M1", "M2", "M3", "M4", "M5"]);
    /// assert_eq!(matrix.search_markers("5"), ["M5"]);
    /// assert!(matrix.search_markers("X").is_empty());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn search_markers(&self, pattern: &str) -> Vec<&str> {
        self.markers.iter().filter(|m| m.contains(pattern)).map(String::as_str).collect()
    }

    /// Returns a copy of the matrix that keeps only the markers whose name contains `pattern`.
    ///
    /// Root calls, isolate calls, and the quality row are narrowed to the same columns.
    ///
    /// ```rust
    /// let matrix = isomut::toy1::matrix()?;
    /// let narrow = matrix.restrict_markers("M5")?;
    /// assert_eq!(narrow.markers, ["M5"]);
    /// assert_eq!(narrow.isolates[1].calls.len(), 1);
    /// assert!(matrix.restrict_markers("X").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn restrict_markers(&self, pattern: &str) -> Result<SequenceMatrix, Report> {
        let keep = self.markers.iter().positions(|m| m.contains(pattern)).collect_vec();
        if keep.is_empty() {
            return Err(eyre!("No marker name contains {pattern:?}."))
                .suggestion(format!("Available markers: {}", self.markers.iter().join(", ")));
        }
        check_lengths(&self.markers, &self.root, &self.isolates.iter().collect_vec())?;
        let pick = |values: &[Call]| keep.iter().map(|&i| values[i].clone()).collect_vec();

        let isolates = self
            .isolates
            .iter()
            .map(|isolate| Isolate { calls: pick(&isolate.calls), ..isolate.clone() })
            .collect();
        let quality = self.quality.as_ref().map(|row| {
            keep.iter().filter_map(|&i| row.get(i).cloned()).collect_vec()
        });
        debug!("Restricted to {} of {} markers matching {pattern:?}", keep.len(), self.markers.len());

        Ok(SequenceMatrix {
            markers: keep.iter().map(|&i| self.markers[i].clone()).collect(),
            root: pick(&self.root),
            isolates,
            quality,
            annotations: self.annotations.clone(),
        })
    }
}

/// Returns the group label of a raw cell, empty and `nan` cells are ungrouped.
fn parse_group(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty() && !raw.eq_ignore_ascii_case("nan")).then(|| raw.to_string())
}

/// Check that the root and every isolate of a subset have exactly one call per marker.
pub(crate) fn check_lengths(
    markers: &[String],
    root: &[Call],
    subset: &[&Isolate],
) -> Result<(), Error> {
    let expected = markers.len();
    if root.len() != expected {
        return Err(Error::LengthMismatch { id: ROOT.to_string(), expected, found: root.len() });
    }
    match subset.iter().find(|isolate| isolate.calls.len() != expected) {
        Some(isolate) => Err(Error::LengthMismatch {
            id: isolate.id.clone(),
            expected,
            found: isolate.calls.len(),
        }),
        None => Ok(()),
    }
}
