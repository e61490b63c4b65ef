//! Per-marker [`AnnotationEntry`] metadata parsed from the reserved annotation row.
//!
//! Each annotation cell is a comma-separated list of four fields: mutation name, gene, locus, and
//! substitution class. The field order is set by an [`AnnotationSchema`].

#[cfg(test)]
mod tests;

use crate::Error;

use itertools::Itertools;
use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

/// Sentinel for annotation fields that are absent.
pub const NOT_ANNOTATED: &str = "Not annotated";

// ----------------------------------------------------------------------------
// Annotation Field
// ----------------------------------------------------------------------------

/// One of the four fields of an annotation cell.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnnotationField {
    Mutation,
    Gene,
    Locus,
    Substitution,
}

impl Display for AnnotationField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnnotationField::Mutation => "mutation",
            AnnotationField::Gene => "gene",
            AnnotationField::Locus => "locus",
            AnnotationField::Substitution => "substitution",
        };
        write!(f, "{name}")
    }
}

impl FromStr for AnnotationField {
    type Err = Error;

    fn from_str(field: &str) -> Result<Self, Error> {
        AnnotationField::iter()
            .find(|f| f.to_string().eq_ignore_ascii_case(field.trim()))
            .ok_or_else(|| Error::InvalidSchema(field.to_string()))
    }
}

// ----------------------------------------------------------------------------
// Annotation Schema
// ----------------------------------------------------------------------------

/// The order of the comma-separated fields in an annotation cell.
///
/// ## Examples
///
/// ```rust
/// use isomut::AnnotationSchema;
/// use std::str::FromStr;
///
/// let schema = AnnotationSchema::default();
/// assert_eq!(schema.to_string(), "mutation,gene,locus,substitution");
///
/// let schema = AnnotationSchema::from_str("mutation,gene,substitution,locus")?;
/// let entry = schema.parse("p.Leu5Val,rpoB,missense,locus123");
/// assert_eq!(entry.substitution_class, "missense");
/// assert_eq!(entry.locus, "locus123");
///
/// assert!(AnnotationSchema::from_str("mutation,gene,gene,locus").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct AnnotationSchema {
    pub order: [AnnotationField; 4],
}

impl Default for AnnotationSchema {
    fn default() -> Self {
        AnnotationSchema {
            order: [
                AnnotationField::Mutation,
                AnnotationField::Gene,
                AnnotationField::Locus,
                AnnotationField::Substitution,
            ],
        }
    }
}

impl Display for AnnotationSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.order.iter().join(","))
    }
}

impl FromStr for AnnotationSchema {
    type Err = Error;

    fn from_str(schema: &str) -> Result<Self, Error> {
        let fields = schema
            .split(',')
            .map(AnnotationField::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let unique = fields.iter().unique().count();
        match <[AnnotationField; 4]>::try_from(fields) {
            Ok(order) if unique == 4 => Ok(AnnotationSchema { order }),
            _ => Err(Error::InvalidSchema(schema.to_string())),
        }
    }
}

impl TryFrom<String> for AnnotationSchema {
    type Error = Error;

    fn try_from(schema: String) -> Result<Self, Error> {
        AnnotationSchema::from_str(&schema)
    }
}

impl From<AnnotationSchema> for String {
    fn from(schema: AnnotationSchema) -> Self {
        schema.to_string()
    }
}

impl AnnotationSchema {
    /// Parse one raw annotation cell, degrading gracefully.
    ///
    /// - Empty and `nan` cells have no annotation: every field is [`NOT_ANNOTATED`].
    /// - Cells without a comma are the mutation name, the other fields are [`NOT_ANNOTATED`].
    /// - Otherwise fields are assigned in schema order. Missing or blank fields are [`NOT_ANNOTATED`] and
    ///   fields beyond the fourth are ignored.
    ///
    /// ```rust
    /// use isomut::annotation::{AnnotationSchema, NOT_ANNOTATED};
    ///
    /// let entry = AnnotationSchema::default().parse("unclassified");
    /// assert_eq!(entry.mutation_name, "unclassified");
    /// assert_eq!(entry.gene, NOT_ANNOTATED);
    /// ```
    pub fn parse(&self, raw: &str) -> AnnotationEntry {
        if is_blank(raw) {
            return AnnotationEntry::default();
        }
        if !raw.contains(',') {
            return AnnotationEntry { mutation_name: raw.trim().to_string(), ..Default::default() };
        }

        let fields = raw.split(',').map(str::trim).collect_vec();
        let mut entry = AnnotationEntry::default();
        self.order.iter().zip(fields).filter(|(_, value)| !value.is_empty()).for_each(
            |(field, value)| {
                let value = value.to_string();
                match field {
                    AnnotationField::Mutation => entry.mutation_name = value,
                    AnnotationField::Gene => entry.gene = value,
                    AnnotationField::Locus => entry.locus = value,
                    AnnotationField::Substitution => entry.substitution_class = value,
                }
            },
        );
        entry
    }

    /// Parse one raw annotation cell, requiring exactly four comma-separated fields.
    ///
    /// Returns [`None`] for cells that are malformed. Empty and `nan` cells are not malformed, they have no annotation.
    pub fn parse_strict(&self, raw: &str) -> Option<AnnotationEntry> {
        (is_blank(raw) || raw.split(',').count() == 4).then(|| self.parse(raw))
    }
}

/// Returns true if a raw annotation cell holds no annotation.
fn is_blank(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case("nan")
}

// ----------------------------------------------------------------------------
// Annotation Entry
// ----------------------------------------------------------------------------

/// Annotation of a single marker.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnotationEntry {
    pub mutation_name: String,
    pub gene: String,
    pub locus: String,
    pub substitution_class: String,
}

impl Default for AnnotationEntry {
    /// Returns an [`AnnotationEntry`] where every field is [`NOT_ANNOTATED`].
    fn default() -> Self {
        AnnotationEntry {
            mutation_name: NOT_ANNOTATED.to_string(),
            gene: NOT_ANNOTATED.to_string(),
            locus: NOT_ANNOTATED.to_string(),
            substitution_class: NOT_ANNOTATED.to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// Annotation Index
// ----------------------------------------------------------------------------

/// Per-marker annotations, derived once from the annotation row.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnotationIndex {
    entries: BTreeMap<String, AnnotationEntry>,
}

impl AnnotationIndex {
    /// Returns an [`AnnotationIndex`] parsed from the cells of the annotation row.
    ///
    /// ## Arguments
    ///
    /// - `markers` - Marker names, parallel to `cells`.
    /// - `cells` - Raw annotation cells.
    /// - `schema` - Field order of the cells.
    /// - `strict` - Raise [`Error::MalformedAnnotation`] instead of degrading gracefully.
    ///
    /// Empty and `nan` cells are left out of the index.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use isomut::{AnnotationIndex, AnnotationSchema, Error};
    ///
    /// let markers = ["M1".to_string(), "M2".to_string()];
    /// let cells   = ["p.Thr5Ala,rpoB,Rv0667,missense".to_string(), "rpoB".to_string()];
    /// let schema  = AnnotationSchema::default();
    ///
    /// let index = AnnotationIndex::parse(&markers, &cells, &schema, false)?;
    /// assert_eq!(index.lookup("M1").gene, "rpoB");
    /// assert_eq!(index.lookup("M2").mutation_name, "rpoB");
    ///
    /// let result = AnnotationIndex::parse(&markers, &cells, &schema, true);
    /// assert!(matches!(result, Err(Error::MalformedAnnotation { .. })));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn parse(
        markers: &[String],
        cells: &[String],
        schema: &AnnotationSchema,
        strict: bool,
    ) -> Result<Self, Error> {
        if markers.len() != cells.len() {
            return Err(Error::LengthMismatch {
                id: crate::matrix::ANNOTATION.to_string(),
                expected: markers.len(),
                found: cells.len(),
            });
        }

        let mut entries = BTreeMap::new();
        for (marker, raw) in markers.iter().zip(cells) {
            if is_blank(raw) {
                continue;
            }
            let fields = raw.split(',').count();
            let entry = match (strict, schema.parse_strict(raw)) {
                (true, None) => {
                    return Err(Error::MalformedAnnotation {
                        marker: marker.clone(),
                        raw: raw.clone(),
                    })
                }
                (true, Some(entry)) => entry,
                (false, _) => {
                    if fields != 1 && fields != 4 {
                        warn!("Annotation of {marker} has {fields} fields instead of 4: {raw:?}");
                    }
                    schema.parse(raw)
                }
            };
            entries.insert(marker.clone(), entry);
        }

        Ok(AnnotationIndex { entries })
    }

    /// Returns the [`AnnotationEntry`] of a marker, if it is annotated.
    pub fn get(&self, marker: &str) -> Option<&AnnotationEntry> {
        self.entries.get(marker)
    }

    /// Returns the [`AnnotationEntry`] of a marker, falling back to all fields [`NOT_ANNOTATED`].
    pub fn lookup(&self, marker: &str) -> AnnotationEntry {
        self.get(marker).cloned().unwrap_or_default()
    }

    /// Insert or replace the annotation of a marker.
    pub fn insert(&mut self, marker: &str, entry: AnnotationEntry) -> Option<AnnotationEntry> {
        self.entries.insert(marker.to_string(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
