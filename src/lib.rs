#![doc = include_str!("../README.md")]

pub mod annotation;
#[cfg(feature = "cli")]
pub mod cli;
mod error;
pub mod frequency;
pub mod list;
pub mod matrix;
pub mod mismatch;
pub mod run;
pub mod stats;
pub mod summary;
pub mod toy1;

#[doc(inline)]
pub use crate::annotation::{AnnotationEntry, AnnotationIndex, AnnotationSchema};
#[cfg(feature = "cli")]
#[doc(inline)]
pub use crate::cli::{Cli, Verbosity};
#[doc(inline)]
pub use crate::error::Error;
#[doc(inline)]
pub use crate::frequency::{compute_base_frequencies, BaseFrequencyTable};
#[doc(inline)]
pub use crate::list::{list, ListArgs};
#[doc(inline)]
pub use crate::matrix::{Base, Call, Isolate, Selection, SequenceMatrix};
#[doc(inline)]
pub use crate::mismatch::{compute_mismatch_report, MismatchReport};
#[cfg(feature = "serde")]
#[doc(inline)]
pub use crate::run::run;
#[doc(inline)]
pub use crate::run::{analyze, Reports, RunArgs};
#[doc(inline)]
pub use crate::stats::{
    aggregate_group_stats, compute_group_stats, compute_snp_type_stats, GroupStats, RatioTable,
    SubstitutionMatrix,
};
#[doc(inline)]
pub use crate::summary::{compute_mutation_summary, MutationSummary};
