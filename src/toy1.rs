//! A small, hand-checkable sequence matrix for examples and tests.
//!
//! Six isolates in two groups (`L1`, `L2`), five markers, with every reserved row present.
//! Marker `M4` has no annotation and isolate `I5` has a missing call (`N`) at `M3`.

use crate::annotation::AnnotationSchema;
use crate::matrix::SequenceMatrix;
use color_eyre::eyre::{Report, Result};
use isomut_table::Table;

/// Toy1 sequence matrix, tab-delimited.
pub const MATRIX: &str = "\
Isolate\tGroup\tM1\tM2\tM3\tM4\tM5
root\tnan\tA\tC\tG\tT\tA
MQ\t\t60\t60\t60\t60\t60
annotation\t\tp.Thr5Ala,rpoB,Rv0667,missense\tp.Gly10Gly,katG,Rv1908c,synonymous\tintergenic\t\tp.Ser3Pro,gyrA,Rv0006,nonsynonymous SNV
I1\tL1\tA\tG\tG\tT\tA
I2\tL1\tA\tG\tG\tT\tC
I3\tL1\tA\tG\tA\tT\tC
I4\tL2\tG\tC\tG\tT\tC
I5\tL2\tG\tC\tN\tT\tC
I6\tL2\tA\tC\tG\tC\tA
";

/// Create the Toy1 [`SequenceMatrix`], with the default [`AnnotationSchema`].
pub fn matrix() -> Result<SequenceMatrix, Report> {
    let table = Table::from_reader(MATRIX.as_bytes(), '\t')?;
    SequenceMatrix::from_table(&table, &AnnotationSchema::default(), false)
}
