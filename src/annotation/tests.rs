use crate::annotation::{AnnotationEntry, AnnotationField, AnnotationIndex, AnnotationSchema, NOT_ANNOTATED};
use crate::Error;
use color_eyre::eyre::{Report, Result};
use std::str::FromStr;

fn markers(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("M{i}")).collect()
}

fn cells(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|c| c.to_string()).collect()
}

#[test]
fn parse_full() {
    let entry = AnnotationSchema::default().parse("p.Ser450Leu, rpoB ,Rv0667,missense");
    let expected = AnnotationEntry {
        mutation_name: "p.Ser450Leu".into(),
        gene: "rpoB".into(),
        locus: "Rv0667".into(),
        substitution_class: "missense".into(),
    };
    assert_eq!(entry, expected);
}

#[test]
fn parse_alternate_order() -> Result<(), Report> {
    let schema = AnnotationSchema::from_str("mutation,gene,substitution,locus")?;
    assert_eq!(schema.order[2], AnnotationField::Substitution);

    let entry = schema.parse("p.Leu5Val,rpoB,missense,locus123");
    assert_eq!(entry.mutation_name, "p.Leu5Val");
    assert_eq!(entry.gene, "rpoB");
    assert_eq!(entry.substitution_class, "missense");
    assert_eq!(entry.locus, "locus123");
    Ok(())
}

#[test]
fn parse_degraded() {
    let schema = AnnotationSchema::default();

    assert_eq!(schema.parse(""), AnnotationEntry::default());
    assert_eq!(schema.parse("nan"), AnnotationEntry::default());

    let entry = schema.parse("p.X,katG");
    assert_eq!(entry.gene, "katG");
    assert_eq!(entry.locus, NOT_ANNOTATED);
    assert_eq!(entry.substitution_class, NOT_ANNOTATED);

    let entry = schema.parse("a,,c,d,e");
    assert_eq!(entry.gene, NOT_ANNOTATED);
    assert_eq!(entry.substitution_class, "d");
}

#[test]
fn parse_strict() {
    let schema = AnnotationSchema::default();
    assert!(schema.parse_strict("a,b,c,d").is_some());
    assert!(schema.parse_strict("nan").is_some());
    assert!(schema.parse_strict("a,b,c").is_none());
    assert!(schema.parse_strict("a,b,c,d,e").is_none());
    assert!(schema.parse_strict("intergenic").is_none());
}

#[test]
fn schema_round_trip() -> Result<(), Report> {
    let text = "locus,Substitution,GENE,mutation";
    let schema = AnnotationSchema::from_str(text)?;
    assert_eq!(schema.to_string(), "locus,substitution,gene,mutation");
    Ok(())
}

#[test]
fn schema_invalid() {
    for text in ["", "mutation,gene,locus", "mutation,gene,locus,substitution,gene", "mutation,gene,locus,locus", "a,b,c,d"] {
        assert!(matches!(AnnotationSchema::from_str(text), Err(Error::InvalidSchema(_))), "{text}");
    }
}

#[cfg(feature = "serde")]
#[test]
fn schema_serde() -> Result<(), Report> {
    let schema = AnnotationSchema::from_str("mutation,gene,substitution,locus")?;
    let json = serde_json::to_string(&schema)?;
    assert_eq!(json, "\"mutation,gene,substitution,locus\"");
    assert_eq!(serde_json::from_str::<AnnotationSchema>(&json)?, schema);
    assert!(serde_json::from_str::<AnnotationSchema>("\"gene\"").is_err());
    Ok(())
}

#[test]
fn index_lenient() -> Result<(), Report> {
    let raw = cells(&["p.A1B,geneA,locA,missense", "nan", "", "intergenic", "x,y"]);
    let index = AnnotationIndex::parse(&markers(5), &raw, &AnnotationSchema::default(), false)?;

    assert_eq!(index.len(), 3);
    assert_eq!(index.lookup("M1").substitution_class, "missense");
    assert!(index.get("M2").is_none());
    assert_eq!(index.lookup("M3"), AnnotationEntry::default());
    assert_eq!(index.lookup("M4").mutation_name, "intergenic");
    assert_eq!(index.lookup("M5").gene, "y");
    assert_eq!(index.lookup("M9"), AnnotationEntry::default());
    Ok(())
}

#[test]
fn index_strict() -> Result<(), Report> {
    let schema = AnnotationSchema::default();

    let raw = cells(&["a,b,c,d", "nan"]);
    let index = AnnotationIndex::parse(&markers(2), &raw, &schema, true)?;
    assert_eq!(index.len(), 1);

    let raw = cells(&["a,b,c,d", "a,b"]);
    let result = AnnotationIndex::parse(&markers(2), &raw, &schema, true);
    let expected = Error::MalformedAnnotation { marker: "M2".into(), raw: "a,b".into() };
    assert_eq!(result, Err(expected));
    Ok(())
}

#[test]
fn index_length_mismatch() {
    let raw = cells(&["a,b,c,d"]);
    let result = AnnotationIndex::parse(&markers(2), &raw, &AnnotationSchema::default(), false);
    let expected = Error::LengthMismatch { id: "annotation".into(), expected: 2, found: 1 };
    assert_eq!(result, Err(expected));
}

#[test]
fn index_insert() {
    let mut index = AnnotationIndex::default();
    assert!(index.is_empty());
    let entry = AnnotationEntry { gene: "gyrA".into(), ..Default::default() };
    assert_eq!(index.insert("M1", entry.clone()), None);
    assert_eq!(index.get("M1"), Some(&entry));
}
