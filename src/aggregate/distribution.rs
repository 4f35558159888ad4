//! Category share distribution (e.g. propositions per type).
//!
//! Small categories are folded into a single "other" bar so the chart stays
//! readable; the result is ordered ascending by count, which is the order a
//! horizontal bar chart draws bottom-up.

use std::collections::{BTreeMap, HashMap};

use super::AggregateError;
use crate::domain::{CategoryShare, DistributionConfig, Record};

/// Count the values of `config.field` across `records`.
///
/// Records with a missing or blank value are not counted.
pub fn category_distribution<R: Record>(
    records: &[R],
    config: &DistributionConfig,
) -> Result<Vec<CategoryShare>, AggregateError> {
    let threshold = config.other_threshold;
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(AggregateError::Configuration(format!(
            "other threshold must be within [0, 1], got {threshold}"
        )));
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let Some(raw) = record.field(&config.field) else {
            continue;
        };
        let label = if config.normalize_labels {
            normalize_label(raw)
        } else {
            raw.trim().to_string()
        };
        if label.is_empty() {
            continue;
        }
        *counts.entry(label).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut folded: BTreeMap<String, usize> = BTreeMap::new();
    for (label, count) in counts {
        let share = count as f64 / total as f64;
        let key = if share < threshold {
            config.other_label.clone()
        } else {
            label
        };
        *folded.entry(key).or_insert(0) += count;
    }

    let mut shares: Vec<CategoryShare> = folded
        .into_iter()
        .map(|(label, count)| CategoryShare {
            label,
            count,
            proportion: count as f64 / total as f64,
        })
        .collect();
    shares.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.label.cmp(&b.label)));

    Ok(shares)
}

/// Trim and title-case a label: the first letter of every word is upper
/// case, the rest lower case. Any non-letter starts a new word.
pub fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn typed(values: &[(&str, usize)]) -> Vec<HashMap<String, String>> {
        let mut out = Vec::new();
        for (value, n) in values {
            for _ in 0..*n {
                out.push(HashMap::from([("TipoProposicao".to_string(), value.to_string())]));
            }
        }
        out
    }

    #[test]
    fn folds_small_categories_and_sorts_ascending() {
        // 200 records: "Moção" at 0.5% and "Veto" at 0.5% fall below 1%.
        let records = typed(&[
            ("Projeto de Lei", 120),
            ("Requerimento", 70),
            ("Indicação", 8),
            ("Moção", 1),
            ("Veto", 1),
        ]);
        let shares = category_distribution(&records, &DistributionConfig::default()).unwrap();

        let labels: Vec<&str> = shares.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Outras", "Indicação", "Requerimento", "Projeto De Lei"]);
        let counts: Vec<usize> = shares.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![2, 8, 70, 120]);

        let total: f64 = shares.iter().map(|s| s.proportion).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((shares[0].proportion - 0.01).abs() < 1e-12);
    }

    #[test]
    fn normalization_merges_spelling_variants() {
        let records = typed(&[("  REQUERIMENTO ", 2), ("requerimento", 1), ("Requerimento", 1)]);
        let shares = category_distribution(&records, &DistributionConfig::default()).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].label, "Requerimento");
        assert_eq!(shares[0].count, 4);
    }

    #[test]
    fn blank_and_missing_values_are_skipped() {
        let mut records = typed(&[("Veto", 3), ("   ", 2)]);
        records.push(HashMap::new());
        let shares = category_distribution(&records, &DistributionConfig::default()).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].count, 3);
        assert_eq!(shares[0].proportion, 1.0);
    }

    #[test]
    fn empty_input_and_bad_threshold() {
        let records: Vec<HashMap<String, String>> = Vec::new();
        assert!(category_distribution(&records, &DistributionConfig::default()).unwrap().is_empty());

        let config = DistributionConfig {
            other_threshold: 1.5,
            ..DistributionConfig::default()
        };
        assert!(matches!(
            category_distribution(&records, &config),
            Err(AggregateError::Configuration(_))
        ));
    }

    #[test]
    fn title_case_handles_accents_and_punctuation() {
        assert_eq!(normalize_label("proposta de emenda à constituição"), "Proposta De Emenda À Constituição");
        assert_eq!(normalize_label("PEC-PROJETO"), "Pec-Projeto");
    }
}
