//! Frequency tables over RMA entries
//!
//! Two tables are derived from a set of entries: defective pieces (keyed by the
//! shipped product) and defect reasons (keyed by a composite product/defect
//! label). Both are sorted by count descending, then by case-folded label, so
//! equal inputs always produce the same report.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::entry::RmaEntry;

/// One row of a frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub label: String,
    pub count: usize,
}

impl Tally {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Both frequency tables for a set of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub pieces: Vec<Tally>,
    pub reasons: Vec<Tally>,
}

impl Summary {
    /// Value of the pieces TOTAL row
    pub fn pieces_total(&self) -> usize {
        self.pieces.iter().map(|t| t.count).sum()
    }

    /// Value of the reasons TOTAL row
    pub fn reasons_total(&self) -> usize {
        self.reasons.iter().map(|t| t.count).sum()
    }
}

/// Composite reason label for an entry.
///
/// `"{product} ({defect})"` when both are present, whichever one is present
/// otherwise, and an empty string when neither is.
pub fn reason_label(entry: &RmaEntry) -> String {
    let product = entry.shipped_product.trim();
    let defect = entry.configuration_or_defect.trim();

    match (product.is_empty(), defect.is_empty()) {
        (false, false) => format!("{} ({})", product, defect),
        (false, true) => product.to_string(),
        (true, false) => defect.to_string(),
        (true, true) => String::new(),
    }
}

/// Compute the pieces and reasons tables
pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a RmaEntry>) -> Summary {
    let mut pieces: HashMap<String, usize> = HashMap::new();
    let mut reasons: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let product = entry.shipped_product.trim();
        if !product.is_empty() {
            *pieces.entry(product.to_string()).or_insert(0) += 1;
        }

        let reason = reason_label(entry);
        if !reason.trim().is_empty() {
            *reasons.entry(reason).or_insert(0) += 1;
        }
    }

    Summary {
        pieces: into_sorted(pieces),
        reasons: into_sorted(reasons),
    }
}

fn into_sorted(counts: HashMap<String, usize>) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = counts
        .into_iter()
        .map(|(label, count)| Tally { label, count })
        .collect();
    tallies.sort_by(compare_tallies);
    tallies
}

/// Count descending, then case-folded label, then raw label
fn compare_tallies(a: &Tally, b: &Tally) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| fold(&a.label).cmp(&fold(&b.label)))
        .then_with(|| a.label.cmp(&b.label))
}

fn fold(label: &str) -> String {
    caseless::default_case_fold_str(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Field;

    fn rma(product: &str, defect: &str) -> RmaEntry {
        RmaEntry::default()
            .with(Field::ShippedProduct, product)
            .with(Field::ConfigurationOrDefect, defect)
    }

    #[test]
    fn test_tie_broken_by_case_insensitive_label() {
        let entries = vec![
            rma("b", ""),
            rma("c", ""),
            rma("A", ""),
            rma("b", ""),
            rma("A", ""),
        ];

        let summary = summarize(&entries);
        assert_eq!(
            summary.pieces,
            vec![Tally::new("A", 2), Tally::new("b", 2), Tally::new("c", 1)]
        );
    }

    #[test]
    fn test_tie_broken_by_full_case_folding() {
        // ß folds to "ss", so "ßa" sorts as "ssa"
        let entries = vec![rma("ssb", ""), rma("ßa", "")];

        let summary = summarize(&entries);
        assert_eq!(
            summary.pieces,
            vec![Tally::new("ßa", 1), Tally::new("ssb", 1)]
        );
    }

    #[test]
    fn test_composite_reason_labels() {
        let entries = vec![rma("Motor", "Burnt coil"), rma("", "Burnt coil")];

        let summary = summarize(&entries);
        assert_eq!(
            summary.reasons,
            vec![Tally::new("Burnt coil", 1), Tally::new("Motor (Burnt coil)", 1)]
        );
        assert_eq!(summary.pieces, vec![Tally::new("Motor", 1)]);
    }

    #[test]
    fn test_reason_label_variants() {
        assert_eq!(reason_label(&rma(" Motor ", " Burnt coil ")), "Motor (Burnt coil)");
        assert_eq!(reason_label(&rma("Motor", "  ")), "Motor");
        assert_eq!(reason_label(&rma("", "Burnt coil")), "Burnt coil");
        assert_eq!(reason_label(&rma(" ", "")), "");
    }

    #[test]
    fn test_empty_keys_are_skipped() {
        let entries = vec![rma("", ""), rma("   ", "  "), RmaEntry::default()];
        let summary = summarize(&entries);
        assert!(summary.pieces.is_empty());
        assert!(summary.reasons.is_empty());
        assert_eq!(summary.pieces_total(), 0);
        assert_eq!(summary.reasons_total(), 0);
    }

    #[test]
    fn test_products_are_trimmed_before_counting() {
        let entries = vec![rma("Motor", ""), rma("  Motor ", "")];
        let summary = summarize(&entries);
        assert_eq!(summary.pieces, vec![Tally::new("Motor", 2)]);
    }

    #[test]
    fn test_order_independent() {
        let entries = vec![
            rma("Motor", "Burnt coil"),
            rma("Fonte", ""),
            rma("motor", "Ruído"),
            rma("Fonte", "Não liga"),
            rma("", "Sem defeito"),
            rma("Motor", "Burnt coil"),
            rma("Placa", ""),
        ];
        let expected = summarize(&entries);

        // Every rotation and the reversal must agree
        for shift in 0..entries.len() {
            let mut rotated = entries.clone();
            rotated.rotate_left(shift);
            assert_eq!(summarize(&rotated), expected);
        }
        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(summarize(&reversed), expected);
    }

    #[test]
    fn test_totals_bounded_by_entry_count() {
        let entries = vec![rma("Motor", ""), rma("", "Ruído"), rma("", ""), rma("Fonte", "x")];
        let summary = summarize(&entries);

        assert_eq!(summary.pieces_total(), 2);
        assert_eq!(summary.reasons_total(), 3);
        assert!(summary.pieces_total() <= entries.len());
        assert!(summary.reasons_total() <= entries.len());
    }

    #[test]
    fn test_equal_folded_labels_have_stable_order() {
        let entries = vec![rma("motor", ""), rma("Motor", "")];
        let summary = summarize(&entries);
        assert_eq!(
            summary.pieces,
            vec![Tally::new("Motor", 1), Tally::new("motor", 1)]
        );
    }
}
