//! Bulk text import
//!
//! Parses rows copied from another spreadsheet or a plain text file. Each
//! non-blank line is one entry; fields are tab separated, falling back to runs
//! of two or more whitespace characters when a line has no tabs.

use regex::Regex;

use crate::core::entry::RmaEntry;

lazy_static::lazy_static! {
    /// Two or more whitespace characters
    static ref WIDE_GAP: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Parse delimited text into entries, one per non-blank line
pub fn parse_text(text: &str) -> Vec<RmaEntry> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| RmaEntry::from_values(split_line(line)))
        .collect()
}

/// Split one trimmed line into raw field values
pub fn split_line(line: &str) -> Vec<&str> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() >= 2 {
        return parts;
    }
    WIDE_GAP.split(line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Field;

    #[test]
    fn test_tab_separated_line() {
        let entries = parse_text("2024-01-01\tAcme\tNF1\n");
        assert_eq!(entries.len(), 1);

        let e = &entries[0];
        assert_eq!(e.received_date, "2024-01-01");
        assert_eq!(e.client, "Acme");
        assert_eq!(e.invoice_number, "NF1");
        assert!(e.values()[3..].iter().all(|v| v.is_empty()));
    }

    #[test]
    fn test_whitespace_run_fallback() {
        let entries = parse_text("05/01/2024   Loja Alfa  NF 123  OS-9");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].received_date, "05/01/2024");
        assert_eq!(entries[0].client, "Loja Alfa");
        assert_eq!(entries[0].invoice_number, "NF 123");
        assert_eq!(entries[0].service_order, "OS-9");
    }

    #[test]
    fn test_single_spaces_stay_in_one_field() {
        let entries = parse_text("just one field here");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].received_date, "just one field here");
        assert_eq!(entries[0].client, "");
    }

    #[test]
    fn test_blank_lines_skipped_and_crlf_trimmed() {
        let text = "\n  \r\na\tb\r\n\n\tc\td\n   \n";
        let entries = parse_text(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].received_date, "a");
        assert_eq!(entries[0].client, "b");
        // Leading tab is trimmed with the line, so "c" lands in the first column
        assert_eq!(entries[1].received_date, "c");
        assert_eq!(entries[1].client, "d");
    }

    #[test]
    fn test_empty_inner_fields_keep_positions() {
        let entries = parse_text("a\t\t\tOS1\t\tMotor");
        assert_eq!(entries[0].get(Field::ServiceOrder), "OS1");
        assert_eq!(entries[0].get(Field::ShippedProduct), "Motor");
        assert_eq!(entries[0].get(Field::Client), "");
    }

    #[test]
    fn test_full_row_maps_all_fields() {
        let row: Vec<String> = Field::ALL.iter().map(|f| format!(" {} ", f.key())).collect();
        let entries = parse_text(&row.join("\t"));
        for field in Field::ALL {
            assert_eq!(entries[0].get(field), field.key());
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_text("").is_empty());
        assert!(parse_text(" \n\t\n").is_empty());
    }
}
