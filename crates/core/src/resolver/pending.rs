//! Work-queue extraction from sheet rows.

use crate::store::SheetRow;

/// A row with an ISBN and no date yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingItem {
    /// 1-based sheet row the date will be written to.
    pub row: u32,
    /// Trimmed ISBN cell, not yet normalized.
    pub isbn: String,
}

/// Rows whose ISBN cell is non-empty and whose date cell is empty, in order.
pub fn pending_items(rows: impl IntoIterator<Item = SheetRow>) -> Vec<PendingItem> {
    rows.into_iter()
        .filter_map(|row| {
            let isbn = row.isbn_cell.trim();
            if isbn.is_empty() || !row.value_cell.trim().is_empty() {
                return None;
            }
            Some(PendingItem {
                row: row.row,
                isbn: isbn.to_string(),
            })
        })
        .collect()
}

/// Keep only the first `max_count` items.
///
/// `None` and `Some(0)` both mean "no limit".
pub fn apply_limit(items: &mut Vec<PendingItem>, max_count: Option<usize>) -> bool {
    match max_count {
        Some(max) if max > 0 && max < items.len() => {
            items.truncate(max);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(row: u32, isbn: &str, value: &str) -> SheetRow {
        SheetRow {
            row,
            isbn_cell: isbn.to_string(),
            value_cell: value.to_string(),
        }
    }

    #[test]
    fn test_pending_requires_isbn_and_no_date() {
        let items = pending_items(vec![
            row(2, "9780000000001", ""),
            row(3, "9780000000002", "1999"),
            row(4, "", ""),
            row(5, "   ", ""),
            row(6, " 978-0-00-000000-3 ", "  "),
        ]);

        assert_eq!(
            items,
            vec![
                PendingItem {
                    row: 2,
                    isbn: "9780000000001".to_string()
                },
                PendingItem {
                    row: 6,
                    isbn: "978-0-00-000000-3".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_limit_keeps_stable_prefix() {
        let mut items: Vec<PendingItem> = (0..5)
            .map(|i| PendingItem {
                row: i + 2,
                isbn: format!("978000000000{}", i),
            })
            .collect();

        assert!(apply_limit(&mut items, Some(3)));
        assert_eq!(
            items.iter().map(|i| i.row).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_limit_not_applied_when_large_or_absent() {
        let mut items = vec![PendingItem {
            row: 2,
            isbn: "1".to_string(),
        }];

        assert!(!apply_limit(&mut items, None));
        assert!(!apply_limit(&mut items, Some(0)));
        assert!(!apply_limit(&mut items, Some(1)));
        assert!(!apply_limit(&mut items, Some(10)));
        assert_eq!(items.len(), 1);
    }
}
