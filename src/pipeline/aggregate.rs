//! Joining page texts into the final document text.

use crate::output::PageText;

/// Placed between consecutive pages.
pub const PAGE_BREAK: &str = "\n\n--- Page Break ---\n\n";

/// Concatenate page texts in ordinal order, separated by [`PAGE_BREAK`].
pub fn aggregate(pages: &[PageText]) -> String {
    let mut ordered: Vec<&PageText> = pages.iter().collect();
    ordered.sort_by_key(|p| p.ordinal);
    ordered
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_BREAK)
}
