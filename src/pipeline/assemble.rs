//! Output assembly shared by both strategies.
//!
//! Direct and OCR output use the same layout so downstream consumers never
//! need to know which path produced the text.

/// Marker line preceding the text of page `page_num` (1-indexed).
pub fn page_marker(page_num: usize) -> String {
    format!("--- Page {page_num} ---")
}

/// Join page texts in order: each block is `marker\ntext`, blocks are
/// separated by a blank line.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}\n{}", page_marker(i + 1), text.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_one_based_and_ordered() {
        let text = join_pages(&["alpha", "beta", "gamma"]);
        assert_eq!(
            text,
            "--- Page 1 ---\nalpha\n\n--- Page 2 ---\nbeta\n\n--- Page 3 ---\ngamma"
        );
    }

    #[test]
    fn empty_pages_keep_their_marker() {
        let text = join_pages(&["", "x"]);
        assert_eq!(text, "--- Page 1 ---\n\n\n--- Page 2 ---\nx");
    }

    #[test]
    fn no_pages_is_empty() {
        assert_eq!(join_pages::<&str>(&[]), "");
    }
}
