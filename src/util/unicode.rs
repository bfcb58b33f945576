use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a name to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // room for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Pad `s` with spaces on the right to `cells` terminal cells.
/// Strings already wider than `cells` are returned unchanged.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let w = display_width(s);
    if w >= cells {
        return s.to_string();
    }
    format!("{}{}", s, " ".repeat(cells - w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk_and_combining() {
        assert_eq!(display_width("Gruppen"), 7);
        assert_eq!(display_width("群論"), 4);
        assert_eq!(display_width("cafe\u{0301}"), 4);
    }

    #[test]
    fn truncate_fits() {
        assert_eq!(truncate_to_width("Groups", 10), "Groups");
        assert_eq!(truncate_to_width("Groups", 6), "Groups");
    }

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_to_width("Representation theory", 8), "Represe\u{2026}");
    }

    #[test]
    fn truncate_wide_boundary() {
        // budget 3: "群" = 2, next "論" would make 4
        let result = truncate_to_width("群論入門", 4);
        assert_eq!(result, "群\u{2026}");
        assert!(display_width(&result) <= 4);
    }

    #[test]
    fn truncate_keeps_combining_marks_together() {
        assert_eq!(truncate_to_width("cafe\u{0301}s", 5), "cafe\u{0301}\u{2026}");
    }

    #[test]
    fn truncate_tiny_widths() {
        assert_eq!(truncate_to_width("abc", 0), "");
        assert_eq!(truncate_to_width("abc", 1), "\u{2026}");
    }

    #[test]
    fn pad_to_width_counts_cells() {
        assert_eq!(pad_to_width("unit", 6), "unit  ");
        assert_eq!(pad_to_width("群", 3), "群 ");
        assert_eq!(pad_to_width("section", 3), "section");
    }
}
