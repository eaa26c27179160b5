//! ASCII table rendering for listing views, sized to the terminal.

use terminal_size::{terminal_size, Height, Width};

pub fn term_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w.saturating_sub(4)) as usize;
    }
    80
}

/// Print column headers and rows as a boxed table. Column widths derive from
/// content, capped so the whole table fits the terminal; overlong cells are
/// truncated with an ellipsis and numeric cells right-align.
pub fn print_table(cols: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        println!("(no results)");
        return;
    }
    let total = term_width();
    crate::tprintln!("[console.render] detected terminal width={} columns", total);
    // Leave room for "| " and " |" around every column
    let chrome = cols.len() * 3 + 1;
    let cap = ((total.saturating_sub(chrome)) / cols.len().max(1)).max(8);

    let mut widths: Vec<usize> = cols.iter().map(|c| c.chars().count().min(cap)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = cell.chars().count().min(cap);
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_row(&cols.iter().map(|s| s.to_string()).collect::<Vec<_>>(), &widths));
    println!("{}", sep);
    for r in rows {
        println!("{}", build_row(r, &widths));
    }
    println!("{}", sep);
    println!("rows: {}", rows.len());
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        let pad = w.saturating_sub(text.chars().count());
        s.push(' ');
        if is_numeric_like(&cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to right
    let st = s.trim();
    if st.is_empty() {
        return false;
    }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if ".-+eE,_".contains(ch) {
            continue;
        }
        return false;
    }
    has_digit
}

/// One-line key/value block for detail views.
pub fn print_detail(pairs: &[(&str, String)]) {
    let label_w = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (k, v) in pairs {
        if v.is_empty() {
            continue;
        }
        println!("  {:label_w$}  {}", k, v, label_w = label_w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long value", 6), "a lon…");
        assert_eq!(truncate("xy", 1), "…");
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric_like("1234"));
        assert!(is_numeric_like("-3.5"));
        assert!(!is_numeric_like("12 Main St"));
        assert!(!is_numeric_like(""));
    }
}
