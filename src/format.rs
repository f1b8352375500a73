//! Stateless value/date formatting helpers used for tick and legend labels.
//! Chart renderers delegate here instead of formatting inline.

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Collapse `YYYY-MM` or any `YYYY-MM-DD...` prefix to a short month name.
/// Anything else is returned unchanged.
pub fn month_label(val: &str) -> String {
    let b = val.as_bytes();
    let month_digits = if b.len() == 7 && is_digits(&b[0..4]) && b[4] == b'-' && is_digits(&b[5..7])
    {
        Some(&val[5..7])
    } else if b.len() >= 10
        && is_digits(&b[0..4])
        && b[4] == b'-'
        && is_digits(&b[5..7])
        && b[7] == b'-'
        && is_digits(&b[8..10])
    {
        Some(&val[5..7])
    } else {
        None
    };

    match month_digits.and_then(|m| m.parse::<usize>().ok()) {
        Some(m) if (1..=12).contains(&m) => MONTHS[m - 1].to_string(),
        _ => val.to_string(),
    }
}

fn is_digits(b: &[u8]) -> bool {
    b.iter().all(|c| c.is_ascii_digit())
}

/// Compact magnitude formatting: 1.2K / 3.4M / 5.6B, with an optional
/// currency prefix. Small values keep at most two decimals.
pub fn compact_number(val: f64, currency: bool) -> String {
    let sign = if currency { "₹" } else { "" };
    let abs = val.abs();
    if abs >= 1e9 {
        format!("{}{:.1}B", sign, val / 1e9)
    } else if abs >= 1e6 {
        format!("{}{:.1}M", sign, val / 1e6)
    } else if abs >= 1e3 {
        format!("{}{:.1}K", sign, val / 1e3)
    } else if val.fract() == 0.0 {
        format!("{}{}", sign, val as i64)
    } else {
        format!("{}{:.2}", sign, val)
    }
}

/// `unit_cost` -> `Unit Cost`: underscores to spaces, word starts uppercased.
pub fn pretty_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        if ch == '_' {
            out.push(' ');
            at_word_start = true;
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = !ch.is_alphanumeric();
        } else {
            out.push(ch);
            at_word_start = !ch.is_alphanumeric();
        }
    }
    out
}
