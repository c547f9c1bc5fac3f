use chrono::Month;

/// Calendar year of the first projected month.
pub const LABEL_START_YEAR: i32 = 2025;

pub const CURRENCY_SYMBOL: &str = "€";

/// Short month name for a 1-based month index, anchored at January of
/// [`LABEL_START_YEAR`]. From the second year on the two-digit year is appended.
pub fn month_label(month_index: u32) -> String {
    let offset = month_index.saturating_sub(1);
    let year = LABEL_START_YEAR + (offset / 12) as i32;
    let name = Month::try_from((offset % 12) as u8 + 1)
        .map(|month| &month.name()[..3])
        .unwrap_or("---");

    if month_index > 12 {
        format!("{name} '{:02}", year.rem_euclid(100))
    } else {
        name.to_string()
    }
}

/// Whole-euro amount with thousands grouping, e.g. `€12,345` or `-€500`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("{CURRENCY_SYMBOL}{value}");
    }

    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}{CURRENCY_SYMBOL}{}", group_thousands(&digits))
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
