/// Converts a locale-formatted amount ("1,5K", "12 345 €", "2M") into a plain
/// integer string. Anything that still fails to parse once cleaned is returned
/// as the cleaned text.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '€'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let (number, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let whole = (value * multiplier).trunc();
            // -0.5 truncates to -0.0, which would print as "-0".
            let whole = if whole == 0.0 { 0.0 } else { whole };
            format!("{:.0}", whole)
        }
        _ => number.to_string(),
    }
}
