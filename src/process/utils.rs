/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a count cell.
///
/// An empty cell is zero. Integral floats ("12.0") are accepted since
/// spreadsheet exports write them; negatives and fractions are not counts.
pub fn parse_count(raw: &str) -> Option<u64> {
    let v = clean_str(raw);
    if v.is_empty() {
        return Some(0);
    }
    if let Ok(n) = v.parse::<u64>() {
        return Some(n);
    }
    match v.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Some(f as u64)
        }
        _ => None,
    }
}

/// Parse a year cell; same float leniency as [`parse_count`], but no default.
pub fn parse_year(raw: &str) -> Option<i32> {
    let v = clean_str(raw);
    if let Ok(y) = v.parse::<i32>() {
        return Some(y);
    }
    match v.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Some(f as i32),
        _ => None,
    }
}
