//! Case-insensitive substring filtering shared by the list operations.
//!
//! Matching happens in Rust rather than through `LIKE`, because `SQLite` only folds ASCII
//! case and client data is frequently Cyrillic.

/// Lower-cased search term, or `None` when no filtering should happen.
pub(crate) fn normalize(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.is_empty()).map(str::to_lowercase)
}

/// True if `needle` (already lower-cased) occurs in any of `fields`.
pub(crate) fn matches_any(needle: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Text form of a stored amount as `SQLite` casts a REAL to TEXT.
///
/// `SQLite` prints 15 significant digits and always keeps a decimal point, switching to
/// exponent form outside `1e-4..1e15`: `1500.0`, `30.3` for `30.299999999999997`,
/// `1.0e+20`.
pub(crate) fn amount_text(amount: f64) -> String {
    let scientific = format!("{amount:.14e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{amount}");
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{amount}");
    };

    if (-4..15).contains(&exponent) {
        let rounded: f64 = scientific.parse().unwrap_or(amount);
        let text = rounded.to_string();
        return if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        };
    }

    let digits = mantissa.trim_end_matches('0');
    let digits = if digits.ends_with('.') {
        format!("{digits}0")
    } else {
        digits.to_string()
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{digits}e{sign}{:02}", exponent.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("")), None);
        assert_eq!(normalize(Some("МОСК")), Some("моск".to_string()));
    }

    #[test]
    fn test_matches_any_folds_unicode_case() {
        assert!(matches_any("моск", &["Иван", "Москва"]));
        assert!(matches_any("mail", &["TEST@MAIL.COM"]));
        assert!(!matches_any("казань", &["Иван", "Москва"]));
    }

    #[test]
    fn test_amount_text() {
        assert_eq!(amount_text(1500.0), "1500.0");
        assert_eq!(amount_text(25.5), "25.5");
        assert_eq!(amount_text(0.0), "0.0");
        assert_eq!(amount_text(-12.0), "-12.0");
    }

    #[test]
    fn test_amount_text_rounds_to_fifteen_digits() {
        assert_eq!(amount_text(10.10 * 3.0), "30.3");
        assert_eq!(amount_text(0.1 + 0.2), "0.3");
        assert_eq!(amount_text(2.0 / 3.0), "0.666666666666667");
    }

    #[test]
    fn test_amount_text_exponent_form() {
        assert_eq!(amount_text(1e20), "1.0e+20");
        assert_eq!(amount_text(1.5e-5), "1.5e-05");
        assert_eq!(amount_text(123_456_789_012_345.0), "123456789012345.0");
    }
}
