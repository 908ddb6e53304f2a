//! Text normalisation for authorship and phrase comparison

use unicode_normalization::UnicodeNormalization;

/// Reduce a string to upper case ASCII letters and digits
///
/// Diacritics are folded (`Müll.` -> `MULL`), punctuation and whitespace
/// dropped. Returns `None` when nothing is left.
pub fn digits_or_ascii_letters(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    for c in value.nfd() {
        match c {
            'ß' => out.push_str("SS"),
            'æ' | 'Æ' => out.push_str("AE"),
            'œ' | 'Œ' => out.push_str("OE"),
            'ø' | 'Ø' => out.push('O'),
            'đ' | 'Đ' => out.push('D'),
            'ł' | 'Ł' => out.push('L'),
            'þ' | 'Þ' => out.push_str("TH"),
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_uppercase()),
            _ => {}
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Compare two optional strings by their ASCII letters and digits only
///
/// Two absent (or empty after normalisation) values are equal.
pub fn equals_digit_or_ascii_letters(a: Option<&str>, b: Option<&str>) -> bool {
    a.and_then(digits_or_ascii_letters) == b.and_then(digits_or_ascii_letters)
}

/// Scientific name followed by the non-empty authorship and phrase
pub fn build_label(scientific_name: &str, authorship: Option<&str>, phrase: Option<&str>) -> String {
    let mut label = scientific_name.to_string();
    for part in [authorship, phrase].into_iter().flatten() {
        if !part.is_empty() {
            label.push(' ');
            label.push_str(part);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(digits_or_ascii_letters("Mill., 1768").as_deref(), Some("MILL1768"));
        assert_eq!(digits_or_ascii_letters("Müll.").as_deref(), Some("MULL"));
        assert_eq!(digits_or_ascii_letters("Børner").as_deref(), Some("BORNER"));
        assert_eq!(digits_or_ascii_letters(" ., ()"), None);
    }

    #[test]
    fn test_build_label() {
        assert_eq!(build_label("Poa annua", Some("L."), Some("sensu lato")), "Poa annua L. sensu lato");
        assert_eq!(build_label("Poa", Some(""), None), "Poa");
    }

    #[test]
    fn test_equals() {
        assert!(equals_digit_or_ascii_letters(Some("L., 1753"), Some("l. 1753")));
        assert!(equals_digit_or_ascii_letters(Some("Börner, C, 1901"), Some("Borner C 1901")));
        assert!(equals_digit_or_ascii_letters(None, None));
        assert!(equals_digit_or_ascii_letters(None, Some("  ")));
        assert!(!equals_digit_or_ascii_letters(Some("L., 1753"), Some("L., 1758")));
        assert!(!equals_digit_or_ascii_letters(Some("Mill."), None));
    }
}
