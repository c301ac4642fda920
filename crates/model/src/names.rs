// First-name extraction and casing

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters kept in a first name: ASCII letters, the Latin-1 letter block,
/// apostrophes (straight and typographic) and hyphens.
static NON_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z\u{C0}-\u{FF}'\u{2019}-]").unwrap());

/// Extract the sanitized first name from a full name.
///
/// Returns an empty string for absent or blank input. Otherwise takes the
/// first whitespace-delimited token and drops every character outside the
/// allowed set, so `"  Ana-Maria  Souza"` becomes `"Ana-Maria"` and
/// `"J0ão,"` becomes `"Jão"`.
pub fn first_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };
    match name.split_whitespace().next() {
        Some(token) => NON_NAME_CHARS.replace_all(token, "").into_owned(),
        None => String::new(),
    }
}

/// Title-case a name: a letter following another letter is lowercased, any
/// other letter is uppercased. Non-letters are copied and break words.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_letter = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_absent_or_blank() {
        assert_eq!(first_name(None), "");
        assert_eq!(first_name(Some("")), "");
        assert_eq!(first_name(Some("   \t ")), "");
    }

    #[test]
    fn first_name_takes_leading_token() {
        assert_eq!(first_name(Some("Maria Silva")), "Maria");
        assert_eq!(first_name(Some("  João   Souza ")), "João");
    }

    #[test]
    fn first_name_strips_foreign_chars() {
        assert_eq!(first_name(Some("Ana-Maria Souza")), "Ana-Maria");
        assert_eq!(first_name(Some("D'Ávila")), "D'Ávila");
        assert_eq!(first_name(Some("J0ão, Souza")), "Jão");
        assert_eq!(first_name(Some("123 Souza")), "");
    }

    #[test]
    fn first_name_keeps_typographic_apostrophe() {
        assert_eq!(first_name(Some("O’Neil")), "O’Neil");
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("maria"), "Maria");
        assert_eq!(title_case("JOÃO"), "João");
        assert_eq!(title_case("ana-maria"), "Ana-Maria");
        assert_eq!(title_case("d'ávila"), "D'Ávila");
        assert_eq!(title_case(""), "");
    }
}
