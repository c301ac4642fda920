use crate::model::DeclaredSex;

/// Canonicalize a free-text declared sex.
///
/// Non-letters are dropped and the rest uppercased before lookup, so
/// `"masc."` and `" MASCULINO "` both read as `M`. Anything outside the
/// known spellings, including empty input, is `None`.
pub fn normalize_declared(raw: Option<&str>) -> Option<DeclaredSex> {
    let letters: String = raw?
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    match letters.as_str() {
        "M" | "MASC" | "MASCULINO" => Some(DeclaredSex::Male),
        "F" | "FEM" | "FEMININO" => Some(DeclaredSex::Female),
        _ => None,
    }
}
