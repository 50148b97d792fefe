//! Identifier case helpers used for module names and handler lookup.

/// Uppercase the first character, leaving the rest untouched.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `EnsureUserIsAdmin` -> `ensure_user_is_admin`.
pub fn snake_case(s: &str) -> String {
    delimited(s, '_')
}

/// `EnsureUserIsAdmin` -> `ensure-user-is-admin`.
pub fn kebab_case(s: &str) -> String {
    delimited(s, '-')
}

fn delimited(s: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push(delimiter);
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("People", "Person"),
    ("Children", "Child"),
    ("Men", "Man"),
    ("Women", "Woman"),
    ("Mice", "Mouse"),
    ("Data", "Datum"),
];

/// English singular of a PascalCase noun. Heuristic: the final word only.
pub fn singularize(word: &str) -> String {
    for (plural, singular) in IRREGULAR_PLURALS {
        if let Some(stem) = word.strip_suffix(plural) {
            return format!("{stem}{singular}");
        }
    }
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
