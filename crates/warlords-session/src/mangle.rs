//! Name mangling: turning whatever a client asked for into a unique
//! name that fits the wire grammar.

use warlords_protocol::{is_valid_name, NAME_WIDTH};

/// Reduces a requested name to the wire grammar: word characters only,
/// leading letter or underscore, at most eight characters.
fn sanitize(requested: &str) -> String {
    let mut name: String = requested
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        name.push_str("player");
    }
    if name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        name.insert(0, '_');
    }
    name.truncate(NAME_WIDTH);
    name
}

/// Builds the n-th suffixed candidate, shortening the stem as the
/// suffix grows so the result stays within eight characters. Once the
/// suffix consumes the whole width the stem becomes an underscore, so
/// the candidate never starts with a digit.
fn candidate(base: &str, n: u32) -> String {
    let suffix = n.to_string();
    let keep = NAME_WIDTH.saturating_sub(suffix.len()).min(base.len());
    let mut name = if keep == 0 {
        format!("_{suffix}")
    } else {
        format!("{}{}", &base[..keep], suffix)
    };
    name.truncate(NAME_WIDTH);
    name
}

/// Picks a unique grammar-valid name for a joining client.
///
/// The requested name is used as-is when it is free; otherwise a
/// numeric suffix is appended, shortening the stem as the suffix
/// grows so the result stays within eight characters.
pub fn mangle_name(taken: &[String], requested: &str) -> String {
    let base = sanitize(requested);
    debug_assert!(is_valid_name(&base));
    if !taken.iter().any(|t| t == &base) {
        return base;
    }
    for n in 1u32.. {
        let candidate = candidate(&base, n);
        if !taken.iter().any(|t| t == &candidate) {
            tracing::debug!(requested, mangled = %candidate, "name mangled");
            return candidate;
        }
    }
    unreachable!("numeric suffixes cannot all be taken")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["a111", "herbert", "_", "herbert1"];
    const INVALID_NAMES: &[&str] = &["9asdf", "%asdfsad", "sdf$asd"];

    #[test]
    fn test_valid_free_name_is_untouched() {
        assert_eq!(mangle_name(&[], "herbert"), "herbert");
    }

    #[test]
    fn test_invalid_characters_are_stripped() {
        assert_eq!(mangle_name(&[], "%asdfsad"), "asdfsad");
        assert_eq!(mangle_name(&[], "sdf$asd"), "sdfasd");
    }

    #[test]
    fn test_leading_digit_gets_a_prefix() {
        let name = mangle_name(&[], "9asdf");
        assert!(is_valid_name(&name));
        assert_eq!(name, "_9asdf");
    }

    #[test]
    fn test_long_names_are_truncated() {
        assert_eq!(mangle_name(&[], "herbert_the_great"), "herbert_");
    }

    #[test]
    fn test_collisions_get_numeric_suffixes() {
        let taken = vec!["herbert".to_string()];
        assert_eq!(mangle_name(&taken, "herbert"), "herbert1");
    }

    #[test]
    fn test_suffix_consuming_the_stem_keeps_the_grammar() {
        // An eight-digit suffix leaves no room for the stem; the
        // candidate still must not start with a digit.
        let name = candidate("herbert", 10_000_000);
        assert!(is_valid_name(&name), "bad name: {name}");
        assert_eq!(name, "_1000000");
        assert_eq!(candidate("herbert", 99), "herber99");
    }

    #[test]
    fn test_hundred_mangles_per_name_stay_unique_and_valid() {
        let mut taken: Vec<String> = Vec::new();
        for name in NAMES.iter().chain(INVALID_NAMES) {
            for _ in 0..100 {
                let mangled = mangle_name(&taken, name);
                assert!(is_valid_name(&mangled), "bad name: {mangled}");
                taken.push(mangled);
            }
        }
        let total = taken.len();
        taken.sort();
        taken.dedup();
        assert_eq!(taken.len(), total);
    }
}
