/// Derive a URL slug from a display name: lowercase, with spaces and `+`
/// replaced by hyphens.
pub fn derive_slug(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '+'], "-")
}

/// Resolve a slug collision by appending `-1`, `-2`, ... until the candidate
/// is free. Used by the seed/bulk-import path only; single-record admin
/// creation rejects duplicates instead.
pub fn resolve_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Benco S1"), "benco-s1");
        assert_eq!(derive_slug("iPhone 15 Pro Max"), "iphone-15-pro-max");
        assert_eq!(derive_slug("Galaxy S24+"), "galaxy-s24-");
    }

    #[test]
    fn test_resolve_slug_appends_counter() {
        let mut taken: HashSet<String> = HashSet::new();

        // Two products both named "Benco S1" during an import.
        let first = resolve_slug(&derive_slug("Benco S1"), |s| taken.contains(s));
        assert_eq!(first, "benco-s1");
        taken.insert(first);

        let second = resolve_slug(&derive_slug("Benco S1"), |s| taken.contains(s));
        assert_eq!(second, "benco-s1-1");
        taken.insert(second);

        let third = resolve_slug(&derive_slug("Benco S1"), |s| taken.contains(s));
        assert_eq!(third, "benco-s1-2");
    }
}
