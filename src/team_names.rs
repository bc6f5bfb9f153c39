const IGNORED_TOKENS: [&str; 3] = ["fc", "afc", "cf"];

pub fn normalize_name(input: &str) -> String {
    let lower = input.trim().to_ascii_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut prev_us = false;
    for ch in lower.chars() {
        // Apostrophes and dots shorten a word rather than split it ("Nott'm", "St.").
        if ch == '\'' || ch == '.' {
            continue;
        }
        let mapped = if ch.is_ascii_alphanumeric() {
            Some(ch)
        } else if ch == '&' {
            Some('a')
        } else {
            None
        };

        if let Some(c) = mapped {
            out.push(c);
            prev_us = false;
        } else if !prev_us && !out.is_empty() {
            out.push('_');
            prev_us = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Heuristic for spelling drift between seasons ("Man Utd" / "Manchester
/// United"). Only used to flag suspicious imputations; matching stays exact.
pub fn names_look_alike(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let a_tokens = significant_tokens(&a);
    let b_tokens = significant_tokens(&b);
    if a_tokens.is_empty() || a_tokens.len() != b_tokens.len() {
        return false;
    }
    a_tokens
        .iter()
        .zip(&b_tokens)
        .all(|(x, y)| is_abbreviation(x, y) || is_abbreviation(y, x))
}

fn significant_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split('_')
        .filter(|t| !t.is_empty() && !IGNORED_TOKENS.contains(t))
        .collect()
}

fn is_abbreviation(short: &str, long: &str) -> bool {
    if short.len() > long.len() || short.chars().next() != long.chars().next() {
        return false;
    }
    let mut rest = long.chars();
    short.chars().all(|c| rest.any(|l| l == c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize_name("Manchester City"), "manchester_city");
        assert_eq!(normalize_name("  Brighton & Hove Albion "), "brighton_a_hove_albion");
        assert_eq!(normalize_name("Nott'm Forest"), "nottm_forest");
    }

    #[test]
    fn abbreviations_look_alike() {
        assert!(names_look_alike("Man United", "Manchester United"));
        assert!(names_look_alike("Man Utd", "Manchester United"));
        assert!(names_look_alike("Nott'm Forest", "Nottingham Forest"));
        assert!(names_look_alike("AFC Bournemouth", "Bournemouth"));
        assert!(names_look_alike("Spurs", "spurs"));
    }

    #[test]
    fn different_clubs_do_not_look_alike() {
        assert!(!names_look_alike("West Ham", "West Brom"));
        assert!(!names_look_alike("Leeds", "Leicester"));
        assert!(!names_look_alike("Manchester City", "Manchester United"));
        assert!(!names_look_alike("Wolves", "Wolverhampton Wanderers"));
    }
}
