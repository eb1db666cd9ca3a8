//! Title comparison and cleaning.
//!
//! Matching is case-sensitive and only ignores surrounding whitespace.

/// Characters that are not allowed in file names on at least one platform.
pub const FORBIDDEN_CHARACTERS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace every forbidden character with `-`, one for one.
pub fn clean_for_filesystem(title: &str) -> String {
    title.chars().map(|c| if FORBIDDEN_CHARACTERS.contains(&c) { '-' } else { c }).collect()
}

pub fn titles_equal(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// `candidate` is within one year of `target`, inclusive.
pub fn year_within_tolerance(candidate: i64, target: i64) -> bool {
    (target.saturating_sub(1)..=target.saturating_add(1)).contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A/B: C*?", "A-B- C--")]
    #[case(r#"a\b"c<d>e|f"#, "a-b-c-d-e-f")]
    #[case("Nothing to clean", "Nothing to clean")]
    #[case("::", "--")]
    #[case("", "")]
    fn test_clean_for_filesystem(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_for_filesystem(input), expected);
    }

    #[rstest]
    #[case("Alien", "Alien", true)]
    #[case(" Alien ", "Alien", true)]
    #[case("Alien", "alien", false)]
    #[case("Alien", "Aliens", false)]
    fn test_titles_equal(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        assert_eq!(titles_equal(a, b), expected);
    }

    #[rstest]
    #[case(2015, 2016, true)]
    #[case(2016, 2016, true)]
    #[case(2017, 2016, true)]
    #[case(2014, 2016, false)]
    #[case(2018, 2016, false)]
    #[case(i64::MAX, i64::MAX, true)]
    #[case(i64::MIN + 1, i64::MIN, true)]
    #[case(0, i64::MAX, false)]
    fn test_year_within_tolerance(#[case] candidate: i64, #[case] target: i64, #[case] expected: bool) {
        assert_eq!(year_within_tolerance(candidate, target), expected);
    }
}
