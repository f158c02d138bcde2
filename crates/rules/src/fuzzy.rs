//! "Did you mean" suggestions for misspelled rule kinds.
//!
//! Distances count `char`s, not bytes, so a typo in a Japanese-labelled
//! catalog costs one edit per character like anything else.

/// Closest candidate to `input`, or `None` when even the best one needs
/// more edits than half the longer of the two names.
///
/// Case and `-`/`_` are ignored, so `Number-Range` suggests `number_range`.
pub(crate) fn suggest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = normalize(input);
    let input_len = input.len();

    candidates
        .iter()
        .map(|&name| (name, levenshtein(&input, &normalize(name))))
        .min_by_key(|&(_, dist)| dist)
        .filter(|&(name, dist)| dist <= input_len.max(name.chars().count()) / 2)
        .map(|(name, _)| name)
}

fn normalize(s: &str) -> Vec<char> {
    s.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == '-' { '_' } else { c })
        .collect()
}

/// Edit distance between two char sequences, keeping one row at a time.
pub(crate) fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RuleKind;

    fn distance(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        levenshtein(&a, &b)
    }

    #[test]
    fn levenshtein_counts_chars() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("abc", ""), 3);
        // Three chars, nine bytes: one deletion.
        assert_eq!(distance("見積書", "見積"), 1);
        assert_eq!(distance("申請書", "申込書"), 1);
    }

    #[test]
    fn suggests_close_kind() {
        assert_eq!(suggest("boolen", RuleKind::NAMES), Some("boolean"));
        assert_eq!(suggest("Number_Range", RuleKind::NAMES), Some("number_range"));
        assert_eq!(suggest("file-required", RuleKind::NAMES), Some("file_required"));
        assert_eq!(suggest("file_requried", RuleKind::NAMES), Some("file_required"));
    }

    #[test]
    fn rejects_distant_kind() {
        assert_eq!(suggest("regex", RuleKind::NAMES), None);
        assert_eq!(suggest("必須", RuleKind::NAMES), None);
    }
}
