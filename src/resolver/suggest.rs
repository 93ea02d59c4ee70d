//! Spelling suggestions for names that resolved to nothing.

const MAX_SUGGESTIONS: usize = 5;

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Levenshtein distance over Unicode scalar values.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Names from `known` that look like a misspelling of `requested`.
///
/// Names are compared lowercased with `_` and `-` removed. A name is kept when
/// its distance is below half the requested length; an exact normalized match
/// is returned alone. Results are ordered by distance, then name.
pub fn suggest<'a, I>(requested: &str, known: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = normalize(requested);
    let max = wanted.chars().count() / 2;

    let mut matches: Vec<(usize, &str)> = Vec::new();
    for name in known {
        let distance = edit_distance(&wanted, &normalize(name));
        if distance >= max {
            continue;
        }
        if distance == 0 {
            return vec![name.to_string()];
        }
        matches.push((distance, name));
    }

    matches.sort();
    matches.dedup();
    matches
        .into_iter()
        .map(|(_, name)| name.to_string())
        .take(MAX_SUGGESTIONS)
        .collect()
}
