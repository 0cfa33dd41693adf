//! Levenshtein edit distance, for function-name typo detection

/// Edit distance between two strings, case-insensitive on ASCII
///
/// Standard two-row dynamic programming over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().map(|c| c.to_ascii_uppercase()).collect();
    let b: Vec<char> = b.chars().map(|c| c.to_ascii_uppercase()).collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Find the candidate closest to `target` within `max_distance` edits
///
/// Ties go to the earliest candidate. Exact matches return distance 0.
pub fn closest_match<'a, I>(target: &str, candidates: I, max_distance: usize) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, usize)> = None;
    for cand in candidates {
        let d = edit_distance(target, cand);
        if d <= max_distance && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((cand, d));
        }
    }
    best
}
