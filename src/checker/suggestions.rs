use crate::checker::dictionary::Dictionary;

/// Largest edit distance a candidate may have to still be offered.
const MAX_DISTANCE: usize = 2;

/// Ranked alternative spellings for `word`, best first.
///
/// Candidates come from single-edit transformations that land in the
/// dictionary, then from words sharing a short prefix, then (for very short
/// words only) from a bounded scan of similar-length words. The final order is
/// by edit distance, ties kept in discovery order.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    let lower = word.to_lowercase();
    let mut candidates: Vec<(usize, String)> = Vec::new();

    let push = |candidate: String, candidates: &mut Vec<(usize, String)>| {
        if candidate == lower || candidates.iter().any(|(_, c)| *c == candidate) {
            return;
        }
        let distance = edit_distance(&lower, &candidate);
        if distance <= MAX_DISTANCE {
            candidates.push((distance, candidate));
        }
    };

    for transform in generate_transformations(&lower) {
        if dictionary.contains(&transform) {
            push(transform, &mut candidates);
        }
    }

    for prefix_len in [3, 2] {
        if candidates.len() >= max_suggestions {
            break;
        }
        let prefix: String = lower.chars().take(prefix_len).collect();
        if prefix.chars().count() < prefix_len {
            continue;
        }
        for candidate in dictionary.words_with_prefix(&prefix) {
            push(candidate, &mut candidates);
        }
    }

    if candidates.len() < max_suggestions && lower.chars().count() <= 3 {
        for candidate in dictionary.words_near_length(lower.len(), 100) {
            push(candidate, &mut candidates);
        }
    }

    candidates.sort_by_key(|(distance, _)| *distance);
    candidates
        .into_iter()
        .take(max_suggestions)
        .map(|(_, candidate)| match_case(word, &candidate))
        .collect()
}

/// Carry the capitalization of `original` over to `candidate`.
fn match_case(original: &str, candidate: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return candidate.to_uppercase();
    }
    match original.chars().next() {
        Some(first) if first.is_uppercase() => {
            let mut chars = candidate.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => candidate.to_string(),
    }
}

/// Calculate Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Single-edit variants of `word`: deletions, adjacent swaps, insertions and
/// substitutions over the lowercase alphabet.
fn generate_transformations(word: &str) -> Vec<String> {
    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
    let chars: Vec<char> = word.chars().collect();
    let mut transformations = Vec::new();

    for i in 0..chars.len() {
        let mut new_word = chars.clone();
        new_word.remove(i);
        transformations.push(new_word.into_iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut new_word = chars.clone();
        new_word.swap(i, i + 1);
        transformations.push(new_word.into_iter().collect());
    }

    for i in 0..=chars.len() {
        for letter in ALPHABET.chars() {
            let mut new_word = chars.clone();
            new_word.insert(i, letter);
            transformations.push(new_word.into_iter().collect());
        }
    }

    for i in 0..chars.len() {
        for letter in ALPHABET.chars() {
            if chars[i] != letter {
                let mut new_word = chars.clone();
                new_word[i] = letter;
                transformations.push(new_word.into_iter().collect());
            }
        }
    }

    transformations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(words: &[&str]) -> Dictionary {
        let words: Vec<String> = words.iter().map(|s| s.to_string()).collect();
        Dictionary::from_words(&words).unwrap()
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("hello", "hallo"), 1);
        assert_eq!(edit_distance("hello", "hullo"), 1);
        assert_eq!(edit_distance("hello", "world"), 4);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn test_transformations() {
        let transforms = generate_transformations("hello");
        assert!(transforms.contains(&"hllo".to_string())); // deletion
        assert!(transforms.contains(&"ehllo".to_string())); // transposition
        assert!(transforms.contains(&"helloo".to_string())); // insertion
        assert!(transforms.contains(&"jello".to_string())); // substitution
    }

    #[test]
    fn test_generate_ranks_closest_first() {
        let d = dict(&["receive", "recipe", "deceive"]);
        let suggestions = generate("recieve", &d, 5);
        assert_eq!(suggestions.first().map(String::as_str), Some("receive"));
        assert!(suggestions.len() <= 5);
    }

    #[test]
    fn test_generate_preserves_capitalization() {
        let d = dict(&["the", "they"]);
        assert_eq!(generate("Teh", &d, 5).first().map(String::as_str), Some("The"));
        assert_eq!(generate("TEH", &d, 5).first().map(String::as_str), Some("THE"));
    }

    #[test]
    fn test_generate_respects_limit() {
        let d = dict(&["cat", "bat", "hat", "mat", "rat", "sat", "vat"]);
        assert_eq!(generate("zat", &d, 3).len(), 3);
    }
}
