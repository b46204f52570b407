use std::sync::OnceLock;

use regex::Regex;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Trailing legal-entity suffixes: S.A., S.A.S., SAS, LTDA, INC, LLC, CO, ...
re!(re_legal_suffix,
    r"(?i)(?:[\s,]+(?:S\.?\s?A\.?\s?S\.?|S\.?\s?A\.?|LTDA\.?|L\.?L\.?C\.?|INC\.?|CORP\.?|LTD\.?|CO\.?))+\s*$");

/// Levenshtein edit distance over chars using the two-row O(min(m,n)) space algorithm.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b, m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];

    for j in 1..=n {
        curr[0] = j;
        for i in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[i] = (prev[i] + 1).min(curr[i - 1] + 1).min(prev[i - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m]
}

/// `1 - distance / max_len`, in [0.0, 1.0]. Two empty strings are identical.
pub fn similarity(s1: &str, s2: &str) -> f32 {
    let max_len = s1.chars().count().max(s2.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (1.0 - (levenshtein_distance(s1, s2) as f32 / max_len as f32)).clamp(0.0, 1.0)
}

/// Longest common substring, compared case-insensitively. The result keeps the
/// casing of `a`; the earliest occurrence in `a` wins ties.
pub fn longest_common_substring(a: &str, b: &str) -> String {
    let a_chars: Vec<char> = a.chars().collect();
    let a_folded: Vec<char> = a_chars.iter().map(|c| fold(*c)).collect();
    let b_folded: Vec<char> = b.chars().map(fold).collect();
    let (m, n) = (a_folded.len(), b_folded.len());
    if m == 0 || n == 0 {
        return String::new();
    }

    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];
    let (mut best_len, mut best_end) = (0usize, 0usize);

    for i in 1..=m {
        for j in 1..=n {
            curr[j] = if a_folded[i - 1] == b_folded[j - 1] {
                prev[j - 1] + 1
            } else {
                0
            };
            if curr[j] > best_len {
                best_len = curr[j];
                best_end = i;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    a_chars[best_end - best_len..best_end].iter().collect()
}

/// Text shared by every input: `LCS(LCS(LCS(s0, s1), s2), ...)`.
pub fn common_text<S: AsRef<str>>(texts: &[S]) -> String {
    let Some((first, rest)) = texts.split_first() else {
        return String::new();
    };
    let mut common = first.as_ref().to_string();
    for next in rest {
        if common.is_empty() {
            break;
        }
        common = longest_common_substring(&common, next.as_ref());
    }
    common
}

/// Uppercase, drop trailing legal-entity suffixes and collapse whitespace.
pub fn normalize_merchant(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    let stripped = re_legal_suffix().replace(&upper, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
