use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "at", "by", "with", "from",
    "is", "are", "was", "were", "be", "as", "it", "its", "this", "that", "after", "over",
    "into", "says", "said", "new", "will", "has", "have", "but", "not", "about", "amid",
];

/// Remove markup and decode the handful of entities feeds actually use.
pub fn strip_html(input: &str) -> String {
    let without_tags = TAG_RE.replace_all(input, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&#8217;", "'")
        .replace("&rsquo;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    WS_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Lowercased content words, punctuation split, stopwords and 1-char tokens dropped.
pub fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// |A ∩ B| / |A ∪ B|; 0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Trim, drop blanks, and remove case-insensitive duplicates, keeping first-seen order.
pub fn clean_labels(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim().to_string();
        if !item.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(&item)) {
            out.push(item);
        }
    }
    out
}
