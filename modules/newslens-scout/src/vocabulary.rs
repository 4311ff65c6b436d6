//! Fixed keyword tables shared by the fetcher's relevance filter, the local
//! enrichment fallback, and the public-interest scoring.
//!
//! The relevance filter and official names match case-insensitive substrings.
//! Topic and scoring terms match whole words (or their plural) through
//! [`TermMatcher`], so "rent" never fires on "current".

use std::sync::LazyLock;

use regex::Regex;

/// Terms that mark an entry as civic or political coverage.
pub const POLITICAL_TERMS: &[&str] = &[
    // Parties
    "liberal", "conservative", "ndp", "new democrat", "bloc québécois", "bloc quebecois",
    "green party", "people's party", "republican", "democrat",
    // Institutions
    "parliament", "house of commons", "senate", "senator", "legislature", "cabinet",
    "minister", "premier", "prime minister", "mp ", "mpp", "mla", "caucus", "committee",
    "supreme court", "federal court", "governor general", "city council", "mayor",
    "elections canada", "bank of canada", "government", "ottawa", "queen's park",
    // Process
    "bill c-", "bill s-", "legislation", "policy", "election", "by-election", "vote",
    "referendum", "motion", "inquiry", "hearing", "question period", "budget", "tariff",
    "regulation", "opposition", "poll", "campaign",
    // Policy domains
    "tax", "immigration", "healthcare", "health care", "housing", "pharmacare", "defence",
    "defense", "foreign affairs", "trade", "carbon", "climate", "indigenous", "reconciliation",
    "public safety", "policing", "firearms", "deficit", "spending", "pension", "dental care",
    "child care", "minimum wage", "labour", "strike",
    // Named events
    "foreign interference", "emergencies act", "freedom convoy", "sncl", "we charity",
    "arrivecan", "g7", "nato",
];

/// Keyword -> topic label used when the intelligence service is unavailable.
pub const TOPIC_KEYWORDS: &[(&str, &str)] = &[
    ("budget", "Federal Budget"),
    ("deficit", "Federal Budget"),
    ("fiscal", "Federal Budget"),
    ("tax", "Taxation"),
    ("gst", "Taxation"),
    ("carbon tax", "Carbon Pricing"),
    ("carbon price", "Carbon Pricing"),
    ("tariff", "Trade"),
    ("trade", "Trade"),
    ("cusma", "Trade"),
    ("immigration", "Immigration"),
    ("refugee", "Immigration"),
    ("asylum", "Immigration"),
    ("housing", "Housing"),
    ("rent", "Housing"),
    ("mortgage", "Housing"),
    ("health care", "Healthcare"),
    ("healthcare", "Healthcare"),
    ("hospital", "Healthcare"),
    ("pharmacare", "Healthcare"),
    ("climate", "Climate & Environment"),
    ("emissions", "Climate & Environment"),
    ("pipeline", "Energy"),
    ("oil and gas", "Energy"),
    ("defence", "Defence & Security"),
    ("defense", "Defence & Security"),
    ("military", "Defence & Security"),
    ("nato", "Defence & Security"),
    ("foreign interference", "Foreign Interference"),
    ("election", "Elections"),
    ("by-election", "Elections"),
    ("poll", "Elections"),
    ("indigenous", "Indigenous Affairs"),
    ("first nations", "Indigenous Affairs"),
    ("reconciliation", "Indigenous Affairs"),
    ("crime", "Public Safety"),
    ("police", "Public Safety"),
    ("firearm", "Public Safety"),
    ("interest rate", "Economy"),
    ("inflation", "Economy"),
    ("unemployment", "Economy"),
    ("jobs", "Economy"),
    ("strike", "Labour"),
    ("union", "Labour"),
    ("ethics commissioner", "Ethics & Accountability"),
    ("scandal", "Ethics & Accountability"),
    ("inquiry", "Ethics & Accountability"),
];

/// Public officials matched by name in the local fallback.
pub const OFFICIALS: &[&str] = &[
    "Mark Carney",
    "Justin Trudeau",
    "Pierre Poilievre",
    "Jagmeet Singh",
    "Yves-François Blanchet",
    "Elizabeth May",
    "Chrystia Freeland",
    "François-Philippe Champagne",
    "Mélanie Joly",
    "Dominic LeBlanc",
    "Anita Anand",
    "Bill Blair",
    "Sean Fraser",
    "Marc Miller",
    "Steven Guilbeault",
    "Jonathan Wilkinson",
    "Doug Ford",
    "Danielle Smith",
    "David Eby",
    "François Legault",
    "Wab Kinew",
    "Scott Moe",
    "Tim Houston",
    "Tiff Macklem",
    "Olivia Chow",
    "Donald Trump",
    "Joe Biden",
];

/// Policy-impact vocabulary for public-interest scoring.
pub const POLICY_TERMS: &[&str] = &[
    "budget", "bill", "legislation", "policy", "regulation", "law", "act", "reform",
    "amendment", "funding", "program", "mandate",
];

/// Public-safety vocabulary for public-interest scoring.
pub const SAFETY_TERMS: &[&str] = &[
    "safety", "emergency", "crime", "police", "violence", "health", "outbreak", "disaster",
    "wildfire", "flood", "security", "threat", "firearm",
];

/// Economic-impact vocabulary for public-interest scoring.
pub const ECONOMIC_TERMS: &[&str] = &[
    "economy", "economic", "inflation", "tax", "jobs", "employment", "tariff", "trade",
    "deficit", "debt", "interest rate", "cost of living", "wage", "gdp",
];

/// Controversy vocabulary for public-interest scoring.
pub const CONTROVERSY_TERMS: &[&str] = &[
    "scandal", "controversy", "controversial", "outrage", "backlash", "resign", "protest",
    "allegation", "investigation", "corruption", "misconduct", "criticism", "slammed",
];

/// True when `text` mentions any of `terms`.
pub fn mentions_any(text: &str, terms: &[&str]) -> bool {
    let lower = text.to_lowercase();
    terms.iter().any(|t| lower.contains(t))
}

/// Case-insensitive whole-word matcher over a fixed term list. Each term
/// also matches with a trailing "s" or "es".
#[derive(Debug, Clone)]
pub struct TermMatcher(Regex);

impl TermMatcher {
    pub fn new(terms: &[&str]) -> Self {
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)\b(?:{alternation})(?:s|es)?\b");
        Self(Regex::new(&pattern).expect("valid regex"))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    /// Non-overlapping whole-word occurrences in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.0.find_iter(text).count()
    }
}

pub static POLICY: LazyLock<TermMatcher> = LazyLock::new(|| TermMatcher::new(POLICY_TERMS));
pub static SAFETY: LazyLock<TermMatcher> = LazyLock::new(|| TermMatcher::new(SAFETY_TERMS));
pub static ECONOMIC: LazyLock<TermMatcher> = LazyLock::new(|| TermMatcher::new(ECONOMIC_TERMS));
pub static CONTROVERSY: LazyLock<TermMatcher> =
    LazyLock::new(|| TermMatcher::new(CONTROVERSY_TERMS));

/// One matcher per topic label, in first-seen table order.
static TOPICS: LazyLock<Vec<(&'static str, TermMatcher)>> = LazyLock::new(|| {
    let mut labels: Vec<&'static str> = Vec::new();
    for (_, label) in TOPIC_KEYWORDS {
        if !labels.contains(label) {
            labels.push(label);
        }
    }
    labels
        .into_iter()
        .map(|label| {
            let keywords: Vec<&str> = TOPIC_KEYWORDS
                .iter()
                .filter(|(_, l)| *l == label)
                .map(|(k, _)| *k)
                .collect();
            (label, TermMatcher::new(&keywords))
        })
        .collect()
});

/// Topic labels whose keywords appear as words in `text`, in table order.
pub fn local_topics(text: &str) -> Vec<String> {
    TOPICS
        .iter()
        .filter(|(_, matcher)| matcher.is_match(text))
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Officials from the fixed list mentioned in `text`.
pub fn local_officials(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    OFFICIALS
        .iter()
        .filter(|name| lower.contains(&name.to_lowercase()))
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_is_case_insensitive() {
        assert!(mentions_any("PARLIAMENT resumes sitting", POLITICAL_TERMS));
        assert!(mentions_any("Bill C-12 budget hearing", POLITICAL_TERMS));
        assert!(!mentions_any("Leafs win in overtime", POLITICAL_TERMS));
    }

    #[test]
    fn local_topics_dedupes_labels() {
        let topics =
            local_topics("Budget deficit widens as fiscal outlook dims; housing rents climb");
        assert_eq!(topics, vec!["Federal Budget".to_string(), "Housing".to_string()]);
    }

    #[test]
    fn local_officials_match_by_substring() {
        let officials = local_officials("pierre poilievre questioned Mark Carney on spending");
        assert_eq!(officials, vec!["Mark Carney".to_string(), "Pierre Poilievre".to_string()]);
    }

    #[test]
    fn topics_ignore_words_that_merely_contain_a_keyword() {
        let topics = local_topics("The current government took a different approach to parents");
        assert!(topics.is_empty(), "{topics:?}");
        assert!(local_topics("Reunion tour sells out; crimean history lecture").is_empty());
        assert_eq!(local_topics("Rents climb again"), vec!["Housing".to_string()]);
    }

    #[test]
    fn hits_count_every_occurrence() {
        let budget = TermMatcher::new(&["budget"]);
        assert_eq!(budget.count("Budget talk: the budget, the BUDGETS"), 3);
        assert_eq!(POLICY.count("nothing here"), 0);
    }

    #[test]
    fn hits_require_whole_words() {
        assert_eq!(POLICY.count("The impact of the fact is a billion in lawyer fees"), 0);
        assert_eq!(POLICY.count("The bill became law under the act"), 3);
        assert_eq!(ECONOMIC.count("Taxes and tariffs"), 2);
    }
}
