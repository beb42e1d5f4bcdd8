use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;
use url::Url;

const TRIVIAL_WORDS: &[&str] = &[
    "company", "inc", "group", "corporation", "co", "corp",
    "university", "college", "&", "llc", "the", "of", "a", "an",
    "llp", "ltd", "limited",
];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    // per occurrence
    pub count: f64,
    // times the 1-based result position
    pub order: f64,
    // times the main label length
    pub length: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        RankWeights {
            count: 0.25,
            order: -0.25,
            length: -0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Provided,
    DirectDomain,
    Acronym,
    PartialNonword,
    NoMatch,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Provided => "provided",
            MatchKind::DirectDomain => "direct domain match",
            MatchKind::Acronym => "acronym match",
            MatchKind::PartialNonword => "partial nonword match",
            MatchKind::NoMatch => "no match found",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub url: String,
    pub rank: f64,
    pub kind: MatchKind,
}

// Scheme-less values like `acme.com/about` are accepted too.
pub fn simplify_url(url: &str) -> String {
    let url = url.trim();
    let parsed = Url::parse(url).or_else(|_| Url::parse(&format!("http://{}", url)));
    match parsed {
        Ok(u) => u.host_str().unwrap_or_default().to_string(),
        Err(_) => String::new(),
    }
}

// The label that identifies the organization: `acme` for both `acme.com` and `www.acme.com`.
fn main_label(host: &str) -> &str {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() > 2 {
        parts[1]
    } else {
        parts[0]
    }
}

fn is_trivial(word: &str) -> bool {
    TRIVIAL_WORDS.contains(&word.to_lowercase().as_str())
}

pub fn company_acronyms(company: &str) -> HashSet<String> {
    let mut acronyms = HashSet::new();
    acronyms.insert(initials(company.split_whitespace()));
    acronyms.insert(initials(company.split_whitespace().filter(|w| !is_trivial(w))));
    acronyms
}

fn initials<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.filter_map(|w| w.chars().next()).collect::<String>().to_lowercase()
}

pub struct UrlRanker {
    weights: RankWeights,
    dictionary: Option<HashSet<String>>,
}

impl Default for UrlRanker {
    fn default() -> Self {
        UrlRanker::new(RankWeights::default())
    }
}

impl UrlRanker {
    pub fn new(weights: RankWeights) -> Self {
        UrlRanker {
            weights,
            dictionary: None,
        }
    }

    // Words missing from it count as distinctive names when matching domains.
    pub fn with_dictionary<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dictionary = Some(words.into_iter().map(|w| w.into().to_lowercase()).collect());
        self
    }

    pub fn arrange_words_by_importance(&self, company: &str) -> (Vec<String>, Vec<String>) {
        let lowered = company.to_lowercase();
        let mut words: Vec<&str> = lowered.split_whitespace().collect();
        words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));

        let mut nonwords = Vec::new();
        let mut others = Vec::new();
        for word in words.into_iter().filter(|w| !is_trivial(w)) {
            match &self.dictionary {
                Some(dict) if !dict.contains(word) => nonwords.push(word.to_string()),
                _ => others.push(word.to_string()),
            }
        }
        (nonwords, others)
    }

    /// Scores each distinct host and returns them best first, normalized to `[0, 1]`.
    pub fn rank_urls(&self, urls: &[String]) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut min_rank = f64::INFINITY;
        let mut max_rank = f64::NEG_INFINITY;

        for (i, url) in urls.iter().enumerate() {
            let host = simplify_url(url);
            // Still counts as a position so later results keep their order weight.
            if host.is_empty() {
                continue;
            }
            let domain_length = main_label(&host).chars().count() as f64;
            let rank = self.weights.count
                + self.weights.order * (i + 1) as f64
                + self.weights.length * domain_length;

            let slot = *index.entry(host.clone()).or_insert_with(|| {
                ranked.push((host, 0.0));
                ranked.len() - 1
            });
            ranked[slot].1 += rank;

            let total = ranked[slot].1;
            min_rank = min_rank.min(total);
            max_rank = max_rank.max(total);
        }

        let divisor = (max_rank - min_rank).max(1.0);
        let mut normalized: Vec<(String, f64)> = ranked
            .into_iter()
            .map(|(host, rank)| (host, (rank - min_rank) / divisor))
            .collect();
        normalized.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        normalized
    }

    pub fn find_best_url(&self, company: &str, urls: &[String]) -> BestMatch {
        let company: String = company.chars().filter(|c| *c != '.' && *c != ',').collect();
        let ranked = self.rank_urls(urls);
        let (nonwords, _others) = self.arrange_words_by_importance(&company);
        let acronyms = company_acronyms(&company);
        let squashed = company.replace(' ', "").to_lowercase();

        for (domain, rank) in &ranked {
            if domain.is_empty() {
                continue;
            }
            let parts: Vec<&str> = domain.split('.').collect();
            let label = if parts.len() >= 3 { parts[1] } else { parts[0] };
            if label.is_empty() {
                continue;
            }

            if squashed.contains(label) || label.contains(squashed.as_str()) {
                return BestMatch {
                    url: domain.clone(),
                    rank: *rank,
                    kind: MatchKind::DirectDomain,
                };
            }
            if acronyms.contains(label) {
                return BestMatch {
                    url: domain.clone(),
                    rank: *rank,
                    kind: MatchKind::Acronym,
                };
            }
            if nonwords.iter().any(|w| label.contains(w.as_str())) {
                return BestMatch {
                    url: domain.clone(),
                    rank: rank * 0.5,
                    kind: MatchKind::PartialNonword,
                };
            }
        }

        BestMatch {
            url: ranked.first().map(|(d, _)| d.clone()).unwrap_or_default(),
            rank: 0.0,
            kind: MatchKind::NoMatch,
        }
    }
}
