use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT, ACCEPT_LANGUAGE};
use scraper::{Html, Selector};
use std::time::Duration;
use log::{info, warn};
use thiserror::Error;
use url::Url;
use crate::delay_manager::DelayRange;
use crate::input_loader::InputRecord;

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

// Results on these hosts are never a company's own website.
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "facebook.com", "instagram.com", "linkedin.com", "twitter.com", "x.com",
    "youtube.com", "pinterest.com", "glassdoor.com", "indeed.com",
    "justdial.com", "indiamart.com", "yellowpages.com",
];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search returned status {0}")]
    Status(reqwest::StatusCode),
}

// Candidate URLs in result order.
pub trait CompanySearch: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

pub fn build_query(record: &InputRecord) -> String {
    let country = record.country.trim();
    if country.is_empty() {
        record.company.trim().to_string()
    } else {
        format!("{} {}", record.company.trim(), country)
    }
}

pub struct DuckDuckGoSearch {
    client: Client,
    max_results: usize,
    delay: DelayRange,
    excluded_domains: Vec<String>,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize, delay: DelayRange) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(DuckDuckGoSearch {
            client,
            max_results,
            delay,
            excluded_domains: DEFAULT_EXCLUDED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        })
    }

    pub fn with_excluded_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_domains = domains.into_iter().map(Into::into).collect();
        self
    }
}

impl CompanySearch for DuckDuckGoSearch {
    fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let search_url = format!("{}?q={}", SEARCH_ENDPOINT, urlencoding::encode(query));

        info!("Searching for: '{}'", query);
        self.delay.pause();

        let resp = self.client.get(&search_url).send()?;
        if !resp.status().is_success() {
            warn!("Search failed with status: {}", resp.status());
            return Err(SearchError::Status(resp.status()));
        }

        let text = resp.text()?;
        let urls = parse_result_links(&text, self.max_results, self.excluded_domains.as_slice());
        if urls.is_empty() {
            warn!("No URLs found for query: {}", query);
        }
        Ok(urls)
    }
}

pub fn parse_result_links<S: AsRef<str>>(html: &str, max_results: usize, excluded_domains: &[S]) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".result__a").unwrap();
    let mut urls = Vec::new();

    for element in document.select(&selector) {
        if urls.len() >= max_results {
            break;
        }
        let Some(href) = element.value().attr("href") else { continue };
        let Some(target) = resolve_redirect(href) else { continue };

        let skip = is_excluded(&target, "duckduckgo.com")
            || excluded_domains.iter().any(|d| is_excluded(&target, d.as_ref()));
        if !skip && !urls.contains(&target) {
            urls.push(target);
        }
    }
    urls
}

fn is_excluded(url: &str, domain: &str) -> bool {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    host == domain || host.ends_with(&format!(".{}", domain))
}

// DuckDuckGo wraps results as `//duckduckgo.com/l/?uddg=<encoded target>`.
fn resolve_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;

    if parsed.domain().map_or(false, |d| d.ends_with("duckduckgo.com")) {
        if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
            let target = Url::parse(&target).ok()?;
            return is_web_url(&target).then(|| target.to_string());
        }
    }
    is_web_url(&parsed).then_some(absolute)
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().map_or(false, |h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="result"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.acme.com%2F&amp;rut=abc">Acme</a></div>
          <div class="result"><a class="result__a" href="https://www.linkedin.com/company/acme">Acme | LinkedIn</a></div>
          <div class="result"><a class="result__a" href="https://en.wikipedia.org/wiki/Acme">Acme - Wikipedia</a></div>
          <div class="result"><a class="result__a" href="https://www.acme.com/">Acme again</a></div>
          <div class="result"><a class="result__a" href="https://duckduckgo.com/y.js?ad=1">Ad</a></div>
          <div class="result"><a class="result__a" href="https://acme-news.net/">News</a></div>
        </body></html>
    "#;

    #[test]
    fn parses_and_filters_result_links() {
        let urls = parse_result_links(RESULTS_PAGE, 10, DEFAULT_EXCLUDED_DOMAINS);
        assert_eq!(
            urls,
            vec![
                "https://www.acme.com/".to_string(),
                "https://en.wikipedia.org/wiki/Acme".to_string(),
                "https://acme-news.net/".to_string(),
            ]
        );
    }

    #[test]
    fn non_web_redirect_targets_are_skipped() {
        let page = r#"
            <a class="result__a" href="//duckduckgo.com/l/?uddg=mailto%3Ainfo%40acme.com">Mail</a>
            <a class="result__a" href="//duckduckgo.com/l/?uddg=javascript%3Avoid(0)">Script</a>
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Facme.com%2F">Acme</a>
        "#;
        assert_eq!(parse_result_links(page, 10, DEFAULT_EXCLUDED_DOMAINS), vec!["https://acme.com/".to_string()]);
    }

    #[test]
    fn respects_max_results() {
        let urls = parse_result_links(RESULTS_PAGE, 1, DEFAULT_EXCLUDED_DOMAINS);
        assert_eq!(urls, vec!["https://www.acme.com/".to_string()]);
    }

    #[test]
    fn exclusions_match_hosts_not_substrings() {
        let page = r#"
            <a class="result__a" href="https://www.fedex.com/">FedEx</a>
            <a class="result__a" href="https://x.com/fedex">FedEx on X</a>
            <a class="result__a" href="https://www.linkedin.com/company/fedex">FedEx | LinkedIn</a>
        "#;
        assert_eq!(
            parse_result_links(page, 10, DEFAULT_EXCLUDED_DOMAINS),
            vec!["https://www.fedex.com/".to_string()]
        );

        let no_exclusions: [&str; 0] = [];
        assert_eq!(parse_result_links(page, 10, &no_exclusions).len(), 3);
    }

    #[test]
    fn query_includes_country_when_present() {
        let mut record = InputRecord::new("Acme Corp");
        assert_eq!(build_query(&record), "Acme Corp");
        record.country = "Germany".to_string();
        assert_eq!(build_query(&record), "Acme Corp Germany");
    }

    #[test]
    #[ignore = "hits the live DuckDuckGo endpoint"]
    fn live_search_finds_rust_foundation() {
        let engine = DuckDuckGoSearch::new(10, DelayRange::none()).unwrap();
        let urls = engine.search("Rust Foundation").unwrap();
        assert!(urls.iter().any(|u| u.contains("rust-lang")));
    }
}
