use std::sync::Arc;

use log::{info, warn, error};
use url::Url;

use crate::csv_writer::{RealTimeCsvWriter, ResultRow};
use crate::job::{run_pool, JobSummary, Tally};
use crate::search_engine::CompanySearch;

pub const LINKEDIN_FIELDS: [&str; 2] = ["Website", "LinkedIn URL"];
pub const NOT_FOUND: &str = "Not Found";
pub const SEARCH_ERROR: &str = "Error";

// Only the first few results are worth checking.
const RESULTS_CHECKED: usize = 5;

pub fn linkedin_query(website: &str) -> String {
    format!("site:linkedin.com \"{}\"", website.trim())
}

pub fn validate_linkedin_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    host.contains("linkedin.com").then(|| parsed.to_string())
}

pub struct LinkedInJob {
    search: Arc<dyn CompanySearch>,
    writer: Arc<RealTimeCsvWriter>,
    max_workers: usize,
}

impl LinkedInJob {
    pub fn new(search: Arc<dyn CompanySearch>, writer: Arc<RealTimeCsvWriter>, max_workers: usize) -> Self {
        LinkedInJob {
            search,
            writer,
            max_workers: max_workers.max(1),
        }
    }

    pub fn run(&self, websites: Vec<String>) -> JobSummary {
        run_pool(
            websites,
            self.max_workers,
            |website| website.clone(),
            |website, tally| self.process(&website, tally),
        )
    }

    fn process(&self, website: &str, tally: &Tally) {
        let linkedin_url = match self.search.search(&linkedin_query(website)) {
            Ok(urls) => match urls.iter().take(RESULTS_CHECKED).find_map(|u| validate_linkedin_url(u)) {
                Some(url) => {
                    info!("LinkedIn page for {}: {}", website, url);
                    Tally::bump(&tally.matched);
                    url
                }
                None => {
                    warn!("No LinkedIn page found for {}", website);
                    Tally::bump(&tally.not_found);
                    NOT_FOUND.to_string()
                }
            },
            Err(e) => {
                error!("LinkedIn search failed for '{}': {}", website, e);
                Tally::bump(&tally.search_failures);
                SEARCH_ERROR.to_string()
            }
        };

        let row: ResultRow = LINKEDIN_FIELDS
            .iter()
            .map(|f| f.to_string())
            .zip([website.to_string(), linkedin_url])
            .collect();
        if self.writer.write_row(&row).is_err() {
            Tally::bump(&tally.dropped_rows);
        }
    }
}
