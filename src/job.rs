use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{info, warn, error};
use serde::Serialize;

use crate::counter::ProgressCounter;
use crate::csv_writer::{RealTimeCsvWriter, ResultRow};
use crate::input_loader::InputRecord;
use crate::ranking::{BestMatch, MatchKind, UrlRanker};
use crate::search_engine::{build_query, CompanySearch};

pub const RESULT_FIELDS: [&str; 4] = ["Company", "Best URL", "Match Rank", "Match Type"];
// Same columns the input loader accepts, so the file can be fed back in.
pub const NOT_FOUND_FIELDS: [&str; 3] = ["Company", "Website", "Country"];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub total: usize,
    pub matched: usize,
    pub not_found: usize,
    pub search_failures: usize,
    pub dropped_rows: usize,
}

#[derive(Default)]
pub(crate) struct Tally {
    pub(crate) matched: AtomicUsize,
    pub(crate) not_found: AtomicUsize,
    pub(crate) search_failures: AtomicUsize,
    pub(crate) dropped_rows: AtomicUsize,
}

impl Tally {
    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn summary(&self, total: usize) -> JobSummary {
        JobSummary {
            total,
            matched: self.matched.load(Ordering::SeqCst),
            not_found: self.not_found.load(Ordering::SeqCst),
            search_failures: self.search_failures.load(Ordering::SeqCst),
            dropped_rows: self.dropped_rows.load(Ordering::SeqCst),
        }
    }
}

// Drains `items` on up to `max_workers` threads and returns the tallied summary.
pub(crate) fn run_pool<T, F>(items: Vec<T>, max_workers: usize, label: impl Fn(&T) -> String + Sync, handle: F) -> JobSummary
where
    T: Send,
    F: Fn(T, &Tally) + Sync,
{
    let total = items.len();
    let queue = Mutex::new(VecDeque::from(items));
    let progress = ProgressCounter::default();
    let tally = Tally::default();
    let workers = max_workers.max(1).min(total.max(1));

    info!("Processing {} items with {} workers", total, workers);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                let Some(item) = next else { break };

                let done = progress.increment();
                info!("Processed {}/{}: {}", done, total, label(&item));
                handle(item, &tally);
            });
        }
    });

    let summary = tally.summary(total);
    match serde_json::to_string(&summary) {
        Ok(json) => info!("Run complete: {}", json),
        Err(_) => info!("Run complete: {:?}", summary),
    }
    summary
}

enum Outcome {
    Found(BestMatch),
    NotFound,
}

pub struct LookupJob {
    search: Arc<dyn CompanySearch>,
    ranker: UrlRanker,
    results: Arc<RealTimeCsvWriter>,
    not_found: Option<Arc<RealTimeCsvWriter>>,
    max_workers: usize,
}

impl LookupJob {
    pub fn new(
        search: Arc<dyn CompanySearch>,
        ranker: UrlRanker,
        results: Arc<RealTimeCsvWriter>,
        max_workers: usize,
    ) -> Self {
        LookupJob {
            search,
            ranker,
            results,
            not_found: None,
            max_workers: max_workers.max(1),
        }
    }

    pub fn with_not_found(mut self, writer: Arc<RealTimeCsvWriter>) -> Self {
        self.not_found = Some(writer);
        self
    }

    pub fn run(&self, records: Vec<InputRecord>) -> JobSummary {
        run_pool(
            records,
            self.max_workers,
            |record| record.company.clone(),
            |record, tally| self.process(&record, tally),
        )
    }

    fn process(&self, record: &InputRecord, tally: &Tally) {
        match self.lookup(record, tally) {
            Outcome::Found(best) => {
                Tally::bump(&tally.matched);
                let row = result_row(&record.company, &best);
                if self.results.write_row(&row).is_err() {
                    Tally::bump(&tally.dropped_rows);
                }
            }
            Outcome::NotFound => {
                Tally::bump(&tally.not_found);
                warn!("Could not find website for {}", record.company);
                if let Some(writer) = &self.not_found {
                    if writer.write_row(&not_found_row(record)).is_err() {
                        Tally::bump(&tally.dropped_rows);
                    }
                }
            }
        }
    }

    fn lookup(&self, record: &InputRecord, tally: &Tally) -> Outcome {
        if let Some(website) = record.known_website() {
            return Outcome::Found(BestMatch {
                url: website.to_string(),
                rank: 1.0,
                kind: MatchKind::Provided,
            });
        }

        let urls = match self.search.search(&build_query(record)) {
            Ok(urls) => urls,
            Err(e) => {
                error!("Search failed for '{}': {}", record.company, e);
                Tally::bump(&tally.search_failures);
                return Outcome::NotFound;
            }
        };

        let best = self.ranker.find_best_url(&record.company, &urls);
        if best.url.is_empty() {
            Outcome::NotFound
        } else {
            Outcome::Found(best)
        }
    }
}

fn result_row(company: &str, best: &BestMatch) -> ResultRow {
    let values = [
        company.to_string(),
        best.url.clone(),
        format!("{:.2}", best.rank),
        best.kind.to_string(),
    ];
    RESULT_FIELDS
        .iter()
        .map(|f| f.to_string())
        .zip(values)
        .collect()
}

fn not_found_row(record: &InputRecord) -> ResultRow {
    let values = [
        record.company.clone(),
        record.website.clone().unwrap_or_default(),
        record.country.clone(),
    ];
    NOT_FOUND_FIELDS
        .iter()
        .map(|f| f.to_string())
        .zip(values)
        .collect()
}
