use company_url_finder::{input_loader, logger};
use company_url_finder::job::{NOT_FOUND_FIELDS, RESULT_FIELDS};
use company_url_finder::linkedin::LINKEDIN_FIELDS;
use company_url_finder::{Config, DuckDuckGoSearch, InputRecord, JobSummary, LinkedInJob, LookupJob, LookupMode, RealTimeCsvWriter, UrlRanker};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use log::{info, error};

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting Company URL Finder...");

    // Optional JSON config as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None if Path::new("config.json").exists() => Config::load("config.json")?,
        None => Config::default(),
    };

    let records = input_loader::load_records(&config.input_path);
    if records.is_empty() {
        error!("No companies found in {:?}. Expected a CSV with a 'Company' column or one name per line.", config.input_path);
        return Ok(());
    }

    let search = Arc::new(
        DuckDuckGoSearch::new(config.max_results, config.search_delay)?
            .with_excluded_domains(config.search_exclusions()),
    );

    let summary = match config.mode {
        LookupMode::Website => run_website_lookup(&config, search, records)?,
        LookupMode::Linkedin => run_linkedin_lookup(&config, search, records)?,
    };

    println!(
        "{} rows: {} matched, {} not found, {} search failures, {} rows dropped",
        summary.total, summary.matched, summary.not_found, summary.search_failures, summary.dropped_rows
    );
    Ok(())
}

fn run_website_lookup(
    config: &Config,
    search: Arc<DuckDuckGoSearch>,
    records: Vec<InputRecord>,
) -> Result<JobSummary, Box<dyn Error>> {
    let results = Arc::new(RealTimeCsvWriter::new(&config.output_path, &RESULT_FIELDS)?);

    let mut job = LookupJob::new(
        search,
        UrlRanker::new(config.rank_weights),
        results.clone(),
        config.max_workers,
    );
    if let Some(path) = &config.not_found_path {
        job = job.with_not_found(Arc::new(RealTimeCsvWriter::new(path, &NOT_FOUND_FIELDS)?));
    }

    let summary = job.run(records);

    println!("Search complete. Results in {}", results.path().display());
    if let Some(path) = &config.not_found_path {
        println!("Companies without results in {}", path.display());
    }
    Ok(summary)
}

fn run_linkedin_lookup(
    config: &Config,
    search: Arc<DuckDuckGoSearch>,
    records: Vec<InputRecord>,
) -> Result<JobSummary, Box<dyn Error>> {
    let writer = Arc::new(RealTimeCsvWriter::new(&config.output_path, &LINKEDIN_FIELDS)?);

    // A plain list has one website per line, which lands in the company field.
    let websites = records
        .iter()
        .map(|r| r.known_website().unwrap_or(r.company.as_str()).to_string())
        .collect();

    let summary = LinkedInJob::new(search, writer.clone(), config.max_workers).run(websites);

    println!("LinkedIn search complete. Results in {}", writer.path().display());
    Ok(summary)
}
