use std::collections::HashSet;
use std::fs;
use std::path::Path;
use encoding_rs::{UTF_8, WINDOWS_1252};
use log::{info, warn, error};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InputRecord {
    #[serde(rename = "Company", alias = "company", alias = "Company Name", alias = "company name", alias = "Business Name", default)]
    pub company: String,
    #[serde(rename = "Website", alias = "website", alias = "url", alias = "URL", default)]
    pub website: Option<String>,
    #[serde(rename = "Country", alias = "country", alias = "Location", default)]
    pub country: String,
}

impl InputRecord {
    pub fn new(company: impl Into<String>) -> Self {
        InputRecord {
            company: company.into(),
            website: None,
            country: String::new(),
        }
    }

    pub fn known_website(&self) -> Option<&str> {
        self.website.as_deref().map(str::trim).filter(|w| !w.is_empty())
    }
}

// `.csv` files need a company column, anything else is one company per line.
pub fn load_records<P: AsRef<Path>>(filename: P) -> Vec<InputRecord> {
    let path_ref = filename.as_ref();

    if !path_ref.exists() {
         error!("Input file {:?} does not exist.", path_ref);
         return Vec::new();
    }

    let content = match read_text(path_ref) {
        Ok(text) => text,
        Err(e) => {
            error!("Could not read input file {:?}: {}", path_ref, e);
            return Vec::new();
        }
    };

    let is_csv = path_ref
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    let records = if is_csv { parse_csv(&content, path_ref) } else { parse_list(&content, path_ref) };
    dedup_records(records)
}

// UTF-8 first, then Windows-1252 for lists exported from older spreadsheet tools.
fn read_text(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let (text, _, had_errors) = UTF_8.decode(&bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }

    warn!("{:?} is not valid UTF-8, decoding as {}", path, WINDOWS_1252.name());
    let (text, _, _) = WINDOWS_1252.decode(&bytes);
    Ok(text.into_owned())
}

fn parse_csv(content: &str, path: &Path) -> Vec<InputRecord> {
    let mut records = Vec::new();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    for result in rdr.deserialize() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => error!("Error parsing CSV record: {}", e),
        }
    }
    info!("Loaded {} records from CSV {:?}", records.len(), path);
    records
}

fn parse_list(content: &str, path: &Path) -> Vec<InputRecord> {
    let records: Vec<InputRecord> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(InputRecord::new)
        .collect();
    info!("Loaded {} companies from {:?}", records.len(), path);
    records
}

fn dedup_records(records: Vec<InputRecord>) -> Vec<InputRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|mut record| {
            record.company = record.company.trim().to_string();
            // Website-only rows feed the LinkedIn lookup.
            let key = match record.known_website() {
                _ if !record.company.is_empty() => record.company.clone(),
                Some(website) => website.to_string(),
                None => return None,
            };
            seen.insert(key).then_some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_csv_with_company_name_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(
            &path,
            "Company Name,Website,Country\nAcme, ,USA\nGlobex,https://globex.com,\nAcme,,USA\n",
        )
        .unwrap();

        let records = load_records(&path);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].country, "USA");
        assert_eq!(records[0].known_website(), None);
        assert_eq!(records[1].known_website(), Some("https://globex.com"));
    }

    #[test]
    fn company_only_csv_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(&path, "Company\nInitech\n").unwrap();

        let records = load_records(&path);

        assert_eq!(records, vec![InputRecord::new("Initech")]);
    }

    #[test]
    fn website_only_csv_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websites.csv");
        fs::write(&path, "Website\nacme.com\n\nglobex.com\nacme.com\n").unwrap();

        let websites: Vec<String> = load_records(&path)
            .iter()
            .filter_map(|r| r.known_website().map(str::to_string))
            .collect();

        assert_eq!(websites, vec!["acme.com".to_string(), "globex.com".to_string()]);
    }

    #[test]
    fn reads_plain_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cant_find_urls.txt");
        fs::write(&path, "  Acme Corp \n\nGlobex\nAcme Corp\n").unwrap();

        let names: Vec<String> = load_records(&path).into_iter().map(|r| r.company).collect();

        assert_eq!(names, vec!["Acme Corp".to_string(), "Globex".to_string()]);
    }

    #[test]
    fn windows_1252_list_keeps_accents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.txt");
        fs::write(&path, b"Soci\xe9t\xe9 G\xe9n\xe9rale\r\nNestl\xe9\r\n").unwrap();

        let names: Vec<String> = load_records(&path).into_iter().map(|r| r.company).collect();

        assert_eq!(names, vec!["Société Générale".to_string(), "Nestlé".to_string()]);
    }

    #[test]
    fn windows_1252_csv_rows_are_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(&path, b"Company,Country\nAcme,USA\nSoci\xe9t\xe9 G\xe9n\xe9rale,France\n").unwrap();

        let records = load_records(&path);

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].company, "Société Générale");
        assert_eq!(records[1].country, "France");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(&path, "\u{feff}Company\nZürich Versicherung\n").unwrap();

        assert_eq!(load_records(&path), vec![InputRecord::new("Zürich Versicherung")]);
    }

    #[test]
    fn missing_file_yields_no_records() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_records(dir.path().join("nope.csv")).is_empty());
    }
}
