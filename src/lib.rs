pub mod config;
pub mod counter;
pub mod csv_writer;
pub mod delay_manager;
pub mod input_loader;
pub mod job;
pub mod linkedin;
pub mod logger;
pub mod ranking;
pub mod search_engine;

// Exporting types for convenience
pub use config::{Config, LookupMode};
pub use counter::ProgressCounter;
pub use csv_writer::{RealTimeCsvWriter, ResultRow, RowError, WriterError};
pub use input_loader::InputRecord;
pub use job::{JobSummary, LookupJob};
pub use linkedin::LinkedInJob;
pub use logger::{GlobalLog, LogSink, MemoryLog};
pub use ranking::{BestMatch, MatchKind, UrlRanker};
pub use search_engine::{CompanySearch, DuckDuckGoSearch};
