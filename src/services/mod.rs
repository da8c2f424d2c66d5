pub mod account;
pub mod alert;
pub mod bootstrap_officer;
pub mod ingestion;
pub mod photo;
pub mod search;
pub mod triage;

pub use account::AccountService;
pub use alert::{AlertFeed, AlertService};
pub use ingestion::ReportService;
pub use photo::PhotoService;
pub use search::SearchService;
pub use triage::TriageService;
