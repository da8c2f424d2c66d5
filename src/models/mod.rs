pub mod missing_report;
pub mod officer;
pub mod report_photo;
pub mod report_status_event;
pub mod reporting_user;

pub use missing_report::{Entity as MissingReport, Model as MissingReportModel};
pub use officer::{Entity as Officer, Model as OfficerModel};
pub use report_photo::Entity as ReportPhoto;
pub use report_status_event::Entity as ReportStatusEvent;
pub use reporting_user::{Entity as ReportingUser, Model as ReportingUserModel};
