//! Typed records shared by the repositories, services and handlers.

pub mod account;
pub mod alert;
pub mod report;

pub use account::{NewOfficer, NewReportingUser, Officer, ReportingUser, Role};
pub use alert::{Alert, AlertKind, NewAlert};
pub use report::{
    MissingReport, NewReport, ReporterContact, ReporterIdentity, ReportStatus, ReportSubject,
    ReportView, StatusChange, StatusEvent, StatusFilter,
};
