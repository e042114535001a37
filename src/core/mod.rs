pub mod assign;
pub mod ingest;
pub mod summary;

pub use crate::domain::model::{
    Assignment, AssignmentStatus, Employee, EmployeeAssignments, EmployeeSummary, IngestOutcome,
    Record,
};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
