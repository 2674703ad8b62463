//! Employee attendance records.
//!
//! [`AttendanceApp`] owns the collection together with the transient form and
//! dialog state and is purely synchronous. [`Session`] shares it between
//! request handlers, persists the collection through an
//! [`EmployeeRepository`] after every change and runs the notice timers.

mod app;
mod delete;
mod draft;
mod error;
mod filter;
mod model;
mod notice;
pub mod profile;
mod repository;
mod session;

pub use app::{AttendanceApp, Effects, FormMode, Snapshot, Submitted};
pub use delete::DeleteModal;
pub use draft::{Draft, DraftField};
pub use error::{AttendanceError, AttendanceResult, SubmitError};
pub use filter::{SearchTerm, filter_employees};
pub use model::{Attendance, Choice, Department, Employee, EmployeeId, Gender};
pub use notice::{NOTICE_TTL, Notice, NoticeBanner, NoticeKind, NoticeTicket};
pub use profile::{ProfileReadToken, encode_data_url, read_data_url};
pub use repository::{EMPLOYEES_KEY, EmployeeRepository};
pub use session::Session;
