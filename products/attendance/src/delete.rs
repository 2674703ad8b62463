use std::mem;

use crate::model::EmployeeId;

/// Two-step delete confirmation. At most one deletion is pending; a new
/// request replaces the previous target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeleteModal {
    #[default]
    Hidden,
    Pending(EmployeeId),
}

impl DeleteModal {
    pub fn open(&mut self, id: EmployeeId) {
        *self = DeleteModal::Pending(id);
    }

    /// Closes the dialog, handing back the target if one was pending.
    pub fn close(&mut self) -> Option<EmployeeId> {
        match mem::take(self) {
            DeleteModal::Pending(id) => Some(id),
            DeleteModal::Hidden => None,
        }
    }

    pub fn pending(&self) -> Option<&EmployeeId> {
        match self {
            DeleteModal::Pending(id) => Some(id),
            DeleteModal::Hidden => None,
        }
    }
}
