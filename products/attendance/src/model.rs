use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque employee identity. Compared as text, so `"01"` and `"1"` are
/// different employees.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EmployeeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for EmployeeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EmployeeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A fixed set of labelled options, as offered by the form's radio groups and
/// select box. Labels double as the persisted representation.
pub trait Choice: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Exact, case-sensitive label match.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.label() == label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Choice for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female, Self::Other];

    fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "HR")]
    Hr,
    Finance,
    Development,
    Marketing,
}

impl Choice for Department {
    const ALL: &'static [Self] = &[
        Self::Hr,
        Self::Finance,
        Self::Development,
        Self::Marketing,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::Finance => "Finance",
            Self::Development => "Development",
            Self::Marketing => "Marketing",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attendance {
    Present,
    Absent,
}

impl Choice for Attendance {
    const ALL: &'static [Self] = &[Self::Present, Self::Absent];

    fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })+
    };
}

display_label!(Gender, Department, Attendance);

/// One stored attendance entry. Serialized field-for-field into the
/// `employees` slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub gender: Gender,
    pub department: Department,
    pub attendance: Attendance,
    /// Profile image as a data URL.
    pub profile: String,
}

impl Employee {
    pub fn is_present(&self) -> bool {
        self.attendance == Attendance::Present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_form_labels() {
        let employee = Employee {
            id: EmployeeId::new("01"),
            name: "Ann".into(),
            gender: Gender::Female,
            department: Department::Hr,
            attendance: Attendance::Present,
            profile: "data:image/png;base64,AA==".into(),
        };
        let value = serde_json::to_value(&employee).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "01",
                "name": "Ann",
                "gender": "Female",
                "department": "HR",
                "attendance": "Present",
                "profile": "data:image/png;base64,AA==",
            })
        );
    }

    #[test]
    fn ids_compare_as_text() {
        assert_ne!(EmployeeId::new("01"), EmployeeId::new("1"));
        assert!(EmployeeId::new("7") == *"7");
    }

    #[test]
    fn labels_parse_case_sensitively() {
        assert_eq!(Department::from_label("HR"), Some(Department::Hr));
        assert_eq!(Department::from_label("hr"), None);
        assert_eq!(Gender::from_label(""), None);
        assert_eq!(Attendance::Absent.to_string(), "Absent");
    }
}
