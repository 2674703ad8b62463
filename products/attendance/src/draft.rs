use serde::Serialize;

use crate::{
    error::SubmitError,
    model::{Attendance, Choice, Department, Employee, EmployeeId, Gender},
};

/// In-progress form state. Every field may be blank until submit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub id: String,
    pub name: String,
    pub gender: Option<Gender>,
    pub department: Option<Department>,
    pub attendance: Option<Attendance>,
    pub profile: String,
}

/// Form inputs addressable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Id,
    Name,
    Gender,
    Department,
    Attendance,
    Profile,
}

impl DraftField {
    pub const ALL: [DraftField; 6] = [
        DraftField::Id,
        DraftField::Name,
        DraftField::Gender,
        DraftField::Department,
        DraftField::Attendance,
        DraftField::Profile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DraftField::Id => "id",
            DraftField::Name => "name",
            DraftField::Gender => "gender",
            DraftField::Department => "department",
            DraftField::Attendance => "attendance",
            DraftField::Profile => "profile",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl Draft {
    /// Writes one input's raw value. Choice inputs take their exact label; a
    /// blank or unknown label clears the selection.
    pub fn set(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Id => self.id = value.to_string(),
            DraftField::Name => self.name = value.to_string(),
            DraftField::Gender => self.gender = Gender::from_label(value),
            DraftField::Department => self.department = Department::from_label(value),
            DraftField::Attendance => self.attendance = Attendance::from_label(value),
            DraftField::Profile => self.profile = value.to_string(),
        }
    }

    /// Presence checks. `require_profile` is set when creating; an edit keeps
    /// whatever profile was pre-filled from the record.
    pub fn validate(&self, require_profile: bool) -> Result<Employee, SubmitError> {
        let (Some(gender), Some(department), Some(attendance)) =
            (self.gender, self.department, self.attendance)
        else {
            return Err(SubmitError::MissingFields);
        };
        if self.id.is_empty() || self.name.is_empty() {
            return Err(SubmitError::MissingFields);
        }
        if require_profile && self.profile.is_empty() {
            return Err(SubmitError::ProfileRequired);
        }
        Ok(Employee {
            id: EmployeeId::new(self.id.clone()),
            name: self.name.clone(),
            gender,
            department,
            attendance,
            profile: self.profile.clone(),
        })
    }
}

impl From<&Employee> for Draft {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.to_string(),
            name: employee.name.clone(),
            gender: Some(employee.gender),
            department: Some(employee.department),
            attendance: Some(employee.attendance),
            profile: employee.profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Draft {
        let mut draft = Draft::default();
        draft.set(DraftField::Id, "1");
        draft.set(DraftField::Name, "Ann");
        draft.set(DraftField::Gender, "Female");
        draft.set(DraftField::Department, "HR");
        draft.set(DraftField::Attendance, "Present");
        draft
    }

    #[test]
    fn every_presence_field_is_required() {
        for field in [
            DraftField::Id,
            DraftField::Name,
            DraftField::Gender,
            DraftField::Department,
            DraftField::Attendance,
        ] {
            let mut draft = filled();
            draft.set(field, "");
            assert_eq!(
                draft.validate(false),
                Err(SubmitError::MissingFields),
                "{} left blank",
                field.name()
            );
        }
    }

    #[test]
    fn profile_only_required_when_asked() {
        let draft = filled();
        assert_eq!(draft.validate(true), Err(SubmitError::ProfileRequired));
        let employee = draft.validate(false).unwrap();
        assert_eq!(employee.department, Department::Hr);
        assert!(employee.profile.is_empty());
    }

    #[test]
    fn unknown_choice_clears_selection() {
        let mut draft = filled();
        draft.set(DraftField::Department, "Legal");
        assert_eq!(draft.department, None);
    }

    #[test]
    fn field_names_round_trip() {
        for field in DraftField::ALL {
            assert_eq!(DraftField::from_name(field.name()), Some(field));
        }
        assert_eq!(DraftField::from_name("salary"), None);
    }
}
