use async_graphql::{Enum, InputObject, MaybeUndefined, SimpleObject};
use hr_attendance::{
    Attendance, Choice, Department, Draft, Employee, FormMode, Gender, Notice, NoticeKind,
};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum GenderValue {
    Male,
    Female,
    Other,
}

impl From<Gender> for GenderValue {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => GenderValue::Male,
            Gender::Female => GenderValue::Female,
            Gender::Other => GenderValue::Other,
        }
    }
}

impl From<GenderValue> for Gender {
    fn from(value: GenderValue) -> Self {
        match value {
            GenderValue::Male => Gender::Male,
            GenderValue::Female => Gender::Female,
            GenderValue::Other => Gender::Other,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum DepartmentValue {
    #[graphql(name = "HR")]
    Hr,
    Finance,
    Development,
    Marketing,
}

impl From<Department> for DepartmentValue {
    fn from(value: Department) -> Self {
        match value {
            Department::Hr => DepartmentValue::Hr,
            Department::Finance => DepartmentValue::Finance,
            Department::Development => DepartmentValue::Development,
            Department::Marketing => DepartmentValue::Marketing,
        }
    }
}

impl From<DepartmentValue> for Department {
    fn from(value: DepartmentValue) -> Self {
        match value {
            DepartmentValue::Hr => Department::Hr,
            DepartmentValue::Finance => Department::Finance,
            DepartmentValue::Development => Department::Development,
            DepartmentValue::Marketing => Department::Marketing,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttendanceValue {
    Present,
    Absent,
}

impl From<Attendance> for AttendanceValue {
    fn from(value: Attendance) -> Self {
        match value {
            Attendance::Present => AttendanceValue::Present,
            Attendance::Absent => AttendanceValue::Absent,
        }
    }
}

impl From<AttendanceValue> for Attendance {
    fn from(value: AttendanceValue) -> Self {
        match value {
            AttendanceValue::Present => Attendance::Present,
            AttendanceValue::Absent => Attendance::Absent,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoticeKindValue {
    Success,
    Update,
    Delete,
    Error,
}

impl From<NoticeKind> for NoticeKindValue {
    fn from(value: NoticeKind) -> Self {
        match value {
            NoticeKind::Success => NoticeKindValue::Success,
            NoticeKind::Update => NoticeKindValue::Update,
            NoticeKind::Delete => NoticeKindValue::Delete,
            NoticeKind::Error => NoticeKindValue::Error,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum SubmitAction {
    Added,
    Updated,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    pub id: String,
    pub name: String,
    pub gender: GenderValue,
    pub department: DepartmentValue,
    pub attendance: AttendanceValue,
    pub profile: String,
    pub present: bool,
}

impl From<&Employee> for EmployeeNode {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.to_string(),
            name: employee.name.clone(),
            gender: employee.gender.into(),
            department: employee.department.into(),
            attendance: employee.attendance.into(),
            profile: employee.profile.clone(),
            present: employee.is_present(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DraftNode {
    pub id: String,
    pub name: String,
    pub gender: Option<GenderValue>,
    pub department: Option<DepartmentValue>,
    pub attendance: Option<AttendanceValue>,
    pub profile: String,
}

impl From<&Draft> for DraftNode {
    fn from(draft: &Draft) -> Self {
        Self {
            id: draft.id.clone(),
            name: draft.name.clone(),
            gender: draft.gender.map(Into::into),
            department: draft.department.map(Into::into),
            attendance: draft.attendance.map(Into::into),
            profile: draft.profile.clone(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ModeNode {
    pub editing: bool,
    pub editing_id: Option<String>,
    pub submit_label: String,
}

impl From<&FormMode> for ModeNode {
    fn from(mode: &FormMode) -> Self {
        Self {
            editing: mode.is_editing(),
            editing_id: match mode {
                FormMode::Editing(id) => Some(id.to_string()),
                FormMode::Creating => None,
            },
            submit_label: mode.submit_label().to_string(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct NoticeNode {
    pub message: String,
    pub kind: NoticeKindValue,
}

impl From<&Notice> for NoticeNode {
    fn from(notice: &Notice) -> Self {
        Self {
            message: notice.message.clone(),
            kind: notice.kind.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SubmitPayload {
    pub action: SubmitAction,
    pub employee: Option<EmployeeNode>,
}

/// Partial draft update. Omitted fields are left alone; an explicit `null`
/// clears a choice.
#[derive(Clone, Debug, Default, InputObject)]
pub struct DraftInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub gender: MaybeUndefined<GenderValue>,
    pub department: MaybeUndefined<DepartmentValue>,
    pub attendance: MaybeUndefined<AttendanceValue>,
    pub profile: Option<String>,
}

/// Label to feed a choice input: the option's label, or blank to clear.
pub fn choice_label<V, C>(value: &MaybeUndefined<V>) -> Option<&'static str>
where
    V: Copy + Into<C>,
    C: Choice,
{
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(""),
        MaybeUndefined::Value(v) => Some(C::label((*v).into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_label_distinguishes_null_from_missing() {
        let missing: MaybeUndefined<DepartmentValue> = MaybeUndefined::Undefined;
        let cleared: MaybeUndefined<DepartmentValue> = MaybeUndefined::Null;
        let set = MaybeUndefined::Value(DepartmentValue::Hr);
        assert_eq!(choice_label::<_, Department>(&missing), None);
        assert_eq!(choice_label::<_, Department>(&cleared), Some(""));
        assert_eq!(choice_label::<_, Department>(&set), Some("HR"));
    }
}
