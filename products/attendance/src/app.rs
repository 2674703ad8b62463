use std::mem;

use serde::Serialize;

use crate::{
    delete::DeleteModal,
    draft::{Draft, DraftField},
    error::SubmitError,
    filter::{SearchTerm, filter_employees},
    model::{Employee, EmployeeId},
    notice::{Notice, NoticeBanner, NoticeKind, NoticeTicket},
    profile::{ProfileReadToken, ProfileReads},
};

/// Whether the form adds a new record or rewrites an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FormMode {
    Creating,
    Editing(EmployeeId),
}

impl FormMode {
    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Creating => "Add Employee",
            FormMode::Editing(_) => "Update Employee",
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, FormMode::Editing(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submitted {
    Added(EmployeeId),
    Updated(EmployeeId),
}

/// Follow-up work produced by state changes: a collection write and/or a
/// banner that needs its hide timer started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub persist: bool,
    pub hide_notice: Option<NoticeTicket>,
}

/// Everything a view needs to render, detached from the live state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub total: usize,
    pub search: String,
    pub draft: Draft,
    pub mode: FormMode,
    pub notice: Option<Notice>,
    pub pending_delete: Option<EmployeeId>,
    pub file_input_key: u64,
}

/// The whole attendance screen: the collection plus form, search, banner and
/// dialog state. Mutations never fail for storage reasons here; writes are
/// requested through [`Effects`].
#[derive(Clone, Debug, Default)]
pub struct AttendanceApp {
    employees: Vec<Employee>,
    loaded: bool,
    draft: Draft,
    editing: Option<EmployeeId>,
    search: SearchTerm,
    notice: NoticeBanner,
    delete: DeleteModal,
    profile_reads: ProfileReads,
    file_input_key: u64,
    effects: Effects,
}

impl AttendanceApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the stored collection. Only the first call has an effect, and
    /// nothing is persisted before it happens.
    pub fn hydrate(&mut self, employees: Vec<Employee>) -> bool {
        if self.loaded {
            return false;
        }
        self.employees = employees;
        self.loaded = true;
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn find(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == *id)
    }

    pub fn search(&self) -> &SearchTerm {
        &self.search
    }

    pub fn set_search(&mut self, raw: impl Into<String>) {
        self.search = SearchTerm::new(raw);
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Employee> {
        filter_employees(&self.employees, &self.search)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> FormMode {
        match &self.editing {
            Some(id) => FormMode::Editing(id.clone()),
            None => FormMode::Creating,
        }
    }

    /// Applies one input change. The id is locked while editing.
    pub fn update_draft(&mut self, field: DraftField, value: &str) {
        if field == DraftField::Id && self.editing.is_some() {
            return;
        }
        self.draft.set(field, value);
    }

    /// Loads a record into the form and switches to editing it.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(employee) = self.find(id).cloned() else {
            return false;
        };
        self.draft = Draft::from(&employee);
        self.editing = Some(employee.id);
        self.profile_reads.invalidate();
        true
    }

    pub fn submit(&mut self) -> Result<Submitted, SubmitError> {
        let outcome = self.commit_draft();
        match &outcome {
            Ok(Submitted::Added(_)) => {
                self.show_notice("Employee added successfully", NoticeKind::Success)
            }
            Ok(Submitted::Updated(_)) => {
                self.show_notice("Employee updated successfully", NoticeKind::Update)
            }
            Err(err) => self.show_notice(err.to_string(), NoticeKind::Error),
        }
        outcome
    }

    fn commit_draft(&mut self) -> Result<Submitted, SubmitError> {
        let record = self.draft.validate(self.editing.is_none())?;
        let submitted = match self.editing.take() {
            Some(target) => {
                let mut replaced = false;
                for slot in self.employees.iter_mut().filter(|e| e.id == target) {
                    *slot = record.clone();
                    replaced = true;
                }
                self.mark_changed(replaced);
                Submitted::Updated(target)
            }
            None => {
                if self.find(record.id.as_str()).is_some() {
                    return Err(SubmitError::DuplicateId(record.id));
                }
                let id = record.id.clone();
                self.employees.push(record);
                self.mark_changed(true);
                Submitted::Added(id)
            }
        };
        self.draft = Draft::default();
        self.file_input_key += 1;
        self.profile_reads.invalidate();
        Ok(submitted)
    }

    pub fn request_delete(&mut self, id: impl Into<EmployeeId>) {
        self.delete.open(id.into());
    }

    pub fn pending_delete(&self) -> Option<&EmployeeId> {
        self.delete.pending()
    }

    /// Removes the pending target. Returns `None` when no deletion was pending.
    pub fn confirm_delete(&mut self) -> Option<EmployeeId> {
        let id = self.delete.close()?;
        let before = self.employees.len();
        self.employees.retain(|e| e.id != id);
        self.mark_changed(self.employees.len() != before);
        self.show_notice("Employee deleted successfully", NoticeKind::Delete);
        Some(id)
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.delete.close().is_some()
    }

    pub fn show_notice(&mut self, message: impl Into<String>, kind: NoticeKind) {
        let ticket = self.notice.show(message, kind);
        self.effects.hide_notice = Some(ticket);
    }

    pub fn hide_notice(&mut self, ticket: NoticeTicket) -> bool {
        self.notice.hide(ticket)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.visible()
    }

    pub fn begin_profile_read(&mut self) -> ProfileReadToken {
        self.profile_reads.begin()
    }

    /// Stores a finished read into the draft unless a newer read started or
    /// the draft was reset since `token` was issued.
    pub fn finish_profile_read(&mut self, token: ProfileReadToken, data_url: String) -> bool {
        if !self.profile_reads.is_current(token) {
            return false;
        }
        self.draft.profile = data_url;
        true
    }

    /// Bumped on every successful submit so the file picker renders fresh.
    pub fn file_input_key(&self) -> u64 {
        self.file_input_key
    }

    pub fn take_effects(&mut self) -> Effects {
        mem::take(&mut self.effects)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            employees: self.filtered().cloned().collect(),
            total: self.employees.len(),
            search: self.search.raw().to_string(),
            draft: self.draft.clone(),
            mode: self.mode(),
            notice: self.notice().cloned(),
            pending_delete: self.pending_delete().cloned(),
            file_input_key: self.file_input_key,
        }
    }

    fn mark_changed(&mut self, changed: bool) {
        if changed && self.loaded {
            self.effects.persist = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attendance, Department, Gender};

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            name: name.into(),
            gender: Gender::Female,
            department: Department::Hr,
            attendance: Attendance::Present,
            profile: "data:image/png;base64,AA==".into(),
        }
    }

    fn loaded(employees: Vec<Employee>) -> AttendanceApp {
        let mut app = AttendanceApp::new();
        app.hydrate(employees);
        app
    }

    fn fill(app: &mut AttendanceApp, id: &str, name: &str) {
        app.update_draft(DraftField::Id, id);
        app.update_draft(DraftField::Name, name);
        app.update_draft(DraftField::Gender, "Male");
        app.update_draft(DraftField::Department, "Finance");
        app.update_draft(DraftField::Attendance, "Absent");
        app.update_draft(DraftField::Profile, "data:image/gif;base64,R0lG");
    }

    #[test]
    fn hydrate_only_once() {
        let mut app = loaded(vec![employee("1", "Ann")]);
        assert!(!app.hydrate(Vec::new()));
        assert_eq!(app.employees().len(), 1);
    }

    #[test]
    fn create_appends_and_resets_form() {
        let mut app = loaded(vec![employee("1", "Ann")]);
        fill(&mut app, "2", "Bob");
        let key = app.file_input_key();

        assert_eq!(app.submit(), Ok(Submitted::Added(EmployeeId::new("2"))));
        assert_eq!(app.employees().len(), 2);
        let added = &app.employees()[1];
        assert_eq!(added.name, "Bob");
        assert_eq!(added.gender, Gender::Male);
        assert_eq!(added.department, Department::Finance);
        assert_eq!(added.attendance, Attendance::Absent);
        assert_eq!(added.profile, "data:image/gif;base64,R0lG");
        assert_eq!(app.draft(), &Draft::default());
        assert_eq!(app.file_input_key(), key + 1);
        assert_eq!(
            app.notice().map(|n| (n.message.as_str(), n.kind)),
            Some(("Employee added successfully", NoticeKind::Success))
        );
        let effects = app.take_effects();
        assert!(effects.persist);
        assert!(effects.hide_notice.is_some());
    }

    #[test]
    fn duplicate_id_is_rejected_without_mutation() {
        let mut app = loaded(vec![employee("1", "Ann")]);
        fill(&mut app, "1", "Impostor");
        let before = app.employees().to_vec();

        assert_eq!(
            app.submit(),
            Err(SubmitError::DuplicateId(EmployeeId::new("1")))
        );
        assert_eq!(app.employees(), before.as_slice());
        assert_eq!(app.draft().name, "Impostor");
        assert_eq!(
            app.notice().map(|n| (n.message.as_str(), n.kind)),
            Some(("Employee ID already exists", NoticeKind::Error))
        );
        assert!(!app.take_effects().persist);
    }

    #[test]
    fn ids_are_not_numerically_equal() {
        let mut app = loaded(vec![employee("1", "Ann")]);
        fill(&mut app, "01", "Zero One");
        assert!(app.submit().is_ok());
        assert_eq!(app.employees().len(), 2);
    }

    #[test]
    fn missing_fields_reported_before_profile() {
        let mut app = loaded(Vec::new());
        app.update_draft(DraftField::Id, "9");
        assert_eq!(app.submit(), Err(SubmitError::MissingFields));
        assert_eq!(app.notice().map(|n| n.message.as_str()), Some("Please fill all fields"));

        fill(&mut app, "9", "Nia");
        app.update_draft(DraftField::Profile, "");
        assert_eq!(app.submit(), Err(SubmitError::ProfileRequired));
        assert!(app.employees().is_empty());
    }

    #[test]
    fn edit_replaces_in_place_and_keeps_profile() {
        let mut app = loaded(vec![employee("1", "Ann"), employee("2", "Bea"), employee("3", "Cy")]);
        assert!(app.begin_edit("2"));
        assert_eq!(app.mode(), FormMode::Editing(EmployeeId::new("2")));
        assert_eq!(app.mode().submit_label(), "Update Employee");

        app.update_draft(DraftField::Id, "99");
        app.update_draft(DraftField::Name, "Beatrice");
        app.update_draft(DraftField::Attendance, "Absent");
        assert_eq!(app.submit(), Ok(Submitted::Updated(EmployeeId::new("2"))));

        let names: Vec<_> = app.employees().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Beatrice", "Cy"]);
        let updated = app.find("2").unwrap();
        assert_eq!(updated.attendance, Attendance::Absent);
        assert_eq!(updated.profile, "data:image/png;base64,AA==");
        assert_eq!(app.mode(), FormMode::Creating);
        assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Update));
    }

    #[test]
    fn edit_of_unknown_id_is_ignored() {
        let mut app = loaded(vec![employee("1", "Ann")]);
        assert!(!app.begin_edit("404"));
        assert_eq!(app.mode(), FormMode::Creating);
    }

    #[test]
    fn confirm_removes_only_target() {
        let mut app = loaded(vec![employee("1", "Ann"), employee("2", "Bea")]);
        app.request_delete("1");
        assert_eq!(app.confirm_delete(), Some(EmployeeId::new("1")));
        assert_eq!(app.employees(), &[employee("2", "Bea")]);
        assert_eq!(app.pending_delete(), None);
        assert_eq!(
            app.notice().map(|n| (n.message.as_str(), n.kind)),
            Some(("Employee deleted successfully", NoticeKind::Delete))
        );
        assert!(app.take_effects().persist);
    }

    #[test]
    fn cancel_leaves_collection_untouched() {
        let mut app = loaded(vec![employee("1", "Ann")]);
        app.request_delete("1");
        assert!(app.cancel_delete());
        assert_eq!(app.employees(), &[employee("1", "Ann")]);
        assert_eq!(app.confirm_delete(), None);
        assert_eq!(app.take_effects(), Effects::default());
    }

    #[test]
    fn nothing_persists_before_hydration() {
        let mut app = AttendanceApp::new();
        fill(&mut app, "1", "Ann");
        assert!(app.submit().is_ok());
        assert!(!app.take_effects().persist);
    }

    #[test]
    fn stale_profile_read_is_dropped() {
        let mut app = loaded(Vec::new());
        let first = app.begin_profile_read();
        let second = app.begin_profile_read();
        assert!(app.finish_profile_read(second, "data:second".into()));
        assert!(!app.finish_profile_read(first, "data:first".into()));
        assert_eq!(app.draft().profile, "data:second");
    }

    #[test]
    fn read_finishing_after_submit_does_not_leak_into_next_draft() {
        let mut app = loaded(Vec::new());
        fill(&mut app, "1", "Ann");
        let token = app.begin_profile_read();
        assert!(app.submit().is_ok());
        assert!(!app.finish_profile_read(token, "data:late".into()));
        assert!(app.draft().profile.is_empty());
    }

    #[test]
    fn snapshot_reflects_search() {
        let mut app = loaded(vec![employee("1", "Ann"), employee("2", "Bob")]);
        app.set_search("bob");
        let snapshot = app.snapshot();
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.employees, vec![employee("2", "Bob")]);
        assert_eq!(snapshot.search, "bob");

        app.set_search("nobody");
        assert!(app.snapshot().employees.is_empty());
    }
}
