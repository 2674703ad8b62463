use crate::model::{Choice, Employee};

/// Free-text search as typed into the search box. Matching uses the trimmed,
/// lower-cased form; the raw text is kept for re-rendering the input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    needle: String,
}

impl SearchTerm {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.trim().to_lowercase();
        Self { raw, needle }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [
            employee.id.as_str(),
            employee.name.as_str(),
            employee.department.label(),
            employee.gender.label(),
            employee.attendance.label(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// Lazily yields the employees matching `term`, in collection order.
pub fn filter_employees<'a>(
    employees: &'a [Employee],
    term: &'a SearchTerm,
) -> impl Iterator<Item = &'a Employee> + 'a {
    employees.iter().filter(move |employee| term.matches(employee))
}
