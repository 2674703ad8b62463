//! Server-rendered attendance screen.

use std::fmt::Write as _;

use hr_attendance::{Attendance, Choice, Department, Draft, Employee, Gender, Snapshot};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

const STYLE: &str = r#"
body { font-family: sans-serif; background: #f4f6f8; margin: 0; }
.container { max-width: 960px; margin: 0 auto; padding: 24px; }
.section { background: #fff; border-radius: 8px; padding: 16px; margin-bottom: 16px; }
.employee-form { display: flex; flex-wrap: wrap; gap: 12px; align-items: center; }
.radio-group { display: flex; gap: 8px; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px; border-bottom: 1px solid #e3e6ea; text-align: left; }
.profile-img { width: 48px; height: 48px; border-radius: 50%; object-fit: cover; border: 3px solid; }
.profile-img.present { border-color: #2e7d32; }
.profile-img.absent { border-color: #c62828; }
.attendance-present { color: #2e7d32; font-weight: bold; }
.attendance-absent { color: #c62828; font-weight: bold; }
.action-icons form { display: inline; }
.icon-btn { border: none; background: none; cursor: pointer; }
.popup-message { position: fixed; top: 20px; right: 20px; padding: 12px 20px; border-radius: 6px;
  color: #fff; animation: popup-fade 3s forwards; }
.popup-message.success { background: #2e7d32; }
.popup-message.update { background: #1565c0; }
.popup-message.delete { background: #6d4c41; }
.popup-message.error { background: #c62828; }
@keyframes popup-fade { 0%, 85% { opacity: 1; } 100% { opacity: 0; } }
.modal-overlay { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.4);
  display: flex; align-items: center; justify-content: center; }
.modal-content { background: #fff; padding: 24px; border-radius: 8px; }
.modal-buttons form { display: inline; margin: 0 8px; }
.draft-preview { width: 48px; height: 48px; border-radius: 50%; object-fit: cover; }
"#;

/// Escapes text for element bodies and double-quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render(view: &Snapshot) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Employee Attendance Report</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"app-wrapper\">\n<div class=\"container\">\n");
    html.push_str("<h1>Employee Attendance Report</h1>\n");
    render_form(&mut html, view);
    render_table(&mut html, view);
    html.push_str("</div>\n");
    render_notice(&mut html, view);
    render_modal(&mut html, view);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, view: &Snapshot) {
    let draft = &view.draft;
    let editing = view.mode.is_editing();
    html.push_str("<div class=\"section\">\n");
    html.push_str(
        "<form class=\"employee-form\" method=\"post\" action=\"/employees\" enctype=\"multipart/form-data\">\n",
    );
    let _ = writeln!(
        html,
        "<input name=\"id\" placeholder=\"Employee ID\" value=\"{}\"{}>",
        escape(&draft.id),
        if editing { " readonly" } else { "" }
    );
    let _ = writeln!(
        html,
        "<input name=\"name\" placeholder=\"Employee Name\" value=\"{}\">",
        escape(&draft.name)
    );
    radio_group::<Gender>(html, "gender", draft.gender);
    department_select(html, draft);
    radio_group::<Attendance>(html, "attendance", draft.attendance);
    if !draft.profile.is_empty() {
        let _ = writeln!(
            html,
            "<img class=\"draft-preview\" src=\"{}\" alt=\"Selected profile\">",
            escape(&draft.profile)
        );
    }
    let _ = writeln!(
        html,
        "<input type=\"file\" name=\"profile\" accept=\"image/*\" data-key=\"{}\">",
        view.file_input_key
    );
    let _ = writeln!(
        html,
        "<button type=\"submit\">{}</button>",
        view.mode.submit_label()
    );
    html.push_str("</form>\n");
    html.push_str(
        "<form class=\"profile-form\" method=\"post\" action=\"/draft/profile\" enctype=\"multipart/form-data\">\n",
    );
    html.push_str("<input type=\"file\" name=\"profile\" accept=\"image/*\">\n");
    html.push_str("<button type=\"submit\">Preview Profile</button>\n</form>\n</div>\n");
}

fn radio_group<C: Choice>(html: &mut String, name: &str, selected: Option<C>)
where
    C: PartialEq,
{
    html.push_str("<div class=\"radio-group\">\n");
    for &choice in C::ALL {
        let label = choice.label();
        let _ = writeln!(
            html,
            "<label><input type=\"radio\" name=\"{name}\" value=\"{label}\"{}> {label}</label>",
            if selected == Some(choice) { " checked" } else { "" }
        );
    }
    html.push_str("</div>\n");
}

fn department_select(html: &mut String, draft: &Draft) {
    html.push_str("<select name=\"department\">\n<option value=\"\">Select Department</option>\n");
    for &department in Department::ALL {
        let label = department.label();
        let _ = writeln!(
            html,
            "<option{}>{label}</option>",
            if draft.department == Some(department) {
                " selected"
            } else {
                ""
            }
        );
    }
    html.push_str("</select>\n");
}

fn render_table(html: &mut String, view: &Snapshot) {
    html.push_str("<div class=\"section\">\n<form class=\"search-box\" method=\"get\" action=\"/\">\n");
    let _ = writeln!(
        html,
        "<input name=\"q\" placeholder=\"Search by Name, ID, Department, Gender\" value=\"{}\">",
        escape(&view.search)
    );
    html.push_str("</form>\n<table>\n<thead>\n<tr><th>Profile</th><th>ID</th><th>Name</th>");
    html.push_str("<th>Department</th><th>Gender</th><th>Attendance</th><th>Actions</th></tr>\n");
    html.push_str("</thead>\n<tbody>\n");
    if view.employees.is_empty() {
        html.push_str(
            "<tr><td colspan=\"7\" class=\"empty-state\" style=\"text-align: center; padding: 20px\">No employees</td></tr>\n",
        );
    }
    for employee in &view.employees {
        render_row(html, employee);
    }
    html.push_str("</tbody>\n</table>\n</div>\n");
}

fn render_row(html: &mut String, employee: &Employee) {
    let (img_class, cell_class) = if employee.is_present() {
        ("present", "attendance-present")
    } else {
        ("absent", "attendance-absent")
    };
    let id = escape(employee.id.as_str());
    let _ = writeln!(
        html,
        "<tr>\n<td><img src=\"{}\" alt=\"{}\" class=\"profile-img {img_class}\"></td>",
        escape(&employee.profile),
        escape(&employee.name)
    );
    let _ = writeln!(
        html,
        "<td>{id}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{cell_class}\">{}</td>",
        escape(&employee.name),
        employee.department,
        employee.gender,
        employee.attendance
    );
    let path = utf8_percent_encode(employee.id.as_str(), NON_ALPHANUMERIC);
    let _ = writeln!(
        html,
        "<td class=\"action-icons\">\
<form method=\"post\" action=\"/employees/{path}/edit\"><button class=\"icon-btn update-btn\" title=\"Edit\">&#9998;</button></form>\
<form method=\"post\" action=\"/employees/{path}/delete\"><button class=\"icon-btn delete-btn\" title=\"Delete\">&#128465;</button></form>\
</td>\n</tr>"
    );
}

fn render_notice(html: &mut String, view: &Snapshot) {
    if let Some(notice) = &view.notice {
        let _ = writeln!(
            html,
            "<div class=\"popup-message {}\">{}</div>",
            notice.kind.as_str(),
            escape(&notice.message)
        );
    }
}

fn render_modal(html: &mut String, view: &Snapshot) {
    if view.pending_delete.is_none() {
        return;
    }
    html.push_str("<div class=\"modal-overlay\">\n<div class=\"modal-content\">\n");
    html.push_str("<h3>Are you sure you want to delete this employee?</h3>\n<div class=\"modal-buttons\">\n");
    html.push_str("<form method=\"post\" action=\"/delete/confirm\"><button class=\"btn-yes\">Yes</button></form>\n");
    html.push_str("<form method=\"post\" action=\"/delete/cancel\"><button class=\"btn-no\">No</button></form>\n");
    html.push_str("</div>\n</div>\n</div>\n");
}
