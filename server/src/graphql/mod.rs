mod nodes;

use anyhow::anyhow;
use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, Object, Result, Schema, SimpleObject,
};
use hr_attendance::{
    Attendance, AttendanceError, Department, DraftField, Gender, SearchTerm, Session, Submitted,
    filter_employees,
};
use platform_api::{ApiError, internal_error};
use serde::Serialize;
use tracing::instrument;

use nodes::{
    DraftInput, DraftNode, EmployeeNode, ModeNode, NoticeNode, SubmitAction, SubmitPayload,
    choice_label,
};

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(session: Session) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(session)
        .finish()
}

fn session<'a>(ctx: &Context<'a>) -> Result<&'a Session> {
    ctx.data::<Session>()
        .map_err(|_| internal_error(anyhow!("attendance session missing from schema data")))
}

fn attendance_error(err: AttendanceError) -> async_graphql::Error {
    match err {
        AttendanceError::Submit(rejection) => {
            ApiError::rejected(rejection.code(), rejection.to_string()).extend()
        }
        other => internal_error(other),
    }
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self, ctx: &Context<'_>) -> Result<HealthPayload> {
        let storage_ok = session(ctx)?.repository().is_reachable().await;
        Ok(HealthPayload {
            ok: storage_ok,
            storage_ok,
        })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Employees matching `search`, or the session's current search term when
    /// omitted. Collection order is kept.
    #[instrument(name = "graphql.employees", skip(self, ctx))]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
    ) -> Result<Vec<EmployeeNode>> {
        let session = session(ctx)?;
        let nodes: Vec<EmployeeNode> = session
            .read(|app| match search {
                Some(raw) => {
                    let term = SearchTerm::new(raw);
                    filter_employees(app.employees(), &term)
                        .map(EmployeeNode::from)
                        .collect()
                }
                None => app.filtered().map(EmployeeNode::from).collect(),
            })
            .await;
        Ok(nodes)
    }

    #[instrument(name = "graphql.employee", skip(self, ctx))]
    async fn employee(&self, ctx: &Context<'_>, id: String) -> Result<Option<EmployeeNode>> {
        let session = session(ctx)?;
        Ok(session
            .read(|app| app.find(&id).map(EmployeeNode::from))
            .await)
    }

    async fn draft(&self, ctx: &Context<'_>) -> Result<DraftNode> {
        let session = session(ctx)?;
        Ok(session.read(|app| DraftNode::from(app.draft())).await)
    }

    async fn mode(&self, ctx: &Context<'_>) -> Result<ModeNode> {
        let session = session(ctx)?;
        Ok(session.read(|app| ModeNode::from(&app.mode())).await)
    }

    async fn notice(&self, ctx: &Context<'_>) -> Result<Option<NoticeNode>> {
        let session = session(ctx)?;
        Ok(session.read(|app| app.notice().map(NoticeNode::from)).await)
    }

    async fn pending_delete(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let session = session(ctx)?;
        Ok(session
            .read(|app| app.pending_delete().map(ToString::to_string))
            .await)
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[instrument(name = "graphql.update_draft", skip_all)]
    async fn update_draft(&self, ctx: &Context<'_>, input: DraftInput) -> Result<DraftNode> {
        let session = session(ctx)?;
        let mut changes: Vec<(DraftField, &str)> = Vec::new();
        if let Some(id) = input.id.as_deref() {
            changes.push((DraftField::Id, id));
        }
        if let Some(name) = input.name.as_deref() {
            changes.push((DraftField::Name, name));
        }
        if let Some(label) = choice_label::<_, Gender>(&input.gender) {
            changes.push((DraftField::Gender, label));
        }
        if let Some(label) = choice_label::<_, Department>(&input.department) {
            changes.push((DraftField::Department, label));
        }
        if let Some(label) = choice_label::<_, Attendance>(&input.attendance) {
            changes.push((DraftField::Attendance, label));
        }
        if let Some(profile) = input.profile.as_deref() {
            changes.push((DraftField::Profile, profile));
        }
        for (field, value) in changes {
            session.update_draft(field, value).await;
        }
        Ok(session.read(|app| DraftNode::from(app.draft())).await)
    }

    #[instrument(name = "graphql.begin_edit", skip(self, ctx))]
    async fn begin_edit(&self, ctx: &Context<'_>, id: String) -> Result<DraftNode> {
        let session = session(ctx)?;
        if !session.begin_edit(&id).await {
            return Err(ApiError::NotFound(id).extend());
        }
        Ok(session.read(|app| DraftNode::from(app.draft())).await)
    }

    #[instrument(name = "graphql.submit", skip_all)]
    async fn submit(&self, ctx: &Context<'_>) -> Result<SubmitPayload> {
        let session = session(ctx)?;
        let submitted = session.submit().await.map_err(attendance_error)?;
        let (action, id) = match submitted {
            Submitted::Added(id) => (SubmitAction::Added, id),
            Submitted::Updated(id) => (SubmitAction::Updated, id),
        };
        let employee = session
            .read(|app| app.find(id.as_str()).map(EmployeeNode::from))
            .await;
        Ok(SubmitPayload { action, employee })
    }

    #[instrument(name = "graphql.request_delete", skip(self, ctx))]
    async fn request_delete(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        session(ctx)?.request_delete(id).await;
        Ok(true)
    }

    /// Deletes the pending target; returns its id, or null when nothing was
    /// pending.
    #[instrument(name = "graphql.confirm_delete", skip_all)]
    async fn confirm_delete(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let removed = session(ctx)?
            .confirm_delete()
            .await
            .map_err(attendance_error)?;
        Ok(removed.map(|id| id.to_string()))
    }

    async fn cancel_delete(&self, ctx: &Context<'_>) -> Result<bool> {
        Ok(session(ctx)?.cancel_delete().await)
    }

    async fn set_search(&self, ctx: &Context<'_>, term: String) -> Result<Vec<EmployeeNode>> {
        let session = session(ctx)?;
        session.set_search(term).await;
        Ok(session
            .read(|app| app.filtered().map(EmployeeNode::from).collect())
            .await)
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
    pub storage_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Request, Value};
    use hr_attendance::EmployeeRepository;
    use platform_db::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    async fn schema() -> SchemaType {
        let session = Session::new(EmployeeRepository::new(Arc::new(MemoryStore::new())));
        session.hydrate().await.unwrap();
        build_schema(session)
    }

    async fn run(schema: &SchemaType, query: &str) -> async_graphql::Response {
        schema.execute(Request::new(query)).await
    }

    const ADD_ANN: &str = r#"
        mutation {
            updateDraft(input: {
                id: "1", name: "Ann", gender: FEMALE, department: HR,
                attendance: PRESENT, profile: "data:image/png;base64,AA=="
            }) { id }
        }
    "#;

    #[tokio::test]
    async fn health_query_returns_ok() {
        let schema = schema().await;
        let response = run(&schema, "{ health { ok storageOk } }").await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true, "storageOk": true}}));
    }

    #[tokio::test]
    async fn submit_adds_employee() {
        let schema = schema().await;
        assert!(run(&schema, ADD_ANN).await.errors.is_empty());

        let response = run(
            &schema,
            "mutation { submit { action employee { id name department attendance present } } }",
        )
        .await;
        assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"submit": {
                "action": "ADDED",
                "employee": {
                    "id": "1", "name": "Ann", "department": "HR",
                    "attendance": "PRESENT", "present": true
                }
            }})
        );

        let response = run(&schema, "{ notice { message kind } mode { submitLabel } }").await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({
                "notice": {"message": "Employee added successfully", "kind": "SUCCESS"},
                "mode": {"submitLabel": "Add Employee"}
            })
        );
    }

    #[tokio::test]
    async fn duplicate_submit_carries_error_code() {
        let schema = schema().await;
        run(&schema, ADD_ANN).await;
        run(&schema, "mutation { submit { action } }").await;
        run(&schema, ADD_ANN).await;

        let response = run(&schema, "mutation { submit { action } }").await;
        let err = response.errors.first().expect("duplicate rejected");
        assert_eq!(err.message, "Employee ID already exists");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(Value::from("DUPLICATE_ID")));

        let response = run(&schema, r#"{ employees(search: "") { id } }"#).await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"employees": [{"id": "1"}]})
        );
    }

    #[tokio::test]
    async fn edit_then_delete_round_trip() {
        let schema = schema().await;
        run(&schema, ADD_ANN).await;
        run(&schema, "mutation { submit { action } }").await;

        let response = run(&schema, r#"mutation { beginEdit(id: "1") { name department } }"#).await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"beginEdit": {"name": "Ann", "department": "HR"}})
        );
        run(
            &schema,
            r#"mutation { updateDraft(input: { attendance: ABSENT, department: null }) { id } }"#,
        )
        .await;
        let response = run(&schema, "mutation { submit { action } }").await;
        assert_eq!(
            response.errors.first().map(|e| e.message.as_str()),
            Some("Please fill all fields")
        );

        run(&schema, r#"mutation { updateDraft(input: { department: FINANCE }) { id } }"#).await;
        let response = run(&schema, "mutation { submit { action employee { attendance } } }").await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"submit": {"action": "UPDATED", "employee": {"attendance": "ABSENT"}}})
        );

        run(&schema, r#"mutation { requestDelete(id: "1") }"#).await;
        let response = run(&schema, "{ pendingDelete }").await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"pendingDelete": "1"})
        );
        let response = run(&schema, "mutation { confirmDelete }").await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"confirmDelete": "1"})
        );
        let response = run(&schema, r#"mutation { setSearch(term: "ann") { id } }"#).await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"setSearch": []})
        );
    }

    #[tokio::test]
    async fn begin_edit_of_unknown_id_is_not_found() {
        let schema = schema().await;
        let response = run(&schema, r#"mutation { beginEdit(id: "nope") { id } }"#).await;
        let code = response
            .errors
            .first()
            .and_then(|e| e.extensions.as_ref())
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(Value::from("NOT_FOUND")));
    }
}
