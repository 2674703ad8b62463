use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::Field},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use hr_attendance::{AttendanceError, DraftField, Session, encode_data_url};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use crate::{config::AppConfig, graphql::SchemaType, page};

#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "attendance server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

fn body_limit(limit: Option<usize>) -> DefaultBodyLimit {
    match limit {
        Some(bytes) => DefaultBodyLimit::max(bytes),
        None => DefaultBodyLimit::disable(),
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/", get(page_handler))
        .route("/employees", post(submit_handler))
        .route("/draft/profile", post(profile_handler))
        .route("/employees/{id}/edit", post(edit_handler))
        .route("/employees/{id}/delete", post(delete_handler))
        .route("/delete/confirm", post(confirm_delete_handler))
        .route("/delete/cancel", post(cancel_delete_handler))
        .route("/graphql", post(graphql_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins))
                .layer(body_limit(state.config.upload_limit)),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct PageQuery {
    q: Option<String>,
}

async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    if let Some(term) = query.q {
        state.session.set_search(term).await;
    }
    let view = state.session.snapshot().await;
    Html(page::render(&view))
}

/// Applies every form part to the draft, then submits. A submit rejection
/// only raises the banner; the page shows it after the redirect.
async fn submit_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> HttpResult<Redirect> {
    apply_form(&state.session, multipart, true).await?;
    match state.session.submit().await {
        Ok(_) | Err(AttendanceError::Submit(_)) => Ok(Redirect::to("/")),
        Err(err) => Err(HttpError::internal(err.into())),
    }
}

async fn profile_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> HttpResult<Redirect> {
    apply_form(&state.session, multipart, false).await?;
    Ok(Redirect::to("/"))
}

async fn edit_handler(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    if !state.session.begin_edit(&id).await {
        debug!(%id, "edit requested for unknown employee");
    }
    Redirect::to("/")
}

async fn delete_handler(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.session.request_delete(id).await;
    Redirect::to("/")
}

async fn confirm_delete_handler(State(state): State<AppState>) -> HttpResult<Redirect> {
    state
        .session
        .confirm_delete()
        .await
        .map_err(|err| HttpError::internal(err.into()))?;
    Ok(Redirect::to("/"))
}

async fn cancel_delete_handler(State(state): State<AppState>) -> Redirect {
    state.session.cancel_delete().await;
    Redirect::to("/")
}

async fn graphql_handler(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let storage_ok = state.session.repository().is_reachable().await;
    Json(HealthResponse {
        ok: storage_ok,
        storage_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    storage_ok: bool,
    version: &'static str,
}

/// Feeds multipart parts into the draft. With `whole_form`, choice inputs
/// missing from the body are cleared, matching an unselected radio group.
async fn apply_form(session: &Session, mut multipart: Multipart, whole_form: bool) -> HttpResult<()> {
    let mut seen = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| HttpError::bad_request(err.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == DraftField::Profile.name() {
            read_profile(session, field).await?;
            continue;
        }
        let Some(draft_field) = DraftField::from_name(&name) else {
            debug!(%name, "ignoring unknown form field");
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|err| HttpError::bad_request(err.body_text()))?;
        session.update_draft(draft_field, &value).await;
        seen.push(draft_field);
    }
    if whole_form {
        for field in [DraftField::Gender, DraftField::Department, DraftField::Attendance] {
            if !seen.contains(&field) {
                session.update_draft(field, "").await;
            }
        }
    }
    Ok(())
}

/// A part without a file name means the picker was left untouched.
async fn read_profile(session: &Session, field: Field<'_>) -> HttpResult<()> {
    if !field.file_name().is_some_and(|name| !name.is_empty()) {
        return Ok(());
    }
    let mime = field.content_type().map(str::to_owned);
    let applied = session
        .load_profile(async move {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| HttpError::bad_request(err.body_text()))?;
            Ok::<_, HttpError>(encode_data_url(mime.as_deref(), &bytes))
        })
        .await?;
    if !applied {
        debug!("profile upload superseded");
    }
    Ok(())
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    fn bad_request(msg: impl Into<String>) -> Self {
        let err = Self::new(StatusCode::BAD_REQUEST, msg);
        warn!(message = %err.message, "rejected form body");
        err
    }

    fn internal(err: anyhow::Error) -> Self {
        error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}
