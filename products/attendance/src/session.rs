use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    app::{AttendanceApp, Snapshot, Submitted},
    draft::DraftField,
    error::AttendanceResult,
    model::{Employee, EmployeeId},
    notice::{NOTICE_TTL, NoticeKind, NoticeTicket},
    repository::EmployeeRepository,
};

const SAVE_FAILED: &str = "Could not save employees";

/// Shared handle on one [`AttendanceApp`]. Events are applied one at a time
/// under the lock, and each collection change is written back before the
/// lock is released, so stored order always matches event order.
#[derive(Clone)]
pub struct Session {
    app: Arc<Mutex<AttendanceApp>>,
    repository: EmployeeRepository,
    notice_ttl: Duration,
}

impl Session {
    pub fn new(repository: EmployeeRepository) -> Self {
        Self::with_notice_ttl(repository, NOTICE_TTL)
    }

    pub fn with_notice_ttl(repository: EmployeeRepository, notice_ttl: Duration) -> Self {
        Self {
            app: Arc::new(Mutex::new(AttendanceApp::new())),
            repository,
            notice_ttl,
        }
    }

    pub fn repository(&self) -> &EmployeeRepository {
        &self.repository
    }

    /// Loads the stored collection. Later calls are no-ops.
    #[instrument(name = "session.hydrate", skip_all)]
    pub async fn hydrate(&self) -> AttendanceResult<usize> {
        let mut app = self.app.lock().await;
        if app.is_loaded() {
            return Ok(app.employees().len());
        }
        let employees = self.repository.load().await?;
        let count = employees.len();
        app.hydrate(employees);
        info!(count, "employees loaded");
        Ok(count)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.app.lock().await.snapshot()
    }

    /// Runs `f` against the current state without changing it.
    pub async fn read<R>(&self, f: impl FnOnce(&AttendanceApp) -> R) -> R {
        f(&*self.app.lock().await)
    }

    pub async fn employees(&self) -> Vec<Employee> {
        self.read(|app| app.employees().to_vec()).await
    }

    pub async fn update_draft(&self, field: DraftField, value: &str) {
        self.app.lock().await.update_draft(field, value);
    }

    pub async fn set_search(&self, raw: impl Into<String>) {
        self.app.lock().await.set_search(raw);
    }

    #[instrument(name = "session.begin_edit", skip(self))]
    pub async fn begin_edit(&self, id: &str) -> bool {
        self.app.lock().await.begin_edit(id)
    }

    /// Commits the draft. Rejections still raise their banner before being
    /// returned.
    #[instrument(name = "session.submit", skip_all)]
    pub async fn submit(&self) -> AttendanceResult<Submitted> {
        let mut app = self.app.lock().await;
        let before = app.clone();
        let outcome = app.submit();
        self.settle(&mut app, before).await?;
        match &outcome {
            Ok(submitted) => info!(?submitted, "employee saved"),
            Err(err) => debug!(code = err.code(), "submit rejected"),
        }
        Ok(outcome?)
    }

    pub async fn request_delete(&self, id: impl Into<EmployeeId>) {
        self.app.lock().await.request_delete(id);
    }

    #[instrument(name = "session.confirm_delete", skip_all)]
    pub async fn confirm_delete(&self) -> AttendanceResult<Option<EmployeeId>> {
        let mut app = self.app.lock().await;
        let before = app.clone();
        let removed = app.confirm_delete();
        self.settle(&mut app, before).await?;
        if let Some(id) = &removed {
            info!(%id, "employee deleted");
        }
        Ok(removed)
    }

    pub async fn cancel_delete(&self) -> bool {
        self.app.lock().await.cancel_delete()
    }

    /// Feeds a profile image read into the draft. The lock is not held while
    /// `read` runs; if another read starts or the draft is reset before it
    /// finishes, its result is dropped and `Ok(false)` is returned.
    pub async fn load_profile<F, E>(&self, read: F) -> Result<bool, E>
    where
        F: Future<Output = Result<String, E>>,
    {
        let token = self.app.lock().await.begin_profile_read();
        let data_url = read.await?;
        let applied = self.app.lock().await.finish_profile_read(token, data_url);
        if !applied {
            debug!("discarding superseded profile read");
        }
        Ok(applied)
    }

    /// Writes the collection when it changed, then starts the banner timer.
    /// If the write fails the state goes back to `before`, so memory never
    /// runs ahead of storage, and an error banner replaces the success one.
    async fn settle(
        &self,
        app: &mut AttendanceApp,
        before: AttendanceApp,
    ) -> AttendanceResult<()> {
        let effects = app.take_effects();
        if effects.persist {
            if let Err(err) = self.repository.save(app.employees()).await {
                warn!(error = %err, "failed to persist employees; rolling back");
                *app = before;
                app.show_notice(SAVE_FAILED, NoticeKind::Error);
                if let Some(ticket) = app.take_effects().hide_notice {
                    self.schedule_hide(ticket);
                }
                return Err(err);
            }
        }
        if let Some(ticket) = effects.hide_notice {
            self.schedule_hide(ticket);
        }
        Ok(())
    }

    fn schedule_hide(&self, ticket: NoticeTicket) {
        let app = Arc::clone(&self.app);
        let ttl = self.notice_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if app.lock().await.hide_notice(ticket) {
                debug!("notice dismissed");
            }
        });
    }
}
