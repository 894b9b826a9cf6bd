use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth::AuthSession;
use crate::catalog_service::CatalogService;
use crate::config::PlayerConfig;
use crate::dashboard_service::DashboardService;
use crate::enrollment_service::EnrollmentService;
use crate::error::AppServicesError;
use crate::player::SessionBootstrap;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthSession>,
    catalog: Arc<CatalogService>,
    enrollments: Arc<EnrollmentService>,
    dashboard: Arc<DashboardService>,
    player: Arc<SessionBootstrap>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, config: PlayerConfig) -> Self {
        let catalog = Arc::new(CatalogService::new(clock, Arc::clone(&storage.courses)));
        let enrollments = Arc::new(EnrollmentService::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.enrollments),
        ));
        let player = Arc::new(SessionBootstrap::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.enrollments),
            Arc::clone(&storage.progress),
            config,
        ));

        Self {
            auth: Arc::new(AuthSession::new()),
            catalog,
            enrollments,
            dashboard,
            player,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: PlayerConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, config))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, config: PlayerConfig) -> Self {
        Self::new(&Storage::in_memory(), clock, config)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthSession> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn enrollments(&self) -> Arc<EnrollmentService> {
        Arc::clone(&self.enrollments)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn player(&self) -> Arc<SessionBootstrap> {
        Arc::clone(&self.player)
    }
}
