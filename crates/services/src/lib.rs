#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod catalog_service;
pub mod config;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod error;
pub mod notice;
pub mod player;

pub use edustream_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthSession, AuthState};
pub use catalog_service::{CatalogQuery, CatalogService, CategoryFilter};
pub use config::PlayerConfig;
pub use dashboard_service::{Dashboard, DashboardService, InstructorCourse};
pub use enrollment_service::{EnrollmentOutcome, EnrollmentService};
pub use error::{
    AppServicesError, AuthError, CatalogError, DashboardError, EnrollError, LoadError, SyncError,
};
pub use notice::{Notice, NoticeVariant};
pub use player::{
    Bootstrap, MediaElement, MediaEvent, PlaybackObserver, PlaybackState, PlayerSession,
    ProgressSampler, ProgressSync, SamplerState, SessionBootstrap, SimulatedMedia, SyncTarget,
    TickOutcome,
};
