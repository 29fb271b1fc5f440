//! Postgres repositories. Each struct wraps a [`sqlx::PgPool`] and exposes
//! the queries one API surface needs.

pub mod dashboard_queries;
pub mod device_repository;
pub mod feedback_repository;
pub mod user_repository;

pub use dashboard_queries::DashboardQueries;
pub use device_repository::DeviceRepository;
pub use feedback_repository::FeedbackRepository;
pub use user_repository::UserRepository;
