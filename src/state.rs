use sqlx::PgPool;

use crate::database::{DashboardQueries, DeviceRepository, FeedbackRepository, UserRepository};

/// Shared application state: one repository per API surface, all cloning the
/// same connection pool.
#[derive(Clone)]
pub struct AppState {
    pub devices: DeviceRepository,
    pub feedbacks: FeedbackRepository,
    pub dashboard: DashboardQueries,
    pub users: UserRepository,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            devices: DeviceRepository::new(pool.clone()),
            feedbacks: FeedbackRepository::new(pool.clone()),
            dashboard: DashboardQueries::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }
}
