//! Domain types shared across handlers and repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sentiment submitted by a feedback terminal. Closed set matching the
/// `feedbacks.type` check constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Unsatisfied,
    Neutral,
    Satisfied,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 3] = [
        FeedbackType::Unsatisfied,
        FeedbackType::Neutral,
        FeedbackType::Satisfied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Unsatisfied => "unsatisfied",
            FeedbackType::Neutral => "neutral",
            FeedbackType::Satisfied => "satisfied",
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted feedback record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub device_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dashboard user account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user, safe to return from the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_type_serde_round_trip() {
        for ty in FeedbackType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
            let back: FeedbackType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }
    }

    #[test]
    fn test_feedback_type_rejects_unknown_value() {
        let result = serde_json::from_str::<FeedbackType>("\"ecstatic\"");
        assert!(result.is_err());
    }
}
