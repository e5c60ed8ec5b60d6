use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::user::User;

/// `{"user": {...}}` envelope for the account endpoints.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserBody,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
}

pub fn user_response(user: &User, token: String) -> UserResponse {
    UserResponse {
        user: UserBody {
            email: user.email.clone(),
            token,
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
        },
    }
}

/// `{"profile": {...}}` envelope.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/// Public view of an account. `following` is the viewer's edge, computed by
/// the caller; anonymous viewers always see `false`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    pub following: bool,
}

pub fn profile(user: &User, following: bool) -> Profile {
    Profile {
        username: user.username.clone(),
        bio: user.bio.clone(),
        image: user.image.clone(),
        following,
    }
}

pub fn profile_response(user: &User, following: bool) -> ProfileResponse {
    ProfileResponse {
        profile: profile(user, following),
    }
}

/// Paginated account listing for the elevated surface.
#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub users: Vec<AccountBody>,
    #[serde(rename = "usersCount")]
    pub users_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AccountBody {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub fn accounts_response(users: &[User], total: i64) -> AccountsResponse {
    AccountsResponse {
        users: users
            .iter()
            .map(|user| AccountBody {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                role: user.role.clone(),
                created_at: user.created_at,
            })
            .collect(),
        users_count: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: "hash".to_string(),
            bio: String::new(),
            image: None,
            role: "user".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_body_never_leaks_the_password_hash() {
        let body = user_response(&sample_user(), "a.b.c".to_string());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["user"]["username"], "tester");
        assert_eq!(json["user"]["token"], "a.b.c");
        assert!(json["user"].get("password_hash").is_none());
        // Absent image serializes as an explicit null
        assert!(json["user"]["image"].is_null());
    }

    #[test]
    fn profile_carries_the_viewer_edge() {
        let user = sample_user();
        assert!(!profile(&user, false).following);
        assert!(profile(&user, true).following);
    }
}
