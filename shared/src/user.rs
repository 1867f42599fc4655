//! 用户与会话模型

use crate::serde_helper::{count_or_zero, non_empty_string, null_as_default, string_lenient};
use serde::{Deserialize, Serialize};

// =========================================================
// 会话 (Session)
// =========================================================

/// 会话中保存的用户身份
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub role: String,
}

/// 客户端持有的认证凭据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

/// `POST /auth/jwt/create/` 的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `POST /auth/jwt/create/` 的响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub refresh: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: SessionUser,
}

impl From<TokenResponse> for Session {
    fn from(resp: TokenResponse) -> Self {
        Self {
            access_token: resp.access,
            refresh_token: resp.refresh,
            user: resp.user,
        }
    }
}

// =========================================================
// 用户列表与统计
// =========================================================

/// `GET /auth/users/all/` 中的一条用户记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub full_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
}

impl Customer {
    /// 姓名或邮箱包含搜索词（忽略大小写）
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.full_name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
    }
}

/// 按搜索词过滤用户列表，保持原有顺序
pub fn filter_customers<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    customers.iter().filter(|c| c.matches(term)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub customer: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub admin: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub moderator: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub superusers: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTotals {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub active_users: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub verified_users: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub by_role: RoleCounts,
}

impl UserTotals {
    pub fn unverified_users(&self) -> u64 {
        self.active_users.saturating_sub(self.verified_users)
    }
}

/// `GET /auth/admin/analytics/users/` 的响应
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnalytics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals: UserTotals,
}

// =========================================================
// 创建协管员 (Moderators)
// =========================================================

/// `POST /auth/create-moderator/` 的请求体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModeratorDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl ModeratorDraft {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn customer(name: &str, email: &str) -> Customer {
        Customer {
            full_name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_customers_by_name_or_email() {
        let customers = vec![
            customer("Kofi Mensah", "kofi@example.com"),
            customer("Abena Owusu", "abena@shop.gh"),
            customer("Yaw Boateng", "YAW@EXAMPLE.COM"),
        ];

        let by_name = filter_customers(&customers, "ABENA");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].full_name, "Abena Owusu");

        let by_email = filter_customers(&customers, "example.com");
        assert_eq!(by_email.len(), 2);

        assert_eq!(filter_customers(&customers, "  ").len(), 3);
        assert!(filter_customers(&customers, "zzz").is_empty());
    }

    #[test]
    fn test_user_analytics_defaults_missing_counts() {
        let analytics: UserAnalytics = serde_json::from_value(json!({
            "totals": {
                "active_users": 40,
                "verified_users": 25,
                "by_role": { "customer": 35, "admin": 2 }
            }
        }))
        .unwrap();

        assert_eq!(analytics.totals.unverified_users(), 15);
        assert_eq!(analytics.totals.by_role.admin, 2);
        assert_eq!(analytics.totals.by_role.moderator, 0);

        let empty: UserAnalytics = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.totals.unverified_users(), 0);
    }

    #[test]
    fn test_unverified_never_underflows() {
        let totals = UserTotals {
            active_users: 3,
            verified_users: 5,
            ..Default::default()
        };
        assert_eq!(totals.unverified_users(), 0);
    }

    #[test]
    fn test_token_response_into_session() {
        let resp: TokenResponse = serde_json::from_value(json!({
            "access": "a.b.c",
            "refresh": "r.s.t",
            "user": { "id": 7, "email": "admin@shop.gh", "role": "admin" }
        }))
        .unwrap();

        let session = Session::from(resp);
        assert_eq!(session.access_token, "a.b.c");
        assert_eq!(session.user.id, "7");
        assert_eq!(session.user.role, "admin");
    }

    #[test]
    fn test_moderator_draft_body() {
        let draft = ModeratorDraft {
            first_name: "Kofi".to_string(),
            last_name: "Mensah".to_string(),
            email: "kofi@shop.gh".to_string(),
            phone: "0240000000".to_string(),
            password: "pa55word".to_string(),
            confirm_password: "pa55word".to_string(),
        };
        assert!(draft.passwords_match());

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["phone"], json!("0240000000"));
        assert_eq!(body["confirm_password"], json!("pa55word"));

        let mismatch = ModeratorDraft {
            confirm_password: "other".to_string(),
            ..draft
        };
        assert!(!mismatch.passwords_match());
    }
}
