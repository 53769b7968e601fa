use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod geo;
pub mod protocol;
pub mod time;

pub use chrono;
pub use geo::GeoPoint;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
/// 上传后允许修改描述的时间窗口
pub const SUBMISSION_EDIT_WINDOW_MINUTES: i64 = 10;
pub const DESCRIPTION_MAX_LEN: usize = 256;

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

// =========================================================
// 认证 (Auth)
// =========================================================

/// OAuth2 password 表单登录，`username` 字段实际承载邮箱
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

impl TokenResponse {
    /// 后端有时会返回 200 但没有 token，这种情况视为登录失败
    pub fn token(&self) -> Option<&str> {
        let token = self.access_token.trim();
        (!token.is_empty()).then_some(token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

// =========================================================
// 用户 (Users)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRead {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// WKT 格式的家庭位置
    #[serde(default)]
    pub home_location: Option<String>,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
}

impl UserRead {
    pub fn home_point(&self) -> Option<GeoPoint> {
        self.home_location.as_deref().and_then(GeoPoint::from_wkt)
    }
}

/// `PUT /users/me` 的请求体，未设置的字段不会被发送
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_radius_km: Option<f64>,
}

// =========================================================
// 图片提交 (Submissions)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRead {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// WKT 点位；附近查询接口历史上用过 `location_wkt` 这个字段名
    #[serde(alias = "location_wkt")]
    pub location: String,
    pub image_url: String,
    #[serde(with = "time::utc_lenient")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, with = "time::utc_lenient_option")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbs_up_count: i64,
    #[serde(default)]
    pub thumbs_down_count: i64,
    #[serde(default)]
    pub is_locked: bool,
}

impl SubmissionRead {
    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::from_wkt(&self.location)
    }

    pub fn description_or_placeholder(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => "No description",
        }
    }

    /// 只有未锁定且仍在编辑窗口内的提交才能修改描述
    pub fn is_editable(&self, now: DateTime<Utc>) -> bool {
        !self.is_locked
            && now.signed_duration_since(self.uploaded_at)
                < Duration::minutes(SUBMISSION_EDIT_WINDOW_MINUTES)
    }
}

/// 新建提交的表单字段（图片本身由前端以 multipart 附件发送）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionUpdate {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn path_segment(&self) -> &'static str {
        match self {
            Vote::Up => "thumbs_up",
            Vote::Down => "thumbs_down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl NearbyQuery {
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_km,
        }
    }
}

// =========================================================
// 错误响应 (Error bodies)
// =========================================================

/// FastAPI 风格的错误响应体：`{"detail": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

/// `detail` 既可能是字符串，也可能是校验错误列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(i64),
    Field(String),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Index(i) => write!(f, "{}", i),
            LocSegment::Field(name) => f.write_str(name),
        }
    }
}

impl ErrorDetail {
    /// 拼接为一行可读文本，校验错误取最后一级字段名：`field: msg, field: msg`
    pub fn flatten(&self) -> String {
        match self {
            ErrorDetail::Message(msg) => msg.clone(),
            ErrorDetail::Validation(issues) => issues
                .iter()
                .map(|issue| match issue.loc.last() {
                    Some(field) => format!("{}: {}", field, issue.msg),
                    None => issue.msg.clone(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
