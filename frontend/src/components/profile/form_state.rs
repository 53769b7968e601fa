//! 个人资料表单状态

use leptos::prelude::*;
use snapmap_shared::{GeoPoint, UserRead, UserUpdate};

use crate::error::{ClientError, ClientResult};

const HOME_LOCATION_INCOMPLETE: &str =
    "Please provide both valid Latitude and Longitude for Home Location, or leave both blank.";

/// 从表单文本构建 `PUT /users/me` 请求体
///
/// 空字段不发送；家庭位置的经纬度必须同时提供或同时留空。
pub fn build_user_update(
    avatar_url: &str,
    default_radius_km: &str,
    home_latitude: &str,
    home_longitude: &str,
) -> ClientResult<UserUpdate> {
    let avatar_url = avatar_url.trim();
    let radius = default_radius_km.trim();
    let (lat, lon) = (home_latitude.trim(), home_longitude.trim());

    let default_radius_km = if radius.is_empty() {
        None
    } else {
        match radius.parse::<f64>() {
            Ok(r) if r.is_finite() && r > 0.0 => Some(r),
            _ => {
                return Err(ClientError::Validation(
                    "Default radius must be a positive number.".to_string(),
                ));
            }
        }
    };

    let home_location = match (lat.is_empty(), lon.is_empty()) {
        (true, true) => None,
        _ => {
            let point = lat
                .parse::<f64>()
                .ok()
                .zip(lon.parse::<f64>().ok())
                .and_then(|(lat, lon)| GeoPoint::new(lat, lon))
                .ok_or_else(|| ClientError::Validation(HOME_LOCATION_INCOMPLETE.to_string()))?;
            Some(point.to_wkt())
        }
    };

    Ok(UserUpdate {
        avatar_url: (!avatar_url.is_empty()).then(|| avatar_url.to_string()),
        home_location,
        default_radius_km,
    })
}

/// 操作失败提示：有后端 detail 时带上，否则使用兜底文本
pub fn failure_message(action: &str, fallback: &str, error: &ClientError) -> String {
    match error {
        ClientError::Unauthenticated(_) => error.user_message(),
        ClientError::BackendRequestFailed { detail, .. } => format!("{} failed: {}", action, detail),
        ClientError::Validation(msg) => msg.clone(),
        _ => fallback.to_string(),
    }
}

/// 表单字段
#[derive(Clone, Copy)]
pub struct ProfileFields {
    pub avatar_url: RwSignal<String>,
    pub default_radius_km: RwSignal<String>,
    pub home_latitude: RwSignal<String>,
    pub home_longitude: RwSignal<String>,
}

impl ProfileFields {
    pub fn new() -> Self {
        Self {
            avatar_url: RwSignal::new(String::new()),
            default_radius_km: RwSignal::new(String::new()),
            home_latitude: RwSignal::new(String::new()),
            home_longitude: RwSignal::new(String::new()),
        }
    }

    /// 用后端返回的用户数据回填
    pub fn fill_from(&self, user: &UserRead) {
        let _ = self
            .avatar_url
            .try_set(user.avatar_url.clone().unwrap_or_default());
        let _ = self
            .default_radius_km
            .try_set(user.default_radius_km.to_string());
        match user.home_point() {
            Some(point) => self.set_home(point),
            None => {
                if let Some(raw) = &user.home_location {
                    log_warn!("[Profile] Could not parse home_location WKT: {}", raw);
                }
                let _ = self.home_latitude.try_set(String::new());
                let _ = self.home_longitude.try_set(String::new());
            }
        }
    }

    pub fn set_home(&self, point: GeoPoint) {
        let _ = self.home_latitude.try_set(point.latitude.to_string());
        let _ = self.home_longitude.try_set(point.longitude.to_string());
    }

    pub fn to_update(&self) -> ClientResult<UserUpdate> {
        build_user_update(
            &self.avatar_url.get_untracked(),
            &self.default_radius_km.get_untracked(),
            &self.home_latitude.get_untracked(),
            &self.home_longitude.get_untracked(),
        )
    }
}

impl Default for ProfileFields {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_sends_nothing() {
        assert_eq!(build_user_update("", " ", "", "").unwrap(), UserUpdate::default());
    }

    #[test]
    fn home_location_is_encoded_as_wkt() {
        let update = build_user_update(
            "https://example.com/me.png",
            "7.5",
            "37.7749",
            "-122.4194",
        )
        .unwrap();
        assert_eq!(update.avatar_url.as_deref(), Some("https://example.com/me.png"));
        assert_eq!(update.default_radius_km, Some(7.5));
        assert_eq!(
            update.home_location.as_deref(),
            Some("SRID=4326;POINT(-122.4194 37.7749)")
        );
    }

    #[test]
    fn home_location_needs_both_coordinates() {
        for (lat, lon) in [("37.7", ""), ("", "-122.4"), ("north", "-122.4"), ("95", "10")] {
            assert_eq!(
                build_user_update("", "", lat, lon).unwrap_err(),
                ClientError::Validation(HOME_LOCATION_INCOMPLETE.to_string()),
                "lat={lat:?} lon={lon:?}"
            );
        }
    }

    #[test]
    fn radius_must_be_positive() {
        assert!(build_user_update("", "0", "", "").is_err());
        assert!(build_user_update("", "-3", "", "").is_err());
        assert!(build_user_update("", "wide", "", "").is_err());
    }

    #[test]
    fn failure_messages_prefer_backend_detail() {
        let backend = ClientError::BackendRequestFailed {
            status: 403,
            detail: "Editing window has closed".into(),
        };
        assert_eq!(
            failure_message("Update", "Failed to update submission.", &backend),
            "Update failed: Editing window has closed"
        );
        assert_eq!(
            failure_message("Delete", "Failed to delete submission.", &ClientError::Network("offline".into())),
            "Failed to delete submission."
        );
        assert_eq!(
            failure_message("Update", "x", &ClientError::Unauthenticated("Not authenticated".into())),
            "Authentication failed. Please log in again."
        );
    }
}
