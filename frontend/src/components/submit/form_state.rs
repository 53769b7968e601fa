//! 提交表单状态
//!
//! 把描述、定位与"是否已选择图片"整合为 `FormState`，
//! 校验逻辑在 [`build_submission`] 中，不依赖 DOM。

use leptos::prelude::*;
use snapmap_shared::{DESCRIPTION_MAX_LEN, GeoPoint, NewSubmission};

use crate::error::{ClientError, ClientResult};

/// 校验并构建新提交
///
/// 需要会话 token、图片与定位；描述可选，超长时拒绝。
pub fn build_submission(
    token: Option<&str>,
    has_image: bool,
    location: Option<GeoPoint>,
    description: &str,
) -> ClientResult<NewSubmission> {
    if token.is_none_or(|t| t.trim().is_empty()) {
        return Err(ClientError::Unauthenticated(
            "Authentication error. Please log in again.".to_string(),
        ));
    }
    if !has_image {
        return Err(ClientError::Validation(
            "Please select a photo or capture one using the camera.".to_string(),
        ));
    }
    let location = location.ok_or_else(|| {
        ClientError::Validation("Location not available yet. Please wait for it.".to_string())
    })?;

    let description = description.trim();
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(ClientError::Validation(format!(
            "Description must be at most {} characters.",
            DESCRIPTION_MAX_LEN
        )));
    }

    Ok(NewSubmission {
        description: (!description.is_empty()).then(|| description.to_string()),
        latitude: location.latitude,
        longitude: location.longitude,
    })
}

/// 校验失败时展示的文本，保留表单给出的原始说明
pub fn rejection_message(error: &ClientError) -> String {
    match error {
        ClientError::Unauthenticated(msg) | ClientError::Validation(msg) => msg.clone(),
        other => other.user_message(),
    }
}

/// 表单状态结构体
#[derive(Clone, Copy)]
pub struct FormState {
    pub description: RwSignal<String>,
    pub location: RwSignal<Option<GeoPoint>>,
    pub has_image: RwSignal<bool>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            description: RwSignal::new(String::new()),
            location: RwSignal::new(None),
            has_image: RwSignal::new(false),
        }
    }

    /// 提交成功后清空输入；定位保留
    pub fn reset(&self) {
        let _ = self.description.try_set(String::new());
        let _ = self.has_image.try_set(false);
    }

    pub fn to_request(&self, token: Option<&str>) -> ClientResult<NewSubmission> {
        build_submission(
            token,
            self.has_image.get_untracked(),
            self.location.get_untracked(),
            &self.description.get_untracked(),
        )
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
