//! 路由定义模块 - 领域模型
//!
//! 不依赖 DOM，定义了应用的所有视图及其 hash token。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    Login,
    Register,
    /// 地图 (默认路由)
    #[default]
    Map,
    /// 上传图片 (需要登录)
    Submit,
    /// 个人资料 (需要登录)
    Profile,
}

impl AppRoute {
    pub const ALL: [AppRoute; 5] = [
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::Map,
        AppRoute::Submit,
        AppRoute::Profile,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Map => "map",
            Self::Submit => "submit",
            Self::Profile => "profile",
        }
    }

    /// `#login` 形式的片段
    pub fn fragment(&self) -> String {
        format!("#{}", self.token())
    }

    /// 视图模板位置
    pub fn locator(&self, views_base: &str) -> String {
        format!("{}/{}.html", views_base.trim_end_matches('/'), self.token())
    }

    /// 视图模板中组件挂载点的元素 id
    pub fn mount_id(&self) -> String {
        format!("{}-root", self.token())
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fragment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_default_is_registered() {
        let tokens: std::collections::HashSet<_> =
            AppRoute::ALL.iter().map(|route| route.token()).collect();
        assert_eq!(tokens.len(), AppRoute::ALL.len());
        assert_eq!(AppRoute::default(), AppRoute::Map);
        assert!(AppRoute::ALL.contains(&AppRoute::default()));
    }

    #[test]
    fn locators_follow_views_base() {
        assert_eq!(AppRoute::Submit.locator("views"), "views/submit.html");
        assert_eq!(AppRoute::Profile.locator("/static/views/"), "/static/views/profile.html");
        assert_eq!(AppRoute::Login.mount_id(), "login-root");
        assert_eq!(AppRoute::Register.to_string(), "#register");
    }
}
