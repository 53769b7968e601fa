//! 运行时配置
//!
//! 每个键依次查找：运行时来源（页面中的 `<meta name="snapmap:<key>">`）
//! -> 编译期环境变量 `SNAPMAP_<KEY>` -> 默认值。

use snapmap_shared::GeoPoint;

// =========================================================
// 默认值
// =========================================================

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";
const DEFAULT_VIEWS_BASE: &str = "views";
const DEFAULT_TOKEN_KEY: &str = "accessToken";
const DEFAULT_RADIUS_KM: f64 = snapmap_shared::DEFAULT_RADIUS_KM;
const DEFAULT_LATITUDE: f64 = 37.7749;
const DEFAULT_LONGITUDE: f64 = -122.4194;
const DEFAULT_MAP_ZOOM: u8 = 13;

const META_PREFIX: &str = "snapmap:";

/// 编译期注入的配置（`SNAPMAP_API_BASE_URL=... trunk build`）
fn compiled(key: &str) -> Option<&'static str> {
    match key {
        "api-base-url" => option_env!("SNAPMAP_API_BASE_URL"),
        "views-base" => option_env!("SNAPMAP_VIEWS_BASE"),
        "token-key" => option_env!("SNAPMAP_TOKEN_KEY"),
        "default-radius-km" => option_env!("SNAPMAP_DEFAULT_RADIUS_KM"),
        "default-latitude" => option_env!("SNAPMAP_DEFAULT_LATITUDE"),
        "default-longitude" => option_env!("SNAPMAP_DEFAULT_LONGITUDE"),
        "map-zoom" => option_env!("SNAPMAP_MAP_ZOOM"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub views_base: String,
    pub token_key: String,
    pub default_radius_km: f64,
    pub default_center: GeoPoint,
    pub map_zoom: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::load(|_| None)
    }
}

impl AppConfig {
    /// 从任意查找函数构建配置
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .or_else(|| compiled(key).map(str::to_string))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str, default: f64| {
            value(key)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };

        let default_center = GeoPoint::new(
            number("default-latitude", DEFAULT_LATITUDE),
            number("default-longitude", DEFAULT_LONGITUDE),
        )
        .unwrap_or(GeoPoint {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
        });

        let default_radius_km = Some(number("default-radius-km", DEFAULT_RADIUS_KM))
            .filter(|r| *r > 0.0)
            .unwrap_or(DEFAULT_RADIUS_KM);

        Self {
            api_base_url: value("api-base-url")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            views_base: value("views-base")
                .unwrap_or_else(|| DEFAULT_VIEWS_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            token_key: value("token-key").unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
            default_radius_km,
            default_center,
            map_zoom: value("map-zoom")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAP_ZOOM),
        }
    }

    /// 读取页面 `<meta name="snapmap:*">`
    pub fn from_document() -> Self {
        let document = web_sys::window().and_then(|w| w.document());
        Self::load(|key| {
            let selector = format!("meta[name=\"{}{}\"]", META_PREFIX, key);
            document
                .as_ref()?
                .query_selector(&selector)
                .ok()??
                .get_attribute("content")
        })
    }
}
