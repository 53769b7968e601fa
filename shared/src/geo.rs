//! 地理坐标模块
//!
//! 后端以 WKT 文本传输点位（PostGIS / GeoAlchemy 输出），例如
//! `SRID=4326;POINT(-122.4194 37.7749)`。注意 WKT 的坐标顺序是 **经度在前**。

use serde::{Deserialize, Serialize};
use std::fmt;

/// WGS 84 坐标系的 SRID
pub const SRID_WGS84: u32 = 4326;

/// 经纬度坐标点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// 创建坐标点，超出合法范围时返回 `None`
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// 解析 WKT 点位
    ///
    /// 接受以下形式（大小写不敏感，允许首尾空白）：
    /// - `POINT(lon lat)`
    /// - `POINT (lon lat)`
    /// - `SRID=4326;POINT(lon lat)`
    pub fn from_wkt(text: &str) -> Option<Self> {
        let mut body = text.trim();

        // 可选的 SRID 前缀
        if let Some((prefix, rest)) = body.split_once(';') {
            if !prefix.trim().to_ascii_uppercase().starts_with("SRID=") {
                return None;
            }
            body = rest.trim();
        }

        if !body.get(..5)?.eq_ignore_ascii_case("POINT") {
            return None;
        }
        let coords = body[5..]
            .trim_start()
            .strip_prefix('(')?
            .strip_suffix(')')?
            .trim();

        let mut parts = coords.split_whitespace();
        let longitude: f64 = parts.next()?.parse().ok()?;
        let latitude: f64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        Self::new(latitude, longitude)
    }

    /// 序列化为带 SRID 的 WKT 文本
    pub fn to_wkt(&self) -> String {
        format!(
            "SRID={};POINT({} {})",
            SRID_WGS84, self.longitude, self.latitude
        )
    }

    /// 以 Leaflet 期望的 `[lat, lng]` 顺序返回
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
