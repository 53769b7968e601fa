//! Leaflet 绑定
//!
//! `L` 由 index.html 中的 leaflet.js 提供，这里只绑定用到的几个接口。

use std::cell::{Cell, RefCell};

use js_sys::{Array, Object, Reflect};
use snapmap_shared::GeoPoint;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::error::ClientResult;

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";
const TILE_MAX_ZOOM: u8 = 19;

#[wasm_bindgen]
extern "C" {
    pub type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn create_map(element: &HtmlElement) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: u8) -> LeafletMap;

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &LeafletMap) -> LatLng;

    #[wasm_bindgen(method)]
    fn remove(this: &LeafletMap);

    pub type LatLng;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &LatLng) -> f64;

    pub type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_tiles_to(this: &TileLayer, map: &LeafletMap) -> TileLayer;

    pub type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    fn layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_group_to(this: &LayerGroup, map: &LeafletMap) -> LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &LayerGroup, layer: &Marker) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    fn clear_layers(this: &LayerGroup) -> LayerGroup;

    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn marker(lat_lng: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Marker, content: &HtmlElement) -> Marker;
}

fn lat_lng(point: GeoPoint) -> JsValue {
    let [lat, lng] = point.lat_lng();
    Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lng)).into()
}

fn tile_options() -> ClientResult<JsValue> {
    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("maxZoom"),
        &JsValue::from_f64(f64::from(TILE_MAX_ZOOM)),
    )?;
    Reflect::set(
        &options,
        &JsValue::from_str("attribution"),
        &JsValue::from_str(TILE_ATTRIBUTION),
    )?;
    Ok(options.into())
}

/// 地图实例及其标记层
///
/// 弹窗中的事件闭包也挂在这里，清空标记或移除地图时一并释放。
pub struct MapSurface {
    map: LeafletMap,
    markers: LayerGroup,
    listeners: RefCell<Vec<Closure<dyn FnMut()>>>,
    generation: Cell<u64>,
    removed: Cell<bool>,
}

impl MapSurface {
    pub fn mount(element: &HtmlElement, center: GeoPoint, zoom: u8) -> ClientResult<Self> {
        let map = create_map(element)?;
        map.set_view(&lat_lng(center), zoom);
        tile_layer(TILE_URL, &tile_options()?).add_tiles_to(&map);
        let markers = layer_group().add_group_to(&map);
        Ok(Self {
            map,
            markers,
            listeners: RefCell::new(Vec::new()),
            generation: Cell::new(0),
            removed: Cell::new(false),
        })
    }

    pub fn center_on(&self, point: GeoPoint, zoom: u8) {
        if !self.removed.get() {
            self.map.set_view(&lat_lng(point), zoom);
        }
    }

    pub fn center(&self) -> Option<GeoPoint> {
        if self.removed.get() {
            return None;
        }
        let center = self.map.get_center();
        GeoPoint::new(center.lat(), center.lng())
    }

    /// 开始一次标记加载；返回的代号用于丢弃过期结果
    pub fn begin_load(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    pub fn is_current(&self, generation: u64) -> bool {
        !self.removed.get() && self.generation.get() == generation
    }

    pub fn clear_markers(&self) {
        if !self.removed.get() {
            self.markers.clear_layers();
        }
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(listeners);
    }

    pub fn add_marker(&self, point: GeoPoint, popup: &HtmlElement) {
        if self.removed.get() {
            return;
        }
        let marker = marker(&lat_lng(point));
        marker.bind_popup(popup);
        self.markers.add_layer(&marker);
    }

    pub fn keep_listener(&self, listener: Closure<dyn FnMut()>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// 移除地图，可重复调用
    pub fn remove(&self) {
        if self.removed.replace(true) {
            return;
        }
        self.markers.clear_layers();
        self.map.remove();
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(listeners);
    }
}
