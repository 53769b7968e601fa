//! 浏览器定位
//!
//! 把 `navigator.geolocation.getCurrentPosition` 的回调包装成 future。

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use js_sys::Reflect;
use snapmap_shared::GeoPoint;
use wasm_bindgen::prelude::*;
use web_sys::PositionOptions;

const TIMEOUT_MS: u32 = 10_000;

type Reply = Rc<RefCell<Option<oneshot::Sender<Result<GeoPoint, String>>>>>;

fn number_at(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

fn point_from_position(position: &JsValue) -> Result<GeoPoint, String> {
    let coords = Reflect::get(position, &JsValue::from_str("coords"))
        .map_err(|_| "position has no coordinates".to_string())?;
    let latitude = number_at(&coords, "latitude");
    let longitude = number_at(&coords, "longitude");
    latitude
        .zip(longitude)
        .and_then(|(lat, lon)| GeoPoint::new(lat, lon))
        .ok_or_else(|| "position coordinates are invalid".to_string())
}

fn send(reply: &Reply, result: Result<GeoPoint, String>) {
    if let Some(tx) = reply.borrow_mut().take() {
        let _ = tx.send(result);
    }
}

/// 获取一次当前位置；不支持定位或用户拒绝时返回错误描述
pub async fn current_position() -> Result<GeoPoint, String> {
    let geolocation = web_sys::window()
        .ok_or_else(|| "window is not available".to_string())?
        .navigator()
        .geolocation()
        .map_err(|_| "Geolocation is not supported by your browser.".to_string())?;

    let (tx, rx) = oneshot::channel();
    let reply: Reply = Rc::new(RefCell::new(Some(tx)));

    let on_success = {
        let reply = reply.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |position: JsValue| {
            send(&reply, point_from_position(&position));
        })
    };
    let on_error = {
        let reply = reply.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
            let message = Reflect::get(&error, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
                .unwrap_or_else(|| "unknown error".to_string());
            send(&reply, Err(message));
        })
    };

    let options = PositionOptions::new();
    options.set_enable_high_accuracy(true);
    options.set_timeout(TIMEOUT_MS);
    options.set_maximum_age(0);

    geolocation
        .get_current_position_with_error_callback_and_options(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
            &options,
        )
        .map_err(|e| format!("{:?}", e))?;

    // 回调闭包需要存活到结果返回
    let result = rx
        .await
        .unwrap_or_else(|_| Err("location request was dropped".to_string()));
    drop((on_success, on_error));
    result
}
