//! 摄像头采集
//!
//! 持有当前的 `MediaStream`；停止或 drop 时关闭所有轨道。

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::api::Attachment;
use crate::error::{ClientError, ClientResult};

const JPEG_QUALITY: f64 = 0.9;

pub fn capture_filename(now_ms: f64) -> String {
    format!("capture-{}.jpg", now_ms as u64)
}

#[derive(Default)]
pub struct Camera {
    stream: RefCell<Option<MediaStream>>,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.stream.borrow().is_some()
    }

    /// 打开后置摄像头并输出到 `video`
    pub async fn start(&self, video: &HtmlVideoElement) -> ClientResult<()> {
        self.stop(Some(video));

        let devices = web_sys::window()
            .ok_or_else(|| ClientError::Browser("window is not available".to_string()))?
            .navigator()
            .media_devices()?;

        let video_constraints = Object::new();
        Reflect::set(
            &video_constraints,
            &JsValue::from_str("facingMode"),
            &JsValue::from_str("environment"),
        )?;
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video_constraints);
        constraints.set_audio(&JsValue::FALSE);

        let stream: MediaStream =
            JsFuture::from(devices.get_user_media_with_constraints(&constraints)?)
                .await?
                .dyn_into()
                .map_err(|_| ClientError::Browser("getUserMedia returned no stream".to_string()))?;

        video.set_src_object(Some(&stream));
        *self.stream.borrow_mut() = Some(stream);
        log_info!("[Camera] Stream started");
        Ok(())
    }

    /// 关闭所有轨道，可重复调用
    pub fn stop(&self, video: Option<&HtmlVideoElement>) {
        let stream = self.stream.borrow_mut().take();
        if let Some(stream) = stream {
            for track in stream.get_tracks().iter() {
                if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                    track.stop();
                }
            }
            log_info!("[Camera] Stream stopped");
        }
        if let Some(video) = video {
            video.set_src_object(None);
        }
    }

    /// 截取当前帧为 JPEG
    pub async fn capture(&self, video: &HtmlVideoElement) -> ClientResult<Attachment> {
        if !self.is_active() {
            return Err(ClientError::Validation("Camera not active.".to_string()));
        }

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ClientError::Browser("document is not available".to_string()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| ClientError::Browser("canvas element unavailable".to_string()))?;
        canvas.set_width(video.video_width());
        canvas.set_height(video.video_height());

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| ClientError::Browser("2d context unavailable".to_string()))?
            .dyn_into()
            .map_err(|_| ClientError::Browser("2d context unavailable".to_string()))?;
        context.draw_image_with_html_video_element_and_dw_and_dh(
            video,
            0.0,
            0.0,
            f64::from(canvas.width()),
            f64::from(canvas.height()),
        )?;

        let (tx, rx) = oneshot::channel::<Option<Blob>>();
        let reply = Rc::new(RefCell::new(Some(tx)));
        let on_blob = Closure::<dyn FnMut(JsValue)>::new(move |blob: JsValue| {
            if let Some(tx) = reply.borrow_mut().take() {
                let _ = tx.send(blob.dyn_into::<Blob>().ok());
            }
        });
        canvas.to_blob_with_type_and_encoder_options(
            on_blob.as_ref().unchecked_ref(),
            "image/jpeg",
            &JsValue::from_f64(JPEG_QUALITY),
        )?;

        let blob = rx.await.ok().flatten();
        drop(on_blob);

        let blob = blob.ok_or_else(|| ClientError::Browser("Failed to capture photo.".to_string()))?;
        Ok(Attachment {
            field: "image",
            blob,
            filename: capture_filename(js_sys::Date::now()),
        })
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.stop(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_names_use_milliseconds() {
        assert_eq!(capture_filename(1_700_000_000_123.0), "capture-1700000000123.jpg");
    }
}
