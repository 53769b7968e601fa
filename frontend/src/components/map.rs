//! 地图视图
//!
//! 定位 -> 查询附近提交 -> 渲染标记与投票弹窗。半径滑块松开时按当前地图中心重新查询。

pub mod leaflet;

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use snapmap_shared::chrono::{DateTime, Utc};
use snapmap_shared::{GeoPoint, NearbyQuery, SubmissionRead, Vote};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use self::leaflet::MapSurface;
use crate::components::notice::{NoticeBanner, NoticeSlot};
use crate::context::AppContext;
use crate::error::{ClientError, ClientResult};
use crate::web::geolocation;

const MIN_RADIUS_KM: u32 = 1;
const MAX_RADIUS_KM: u32 = 50;

// =========================================================
// 提示文本
// =========================================================

fn nearby_error_message(error: &ClientError) -> String {
    match error {
        ClientError::BackendRequestFailed { detail, .. } | ClientError::Unauthenticated(detail) => {
            format!("Error: {}", detail)
        }
        _ => "Failed to load nearby photos. Please try again later.".to_string(),
    }
}

fn vote_error_message(error: &ClientError) -> String {
    match error {
        ClientError::Unauthenticated(_) => {
            "Authentication required to vote. Please log in.".to_string()
        }
        ClientError::BackendRequestFailed { detail, .. } => format!("Error: {}", detail),
        _ => "Failed to record vote.".to_string(),
    }
}

fn slider_radius(radius_km: f64) -> u32 {
    (radius_km.round() as u32).clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
}

/// 按浏览器本地时区格式化
pub(crate) fn local_time(at: &DateTime<Utc>) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(at.timestamp_millis() as f64));
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}

// =========================================================
// 弹窗
// =========================================================

fn current_document() -> ClientResult<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ClientError::Browser("document is not available".to_string()))
}

fn element(document: &Document, tag: &str, class: &str) -> ClientResult<Element> {
    let el = document.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

/// 投票按钮，返回 (按钮, 计数 span)
fn vote_button(document: &Document, class: &str, icon: &str, count: i64) -> ClientResult<(Element, Element)> {
    let button = element(document, "button", class)?;
    button.set_attribute("type", "button")?;
    button.set_text_content(Some(icon));
    let counter = element(document, "span", "ml-1")?;
    counter.set_text_content(Some(&count.to_string()));
    button.append_child(&counter)?;
    Ok((button, counter))
}

fn build_popup(
    ctx: &AppContext,
    surface: &MapSurface,
    notice: NoticeSlot,
    submission: &SubmissionRead,
) -> ClientResult<HtmlElement> {
    let document = current_document()?;
    let root: HtmlElement = element(&document, "div", "space-y-1")?
        .dyn_into()
        .map_err(|_| ClientError::Browser("popup root is not an HtmlElement".to_string()))?;

    let title = element(&document, "b", "block")?;
    title.set_text_content(Some(submission.description_or_placeholder()));
    root.append_child(&title)?;

    let image = element(&document, "img", "rounded")?;
    image.set_attribute("src", &submission.image_url)?;
    image.set_attribute("alt", "Submission thumbnail")?;
    image.set_attribute("width", "100")?;
    root.append_child(&image)?;

    let uploaded = element(&document, "small", "block opacity-70")?;
    uploaded.set_text_content(Some(&format!(
        "Uploaded: {}",
        local_time(&submission.uploaded_at)
    )));
    root.append_child(&uploaded)?;

    let actions = element(&document, "div", "flex gap-1 mt-1")?;
    let (up_button, up_count) = vote_button(
        &document,
        "btn btn-xs btn-outline btn-success thumb-btn",
        "👍",
        submission.thumbs_up_count,
    )?;
    let (down_button, down_count) = vote_button(
        &document,
        "btn btn-xs btn-outline btn-error thumb-btn",
        "👎",
        submission.thumbs_down_count,
    )?;
    actions.append_child(&up_button)?;
    actions.append_child(&down_button)?;
    root.append_child(&actions)?;

    for (button, vote) in [(up_button, Vote::Up), (down_button, Vote::Down)] {
        let id = submission.id;
        let api = ctx.api.clone();
        let session = ctx.session.clone();
        let (up_count, down_count) = (up_count.clone(), down_count.clone());
        let on_click = Closure::<dyn FnMut()>::new(move || {
            let api = api.clone();
            let token = session.token();
            let (up_count, down_count) = (up_count.clone(), down_count.clone());
            log_info!("[Map] Voting {} on submission {}", vote.path_segment(), id);
            spawn_local(async move {
                match api.vote(token.as_deref(), id, vote).await {
                    Ok(updated) => {
                        up_count.set_text_content(Some(&updated.thumbs_up_count.to_string()));
                        down_count.set_text_content(Some(&updated.thumbs_down_count.to_string()));
                    }
                    Err(e) => {
                        log_error!("[Map] Vote on {} failed: {}", id, e);
                        notice.danger(vote_error_message(&e));
                    }
                }
            });
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        surface.keep_listener(on_click);
    }

    Ok(root)
}

// =========================================================
// 加载
// =========================================================

fn load_markers(
    ctx: AppContext,
    surface: Rc<MapSurface>,
    notice: NoticeSlot,
    center: GeoPoint,
    radius_km: f64,
) {
    let generation = surface.begin_load();
    log_info!("[Map] Fetching markers near {} within {}km", center, radius_km);

    spawn_local(async move {
        let result = ctx.api.nearby(&NearbyQuery::around(center, radius_km)).await;
        if !surface.is_current(generation) {
            return;
        }

        let submissions = match result {
            Ok(submissions) => submissions,
            Err(e) => {
                log_error!("[Map] Failed to fetch markers: {}", e);
                notice.danger(nearby_error_message(&e));
                return;
            }
        };

        surface.clear_markers();
        if submissions.is_empty() {
            notice.info("No nearby submissions found in this area.");
            return;
        }

        for submission in &submissions {
            let Some(point) = submission.point() else {
                log_warn!("[Map] Could not parse location WKT: {}", submission.location);
                continue;
            };
            match build_popup(&ctx, &surface, notice, submission) {
                Ok(popup) => surface.add_marker(point, &popup),
                Err(e) => log_error!("[Map] Failed to build popup for {}: {}", submission.id, e),
            }
        }
    });
}

// =========================================================
// 组件
// =========================================================

/// 半径滑块与提示区域；地图本身由视图初始化器创建
#[component]
pub fn MapControls(ctx: AppContext, surface: Rc<MapSurface>) -> impl IntoView {
    let notice = NoticeSlot::new();
    let radius = RwSignal::new(slider_radius(ctx.config.default_radius_km));

    // 先定位，失败时退回默认中心
    {
        let ctx = ctx.clone();
        let surface = surface.clone();
        let initial_radius = f64::from(radius.get_untracked());
        spawn_local(async move {
            let center = match geolocation::current_position().await {
                Ok(point) => {
                    surface.center_on(point, ctx.config.map_zoom);
                    point
                }
                Err(e) => {
                    log_warn!("[Map] Geolocation error: {}", e);
                    notice.warning("Could not get your location. Showing default area.");
                    ctx.config.default_center
                }
            };
            load_markers(ctx, surface, notice, center, initial_radius);
        });
    }

    let surface = StoredValue::new_local(surface);

    let on_input = move |ev: leptos::ev::Event| {
        if let Ok(value) = event_target_value(&ev).parse::<u32>() {
            radius.set(value.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM));
        }
    };

    let on_change = move |_: leptos::ev::Event| {
        let surface = surface.get_value();
        let center = surface.center().unwrap_or(ctx.config.default_center);
        load_markers(
            ctx.clone(),
            surface,
            notice,
            center,
            f64::from(radius.get_untracked()),
        );
    };

    view! {
        <div class="flex items-center gap-3 my-2">
            <label class="label-text" for="radius-slider">"Search radius"</label>
            <input
                id="radius-slider"
                type="range"
                min=MIN_RADIUS_KM.to_string()
                max=MAX_RADIUS_KM.to_string()
                step="1"
                class="range range-sm range-primary w-64"
                prop:value=move || radius.get().to_string()
                on:input=on_input
                on:change=on_change
            />
            <span id="radius-value" class="badge badge-outline">
                {move || format!("{} km", radius.get())}
            </span>
        </div>
        <NoticeBanner slot=notice />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_errors() {
        assert_eq!(
            vote_error_message(&ClientError::Unauthenticated("Not authenticated".into())),
            "Authentication required to vote. Please log in."
        );
        assert_eq!(
            vote_error_message(&ClientError::BackendRequestFailed {
                status: 404,
                detail: "Submission not found".into()
            }),
            "Error: Submission not found"
        );
        assert_eq!(
            vote_error_message(&ClientError::Network("offline".into())),
            "Failed to record vote."
        );
    }

    #[test]
    fn nearby_errors() {
        assert_eq!(
            nearby_error_message(&ClientError::BackendRequestFailed {
                status: 422,
                detail: "radius_km: value too large".into()
            }),
            "Error: radius_km: value too large"
        );
        assert_eq!(
            nearby_error_message(&ClientError::Decode("eof".into())),
            "Failed to load nearby photos. Please try again later."
        );
    }

    #[test]
    fn slider_radius_is_clamped() {
        assert_eq!(slider_radius(5.0), 5);
        assert_eq!(slider_radius(0.2), 1);
        assert_eq!(slider_radius(120.0), 50);
        assert_eq!(slider_radius(12.5), 13);
    }
}
