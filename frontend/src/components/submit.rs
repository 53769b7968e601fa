pub mod camera;
mod form_state;

use std::rc::Rc;

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{Blob, HtmlInputElement, Url};

use self::camera::Camera;
use self::form_state::{FormState, rejection_message};
use crate::api::Attachment;
use crate::components::notice::{NoticeBanner, NoticeSlot};
use crate::context::AppContext;
use crate::web::geolocation;

/// 定位状态行
#[derive(Debug, Clone, PartialEq)]
enum LocationStatus {
    Pending,
    Acquired(String),
    Failed(String),
}

impl LocationStatus {
    fn text(&self) -> String {
        match self {
            LocationStatus::Pending => "Fetching location...".to_string(),
            LocationStatus::Acquired(at) => format!("Location acquired: {}", at),
            LocationStatus::Failed(reason) => format!(
                "Error getting location: {}. Please ensure location services are enabled.",
                reason
            ),
        }
    }

    fn class(&self) -> &'static str {
        match self {
            LocationStatus::Pending => "text-sm opacity-70",
            LocationStatus::Acquired(_) => "text-sm text-success",
            LocationStatus::Failed(_) => "text-sm text-error",
        }
    }
}

#[component]
pub fn SubmitForm(ctx: AppContext, camera: Rc<Camera>) -> impl IntoView {
    let form = FormState::new();
    let notice = NoticeSlot::new();
    let status = RwSignal::new(LocationStatus::Pending);
    let camera_active = RwSignal::new(false);
    let is_submitting = RwSignal::new(false);
    let preview_url = RwSignal::new(Option::<String>::None);

    let camera = StoredValue::new_local(camera);
    let image = StoredValue::new_local(Option::<Attachment>::None);
    let video_ref = NodeRef::<html::Video>::new();
    let file_ref = NodeRef::<html::Input>::new();

    // 定位
    spawn_local(async move {
        match geolocation::current_position().await {
            Ok(point) => {
                log_info!("[Submit] Location acquired: {}", point);
                let _ = form.location.try_set(Some(point));
                let _ = status.try_set(LocationStatus::Acquired(point.to_string()));
            }
            Err(e) => {
                log_warn!("[Submit] Geolocation error: {}", e);
                let _ = status.try_set(LocationStatus::Failed(e));
            }
        }
    });

    // 预览使用 object URL，替换或拆除时回收
    let set_preview = move |blob: Option<&Blob>| {
        let next = blob.and_then(|b| Url::create_object_url_with_blob(b).ok());
        if let Some(previous) = preview_url.try_get_untracked().flatten() {
            let _ = Url::revoke_object_url(&previous);
        }
        let _ = preview_url.try_set(next);
    };
    on_cleanup(move || {
        if let Some(previous) = preview_url.try_get_untracked().flatten() {
            let _ = Url::revoke_object_url(&previous);
        }
    });

    let stop_camera = move || {
        camera.try_with_value(|c| c.stop(video_ref.get_untracked().as_ref()));
        let _ = camera_active.try_set(false);
    };

    let clear_file_input = move || {
        if let Some(input) = file_ref.get_untracked() {
            input.set_value("");
        }
    };

    let on_use_camera = move |_: leptos::ev::MouseEvent| {
        let Some(video) = video_ref.get_untracked() else {
            return;
        };
        let camera = camera.get_value();
        spawn_local(async move {
            match camera.start(&video).await {
                Ok(()) => {
                    let _ = camera_active.try_set(true);
                    image.try_update_value(|v| *v = None);
                    let _ = form.has_image.try_set(false);
                    set_preview(None);
                    clear_file_input();
                    notice.info("Camera started. Point and capture.");
                }
                Err(e) => {
                    log_error!("[Submit] Error accessing camera: {}", e);
                    notice.danger(format!("Error accessing camera: {}", e));
                    stop_camera();
                }
            }
        });
    };

    let on_capture = move |_: leptos::ev::MouseEvent| {
        let Some(video) = video_ref.get_untracked() else {
            return;
        };
        let camera = camera.get_value();
        if !camera.is_active() {
            notice.warning("Camera not active.");
            return;
        }
        spawn_local(async move {
            match camera.capture(&video).await {
                Ok(photo) => {
                    set_preview(Some(&photo.blob));
                    image.try_update_value(|v| *v = Some(photo));
                    let _ = form.has_image.try_set(true);
                    notice.success("Photo captured!");
                }
                Err(e) => {
                    log_error!("[Submit] Capture failed: {}", e);
                    notice.danger("Failed to capture photo.");
                }
            }
            stop_camera();
        });
    };

    let on_cancel_camera = move |_: leptos::ev::MouseEvent| stop_camera();

    let on_file_change = move |ev: leptos::ev::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.item(0));
        match file {
            Some(file) => {
                let filename = file.name();
                let blob = Blob::from(file);
                set_preview(Some(&blob));
                image.set_value(Some(Attachment {
                    field: "image",
                    blob,
                    filename,
                }));
                form.has_image.set(true);
                stop_camera();
            }
            None => {
                set_preview(None);
                image.set_value(None);
                form.has_image.set(false);
            }
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        notice.clear();

        let token = ctx.session.token();
        let request = match form.to_request(token.as_deref()) {
            Ok(request) => request,
            Err(e) => {
                notice.warning(rejection_message(&e));
                return;
            }
        };
        let (Some(token), Some(photo)) = (token, image.get_value()) else {
            return;
        };

        is_submitting.set(true);
        let api = ctx.api.clone();
        spawn_local(async move {
            match api.create_submission(&token, &request, &photo).await {
                Ok(created) => {
                    log_info!("[Submit] Submission {} created", created.id);
                    notice.success("Photo submitted successfully!");
                    form.reset();
                    image.try_update_value(|v| *v = None);
                    set_preview(None);
                    clear_file_input();
                    stop_camera();
                }
                Err(e) => {
                    log_error!("[Submit] Submission failed: {}", e);
                    notice.danger(e.user_message());
                }
            }
            let _ = is_submitting.try_set(false);
        });
    };

    let can_submit =
        move || form.location.with(|l| l.is_some()) && !is_submitting.get();

    view! {
        <div class="card w-full max-w-xl mx-auto shadow-xl bg-base-100">
            <form id="submit-form" class="card-body gap-3" on:submit=on_submit>
                <h2 class="card-title">"Submit a photo"</h2>
                <NoticeBanner slot=notice />

                <p id="location-status" class=move || status.with(|s| s.class())>
                    {move || status.with(|s| s.text())}
                </p>

                <div class="form-control">
                    <label class="label" for="image-file">
                        <span class="label-text">"Photo"</span>
                    </label>
                    <input
                        id="image-file"
                        node_ref=file_ref
                        type="file"
                        accept="image/*"
                        class="file-input file-input-bordered w-full"
                        on:change=on_file_change
                    />
                </div>

                <div class="flex gap-2">
                    <button type="button" id="use-camera-btn" class="btn btn-outline btn-sm" on:click=on_use_camera>
                        "Use camera"
                    </button>
                </div>

                <div id="camera-view" class="space-y-2" class:hidden=move || !camera_active.get()>
                    <video node_ref=video_ref class="w-full rounded" autoplay playsinline muted></video>
                    <div class="flex gap-2">
                        <button type="button" id="capture-btn" class="btn btn-primary btn-sm" on:click=on_capture>
                            "Capture"
                        </button>
                        <button type="button" id="cancel-camera-btn" class="btn btn-ghost btn-sm" on:click=on_cancel_camera>
                            "Cancel"
                        </button>
                    </div>
                </div>

                <Show when=move || preview_url.with(|p| p.is_some())>
                    <img
                        id="image-preview"
                        class="max-h-64 rounded"
                        alt="Preview"
                        src=move || preview_url.get().unwrap_or_default()
                    />
                </Show>

                <div class="form-control">
                    <label class="label" for="description">
                        <span class="label-text">"Description (optional)"</span>
                    </label>
                    <textarea
                        id="description"
                        class="textarea textarea-bordered"
                        maxlength=snapmap_shared::DESCRIPTION_MAX_LEN.to_string()
                        prop:value=move || form.description.get()
                        on:input=move |ev| form.description.set(event_target_value(&ev))
                    ></textarea>
                </div>

                <div class="form-control mt-2">
                    <button id="submit-btn" class="btn btn-primary" disabled=move || !can_submit()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Uploading..." }.into_any()
                        } else {
                            "Submit".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
