//! 个人资料视图
//!
//! 读取当前用户、编辑资料，以及管理自己的提交（限时编辑描述、删除）。

mod form_state;

use leptos::prelude::*;
use leptos::task::spawn_local;
use snapmap_shared::chrono::{DateTime, Utc};
use snapmap_shared::{SUBMISSION_EDIT_WINDOW_MINUTES, SubmissionRead, UserRead};

use self::form_state::{ProfileFields, failure_message};
use crate::components::map::local_time;
use crate::components::notice::{NoticeBanner, NoticeSlot};
use crate::context::AppContext;
use crate::error::ClientError;
use crate::web::geolocation;

#[derive(Debug, Clone, PartialEq)]
enum SubmissionList {
    Loading,
    Loaded(Vec<SubmissionRead>),
    Failed,
}

fn load_error_message(error: &ClientError) -> &'static str {
    if error.is_unauthenticated() {
        "Authentication failed. Please log in again."
    } else {
        "Failed to load profile data. Please try logging in again."
    }
}

fn now_utc() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// `window.prompt`；取消时返回 `None`
fn prompt_description(id: i64, current: Option<&str>) -> Option<String> {
    let message = format!("Enter new description for submission {}:", id);
    web_sys::window()?
        .prompt_with_message_and_default(&message, current.unwrap_or_default())
        .ok()
        .flatten()
}

fn confirm_delete(id: i64) -> bool {
    let message = format!(
        "Are you sure you want to delete submission {}? This cannot be undone.",
        id
    );
    web_sys::window()
        .and_then(|w| w.confirm_with_message(&message).ok())
        .unwrap_or(false)
}

#[component]
pub fn ProfileView(ctx: AppContext) -> impl IntoView {
    let notice = NoticeSlot::new();
    let fields = ProfileFields::new();
    let user = RwSignal::new(Option::<UserRead>::None);
    let load_error = RwSignal::new(Option::<&'static str>::None);
    let submissions = RwSignal::new(SubmissionList::Loading);
    let is_saving = RwSignal::new(false);

    // 先取用户，成功后再取提交列表
    {
        let ctx = ctx.clone();
        spawn_local(async move {
            let Some(token) = ctx.session.token() else {
                let _ = load_error.try_set(Some(load_error_message(&ClientError::Unauthenticated(
                    "missing token".to_string(),
                ))));
                return;
            };

            match ctx.api.current_user(&token).await {
                Ok(me) => {
                    log_info!("[Profile] Loaded user {}", me.id);
                    fields.fill_from(&me);
                    let _ = user.try_set(Some(me));
                }
                Err(e) => {
                    log_error!("[Profile] Failed to fetch user profile: {}", e);
                    let _ = load_error.try_set(Some(load_error_message(&e)));
                    return;
                }
            }

            match ctx.api.my_submissions(&token).await {
                Ok(list) => {
                    let _ = submissions.try_set(SubmissionList::Loaded(list));
                }
                Err(e) => {
                    log_error!("[Profile] Failed to fetch user submissions: {}", e);
                    let _ = submissions.try_set(SubmissionList::Failed);
                    notice.danger("Failed to load your submissions.");
                }
            }
        });
    }

    let on_use_location = move |_: leptos::ev::MouseEvent| {
        spawn_local(async move {
            match geolocation::current_position().await {
                Ok(point) => {
                    fields.set_home(point);
                    notice.success("Current location populated.");
                }
                Err(e) => {
                    log_warn!("[Profile] Geolocation error: {}", e);
                    notice.danger("Could not get current location.");
                }
            }
        });
    };

    let on_update = {
        let ctx = ctx.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            notice.clear();

            let update = match fields.to_update() {
                Ok(update) => update,
                Err(e) => {
                    notice.danger(e.user_message());
                    return;
                }
            };
            let Some(token) = ctx.session.token() else {
                notice.danger("Authentication failed. Please log in again.");
                return;
            };

            is_saving.set(true);
            let api = ctx.api.clone();
            spawn_local(async move {
                match api.update_user(&token, &update).await {
                    Ok(updated) => {
                        log_info!("[Profile] Profile updated");
                        fields.fill_from(&updated);
                        let _ = user.try_set(Some(updated));
                        notice.success("Profile updated successfully!");
                    }
                    Err(e) => {
                        log_error!("[Profile] Profile update failed: {}", e);
                        notice.danger(failure_message(
                            "Update",
                            "Profile update failed. Please try again.",
                            &e,
                        ));
                    }
                }
                let _ = is_saving.try_set(false);
            });
        }
    };

    let edit_submission = {
        let ctx = ctx.clone();
        move |id: i64, current: Option<String>| {
            let Some(description) = prompt_description(id, current.as_deref()) else {
                return;
            };
            let Some(token) = ctx.session.token() else {
                notice.danger("Authentication failed. Please log in again.");
                return;
            };
            let api = ctx.api.clone();
            spawn_local(async move {
                match api.edit_submission(&token, id, Some(description)).await {
                    Ok(updated) => {
                        submissions.try_update(|list| {
                            if let SubmissionList::Loaded(items) = list {
                                if let Some(item) = items.iter_mut().find(|s| s.id == updated.id) {
                                    *item = updated;
                                }
                            }
                        });
                        notice.success("Submission updated successfully!");
                    }
                    Err(e) => {
                        log_error!("[Profile] Update of submission {} failed: {}", id, e);
                        notice.danger(failure_message("Update", "Failed to update submission.", &e));
                    }
                }
            });
        }
    };

    let delete_submission = {
        let ctx = ctx.clone();
        move |id: i64| {
            if !confirm_delete(id) {
                return;
            }
            let Some(token) = ctx.session.token() else {
                notice.danger("Authentication failed. Please log in again.");
                return;
            };
            let api = ctx.api.clone();
            spawn_local(async move {
                match api.delete_submission(&token, id).await {
                    Ok(_) => {
                        submissions.try_update(|list| {
                            if let SubmissionList::Loaded(items) = list {
                                items.retain(|s| s.id != id);
                            }
                        });
                        notice.success("Submission deleted successfully!");
                    }
                    Err(e) => {
                        log_error!("[Profile] Delete of submission {} failed: {}", id, e);
                        notice.danger(failure_message("Delete", "Failed to delete submission.", &e));
                    }
                }
            });
        }
    };

    let submission_rows = move || match submissions.get() {
        SubmissionList::Loading => view! { <p>"Loading your submissions..."</p> }.into_any(),
        SubmissionList::Failed => ().into_any(),
        SubmissionList::Loaded(items) if items.is_empty() => {
            view! { <p>"You have not submitted any photos yet."</p> }.into_any()
        }
        SubmissionList::Loaded(items) => {
            let now = now_utc();
            let edit_submission = edit_submission.clone();
            let delete_submission = delete_submission.clone();
            view! {
                <ul class="divide-y divide-base-300">
                    {items
                        .into_iter()
                        .map(|sub| {
                            let id = sub.id;
                            let editable = sub.is_editable(now);
                            let current = sub.description.clone();
                            let edit_submission = edit_submission.clone();
                            let delete_submission = delete_submission.clone();
                            view! {
                                <li class="flex flex-wrap items-center justify-between gap-2 py-2" data-submission-id=id.to_string()>
                                    <div class="flex items-center gap-3">
                                        <img src=sub.image_url.clone() alt="Thumbnail" width="60" height="60" class="rounded" />
                                        <div>
                                            <p class="mb-1">{sub.description_or_placeholder().to_string()}</p>
                                            <small class="opacity-70">{format!("Uploaded: {}", local_time(&sub.uploaded_at))}</small>
                                        </div>
                                    </div>
                                    <div class="flex gap-2">
                                        <button
                                            type="button"
                                            class="btn btn-sm btn-outline edit-submission-btn"
                                            disabled=!editable
                                            title=(!editable).then(|| format!(
                                                "Editing only allowed within {} minutes of upload.",
                                                SUBMISSION_EDIT_WINDOW_MINUTES
                                            ))
                                            on:click=move |_| edit_submission(id, current.clone())
                                        >
                                            "Edit"
                                        </button>
                                        <button
                                            type="button"
                                            class="btn btn-sm btn-outline btn-error delete-submission-btn"
                                            on:click=move |_| delete_submission(id)
                                        >
                                            "Delete"
                                        </button>
                                    </div>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            }
            .into_any()
        }
    };

    view! {
        <div class="space-y-4 max-w-2xl mx-auto">
            <NoticeBanner slot=notice />
            <Show when=move || load_error.with(|e| e.is_some())>
                <div id="profile-error" role="alert" class="alert alert-error text-sm">
                    {move || load_error.get().unwrap_or_default()}
                </div>
            </Show>

            <Show when=move || user.with(|u| u.is_some())>
                <div class="card shadow bg-base-100">
                    <div class="card-body gap-1">
                        <h2 class="card-title">"Profile"</h2>
                        <p>
                            "Email: "
                            <span id="profile-email">
                                {move || user.with(|u| {
                                    u.as_ref()
                                        .map(|u| u.email.clone())
                                        .filter(|e| !e.is_empty())
                                        .unwrap_or_else(|| "N/A".to_string())
                                })}
                            </span>
                        </p>
                        <p>
                            "Avatar URL: "
                            <span id="profile-avatar-url">
                                {move || user.with(|u| {
                                    u.as_ref()
                                        .and_then(|u| u.avatar_url.clone())
                                        .filter(|a| !a.is_empty())
                                        .unwrap_or_else(|| "None".to_string())
                                })}
                            </span>
                        </p>
                    </div>
                </div>

                <form id="profile-update-form" class="card shadow bg-base-100" on:submit=on_update.clone()>
                    <div class="card-body gap-2">
                        <h3 class="font-bold">"Update profile"</h3>
                        <label class="label" for="avatar-url"><span class="label-text">"Avatar URL"</span></label>
                        <input
                            id="avatar-url"
                            name="avatar_url"
                            type="url"
                            class="input input-bordered"
                            prop:value=move || fields.avatar_url.get()
                            on:input=move |ev| fields.avatar_url.set(event_target_value(&ev))
                        />
                        <label class="label" for="default-radius"><span class="label-text">"Default radius (km)"</span></label>
                        <input
                            id="default-radius"
                            name="default_radius_km"
                            type="number"
                            step="0.1"
                            min="0.1"
                            class="input input-bordered"
                            prop:value=move || fields.default_radius_km.get()
                            on:input=move |ev| fields.default_radius_km.set(event_target_value(&ev))
                        />
                        <div class="grid grid-cols-2 gap-2">
                            <input
                                id="home-latitude"
                                name="home_latitude"
                                type="number"
                                step="any"
                                placeholder="Latitude"
                                class="input input-bordered"
                                prop:value=move || fields.home_latitude.get()
                                on:input=move |ev| fields.home_latitude.set(event_target_value(&ev))
                            />
                            <input
                                id="home-longitude"
                                name="home_longitude"
                                type="number"
                                step="any"
                                placeholder="Longitude"
                                class="input input-bordered"
                                prop:value=move || fields.home_longitude.get()
                                on:input=move |ev| fields.home_longitude.set(event_target_value(&ev))
                            />
                        </div>
                        <div class="flex gap-2 mt-2">
                            <button
                                type="button"
                                id="set-home-location-current"
                                class="btn btn-outline btn-sm"
                                on:click=on_use_location
                            >
                                "Use current location"
                            </button>
                            <button type="submit" class="btn btn-primary btn-sm" disabled=move || is_saving.get()>
                                "Save"
                            </button>
                        </div>
                    </div>
                </form>

                <div class="card shadow bg-base-100">
                    <div id="profile-submissions-list" class="card-body">
                        <h3 class="font-bold">"My submissions"</h3>
                        {submission_rows.clone()}
                    </div>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_distinguish_expired_sessions() {
        assert_eq!(
            load_error_message(&ClientError::Unauthenticated("Not authenticated".into())),
            "Authentication failed. Please log in again."
        );
        assert_eq!(
            load_error_message(&ClientError::Network("offline".into())),
            "Failed to load profile data. Please try logging in again."
        );
    }
}
