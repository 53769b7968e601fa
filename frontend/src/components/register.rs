use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::register;
use crate::components::notice::{NoticeBanner, NoticeSlot};
use crate::context::AppContext;
use crate::web::route::AppRoute;

#[component]
pub fn RegisterForm(ctx: AppContext) -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (registered, set_registered) = signal(false);
    let notice = NoticeSlot::new();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        notice.clear();

        let ctx = ctx.clone();
        spawn_local(async move {
            let result = register(
                &ctx,
                &email.get_untracked(),
                &password.get_untracked(),
                &confirm.get_untracked(),
            )
            .await;
            match result {
                Ok(user) => {
                    notice.success(format!("Account created for {}. You can now log in.", user.email));
                    set_password.set(String::new());
                    set_confirm.set(String::new());
                    set_registered.set(true);
                }
                Err(e) => {
                    log_error!("[Auth] Registration failed: {}", e);
                    notice.danger(e.user_message());
                }
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="card w-full max-w-md mx-auto shadow-xl bg-base-100">
            <form id="register-form" class="card-body" on:submit=on_submit>
                <h2 class="card-title">"Register"</h2>
                <NoticeBanner slot=notice />

                <div class="form-control">
                    <label class="label" for="register-email">
                        <span class="label-text">"Email"</span>
                    </label>
                    <input
                        id="register-email"
                        type="email"
                        autocomplete="email"
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        prop:value=email
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control">
                    <label class="label" for="register-password">
                        <span class="label-text">"Password"</span>
                    </label>
                    <input
                        id="register-password"
                        type="password"
                        autocomplete="new-password"
                        minlength="8"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control">
                    <label class="label" for="register-confirm">
                        <span class="label-text">"Confirm password"</span>
                    </label>
                    <input
                        id="register-confirm"
                        type="password"
                        autocomplete="new-password"
                        on:input=move |ev| set_confirm.set(event_target_value(&ev))
                        prop:value=confirm
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                        } else {
                            "Register".into_any()
                        }}
                    </button>
                </div>
                <Show when=move || registered.get()>
                    <a class="btn btn-link" href=AppRoute::Login.fragment()>"Go to login"</a>
                </Show>
            </form>
        </div>
    }
}
