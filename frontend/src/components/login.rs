use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{login, login_error_message};
use crate::components::notice::{NoticeBanner, NoticeSlot};
use crate::context::AppContext;
use crate::web::route::AppRoute;

#[component]
pub fn LoginForm(ctx: AppContext) -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let notice = NoticeSlot::new();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get_untracked().trim().is_empty() || password.get_untracked().is_empty() {
            notice.warning("Please fill in all fields");
            return;
        }

        set_is_submitting.set(true);
        notice.clear();

        let ctx = ctx.clone();
        spawn_local(async move {
            if let Err(e) = login(&ctx, &email.get_untracked(), &password.get_untracked()).await {
                log_error!("[Auth] Login failed: {}", e);
                notice.danger(login_error_message(&e));
            }
            // 登录成功时视图已经被替换
            let _ = set_is_submitting.try_set(false);
        });
    };

    view! {
        <div class="card w-full max-w-md mx-auto shadow-xl bg-base-100">
            <form id="login-form" class="card-body" on:submit=on_submit>
                <h2 class="card-title">"Login"</h2>
                <NoticeBanner slot=notice />

                <div class="form-control">
                    <label class="label" for="login-email">
                        <span class="label-text">"Email"</span>
                    </label>
                    <input
                        id="login-email"
                        name="username"
                        type="email"
                        autocomplete="username"
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        prop:value=email
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control">
                    <label class="label" for="login-password">
                        <span class="label-text">"Password"</span>
                    </label>
                    <input
                        id="login-password"
                        name="password"
                        type="password"
                        autocomplete="current-password"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Logging in..." }.into_any()
                        } else {
                            "Login".into_any()
                        }}
                    </button>
                </div>
                <p class="text-sm text-center mt-2">
                    "No account yet? "
                    <a class="link link-primary" href=AppRoute::Register.fragment()>"Register"</a>
                </p>
            </form>
        </div>
    }
}
