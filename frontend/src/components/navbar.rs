use leptos::prelude::*;

use crate::auth;
use crate::context::AppContext;
use crate::web::route::AppRoute;

/// 顶部导航栏，入口可见性由 `AppContext::nav` 驱动
#[component]
pub fn Navbar(ctx: AppContext) -> impl IntoView {
    let nav = ctx.nav;

    let on_logout = move |ev: leptos::web_sys::MouseEvent| {
        ev.prevent_default();
        auth::logout(&ctx);
    };

    view! {
        <nav class="navbar bg-base-100 shadow-sm px-4">
            <div class="flex-1">
                <a class="btn btn-ghost text-xl" href=AppRoute::Map.fragment()>"SnapMap"</a>
            </div>
            <ul class="menu menu-horizontal px-1 gap-1">
                <li><a href=AppRoute::Map.fragment()>"Map"</a></li>
                <Show when=move || nav.get().submit>
                    <li id="submit-link"><a href=AppRoute::Submit.fragment()>"Submit Photo"</a></li>
                </Show>
                <Show when=move || nav.get().profile>
                    <li id="profile-link"><a href=AppRoute::Profile.fragment()>"Profile"</a></li>
                </Show>
                <Show when=move || nav.get().login>
                    <li id="login-link"><a href=AppRoute::Login.fragment()>"Login"</a></li>
                </Show>
                <Show when=move || nav.get().register>
                    <li id="register-link"><a href=AppRoute::Register.fragment()>"Register"</a></li>
                </Show>
                <Show when=move || nav.get().logout>
                    <li id="logout-link"><a href="#" on:click=on_logout.clone()>"Logout"</a></li>
                </Show>
            </ul>
        </nav>
    }
}
