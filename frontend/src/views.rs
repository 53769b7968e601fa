//! 视图注册
//!
//! 每个路由对应 `views/<token>.html` 模板；模板插入内容区域后，初始化器把
//! 对应组件挂载到模板里的 `#<token>-root`，并把挂载句柄与浏览器资源交给
//! `ViewGuard`，离开视图时统一释放。

use std::rc::Rc;

use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::components::login::LoginForm;
use crate::components::map::MapControls;
use crate::components::map::leaflet::MapSurface;
use crate::components::profile::ProfileView;
use crate::components::register::RegisterForm;
use crate::components::submit::SubmitForm;
use crate::components::submit::camera::Camera;
use crate::context::AppContext;
use crate::error::{ClientError, ClientResult};
use crate::registry::{ViewGuard, ViewRegistry};
use crate::web::route::AppRoute;

/// 地图容器的元素 id（位于 map.html 模板内）
const MAP_ELEMENT_ID: &str = "map";

fn element_by_id(id: &str) -> ClientResult<HtmlElement> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| ClientError::Browser(format!("element #{} not found in view", id)))
}

fn mount_root(route: AppRoute) -> ClientResult<HtmlElement> {
    element_by_id(&route.mount_id())
}

// =========================================================
// 初始化器
// =========================================================

fn init_login(ctx: &AppContext) -> ClientResult<ViewGuard> {
    let ctx = ctx.clone();
    let handle = mount_to(mount_root(AppRoute::Login)?, move || view! { <LoginForm ctx=ctx /> });
    Ok(ViewGuard::empty().hold(handle))
}

fn init_register(ctx: &AppContext) -> ClientResult<ViewGuard> {
    let ctx = ctx.clone();
    let handle = mount_to(mount_root(AppRoute::Register)?, move || {
        view! { <RegisterForm ctx=ctx /> }
    });
    Ok(ViewGuard::empty().hold(handle))
}

fn init_map(ctx: &AppContext) -> ClientResult<ViewGuard> {
    let root = mount_root(AppRoute::Map)?;
    let surface = Rc::new(MapSurface::mount(
        &element_by_id(MAP_ELEMENT_ID)?,
        ctx.config.default_center,
        ctx.config.map_zoom,
    )?);

    let ctx = ctx.clone();
    let controls = surface.clone();
    let handle = mount_to(root, move || view! { <MapControls ctx=ctx surface=controls /> });

    // 先卸载组件，再移除地图
    Ok(ViewGuard::empty()
        .hold(handle)
        .on_release(move || surface.remove()))
}

fn init_submit(ctx: &AppContext) -> ClientResult<ViewGuard> {
    let root = mount_root(AppRoute::Submit)?;
    let camera = Rc::new(Camera::new());

    let ctx = ctx.clone();
    let form_camera = camera.clone();
    let handle = mount_to(root, move || view! { <SubmitForm ctx=ctx camera=form_camera /> });

    Ok(ViewGuard::empty()
        .hold(handle)
        .on_release(move || camera.stop(None)))
}

fn init_profile(ctx: &AppContext) -> ClientResult<ViewGuard> {
    let ctx = ctx.clone();
    let handle = mount_to(mount_root(AppRoute::Profile)?, move || {
        view! { <ProfileView ctx=ctx /> }
    });
    Ok(ViewGuard::empty().hold(handle))
}

// =========================================================
// 注册表
// =========================================================

/// 注册所有视图，默认路由为地图
pub fn build_registry(ctx: &AppContext) -> ClientResult<ViewRegistry> {
    let views = ctx.config.views_base.as_str();
    let mut builder = ViewRegistry::builder(AppRoute::default().token());

    for route in AppRoute::ALL {
        let ctx = ctx.clone();
        let init = move || -> ClientResult<ViewGuard> {
            log_info!("[Views] Initializing {}", route.token());
            match route {
                AppRoute::Login => init_login(&ctx),
                AppRoute::Register => init_register(&ctx),
                AppRoute::Map => init_map(&ctx),
                AppRoute::Submit => init_submit(&ctx),
                AppRoute::Profile => init_profile(&ctx),
            }
        };
        builder = builder.route_with(route.token(), route.locator(views), init);
    }

    builder.build()
}
