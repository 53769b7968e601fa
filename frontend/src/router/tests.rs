use super::*;
use crate::registry::{ViewGuard, ViewInitializer, ViewRegistry};
use futures::channel::oneshot;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

// =========================================================
// Shared Mock Components
// =========================================================

struct TestContext {
    /// Operation log to verify calling order
    log: RefCell<Vec<String>>,
    /// Markup served per locator
    pages: RefCell<HashMap<String, String>>,
    /// Locators whose fetch fails
    failing: RefCell<HashSet<String>>,
    /// Fetches that wait for the test to release them
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
}

impl TestContext {
    fn new() -> Self {
        let ctx = Self {
            log: RefCell::new(Vec::new()),
            pages: RefCell::new(HashMap::new()),
            failing: RefCell::new(HashSet::new()),
            gates: RefCell::new(HashMap::new()),
        };
        for token in ["login", "map", "submit"] {
            ctx.pages.borrow_mut().insert(
                format!("views/{}.html", token),
                format!("<section>{}</section>", token),
            );
        }
        ctx
    }

    fn push_log(&self, msg: String) {
        self.log.borrow_mut().push(msg);
    }

    fn log_entries(&self, prefix: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Holds the next fetch of `locator` until the returned sender fires
    fn gate(&self, locator: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(locator.to_string(), rx);
        tx
    }

    fn last_host_event(&self) -> Option<String> {
        self.log
            .borrow()
            .iter()
            .rev()
            .find(|entry| entry.starts_with("host:"))
            .cloned()
    }
}

struct TestSource {
    ctx: Rc<TestContext>,
}

#[async_trait(?Send)]
impl ContentSource for TestSource {
    async fn fetch(&self, locator: &str) -> ClientResult<String> {
        self.ctx.push_log(format!("fetch:{}", locator));
        let gate = self.ctx.gates.borrow_mut().remove(locator);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.ctx.failing.borrow().contains(locator) {
            return Err(ClientError::ContentFetchFailed("404 Not Found".into()));
        }
        self.ctx
            .pages
            .borrow()
            .get(locator)
            .cloned()
            .ok_or_else(|| ClientError::Network("connection refused".into()))
    }
}

struct TestHost {
    ctx: Rc<TestContext>,
}

impl ContentHost for TestHost {
    fn show_content(&self, html: &str) {
        self.ctx.push_log(format!("host:content:{}", html));
    }

    fn show_error(&self, message: &str) {
        self.ctx.push_log(format!("host:error:{}", message));
    }
}

fn initializer(ctx: &Rc<TestContext>, token: &'static str) -> impl ViewInitializer + 'static {
    let ctx = ctx.clone();
    move || -> ClientResult<ViewGuard> {
        ctx.push_log(format!("init:{}", token));
        let release_ctx = ctx.clone();
        Ok(ViewGuard::empty()
            .on_release(move || release_ctx.push_log(format!("release:{}", token))))
    }
}

fn setup_router() -> (Rc<TestContext>, Router<TestSource, TestHost>) {
    let ctx = Rc::new(TestContext::new());
    let registry = ViewRegistry::builder("map")
        .route_with("login", "views/login.html", initializer(&ctx, "login"))
        .route_with("map", "views/map.html", initializer(&ctx, "map"))
        .route("submit", "views/submit.html")
        .build()
        .unwrap();
    let router = Router::new(
        registry,
        TestSource { ctx: ctx.clone() },
        TestHost { ctx: ctx.clone() },
    );
    (ctx, router)
}

fn failed_not_found(route: &str) -> RouterState {
    RouterState::Failed {
        route: route.into(),
        error: ClientError::RouteNotFound(route.into()),
    }
}

// =========================================================
// Tests
// =========================================================

#[tokio::test]
async fn test_starts_idle() {
    let (ctx, router) = setup_router();
    assert_eq!(router.state(), RouterState::Idle);
    assert!(ctx.log.borrow().is_empty());
}

#[tokio::test]
async fn test_known_route_displays_and_initializes_once() {
    let (ctx, router) = setup_router();

    let outcome = router.navigate("#login").await;

    assert_eq!(outcome, NavigationOutcome::Displayed("login".into()));
    assert_eq!(router.state(), RouterState::Displayed("login".into()));
    assert_eq!(
        *ctx.log.borrow(),
        vec![
            "fetch:views/login.html",
            "host:content:<section>login</section>",
            "init:login",
        ]
    );
}

#[tokio::test]
async fn test_unknown_route_fails_without_fetch() {
    let (ctx, router) = setup_router();

    let outcome = router.navigate("#unknown").await;

    assert_eq!(
        outcome,
        NavigationOutcome::Failed(ClientError::RouteNotFound("unknown".into()))
    );
    assert_eq!(router.state(), failed_not_found("unknown"));
    assert_eq!(
        *ctx.log.borrow(),
        vec![format!("host:error:{}", NOT_FOUND_MESSAGE)]
    );
}

#[tokio::test]
async fn test_unknown_route_fails_from_any_prior_state() {
    let (ctx, router) = setup_router();

    router.navigate("#login").await;
    router.navigate("#nope").await;
    assert_eq!(router.state(), failed_not_found("nope"));

    ctx.failing.borrow_mut().insert("views/map.html".into());
    router.navigate("#map").await;
    router.navigate("#nope").await;
    assert_eq!(router.state(), failed_not_found("nope"));

    assert!(ctx.log_entries("fetch:").iter().all(|f| !f.contains("nope")));
}

#[tokio::test]
async fn test_empty_fragments_load_default_route() {
    for fragment in ["", "#"] {
        let (ctx, router) = setup_router();
        let outcome = router.navigate(fragment).await;
        assert_eq!(outcome, NavigationOutcome::Displayed("map".into()));
        assert_eq!(ctx.log_entries("fetch:"), vec!["fetch:views/map.html"]);
        assert_eq!(ctx.log_entries("init:"), vec!["init:map"]);
    }
}

#[tokio::test]
async fn test_fetch_failure_shows_reason_and_skips_initializer() {
    let (ctx, router) = setup_router();
    ctx.failing.borrow_mut().insert("views/login.html".into());

    let outcome = router.navigate("#login").await;

    let error = ClientError::ContentFetchFailed("404 Not Found".into());
    assert_eq!(outcome, NavigationOutcome::Failed(error.clone()));
    assert_eq!(
        router.state(),
        RouterState::Failed {
            route: "login".into(),
            error
        }
    );
    assert_eq!(
        ctx.last_host_event().as_deref(),
        Some("host:error:Error loading view: 404 Not Found")
    );
    assert!(ctx.log_entries("init:").is_empty());
}

#[tokio::test]
async fn test_network_errors_are_reported_as_fetch_failures() {
    let (ctx, router) = setup_router();
    ctx.pages.borrow_mut().remove("views/submit.html");

    let outcome = router.navigate("#submit").await;

    assert_eq!(
        outcome,
        NavigationOutcome::Failed(ClientError::ContentFetchFailed(
            "Network error: connection refused".into()
        ))
    );
    assert_eq!(
        ctx.last_host_event().as_deref(),
        Some("host:error:Error loading view: Network error: connection refused")
    );
}

#[tokio::test]
async fn test_same_route_is_fetched_again() {
    let (ctx, router) = setup_router();

    router.navigate("#login").await;
    router.navigate("#login").await;

    assert_eq!(
        ctx.log_entries("fetch:"),
        vec!["fetch:views/login.html", "fetch:views/login.html"]
    );
    assert_eq!(ctx.log_entries("init:"), vec!["init:login", "init:login"]);
    assert_eq!(ctx.log_entries("release:"), vec!["release:login"]);
}

#[tokio::test]
async fn test_guard_released_before_next_content_swap() {
    let (ctx, router) = setup_router();

    router.navigate("#map").await;
    router.navigate("#submit").await;

    assert_eq!(
        *ctx.log.borrow(),
        vec![
            "fetch:views/map.html",
            "host:content:<section>map</section>",
            "init:map",
            "fetch:views/submit.html",
            "release:map",
            "host:content:<section>submit</section>",
        ]
    );
    assert_eq!(router.state(), RouterState::Displayed("submit".into()));
}

#[tokio::test]
async fn test_guard_released_on_error_pages_too() {
    let (ctx, router) = setup_router();

    router.navigate("#map").await;
    router.navigate("#missing").await;

    let log = ctx.log.borrow();
    let release = log.iter().position(|e| e == "release:map").unwrap();
    let error = log.iter().position(|e| e.starts_with("host:error:")).unwrap();
    assert!(release < error);
}

#[tokio::test]
async fn test_later_navigation_wins_when_earlier_completes_last() {
    let (ctx, router) = setup_router();
    let release_login = ctx.gate("views/login.html");
    let release_submit = ctx.gate("views/submit.html");
    let (submit_done_tx, submit_done_rx) = oneshot::channel::<()>();

    let nav_login = router.navigate("#login");
    let nav_submit = async {
        let outcome = router.navigate("#submit").await;
        let _ = submit_done_tx.send(());
        outcome
    };
    let driver = async {
        release_submit.send(()).unwrap();
        submit_done_rx.await.unwrap();
        release_login.send(()).unwrap();
    };

    let (login, submit, ()) = futures::join!(nav_login, nav_submit, driver);

    assert_eq!(login, NavigationOutcome::Superseded);
    assert_eq!(submit, NavigationOutcome::Displayed("submit".into()));
    assert_eq!(router.state(), RouterState::Displayed("submit".into()));
    assert_eq!(
        ctx.last_host_event().as_deref(),
        Some("host:content:<section>submit</section>")
    );
    assert!(ctx.log_entries("init:").is_empty());
}

#[tokio::test]
async fn test_stale_failed_load_does_not_replace_newer_view() {
    let (ctx, router) = setup_router();
    ctx.failing.borrow_mut().insert("views/login.html".into());
    let release_login = ctx.gate("views/login.html");
    let (map_done_tx, map_done_rx) = oneshot::channel::<()>();

    let nav_login = router.navigate("#login");
    let nav_map = async {
        let outcome = router.navigate("#map").await;
        let _ = map_done_tx.send(());
        outcome
    };
    let driver = async {
        map_done_rx.await.unwrap();
        release_login.send(()).unwrap();
    };

    let (login, map, ()) = futures::join!(nav_login, nav_map, driver);

    assert_eq!(login, NavigationOutcome::Superseded);
    assert_eq!(map, NavigationOutcome::Displayed("map".into()));
    assert_eq!(router.state(), RouterState::Displayed("map".into()));
    assert!(ctx.log_entries("host:error:").is_empty());
    assert_eq!(
        ctx.last_host_event().as_deref(),
        Some("host:content:<section>map</section>")
    );
    assert_eq!(ctx.log_entries("init:"), vec!["init:map"]);
}

#[tokio::test]
async fn test_stale_load_completing_first_is_discarded() {
    let (ctx, router) = setup_router();
    let release_login = ctx.gate("views/login.html");
    let release_map = ctx.gate("views/map.html");

    let nav_login = router.navigate("#login");
    let nav_map = router.navigate("#map");
    let driver = async {
        release_login.send(()).unwrap();
        release_map.send(()).unwrap();
    };

    let (login, map, ()) = futures::join!(nav_login, nav_map, driver);

    assert_eq!(login, NavigationOutcome::Superseded);
    assert_eq!(map, NavigationOutcome::Displayed("map".into()));
    assert_eq!(
        ctx.log_entries("host:"),
        vec!["host:content:<section>map</section>"]
    );
    assert_eq!(ctx.log_entries("init:"), vec!["init:map"]);
}

#[tokio::test]
async fn test_superseded_load_keeps_current_view_resources() {
    let (ctx, router) = setup_router();
    router.navigate("#map").await;

    let release_login = ctx.gate("views/login.html");
    let nav_login = router.navigate("#login");
    // unregistered routes supersede in-flight loads too
    let nav_missing = router.navigate("#missing");
    let driver = async {
        release_login.send(()).unwrap();
    };
    let (login, missing, ()) = futures::join!(nav_login, nav_missing, driver);

    assert_eq!(login, NavigationOutcome::Superseded);
    assert!(matches!(missing, NavigationOutcome::Failed(_)));
    assert_eq!(router.state(), failed_not_found("missing"));
    assert_eq!(ctx.log_entries("release:"), vec!["release:map"]);
    assert_eq!(ctx.log_entries("init:"), vec!["init:map"]);
}

#[tokio::test]
async fn test_initializer_error_leaves_view_displayed() {
    let ctx = Rc::new(TestContext::new());
    let registry = ViewRegistry::builder("map")
        .route_with("map", "views/map.html", || -> ClientResult<ViewGuard> {
            Err(ClientError::Browser("map container missing".into()))
        })
        .build()
        .unwrap();
    let router = Router::new(
        registry,
        TestSource { ctx: ctx.clone() },
        TestHost { ctx: ctx.clone() },
    );

    let outcome = router.navigate("#map").await;

    assert_eq!(outcome, NavigationOutcome::Displayed("map".into()));
    assert_eq!(router.state(), RouterState::Displayed("map".into()));
    assert_eq!(
        ctx.last_host_event().as_deref(),
        Some("host:content:<section>map</section>")
    );
}
