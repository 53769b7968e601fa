//! 导航可见性控制
//!
//! 根据会话状态决定导航栏中哪些入口可见。

use crate::session::{SessionStore, TokenStorage};

/// 导航入口的可见性快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavVisibility {
    // 仅匿名用户
    pub login: bool,
    pub register: bool,
    // 仅已登录用户
    pub logout: bool,
    pub profile: bool,
    pub submit: bool,
}

impl NavVisibility {
    pub fn for_session(authenticated: bool) -> Self {
        Self {
            login: !authenticated,
            register: !authenticated,
            logout: authenticated,
            profile: authenticated,
            submit: authenticated,
        }
    }
}

/// 可见性输出端
///
/// 浏览器中是驱动导航栏的 Leptos 信号。
pub trait AffordanceSink {
    fn apply(&self, visibility: NavVisibility);
}

#[derive(Debug, Clone)]
pub struct VisibilityController<S, K> {
    session: SessionStore<S>,
    sink: K,
}

impl<S: TokenStorage, K: AffordanceSink> VisibilityController<S, K> {
    pub fn new(session: SessionStore<S>, sink: K) -> Self {
        Self { session, sink }
    }

    /// 重新读取会话并应用可见性，幂等
    pub fn refresh(&self) -> NavVisibility {
        let visibility = NavVisibility::for_session(self.session.is_authenticated());
        self.sink.apply(visibility);
        visibility
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::tests::memory_session;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) applied: Rc<RefCell<Vec<NavVisibility>>>,
    }

    impl AffordanceSink for RecordingSink {
        fn apply(&self, visibility: NavVisibility) {
            self.applied.borrow_mut().push(visibility);
        }
    }

    #[test]
    fn anonymous_session_hides_member_links() {
        let controller = VisibilityController::new(memory_session(), RecordingSink::default());
        let v = controller.refresh();
        assert!(!v.logout && !v.profile && !v.submit);
        assert!(v.login && v.register);
    }

    #[test]
    fn token_present_shows_member_links() {
        let session = memory_session();
        session.set_token("t");
        let controller = VisibilityController::new(session, RecordingSink::default());
        let v = controller.refresh();
        assert!(v.logout && v.profile && v.submit);
        assert!(!v.login && !v.register);
    }

    #[test]
    fn refresh_is_idempotent() {
        let sink = RecordingSink::default();
        let controller = VisibilityController::new(memory_session(), sink.clone());
        let first = controller.refresh();
        let second = controller.refresh();
        assert_eq!(first, second);
        let applied = sink.applied.borrow();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0], applied[1]);
    }

    #[test]
    fn follows_login_and_logout() {
        let session = memory_session();
        let controller = VisibilityController::new(session.clone(), RecordingSink::default());

        session.set_token("fresh");
        assert!(controller.refresh().submit);

        session.clear_token();
        let v = controller.refresh();
        assert!(!v.logout && !v.profile && !v.submit);
    }
}
