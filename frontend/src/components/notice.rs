use std::time::Duration;

use leptos::prelude::*;

const AUTO_HIDE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Danger,
}

impl NoticeKind {
    fn alert_class(&self) -> &'static str {
        match self {
            NoticeKind::Info => "alert alert-info",
            NoticeKind::Success => "alert alert-success",
            NoticeKind::Warning => "alert alert-warning",
            NoticeKind::Danger => "alert alert-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub text: String,
    pub kind: NoticeKind,
}

/// 只有仍在显示的同一条提示才会被计时器清除
fn expire(current: &mut Option<Notice>, id: u64) {
    if current.as_ref().is_some_and(|n| n.id == id) {
        *current = None;
    }
}

/// 视图内的提示槽位，同一时间只显示一条
#[derive(Clone, Copy)]
pub struct NoticeSlot {
    current: RwSignal<Option<Notice>>,
    next_id: RwSignal<u64>,
}

impl NoticeSlot {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            next_id: RwSignal::new(0),
        }
    }

    /// 显示提示；非错误提示 3 秒后自动隐藏
    pub fn show(&self, text: impl Into<String>, kind: NoticeKind) {
        // 异步回调可能在视图拆除后才到达
        let Some(id) = self.next_id.try_get_untracked().map(|n| n + 1) else {
            return;
        };
        self.next_id.set(id);
        self.current.set(Some(Notice {
            id,
            text: text.into(),
            kind,
        }));

        if kind != NoticeKind::Danger {
            let current = self.current;
            set_timeout(
                move || {
                    current.try_update(|n| expire(n, id));
                },
                AUTO_HIDE,
            );
        }
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(text, NoticeKind::Info);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(text, NoticeKind::Success);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.show(text, NoticeKind::Warning);
    }

    pub fn danger(&self, text: impl Into<String>) {
        self.show(text, NoticeKind::Danger);
    }

    pub fn clear(&self) {
        let _ = self.current.try_set(None);
    }
}

impl Default for NoticeSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn NoticeBanner(slot: NoticeSlot) -> impl IntoView {
    let current = slot.current;
    view! {
        <Show when=move || current.with(|n| n.is_some())>
            <div
                role="alert"
                class=move || {
                    current
                        .with(|n| n.as_ref().map(|n| n.kind.alert_class()).unwrap_or("alert"))
                        .to_string() + " text-sm py-2 mt-2"
                }
            >
                <span>{move || current.with(|n| n.as_ref().map(|n| n.text.clone()).unwrap_or_default())}</span>
                <button
                    type="button"
                    class="btn btn-ghost btn-xs"
                    aria-label="Close"
                    on:click=move |_| slot.clear()
                >
                    "✕"
                </button>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(id: u64) -> Option<Notice> {
        Some(Notice {
            id,
            text: format!("notice {}", id),
            kind: NoticeKind::Info,
        })
    }

    #[test]
    fn timer_clears_its_own_notice() {
        let mut current = notice(1);
        expire(&mut current, 1);
        assert_eq!(current, None);
    }

    #[test]
    fn older_timer_keeps_newer_notice() {
        let mut current = notice(2);
        expire(&mut current, 1);
        assert_eq!(current.map(|n| n.id), Some(2));
    }
}
