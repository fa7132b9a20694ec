use std::sync::Arc;

use futures::future::{join_all, BoxFuture};

use crate::dom::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Submit,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
        }
    }
}

#[derive(Debug)]
pub struct Event {
    kind: EventType,
    target: Element,
    current_target: Element,
    default_prevented: bool,
}

impl Event {
    pub(crate) fn new(kind: EventType, target: Element) -> Self {
        Self {
            kind,
            current_target: target.clone(),
            target,
            default_prevented: false,
        }
    }

    pub fn kind(&self) -> EventType {
        self.kind
    }

    /// Element the event was dispatched at.
    pub fn target(&self) -> &Element {
        &self.target
    }

    /// Element whose listener is running.
    pub fn current_target(&self) -> &Element {
        &self.current_target
    }

    pub(crate) fn set_current_target(&mut self, element: Element) {
        self.current_target = element;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Work a listener left for after its first suspension point.
pub type HandlerTask = BoxFuture<'static, ()>;

/// Listeners run synchronously during dispatch. Returning a task hands the
/// asynchronous remainder of the handler to whoever dispatched the event.
pub type Listener = Arc<dyn Fn(&mut Event) -> Option<HandlerTask> + Send + Sync>;

/// Outcome of delivering one event.
#[must_use = "pending handler tasks do nothing unless driven"]
pub struct Dispatch {
    default_prevented: bool,
    tasks: Vec<HandlerTask>,
}

impl Dispatch {
    pub(crate) fn new(default_prevented: bool, tasks: Vec<HandlerTask>) -> Self {
        Self {
            default_prevented,
            tasks,
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn into_tasks(self) -> Vec<HandlerTask> {
        self.tasks
    }

    /// Drives every pending handler to completion.
    pub async fn settle(self) {
        join_all(self.tasks).await;
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("default_prevented", &self.default_prevented)
            .field("pending", &self.tasks.len())
            .finish()
    }
}
