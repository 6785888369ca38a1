// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{
    collections::HashMap,
    convert::TryFrom,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::transport::NotifyRequest;

pub const URGENCY_HINT: &str = "urgency";

pub type ActionHandler = Arc<dyn Fn() + Send + Sync>;
pub type ClosedHandler = Arc<dyn Fn(u32) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Urgency {
    Low = 0,
    Normal = 1,
    Critical = 2,
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Normal
    }
}

/// How long the server keeps a notification on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Left to the server's settings.
    Default,
    /// The notification never expires.
    Never,
    After(Duration),
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Default
    }
}

impl Timeout {
    /// Value of the `expire_timeout` argument of `Notify`.
    pub fn as_millis(&self) -> i32 {
        match self {
            Timeout::Default => -1,
            Timeout::Never => 0,
            Timeout::After(duration) if duration.is_zero() => 0,
            // rounds up so a short timeout doesn't turn into "never"
            Timeout::After(duration) => i32::try_from(duration.as_millis())
                .unwrap_or(i32::MAX)
                .max(1),
        }
    }
}

/// A zero duration never expires.
impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            Timeout::Never
        } else {
            Timeout::After(duration)
        }
    }
}

/// Reason reported with a `NotificationClosed` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CloseReason {
    Expired = 1,
    Dismissed = 2,
    Closed = 3,
    Undefined = 4,
}

impl CloseReason {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(CloseReason::Expired),
            2 => Some(CloseReason::Dismissed),
            3 => Some(CloseReason::Closed),
            4 => Some(CloseReason::Undefined),
            _ => None,
        }
    }
}

/// Value of a notification hint. Only types the protocol's hints use are representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    Str(String),
    Int(i32),
    Bool(bool),
    Byte(u8),
}

impl From<String> for Hint {
    fn from(value: String) -> Self {
        Hint::Str(value)
    }
}

impl From<&str> for Hint {
    fn from(value: &str) -> Self {
        Hint::Str(value.to_string())
    }
}

impl From<i32> for Hint {
    fn from(value: i32) -> Self {
        Hint::Int(value)
    }
}

impl From<bool> for Hint {
    fn from(value: bool) -> Self {
        Hint::Bool(value)
    }
}

impl From<u8> for Hint {
    fn from(value: u8) -> Self {
        Hint::Byte(value)
    }
}

impl From<Urgency> for Hint {
    fn from(urgency: Urgency) -> Self {
        Hint::Byte(urgency as u8)
    }
}

#[derive(Clone)]
struct Action {
    key: String,
    name: String,
    handler: ActionHandler,
}

struct NotificationInner {
    id: u32,
    icon: String,
    summary: String,
    body: String,
    urgency: Urgency,
    timeout: Timeout,
    hints: HashMap<String, Hint>,
    actions: Vec<Action>,
    closed_handler: Option<ClosedHandler>,
}

/// A desktop notification.
///
/// This is a shared handle: clones refer to the same notification. It can be
/// modified after it was sent and shown again with
/// [`Notifier::notify`](crate::Notifier::notify), which updates it in place.
#[derive(Clone)]
pub struct Notification(Arc<Mutex<NotificationInner>>);

impl Notification {
    /// Creates a notification with [`Urgency::Normal`] and [`Timeout::Default`].
    pub fn new(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(NotificationInner {
            id: 0,
            icon: String::new(),
            summary: summary.into(),
            body: body.into(),
            urgency: Urgency::default(),
            timeout: Timeout::default(),
            hints: HashMap::new(),
            actions: Vec::new(),
            closed_handler: None,
        })))
    }

    fn lock(&self) -> MutexGuard<'_, NotificationInner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Server assigned id, 0 until the notification has been sent.
    pub fn id(&self) -> u32 {
        self.lock().id
    }

    pub(crate) fn set_id(&self, id: u32) {
        self.lock().id = id;
    }

    pub fn icon(&self) -> String {
        self.lock().icon.clone()
    }

    /// Sets the icon. An empty string falls back to the application icon.
    pub fn set_icon(&self, icon: impl Into<String>) {
        self.lock().icon = icon.into();
    }

    pub fn summary(&self) -> String {
        self.lock().summary.clone()
    }

    /// Sets the single line overview of the notification.
    pub fn set_summary(&self, summary: impl Into<String>) {
        self.lock().summary = summary.into();
    }

    pub fn body(&self) -> String {
        self.lock().body.clone()
    }

    /// Sets the multi-line body text.
    pub fn set_body(&self, body: impl Into<String>) {
        self.lock().body = body.into();
    }

    pub fn urgency(&self) -> Urgency {
        self.lock().urgency
    }

    pub fn set_urgency(&self, urgency: Urgency) {
        self.lock().urgency = urgency;
    }

    pub fn timeout(&self) -> Timeout {
        self.lock().timeout
    }

    pub fn set_timeout(&self, timeout: impl Into<Timeout>) {
        self.lock().timeout = timeout.into();
    }

    /// Adds a hint. The `urgency` hint is always replaced by [`Notification::urgency`] when sent.
    pub fn add_hint(&self, key: impl Into<String>, value: impl Into<Hint>) {
        self.lock().hints.insert(key.into(), value.into());
    }

    pub fn remove_hint(&self, key: &str) -> Option<Hint> {
        self.lock().hints.remove(key)
    }

    pub fn hint(&self, key: &str) -> Option<Hint> {
        self.lock().hints.get(key).cloned()
    }

    /// Adds an action button. Adding a key that already exists replaces it in place.
    pub fn add_action<F>(&self, key: impl Into<String>, name: impl Into<String>, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let action = Action {
            key: key.into(),
            name: name.into(),
            handler: Arc::new(handler),
        };

        let mut inner = self.lock();
        match inner.actions.iter_mut().find(|a| a.key == action.key) {
            Some(existing) => *existing = action,
            None => inner.actions.push(action),
        }
    }

    pub fn remove_action(&self, key: &str) -> bool {
        let mut inner = self.lock();
        let len = inner.actions.len();
        inner.actions.retain(|a| a.key != key);
        inner.actions.len() != len
    }

    pub fn action_keys(&self) -> Vec<String> {
        self.lock().actions.iter().map(|a| a.key.clone()).collect()
    }

    /// Sets the handler for the `NotificationClosed` signal. It receives the
    /// raw reason code, see [`CloseReason::from_code`].
    pub fn set_closed_handler<F>(&self, handler: F)
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.lock().closed_handler = Some(Arc::new(handler));
    }

    pub fn clear_closed_handler(&self) {
        self.lock().closed_handler = None;
    }

    pub(crate) fn closed_handler(&self) -> Option<ClosedHandler> {
        self.lock().closed_handler.clone()
    }

    pub(crate) fn action_handler(&self, key: &str) -> Option<ActionHandler> {
        self.lock()
            .actions
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.handler.clone())
    }

    /// Whether both handles refer to the same notification.
    pub fn ptr_eq(&self, other: &Notification) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Writes the urgency hint and builds the `Notify` arguments.
    pub(crate) fn to_request(&self, app_name: &str, icon: String) -> NotifyRequest {
        let mut inner = self.lock();
        let urgency = inner.urgency;
        inner.hints.insert(URGENCY_HINT.to_string(), urgency.into());

        NotifyRequest {
            app_name: app_name.to_string(),
            replaces_id: inner.id,
            app_icon: icon,
            summary: inner.summary.clone(),
            body: inner.body.clone(),
            actions: inner
                .actions
                .iter()
                .flat_map(|a| vec![a.key.clone(), a.name.clone()])
                .collect(),
            hints: inner.hints.clone(),
            expire_timeout: inner.timeout.as_millis(),
        }
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Notification {}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Notification")
            .field("id", &inner.id)
            .field("icon", &inner.icon)
            .field("summary", &inner.summary)
            .field("body", &inner.body)
            .field("urgency", &inner.urgency)
            .field("timeout", &inner.timeout)
            .field("hints", &inner.hints)
            .field(
                "actions",
                &inner.actions.iter().map(|a| &a.key).collect::<Vec<_>>(),
            )
            .field("closed_handler", &inner.closed_handler.is_some())
            .finish()
    }
}
