// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Client side of the `org.freedesktop.Notifications` protocol.
//!
//! A [`Notifier`] sends [`Notification`]s to the notification server on the
//! session bus and routes the `NotificationClosed` and `ActionInvoked` signals
//! it emits back to the handlers registered on each notification.
//!
//! See <https://specifications.freedesktop.org/notification-spec/notification-spec-latest.html>.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod icon;
pub mod notification;
pub mod notifier;
pub mod proxies;
pub mod registry;
pub mod transport;
pub mod workers;

pub use config::Config;
pub use error::{Error, Result};
pub use notification::{CloseReason, Hint, Notification, Timeout, Urgency};
pub use notifier::{send_notification, Notifier};
pub use registry::Registry;
pub use transport::{dbus::DbusTransport, NotifyRequest, ServerInformation, Signal, Transport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BUS_NAME: &str = "org.freedesktop.Notifications";
pub const OBJECT_PATH: &str = "/org/freedesktop/Notifications";
pub const INTERFACE: &str = "org.freedesktop.Notifications";

/// Capacity of the queue between the bus and the dispatch loop.
pub const SIGNAL_QUEUE_DEPTH: usize = 10;
