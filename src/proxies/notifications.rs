// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::collections::HashMap;

use zbus::dbus_proxy;
use zvariant::Value;

#[dbus_proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
pub trait Notifications {
    /// Sends a notification to the notification server.
    /// A non-zero `replaces_id` updates that notification in place.
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: &HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    /// Forcefully closes and removes a notification from the user's view.
    fn close_notification(&self, id: u32) -> zbus::Result<()>;

    /// Optional capabilities implemented by the server.
    fn get_capabilities(&self) -> zbus::Result<Vec<String>>;

    /// Name, vendor, version and specification version of the server.
    fn get_server_information(&self) -> zbus::Result<(String, String, String, String)>;

    /// A notification was closed. `reason` is 1 (expired), 2 (dismissed),
    /// 3 (closed by `CloseNotification`) or 4 (undefined).
    #[dbus_proxy(signal)]
    fn notification_closed(&self, id: u32, reason: u32) -> zbus::Result<()>;

    /// The user invoked one of the notification's actions.
    #[dbus_proxy(signal)]
    fn action_invoked(&self, id: u32, action_key: &str) -> zbus::Result<()>;
}
