// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use zvariant::{OwnedValue, Value};

use crate::{error::Result, notification::Hint, INTERFACE};

pub mod dbus;
#[cfg(test)]
pub(crate) mod memory;

/// Message bus access used by [`Notifier`](crate::Notifier).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Calls `Notify` and returns the id assigned by the server.
    async fn notify(&self, request: &NotifyRequest) -> Result<u32>;

    async fn close_notification(&self, id: u32) -> Result<()>;

    async fn get_capabilities(&self) -> Result<Vec<String>>;

    async fn get_server_information(&self) -> Result<ServerInformation>;

    /// Starts delivering the server's signals into `queue`. Delivery waits
    /// for queue capacity and stops once the receiving end is dropped.
    async fn subscribe(&self, queue: mpsc::Sender<Signal>) -> Result<()>;
}

/// Arguments of a `Notify` call, in wire order.
#[derive(Clone, Debug, PartialEq)]
pub struct NotifyRequest {
    pub app_name: String,
    pub replaces_id: u32,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    /// Alternating action keys and display names.
    pub actions: Vec<String>,
    pub hints: HashMap<String, Hint>,
    pub expire_timeout: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInformation {
    /// The product name of the server.
    pub name: String,

    /// The vendor name. For example "KDE," "GNOME," "freedesktop.org" or "Microsoft".
    pub vendor: String,

    /// The server's version number.
    pub version: String,

    /// The specification version the server is compliant with.
    pub spec_version: String,
}

impl From<(String, String, String, String)> for ServerInformation {
    fn from((name, vendor, version, spec_version): (String, String, String, String)) -> Self {
        Self {
            name,
            vendor,
            version,
            spec_version,
        }
    }
}

/// A signal received from the notification server.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    /// Fully qualified member name, e.g. `org.freedesktop.Notifications.ActionInvoked`.
    pub name: String,
    pub args: Vec<OwnedValue>,
}

impl Signal {
    pub fn new(name: impl Into<String>, args: Vec<OwnedValue>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn notification_closed(id: u32, reason: u32) -> Self {
        Self::new(
            format!("{}.NotificationClosed", INTERFACE),
            vec![Value::U32(id).into(), Value::U32(reason).into()],
        )
    }

    pub fn action_invoked(id: u32, action_key: impl Into<String>) -> Self {
        let action_key: String = action_key.into();
        Self::new(
            format!("{}.ActionInvoked", INTERFACE),
            vec![Value::U32(id).into(), Value::from(action_key).into()],
        )
    }
}

impl Hint {
    pub fn to_value(&self) -> Value<'_> {
        match self {
            Hint::Str(s) => Value::from(s.as_str()),
            Hint::Int(i) => Value::I32(*i),
            Hint::Bool(b) => Value::Bool(*b),
            Hint::Byte(b) => Value::U8(*b),
        }
    }
}
