// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use zbus::{Connection, Message, SignalStream};
use zvariant::{OwnedValue, Value};

use super::{NotifyRequest, ServerInformation, Signal, Transport};
use crate::{
    error::{Error, Result},
    proxies::notifications::NotificationsProxy,
};

/// [`Transport`] talking to `org.freedesktop.Notifications` over D-Bus.
#[derive(Clone)]
pub struct DbusTransport {
    proxy: NotificationsProxy<'static>,
}

impl DbusTransport {
    /// Connects to the session bus.
    pub async fn session() -> Result<Self> {
        let connection = Connection::session().await.map_err(Error::Connection)?;
        Self::new(&connection).await
    }

    pub async fn new(connection: &Connection) -> Result<Self> {
        let proxy = NotificationsProxy::new(connection)
            .await
            .map_err(Error::Connection)?;
        Ok(Self { proxy })
    }

    pub fn connection(&self) -> &Connection {
        self.proxy.inner().connection()
    }
}

#[async_trait]
impl Transport for DbusTransport {
    async fn notify(&self, request: &NotifyRequest) -> Result<u32> {
        let actions: Vec<&str> = request.actions.iter().map(String::as_str).collect();
        let values: HashMap<&str, Value<'_>> = request
            .hints
            .iter()
            .map(|(key, hint)| (key.as_str(), hint.to_value()))
            .collect();
        let hints: HashMap<&str, &Value<'_>> = values.iter().map(|(k, v)| (*k, v)).collect();

        let id = self
            .proxy
            .notify(
                &request.app_name,
                request.replaces_id,
                &request.app_icon,
                &request.summary,
                &request.body,
                &actions,
                &hints,
                request.expire_timeout,
            )
            .await?;

        Ok(id)
    }

    async fn close_notification(&self, id: u32) -> Result<()> {
        self.proxy.close_notification(id).await?;
        Ok(())
    }

    async fn get_capabilities(&self) -> Result<Vec<String>> {
        Ok(self.proxy.get_capabilities().await?)
    }

    async fn get_server_information(&self) -> Result<ServerInformation> {
        Ok(self.proxy.get_server_information().await?.into())
    }

    async fn subscribe(&self, queue: mpsc::Sender<Signal>) -> Result<()> {
        let stream = self.proxy.inner().receive_all_signals().await?;

        tokio::spawn(forward_signals(stream, queue));

        Ok(())
    }
}

async fn forward_signals(mut stream: SignalStream<'static>, queue: mpsc::Sender<Signal>) {
    while let Some(message) = stream.next().await {
        let signal = match signal_from_message(&message) {
            Some(signal) => signal,
            None => continue,
        };

        log::trace!("received signal {}", signal.name);

        // waits while the dispatch loop is behind
        if queue.send(signal).await.is_err() {
            log::debug!("signal queue closed, unsubscribing");
            return;
        }
    }

    log::warn!("signal stream from the notification server ended");
}

/// Unpacks the arguments of the signals the notification server emits.
/// Bodies of any other shape are passed on without arguments.
fn signal_from_message(message: &Message) -> Option<Signal> {
    let interface = message.interface()?;
    let member = message.member()?;
    let name = format!("{}.{}", interface, member);

    let signature = match message.body_signature() {
        Ok(signature) => signature.as_str().to_string(),
        Err(err) => {
            log::debug!("dropping {}: {}", name, err);
            return None;
        }
    };

    let args: Vec<OwnedValue> = match signature.as_str() {
        "uu" => match message.body::<(u32, u32)>() {
            Ok((id, reason)) => vec![Value::U32(id).into(), Value::U32(reason).into()],
            Err(err) => {
                log::debug!("dropping {}: {}", name, err);
                return None;
            }
        },
        "us" => match message.body::<(u32, String)>() {
            Ok((id, key)) => vec![Value::U32(id).into(), Value::from(key).into()],
            Err(err) => {
                log::debug!("dropping {}: {}", name, err);
                return None;
            }
        },
        _ => Vec::new(),
    };

    Some(Signal::new(name, args))
}
