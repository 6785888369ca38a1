// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{collections::HashMap, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    config::Config,
    dispatch::Dispatcher,
    error::{Error, Result},
    icon,
    notification::{Notification, Timeout, Urgency, URGENCY_HINT},
    registry::Registry,
    transport::{dbus::DbusTransport, NotifyRequest, ServerInformation, Transport},
    workers::WorkerPool,
};

struct Session {
    transport: Arc<dyn Transport>,
    workers: WorkerPool,
    dispatcher: Dispatcher,
}

/// A notification session: sends notifications and runs their handlers.
///
/// Created uninitialized; every operation fails with
/// [`Error::NotInitialized`] until [`Notifier::init`] succeeds.
pub struct Notifier {
    config: Config,
    registry: Registry,
    session: Option<Session>,
}

impl Notifier {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: Registry::new(),
            session: None,
        }
    }

    /// Creates a notifier connected to the session bus.
    pub async fn connect(config: Config) -> Result<Self> {
        let mut notifier = Self::new(config);
        notifier.init().await?;
        Ok(notifier)
    }

    /// Connects to the session bus and starts handling signals.
    pub async fn init(&mut self) -> Result<()> {
        let transport = DbusTransport::session().await?;
        self.init_with(transport).await
    }

    /// Starts handling signals delivered by `transport`. A previous session is shut down first.
    pub async fn init_with<T>(&mut self, transport: T) -> Result<()>
    where
        T: Transport + 'static,
    {
        self.shutdown().await;

        let transport: Arc<dyn Transport> = Arc::new(transport);
        let (tx, rx) = mpsc::channel(self.config.signal_queue_depth.max(1));
        transport.subscribe(tx).await?;

        let workers = WorkerPool::new(self.config.workers, self.config.job_queue_depth)
            .map_err(Error::Workers)?;
        let dispatcher = Dispatcher::spawn(self.registry.clone(), rx, workers.clone());

        self.session = Some(Session {
            transport,
            workers,
            dispatcher,
        });

        log::info!("notifier for {:?} initialized", self.config.app_name);

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Stops the dispatch loop and drops the bus connection.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            session.dispatcher.stop().await;
            log::info!("notifier for {:?} shut down", self.config.app_name);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn active_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotInitialized)
    }

    fn transport(&self) -> Result<&Arc<dyn Transport>> {
        self.active_session().map(|s| &s.transport)
    }

    /// Shows `notification`, or updates it in place if it was sent before.
    /// Returns the id assigned by the server, which is also stored in the notification.
    pub async fn notify(&self, notification: &Notification) -> Result<u32> {
        let session = self.active_session()?;

        let icon = icon::resolve(icon::effective(
            &notification.icon(),
            &self.config.app_icon,
        ));
        let request = notification.to_request(&self.config.app_name, icon);
        let previous_id = request.replaces_id;

        log::debug!("notify {:#?}", request);

        let pending = self.registry.begin_send();
        let id = session.transport.notify(&request).await?;

        notification.set_id(id);
        let closed = self.registry.register(previous_id, id, notification.clone());
        drop(pending);

        // the server closed it before the call returned
        if let Some(reason) = closed {
            log::debug!("notification {} closed while being sent", id);
            if let Some(handler) = notification.closed_handler() {
                session
                    .workers
                    .submit(Box::new(move || handler(reason)))
                    .await;
            }
        }

        Ok(id)
    }

    /// Asks the server to close `notification`. It stays registered until
    /// the server reports it closed.
    pub async fn close_notification(&self, notification: &Notification) -> Result<()> {
        let transport = self.transport()?;
        let id = notification.id();

        log::debug!("close_notification {}", id);

        transport.close_notification(id).await
    }

    pub async fn get_capabilities(&self) -> Result<Vec<String>> {
        self.transport()?.get_capabilities().await
    }

    pub async fn get_server_information(&self) -> Result<ServerInformation> {
        self.transport()?.get_server_information().await
    }
}

/// Sends a single notification without actions over a fresh session bus connection.
/// Nothing is registered, so the notification's signals are not handled.
pub async fn send_notification(
    app_name: &str,
    app_icon: &str,
    summary: &str,
    body: &str,
    urgency: Urgency,
    timeout: Timeout,
) -> Result<u32> {
    let transport = DbusTransport::session().await?;

    let mut hints = HashMap::new();
    hints.insert(URGENCY_HINT.to_string(), urgency.into());

    let request = NotifyRequest {
        app_name: app_name.to_string(),
        replaces_id: 0,
        app_icon: icon::resolve(app_icon),
        summary: summary.to_string(),
        body: body.to_string(),
        actions: Vec::new(),
        hints,
        expire_timeout: timeout.as_millis(),
    };

    transport.notify(&request).await
}
