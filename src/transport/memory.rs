// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{NotifyRequest, ServerInformation, Signal, Transport};
use crate::error::{Error, Result};

#[derive(Default)]
struct State {
    next_id: u32,
    failing: bool,
    close_on_notify: Option<u32>,
    requests: Vec<NotifyRequest>,
    closed: Vec<u32>,
    queue: Option<mpsc::Sender<Signal>>,
}

/// In-process notification server that records calls and lets tests emit signals.
#[derive(Clone)]
pub(crate) struct MemoryTransport {
    state: Arc<Mutex<State>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next_id: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_id,
                ..Default::default()
            })),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    /// Makes `notify` report the new notification closed with `reason`
    /// before the call returns.
    pub fn close_on_notify(&self, reason: u32) {
        self.state.lock().unwrap().close_on_notify = Some(reason);
    }

    pub fn requests(&self) -> Vec<NotifyRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn closed(&self) -> Vec<u32> {
        self.state.lock().unwrap().closed.clone()
    }

    pub async fn emit(&self, signal: Signal) {
        let queue = self
            .state
            .lock()
            .unwrap()
            .queue
            .clone()
            .expect("not subscribed");
        queue.send(signal).await.expect("signal queue closed");
    }

    fn fail_if_requested(&self) -> Result<()> {
        if self.state.lock().unwrap().failing {
            Err(Error::Protocol(zbus::Error::InterfaceNotFound))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn notify(&self, request: &NotifyRequest) -> Result<u32> {
        self.fail_if_requested()?;

        let (id, early_close) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            let id = if request.replaces_id != 0 {
                request.replaces_id
            } else {
                state.next_id += 1;
                state.next_id - 1
            };
            let early_close = state
                .close_on_notify
                .and_then(|reason| state.queue.clone().map(|queue| (queue, reason)));
            (id, early_close)
        };

        if let Some((queue, reason)) = early_close {
            queue
                .send(Signal::notification_closed(id, reason))
                .await
                .expect("signal queue closed");
            // let the dispatch loop see it before the reply
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        Ok(id)
    }

    async fn close_notification(&self, id: u32) -> Result<()> {
        self.fail_if_requested()?;
        self.state.lock().unwrap().closed.push(id);
        Ok(())
    }

    async fn get_capabilities(&self) -> Result<Vec<String>> {
        self.fail_if_requested()?;
        Ok(vec!["actions".to_string(), "body".to_string()])
    }

    async fn get_server_information(&self) -> Result<ServerInformation> {
        self.fail_if_requested()?;
        Ok(ServerInformation {
            name: "memory".to_string(),
            vendor: "fdo-notify".to_string(),
            version: "0.1".to_string(),
            spec_version: "1.2".to_string(),
        })
    }

    async fn subscribe(&self, queue: mpsc::Sender<Signal>) -> Result<()> {
        self.fail_if_requested()?;
        self.state.lock().unwrap().queue = Some(queue);
        Ok(())
    }
}
