// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use zvariant::{OwnedValue, Value};

use crate::{registry::Registry, transport::Signal, workers::WorkerPool};

/// A signal the dispatch loop acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    NotificationClosed { id: u32, reason: u32 },
    ActionInvoked { id: u32, action_key: String },
}

impl Event {
    /// Classifies a signal by its member name. Unknown members and
    /// arguments of the wrong shape yield `None`.
    pub fn classify(signal: &Signal) -> Option<Self> {
        if signal.name.ends_with(".NotificationClosed") {
            match signal.args.as_slice() {
                [id, reason] => Some(Event::NotificationClosed {
                    id: as_u32(id)?,
                    reason: as_u32(reason)?,
                }),
                _ => None,
            }
        } else if signal.name.ends_with(".ActionInvoked") {
            match signal.args.as_slice() {
                [id, key] => Some(Event::ActionInvoked {
                    id: as_u32(id)?,
                    action_key: as_string(key)?,
                }),
                _ => None,
            }
        } else {
            None
        }
    }
}

fn as_u32(value: &OwnedValue) -> Option<u32> {
    match &**value {
        Value::U32(v) => Some(*v),
        _ => None,
    }
}

fn as_string(value: &OwnedValue) -> Option<String> {
    match &**value {
        Value::Str(s) => Some(s.as_str().to_string()),
        _ => None,
    }
}

/// Handle to the background task routing server signals to notification handlers.
pub struct Dispatcher {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Dispatcher {
    pub fn spawn(registry: Registry, signals: mpsc::Receiver<Signal>, workers: WorkerPool) -> Self {
        let (stop, stopped) = oneshot::channel();
        let handle = tokio::spawn(run(registry, signals, workers, stopped));

        Self {
            stop: Some(stop),
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the loop and waits for it to exit. Handlers already queued still run.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            log::error!("dispatch loop failed: {}", e);
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn run(
    registry: Registry,
    mut signals: mpsc::Receiver<Signal>,
    workers: WorkerPool,
    mut stopped: oneshot::Receiver<()>,
) {
    log::debug!("dispatch loop started");

    loop {
        let signal = tokio::select! {
            _ = &mut stopped => break,
            signal = signals.recv() => match signal {
                Some(signal) => signal,
                None => break,
            },
        };

        match Event::classify(&signal) {
            Some(event) => dispatch(&registry, &workers, event).await,
            None => log::trace!("ignoring signal {}", signal.name),
        }
    }

    log::debug!("dispatch loop stopped");
}

async fn dispatch(registry: &Registry, workers: &WorkerPool, event: Event) {
    match event {
        Event::NotificationClosed { id, reason } => {
            // not ours, or already gone
            let notification = match registry.close(id, reason) {
                Some(n) => n,
                None => return,
            };

            if let Some(handler) = notification.closed_handler() {
                workers.submit(Box::new(move || handler(reason))).await;
            }
        }
        Event::ActionInvoked { id, action_key } => {
            let handler = registry
                .get(id)
                .and_then(|n| n.action_handler(&action_key));

            if let Some(handler) = handler {
                workers.submit(Box::new(move || handler())).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notification::Notification, INTERFACE};
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc as std_mpsc, Arc,
        },
        time::Duration,
    };

    #[test]
    fn test_classify() {
        assert_eq!(
            Event::classify(&Signal::notification_closed(7, 2)),
            Some(Event::NotificationClosed { id: 7, reason: 2 })
        );
        assert_eq!(
            Event::classify(&Signal::action_invoked(7, "open")),
            Some(Event::ActionInvoked {
                id: 7,
                action_key: "open".to_string()
            })
        );
    }

    #[test]
    fn test_classify_drops_unknown_and_malformed() {
        let token = Signal::new(
            format!("{}.ActivationToken", INTERFACE),
            vec![Value::U32(7).into(), Value::from("token").into()],
        );
        assert_eq!(Event::classify(&token), None);

        let short = Signal::new(
            format!("{}.NotificationClosed", INTERFACE),
            vec![Value::U32(7).into()],
        );
        assert_eq!(Event::classify(&short), None);

        let wrong_type = Signal::new(
            format!("{}.ActionInvoked", INTERFACE),
            vec![Value::U32(7).into(), Value::U32(1).into()],
        );
        assert_eq!(Event::classify(&wrong_type), None);
    }

    async fn settle(registry: &Registry, id: u32) {
        for _ in 0..100 {
            if !registry.contains(id) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_ignored() {
        let registry = Registry::new();
        let n = Notification::new("", "");
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = calls.clone();
            n.add_action("open", "Open", move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        registry.register(0, 1, n);

        let (tx, rx) = mpsc::channel(10);
        let dispatcher = Dispatcher::spawn(registry.clone(), rx, WorkerPool::new(1, 4).unwrap());

        tx.send(Signal::notification_closed(99, 1)).await.unwrap();
        tx.send(Signal::action_invoked(99, "open")).await.unwrap();
        tx.send(Signal::action_invoked(1, "missing")).await.unwrap();
        tx.send(Signal::new("bogus", Vec::new())).await.unwrap();
        // still alive after all of the above
        tx.send(Signal::notification_closed(1, 3)).await.unwrap();
        settle(&registry, 1).await;

        assert!(registry.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        dispatcher.stop().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_closed_handler_does_not_block_loop() {
        let registry = Registry::new();
        let (release_tx, release_rx) = std_mpsc::channel::<()>();
        let release_rx = Arc::new(std::sync::Mutex::new(release_rx));
        let (reason_tx, reason_rx) = std_mpsc::channel();

        let slow = Notification::new("slow", "");
        {
            let reason_tx = reason_tx.clone();
            slow.set_closed_handler(move |reason| {
                reason_tx.send(reason).unwrap();
                let _ = release_rx.lock().unwrap().recv();
            });
        }
        let other = Notification::new("other", "");
        other.set_closed_handler(move |reason| reason_tx.send(reason).unwrap());

        registry.register(0, 1, slow);
        registry.register(0, 2, other);

        let (tx, rx) = mpsc::channel(10);
        let dispatcher = Dispatcher::spawn(registry.clone(), rx, WorkerPool::new(2, 4).unwrap());

        tx.send(Signal::notification_closed(1, 1)).await.unwrap();
        assert_eq!(reason_rx.recv_timeout(Duration::from_secs(5)), Ok(1));

        tx.send(Signal::notification_closed(2, 2)).await.unwrap();
        assert_eq!(reason_rx.recv_timeout(Duration::from_secs(5)), Ok(2));
        assert!(registry.is_empty());

        release_tx.send(()).unwrap();
        dispatcher.stop().await;
    }

    #[tokio::test]
    async fn test_stop() {
        let (_tx, rx) = mpsc::channel(10);
        let dispatcher = Dispatcher::spawn(Registry::new(), rx, WorkerPool::new(1, 1).unwrap());
        assert!(dispatcher.is_running());

        tokio::time::timeout(Duration::from_secs(5), dispatcher.stop())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_exits_when_queue_closes() {
        let (tx, rx) = mpsc::channel(10);
        let dispatcher = Dispatcher::spawn(Registry::new(), rx, WorkerPool::new(1, 1).unwrap());
        drop(tx);

        for _ in 0..100 {
            if !dispatcher.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!dispatcher.is_running());
    }
}
