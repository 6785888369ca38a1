// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::notification::Notification;

/// A `NotificationClosed` seen while a `Notify` call was in flight.
#[derive(Clone, Copy)]
struct EarlyClose {
    reason: u32,
    /// The closed handler already ran for a registered entry.
    handled: bool,
}

#[derive(Default)]
struct Table {
    entries: HashMap<u32, Notification>,
    in_flight: usize,
    closed_in_flight: HashMap<u32, EarlyClose>,
}

/// Notifications currently shown by the server, by id.
///
/// Entries are added when a notification is sent and removed when the
/// server reports it closed.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Mutex<Table>>,
}

/// Marks a `Notify` call in flight until dropped. Closures reported
/// meanwhile are remembered so [`Registry::register`] can honor them.
pub(crate) struct PendingSend {
    registry: Registry,
}

impl Drop for PendingSend {
    fn drop(&mut self) {
        let mut table = self.registry.lock();
        table.in_flight -= 1;
        if table.in_flight == 0 {
            table.closed_in_flight.clear();
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn begin_send(&self) -> PendingSend {
        self.lock().in_flight += 1;
        PendingSend {
            registry: self.clone(),
        }
    }

    /// Records `notification` under `id`. If it was previously registered
    /// under a different id, that entry is dropped.
    ///
    /// If the server already reported `id` closed while the call was in
    /// flight, nothing is recorded. The reason is returned when the closed
    /// handler still has to run.
    pub(crate) fn register(
        &self,
        previous_id: u32,
        id: u32,
        notification: Notification,
    ) -> Option<u32> {
        let mut table = self.lock();
        if previous_id != 0 && previous_id != id {
            if let Some(stale) = table.entries.get(&previous_id) {
                if stale.ptr_eq(&notification) {
                    table.entries.remove(&previous_id);
                }
            }
        }

        if let Some(early) = table.closed_in_flight.remove(&id) {
            table.entries.remove(&id);
            return if early.handled {
                None
            } else {
                Some(early.reason)
            };
        }

        table.entries.insert(id, notification);
        None
    }

    /// Removes `id` after the server reported it closed.
    pub(crate) fn close(&self, id: u32, reason: u32) -> Option<Notification> {
        let mut table = self.lock();
        let removed = table.entries.remove(&id);
        if table.in_flight > 0 {
            table.closed_in_flight.insert(
                id,
                EarlyClose {
                    reason,
                    handled: removed.is_some(),
                },
            );
        }
        removed
    }

    pub fn get(&self, id: u32) -> Option<Notification> {
        self.lock().entries.get(&id).cloned()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lock().entries.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.lock().entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
