// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use serde::Deserialize;

use crate::SIGNAL_QUEUE_DEPTH;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_JOB_QUEUE_DEPTH: usize = 32;

/// Settings consumed by [`Notifier::init`](crate::Notifier::init).
///
/// Deserializable so applications can embed it in their own config files;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name sent with every notification.
    pub app_name: String,

    /// Icon used by notifications that don't set one.
    pub app_icon: String,

    /// Capacity of the queue between the bus and the dispatch loop.
    pub signal_queue_depth: usize,

    /// Number of threads running closed and action handlers.
    ///
    /// Once every worker is busy and the job queue is full, the dispatch
    /// loop waits for room. Until then no further signals are handled, so
    /// closed notifications stay registered. Handlers that block for long
    /// should hand their work off elsewhere.
    pub workers: usize,

    /// Capacity of the handler job queue. See [`Config::workers`] for what
    /// happens when it fills up.
    pub job_queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            app_icon: String::new(),
            signal_queue_depth: SIGNAL_QUEUE_DEPTH,
            workers: DEFAULT_WORKERS,
            job_queue_depth: DEFAULT_JOB_QUEUE_DEPTH,
        }
    }
}

impl Config {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_icon(mut self, app_icon: impl Into<String>) -> Self {
        self.app_icon = app_icon.into();
        self
    }

    pub fn with_signal_queue_depth(mut self, depth: usize) -> Self {
        self.signal_queue_depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_job_queue_depth(mut self, depth: usize) -> Self {
        self.job_queue_depth = depth;
        self
    }
}
