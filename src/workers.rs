// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{
    panic::{self, AssertUnwindSafe},
    thread,
};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs notification handlers on a fixed set of threads, fed by a bounded queue.
///
/// Handlers are application code and may block for as long as they like; a
/// slow handler only ties up its own worker.
#[derive(Clone)]
pub struct WorkerPool {
    jobs: async_channel::Sender<Job>,
}

impl WorkerPool {
    pub fn new(workers: usize, queue_depth: usize) -> std::io::Result<Self> {
        let (jobs, rx) = async_channel::bounded::<Job>(queue_depth.max(1));

        for i in 0..workers.max(1) {
            let rx = rx.clone();
            thread::Builder::new()
                .name(format!("notify-worker-{}", i))
                .spawn(move || {
                    // exits once every sender is gone
                    while let Ok(job) = rx.recv_blocking() {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            log::error!("notification handler panicked");
                        }
                    }
                })?;
        }

        Ok(Self { jobs })
    }

    /// Queues a job, waiting for room if the queue is full.
    pub async fn submit(&self, job: Job) {
        if self.jobs.send(job).await.is_err() {
            log::error!("worker pool is gone, dropping handler");
        }
    }
}
