// src/crawl/pool.rs
// =============================================================================
// A fixed-size pool of worker tasks sharing one unbounded job queue.
//
// How it works:
// 1. new() spawns N workers. Each one loops: take the next job off the
//    queue, run it, repeat
// 2. submit() pushes a job. Jobs may submit more jobs while they run, which
//    is how one crawled page turns into N more crawl units
// 3. A `pending` counter tracks jobs that are queued or running. When it
//    drops to zero nothing can ever submit again, so the crawl is quiescent
// 4. close() drops the queue's only sender. submit() sees the closed queue
//    under the same lock it sends with, so "closed" and "submit" never race.
//    Workers finish whatever is still queued and then exit
//
// There is no back-pressure: the queue grows with the number of discovered
// pages that haven't been crawled yet.
//
// Rust concepts:
// - JoinSet: owns a group of spawned tasks so we can wait for or abort them
// - mpsc::unbounded_channel: the shared queue
// - watch channel: lets any number of tasks wait for `pending == 0`
// =============================================================================

use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinSet;
use tracing::{debug, error, trace};

/// One unit of work. It owns everything it needs.
pub type Job = BoxFuture<'static, ()>;

type SharedReceiver = Arc<AsyncMutex<mpsc::UnboundedReceiver<Job>>>;

pub struct WorkerPool {
    queue: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Option<JoinSet<()>>>,
    pending: Arc<watch::Sender<usize>>,
    size: usize,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one). Must be called inside a tokio
    /// runtime.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver: SharedReceiver = Arc::new(AsyncMutex::new(receiver));
        let (pending, _) = watch::channel(0usize);
        let pending = Arc::new(pending);

        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(worker_loop(id, Arc::clone(&receiver), Arc::clone(&pending)));
        }
        debug!("Started worker pool with {} worker(s)", size);

        Self {
            queue: Mutex::new(Some(sender)),
            workers: Mutex::new(Some(workers)),
            pending,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues `job`. Returns false (and drops the job) once the pool is
    /// closed.
    pub fn submit(&self, job: Job) -> bool {
        // Holding the lock for the whole submit means close() can't slip in
        // between the "is it open?" check and the send
        let queue = lock(&self.queue);
        let Some(sender) = queue.as_ref() else {
            return false;
        };

        // Count the job before it's visible to workers, so pending can't
        // dip to zero while it sits in the queue
        self.pending.send_modify(|n| *n += 1);
        if sender.send(job).is_err() {
            // Every worker is gone, nobody will ever run it
            self.pending.send_modify(|n| *n -= 1);
            return false;
        }
        true
    }

    /// Stops accepting work. Already queued jobs still run.
    pub fn close(&self) {
        if lock(&self.queue).take().is_some() {
            debug!("Worker pool closed to new work");
        }
    }

    /// Jobs queued or running right now.
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Resolves once no job is queued or running.
    pub async fn wait_idle(&self) {
        let mut pending = self.pending.subscribe();
        // Only fails if the sender is dropped, and we own it
        let _ = pending.wait_for(|n| *n == 0).await;
    }

    /// Hands the worker tasks to the caller (the shutdown controller).
    /// Returns None if they were already taken.
    pub(super) fn take_workers(&self) -> Option<JoinSet<()>> {
        lock(&self.workers).take()
    }

    /// Forgets about jobs that were cancelled mid-flight so that
    /// wait_idle() callers are released.
    pub(super) fn clear_pending(&self) {
        self.pending.send_replace(0);
    }
}

async fn worker_loop(id: usize, receiver: SharedReceiver, pending: Arc<watch::Sender<usize>>) {
    loop {
        // Only one worker waits on the queue at a time; the lock is released
        // as soon as a job (or None) comes back
        let job = receiver.lock().await.recv().await;

        // None means the queue was closed and fully drained
        let Some(job) = job else {
            break;
        };

        // A panicking unit only loses itself, the worker keeps going
        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            error!("Crawl unit panicked on worker {}", id);
        }

        // Any jobs this one submitted were counted already, so dropping our
        // own count here can't make the pool look idle too early
        pending.send_modify(|n| *n -= 1);
    }
    trace!("Worker {} exiting", id);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_submitted_jobs() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            assert!(pool.submit(
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                .boxed()
            ));
        }

        pool.wait_idle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 20);
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test]
    async fn test_jobs_can_submit_more_jobs() {
        let pool = Arc::new(WorkerPool::new(2));
        let counter = Arc::new(AtomicUsize::new(0));

        // Each job spawns two children until depth 4: 1 + 2 + 4 + 8 + 16 = 31
        fn spawn_tree(pool: Arc<WorkerPool>, counter: Arc<AtomicUsize>, depth: usize) -> Job {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if depth < 4 {
                    for _ in 0..2 {
                        let child = spawn_tree(Arc::clone(&pool), Arc::clone(&counter), depth + 1);
                        pool.submit(child);
                    }
                }
            }
            .boxed()
        }

        pool.submit(spawn_tree(Arc::clone(&pool), Arc::clone(&counter), 0));
        pool.wait_idle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 31);
    }

    #[tokio::test]
    async fn test_submit_after_close_is_dropped() {
        let pool = WorkerPool::new(1);
        assert!(pool.submit(async {}.boxed()));
        pool.wait_idle().await;

        pool.close();
        assert!(!pool.submit(async {}.boxed()));
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_kill_worker() {
        let pool = WorkerPool::new(1);
        let counter = Arc::new(AtomicUsize::new(0));

        pool.submit(async { panic!("boom"); }.boxed());
        let after = Arc::clone(&counter);
        pool.submit(
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                after.fetch_add(1, Ordering::SeqCst);
            }
            .boxed(),
        );

        pool.wait_idle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_size_is_at_least_one() {
        assert_eq!(WorkerPool::new(0).size(), 1);
        assert_eq!(WorkerPool::new(3).size(), 3);
    }
}
