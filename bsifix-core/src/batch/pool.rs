use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};

use crate::error::{FixError, Result};

/// What a worker hands back: the job's value, or the panic message.
pub type Finished<T> = std::result::Result<T, String>;

/// Fixed-size pool of worker threads. Each submitted closure runs to
/// completion on one worker; nothing is shared between closures except what
/// they capture.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// `workers` of `None` (or zero) sizes the pool to the host's cores.
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let mut b = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("bsifix-worker-{i}"));
        if let Some(n) = workers.filter(|&n| n > 0) {
            b = b.num_threads(n);
        }
        let pool = b.build().map_err(|e| FixError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue one job and get a handle to its result.
    pub fn submit<T, F>(&self, f: F) -> JobHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        self.pool.spawn(move || {
            let _ = tx.send(run_caught(f));
        });
        JobHandle { rx }
    }

    /// Queue every job; results arrive in completion order tagged with the
    /// job's position in `jobs`.
    pub fn run_all<T, F, I>(&self, jobs: I) -> Completions<T>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let mut remaining = 0;
        for (idx, f) in jobs.into_iter().enumerate() {
            let tx = tx.clone();
            self.pool.spawn(move || {
                let _ = tx.send((idx, run_caught(f)));
            });
            remaining += 1;
        }
        Completions { rx, remaining }
    }
}

fn run_caught<T>(f: impl FnOnce() -> T) -> Finished<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(p: Box<dyn Any + Send>) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

pub struct JobHandle<T> {
    rx: Receiver<Finished<T>>,
}

impl<T> JobHandle<T> {
    /// Block until the job is done.
    pub fn join(self) -> Result<T> {
        match self.rx.recv() {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(msg)) => Err(FixError::Pool(format!("job panicked: {msg}"))),
            Err(_) => Err(FixError::Pool("worker exited without a result".into())),
        }
    }
}

pub struct Completions<T> {
    rx: Receiver<(usize, Finished<T>)>,
    remaining: usize,
}

impl<T> Iterator for Completions<T> {
    type Item = (usize, Finished<T>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.rx.recv().ok()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn handle_returns_value() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.submit(|| 6 * 7).join().unwrap(), 42);
    }

    #[test]
    fn panics_become_errors() {
        let pool = WorkerPool::new(Some(1)).unwrap();
        let err = pool.submit(|| -> u8 { panic!("boom") }).join().unwrap_err();
        assert!(err.to_string().contains("boom"));
        // the worker survives
        assert_eq!(pool.submit(|| 1).join().unwrap(), 1);
    }

    #[test]
    fn every_job_completes_once_and_concurrency_is_bounded() {
        let pool = WorkerPool::new(Some(3)).unwrap();
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let jobs: Vec<_> = (0..20)
            .map(|i| {
                let live = Arc::clone(&live);
                let peak = Arc::clone(&peak);
                move || {
                    let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                    live.fetch_sub(1, Ordering::SeqCst);
                    i * 2
                }
            })
            .collect();

        let done: Vec<(usize, Finished<usize>)> = pool.run_all(jobs).collect();
        assert_eq!(done.len(), 20);
        let idx: BTreeSet<usize> = done.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx.len(), 20);
        for (i, r) in done {
            assert_eq!(r.unwrap(), i * 2);
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
