//! Dynamic fan-out pool: N long-lived workers run jobs whose results may spawn more jobs.
//!
//! One consumer thread owns the pool. It submits the seed job, then alternates between
//! [`FanOutPool::await_next`] and [`FanOutPool::submit`] until the pool reports
//! [`Next::Drained`]. Submission takes `&mut self`, so only that thread can add work and the
//! outstanding counter needs no synchronization.

use anyhow::{Result, anyhow, bail};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Outcome of one job as seen by the consumer.
#[derive(Debug)]
pub enum TaskResult<R> {
    Completed(R),
    /// The job panicked; carries the panic message.
    Failed(String),
}

/// What [`FanOutPool::await_next`] hands back.
#[derive(Debug)]
pub enum Next<R> {
    Result(TaskResult<R>),
    /// Every submitted job has been delivered and nothing is in flight.
    Drained,
}

pub struct FanOutPool<J, R> {
    job_tx: Option<Sender<J>>,
    result_rx: Receiver<TaskResult<R>>,
    workers: Vec<JoinHandle<()>>,
    outstanding: usize,
}

impl<J, R> FanOutPool<J, R>
where
    J: Send + 'static,
    R: Send + 'static,
{
    /// Spawn `workers` threads (at least one), each running `exec` on the jobs it pulls.
    pub fn new<F>(workers: usize, exec: F) -> Self
    where
        F: Fn(J) -> R + Send + Sync + 'static,
    {
        let n = workers.max(1);
        let (job_tx, job_rx) = unbounded::<J>();
        let (result_tx, result_rx) = unbounded::<TaskResult<R>>();
        let exec = Arc::new(exec);

        let handles = (0..n)
            .map(|_| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let exec = Arc::clone(&exec);
                thread::spawn(move || worker_loop(job_rx, result_tx, exec))
            })
            .collect();
        debug!("pool: started {} workers", n);

        Self {
            job_tx: Some(job_tx),
            result_rx,
            workers: handles,
            outstanding: 0,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Jobs submitted but not yet delivered by [`Self::await_next`].
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn submit(&mut self, job: J) -> Result<()> {
        let tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| anyhow!("pool already shut down"))?;
        tx.send(job)
            .map_err(|_| anyhow!("pool workers exited; job not queued"))?;
        self.outstanding += 1;
        Ok(())
    }

    /// Block until a job finishes, or return [`Next::Drained`] when nothing is outstanding.
    pub fn await_next(&mut self) -> Result<Next<R>> {
        if self.outstanding == 0 {
            return Ok(Next::Drained);
        }
        match self.result_rx.recv() {
            Ok(result) => {
                self.outstanding -= 1;
                Ok(Next::Result(result))
            }
            Err(_) => bail!(
                "pool workers exited with {} jobs outstanding",
                self.outstanding
            ),
        }
    }

    /// Close the job queue and join every worker. In-flight jobs finish first.
    pub fn shutdown(mut self) -> Result<()> {
        if self.outstanding > 0 {
            debug!(
                "pool: shutting down with {} undelivered jobs",
                self.outstanding
            );
        }
        let panicked = self.join_workers();
        if panicked > 0 {
            bail!("{} pool worker threads panicked", panicked);
        }
        Ok(())
    }

    /// Returns how many worker threads ended in a panic.
    fn join_workers(&mut self) -> usize {
        // Dropping the only sender lets idle workers see the closed queue.
        self.job_tx.take();
        self.workers
            .drain(..)
            .map(|h| h.join())
            .filter(|r| r.is_err())
            .count()
    }
}

impl<J, R> Drop for FanOutPool<J, R> {
    fn drop(&mut self) {
        self.job_tx.take();
        for h in self.workers.drain(..) {
            if h.join().is_err() {
                error!("pool worker thread panicked");
            }
        }
    }
}

fn worker_loop<J, R, F>(job_rx: Receiver<J>, result_tx: Sender<TaskResult<R>>, exec: Arc<F>)
where
    F: Fn(J) -> R,
{
    while let Ok(job) = job_rx.recv() {
        let result = match catch_unwind(AssertUnwindSafe(|| exec(job))) {
            Ok(r) => TaskResult::Completed(r),
            Err(payload) => TaskResult::Failed(panic_message(payload.as_ref())),
        };
        if result_tx.send(result).is_err() {
            break;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "job panicked".to_string()
    }
}
