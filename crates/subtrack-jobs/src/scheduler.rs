//! The periodic job scheduler.
//!
//! One [`JobScheduler`] exists per process: created at startup, started
//! once, shut down on exit. Each registered job runs on its own tokio task
//! in a sleep-until-due / run / repeat loop, so invocations of one job never
//! overlap while different jobs run concurrently. A failing invocation is
//! logged and the schedule stays alive.

use std::{
  collections::HashMap,
  future::Future,
  pin::Pin,
  sync::{Arc, Mutex},
  time::Duration,
};

use subtrack_core::clock::Clock;
use tokio::task::JoinHandle;

use crate::schedule::Recurrence;

type JobFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type JobFn = Arc<dyn Fn() -> JobFuture + Send + Sync>;

struct Job {
  name:       String,
  recurrence: Recurrence,
  run:        JobFn,
  handle:     Option<JoinHandle<()>>,
}

struct Inner {
  jobs:    HashMap<String, Job>,
  started: bool,
}

/// Process-wide scheduler with an explicit `start`/`shutdown` lifecycle.
pub struct JobScheduler {
  clock: Arc<dyn Clock>,
  inner: Mutex<Inner>,
}

impl JobScheduler {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self {
      clock,
      inner: Mutex::new(Inner { jobs: HashMap::new(), started: false }),
    }
  }

  /// Register `job` under `id`, replacing any previous registration with
  /// the same id — safe to call repeatedly, e.g. on restart. If the
  /// scheduler is already started, the replaced job's loop is stopped and
  /// the new one is spawned immediately.
  pub fn add_job<F, Fut>(
    &self,
    id: &str,
    name: &str,
    recurrence: Recurrence,
    job: F,
  ) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
  {
    let run: JobFn = Arc::new(move || Box::pin(job()) as JobFuture);

    let mut inner = self.inner.lock().expect("scheduler lock poisoned");
    if let Some(old) = inner.jobs.remove(id)
      && let Some(handle) = old.handle
    {
      handle.abort();
    }

    let mut entry = Job {
      name: name.to_string(),
      recurrence,
      run,
      handle: None,
    };
    if inner.started {
      entry.handle = Some(self.spawn_loop(id.to_string(), &entry));
    }
    inner.jobs.insert(id.to_string(), entry);

    tracing::info!(job = id, "scheduled: {name} ({recurrence})");
  }

  /// Spawn the per-job loops. Idempotent; jobs registered after `start` are
  /// spawned as they arrive.
  pub fn start(&self) {
    let mut inner = self.inner.lock().expect("scheduler lock poisoned");
    if inner.started {
      return;
    }
    inner.started = true;

    let ids: Vec<String> = inner.jobs.keys().cloned().collect();
    for id in ids {
      let handle = {
        let job = inner.jobs.get(&id).expect("job id just listed");
        self.spawn_loop(id.clone(), job)
      };
      if let Some(job) = inner.jobs.get_mut(&id) {
        job.handle = Some(handle);
      }
    }

    tracing::info!("job scheduler started");
  }

  /// Stop all job loops. An invocation in flight is aborted with its task.
  /// The daemon calls this on normal exit.
  pub fn shutdown(&self) {
    let mut inner = self.inner.lock().expect("scheduler lock poisoned");
    inner.started = false;
    for job in inner.jobs.values_mut() {
      if let Some(handle) = job.handle.take() {
        handle.abort();
      }
    }
    tracing::info!("job scheduler stopped");
  }

  /// Run a registered job once, immediately and outside its schedule.
  /// Errors from the invocation surface to the caller here, unlike in the
  /// scheduled loop where they are logged and swallowed.
  pub async fn run_now(&self, id: &str) -> anyhow::Result<()> {
    let run = {
      let inner = self.inner.lock().expect("scheduler lock poisoned");
      inner.jobs.get(id).map(|job| Arc::clone(&job.run))
    };
    match run {
      Some(run) => run().await,
      None => anyhow::bail!("no job registered under id {id:?}"),
    }
  }

  /// Ids of all registered jobs, sorted.
  pub fn job_ids(&self) -> Vec<String> {
    let inner = self.inner.lock().expect("scheduler lock poisoned");
    let mut ids: Vec<String> = inner.jobs.keys().cloned().collect();
    ids.sort();
    ids
  }

  fn spawn_loop(&self, id: String, job: &Job) -> JoinHandle<()> {
    let clock = Arc::clone(&self.clock);
    let run = Arc::clone(&job.run);
    let recurrence = job.recurrence;
    let name = job.name.clone();

    tokio::spawn(async move {
      loop {
        let now = clock.now().naive_local();
        let due = recurrence.next_after(now);
        // A backwards clock jump makes the delta negative; fire immediately
        // rather than panic.
        let wait = (due - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        tracing::debug!(job = %id, "running {name}");
        if let Err(e) = run().await {
          tracing::error!(job = %id, error = %e, "job invocation failed");
        }
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use subtrack_core::clock::SystemClock;

  use super::*;

  fn scheduler() -> JobScheduler {
    JobScheduler::new(Arc::new(SystemClock))
  }

  #[tokio::test]
  async fn run_now_invokes_the_job() {
    let s = scheduler();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    s.add_job("tick", "Tick", Recurrence::daily(9, 0), move || {
      let counter = Arc::clone(&counter);
      async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
      }
    });

    s.run_now("tick").await.unwrap();
    s.run_now("tick").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn reregistering_replaces_the_previous_job() {
    let s = scheduler();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    s.add_job("job", "First", Recurrence::daily(9, 0), move || {
      let counter = Arc::clone(&counter);
      async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
      }
    });

    let counter = Arc::clone(&second);
    s.add_job("job", "Second", Recurrence::daily(9, 0), move || {
      let counter = Arc::clone(&counter);
      async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
      }
    });

    // Exactly one registration survives, and it is the newest.
    assert_eq!(s.job_ids(), vec!["job".to_string()]);
    s.run_now("job").await.unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn failing_job_reports_error_and_stays_registered() {
    let s = scheduler();
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&attempts);
    s.add_job("flaky", "Flaky", Recurrence::daily(9, 0), move || {
      let counter = Arc::clone(&counter);
      async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
          anyhow::bail!("store unavailable");
        }
        Ok(())
      }
    });

    assert!(s.run_now("flaky").await.is_err());
    // The failure did not unregister the job; the next invocation runs.
    assert!(s.run_now("flaky").await.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn run_now_unknown_id_errors() {
    let s = scheduler();
    assert!(s.run_now("missing").await.is_err());
  }

  #[tokio::test]
  async fn start_and_shutdown_are_idempotent() {
    let s = scheduler();
    s.add_job("noop", "Noop", Recurrence::daily(9, 0), || async { Ok(()) });

    s.start();
    s.start();
    s.shutdown();
    s.shutdown();

    // Registration survives shutdown; only the loops are stopped.
    assert_eq!(s.job_ids(), vec!["noop".to_string()]);
  }
}
