//! Background job scheduling for SubTrack.
//!
//! Owns the time-based schedules (daily at a fixed hour, monthly on a fixed
//! day) and runs the notification jobs on them, independent of any
//! request/response cycle. Pure tokio timers — no job-queue service, no
//! extra scheduler dependency.

pub mod jobs;
pub mod schedule;
pub mod scheduler;

pub use jobs::NotificationJobs;
pub use schedule::Recurrence;
pub use scheduler::JobScheduler;
