//! # CycleJob Trait
//!
//! The `CycleJob` trait is the contract for the unit of work a [`HostedService`](crate::HostedService)
//! runs on every trigger firing. It separates the *business logic* of one cycle from the
//! *plumbing* (timers, task spawning, error containment), in the same way a resource entity is
//! kept apart from the actor loop that drives it.
//!
//! # Scopes
//! Every cycle starts by calling [`CycleJob::begin_scope`]. The returned scope owns whatever
//! collaborators the cycle needs and is moved into [`CycleJob::run_cycle`], so nothing created
//! for one cycle can leak into the next one or into a concurrently running cycle.

use async_trait::async_trait;
use std::fmt::Debug;

/// Work executed once per trigger firing.
///
/// Implementors must be `Send + Sync + 'static` because the job is shared (behind an `Arc`)
/// between every cycle task the service spawns. Cycles may overlap, so `run_cycle` takes
/// `&self` and any per-cycle state belongs in [`CycleJob::Scope`].
#[async_trait]
pub trait CycleJob: Send + Sync + 'static {
    /// Collaborators owned by a single cycle.
    type Scope: Send;

    /// What a successful cycle reports back (logged at debug level).
    type Output: Debug + Send;

    /// The error type for this job.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in log fields. Defaults to the type name without module path or generics.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Creates the fresh, isolated scope for one cycle.
    fn begin_scope(&self) -> Result<Self::Scope, Self::Error>;

    /// Runs one cycle. `cycle` is the 1-based firing number.
    async fn run_cycle(&self, scope: Self::Scope, cycle: u64) -> Result<Self::Output, Self::Error>;
}
