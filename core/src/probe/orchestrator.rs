use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use vitals_common::network::range::IpCollection;

use super::{Dispatcher, ProbeSettings, RateLimiter};
use crate::engine::{Phase, SendEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Host discovery was turned off in the configuration.
    Disabled,
    /// The process cannot open raw sockets.
    Unprivileged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Nothing was sent; every target is assumed alive.
    Skipped(SkipReason),
    /// Probes were queued for this many targets.
    Dispatched(usize),
}

/// Fans the asynchronous dispatchers out over the whole target set.
pub struct Orchestrator {
    dispatcher: Dispatcher,
    targets: IpCollection,
    privileged: fn() -> bool,
}

impl Orchestrator {
    pub fn new(
        settings: Arc<ProbeSettings>,
        targets: IpCollection,
        engine: Arc<dyn SendEngine>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(settings, engine),
            targets,
            privileged: is_root::is_root,
        }
    }

    /// Replaces the raw socket privilege check.
    pub fn with_privilege_check(mut self, privileged: fn() -> bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Moves the scan into the probe phase, then either skips discovery or
    /// queues every probe for every target.
    ///
    /// Dispatch starts are spaced by the configured rate and happen in target
    /// order. Returns once every task has queued its probes; answers are the
    /// send engine's business.
    pub async fn probe_or_skip(&self, phase: &mut Phase) -> ProbeOutcome {
        *phase = phase.begin_probe();

        let config = &self.dispatcher.settings().config;
        if config.no_probe {
            info!("Host discovery disabled, treating every target as alive");
            return ProbeOutcome::Skipped(SkipReason::Disabled);
        }
        if !(self.privileged)() {
            warn!("Raw sockets unavailable, skipping host discovery");
            return ProbeOutcome::Skipped(SkipReason::Unprivileged);
        }

        let mut limiter = RateLimiter::new(config.rate_interval());
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut dispatched: usize = 0;

        for target in self.targets.iter() {
            limiter.wait().await;
            let dispatcher = self.dispatcher.clone();
            tasks.spawn(async move { dispatcher.dispatch(target) });
            dispatched += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("probe task failed: {e}");
            }
        }

        debug!(dispatched, "discovery probes queued");
        ProbeOutcome::Dispatched(dispatched)
    }
}
