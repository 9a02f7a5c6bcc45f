/*!
 * Readiness Registry
 *
 * The three handshake signals shared between a launcher and the runners
 * waiting on it. The registry is an ordinary value: share it with `Arc`,
 * construct a fresh one per test.
 */

use super::name::SignalName;
use crate::core::errors::SignalError;
use crate::core::timeout::deadline_after;
use crate::core::sync::{CancelToken, Signal, WakeResult};
use crate::core::types::{Completion, DuplicatePolicy, SignalResult};
use crate::monitoring::WaitSpan;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

/// Named one-shot signals for the launch handshake
///
/// `H` is the loader handle published with `loader-ready`.
///
/// # Examples
///
/// ```
/// use readiness_signals::registry::{ReadinessRegistry, SignalName};
/// use std::sync::Arc;
/// use std::thread;
///
/// let registry = Arc::new(ReadinessRegistry::<u64>::new());
/// let launcher = registry.clone();
///
/// thread::spawn(move || {
///     launcher.complete_loader_ready(42).unwrap();
///     launcher.complete(SignalName::PlayerJoined).unwrap();
/// });
///
/// assert_eq!(registry.wait_for_loader().unwrap(), 42);
/// registry.wait(SignalName::PlayerJoined).unwrap();
/// ```
pub struct ReadinessRegistry<H> {
    id: Uuid,
    policy: DuplicatePolicy,
    loader_ready: Signal<H>,
    player_joined: Signal<()>,
    game_closed: Signal<()>,
    shutdown: CancelToken,
}

impl<H> ReadinessRegistry<H>
where
    H: Clone + Send + 'static,
{
    /// Create a registry with every signal pending and the default policy
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// Create a registry whose signals all apply `policy` to duplicates
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        let id = Uuid::new_v4();
        info!(registry_id = %id, policy = policy.as_str(), "readiness registry created");
        Self {
            id,
            policy,
            loader_ready: Signal::new(SignalName::LoaderReady.as_str(), policy),
            player_joined: Signal::new(SignalName::PlayerJoined.as_str(), policy),
            game_closed: Signal::new(SignalName::GameClosed.as_str(), policy),
            shutdown: CancelToken::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn loader_ready(&self) -> &Signal<H> {
        &self.loader_ready
    }

    pub fn player_joined(&self) -> &Signal<()> {
        &self.player_joined
    }

    pub fn game_closed(&self) -> &Signal<()> {
        &self.game_closed
    }

    /// Publish the loader handle
    pub fn complete_loader_ready(&self, handle: H) -> SignalResult<Completion> {
        self.loader_ready.complete(handle)
    }

    /// Complete a payload-less signal
    ///
    /// `loader-ready` carries the loader handle and is rejected here with
    /// `SignalError::PayloadRequired`; use `complete_loader_ready`.
    pub fn complete(&self, name: SignalName) -> SignalResult<Completion> {
        let payload_required = || SignalError::PayloadRequired {
            signal: name.to_string(),
        };
        if name.carries_payload() {
            return Err(payload_required());
        }
        match name {
            SignalName::PlayerJoined => self.player_joined.complete(()),
            SignalName::GameClosed => self.game_closed.complete(()),
            SignalName::LoaderReady => Err(payload_required()),
        }
    }

    /// Non-blocking state query
    pub fn is_completed(&self, name: SignalName) -> bool {
        match name {
            SignalName::LoaderReady => self.loader_ready.is_completed(),
            SignalName::PlayerJoined => self.player_joined.is_completed(),
            SignalName::GameClosed => self.game_closed.is_completed(),
        }
    }

    /// Block until the loader handle is published
    ///
    /// Fails with `Cancelled` if the registry is shut down first.
    pub fn wait_for_loader(&self) -> SignalResult<H> {
        self.traced(SignalName::LoaderReady, |token| {
            self.loader_ready.wait_with(token, None)
        })
    }

    /// Block until the loader handle is published or `timeout` elapses
    ///
    /// A timeout too large to represent as a deadline waits without one.
    pub fn wait_for_loader_timeout(&self, timeout: Duration) -> SignalResult<H> {
        self.wait_for_loader_until(deadline_after(timeout))
    }

    /// Block until the loader handle is published or the optional deadline passes
    pub fn wait_for_loader_until(&self, deadline: Option<Instant>) -> SignalResult<H> {
        self.traced(SignalName::LoaderReady, |token| {
            self.loader_ready.wait_with(token, deadline)
        })
    }

    /// Block until `name` completes, discarding any payload
    pub fn wait(&self, name: SignalName) -> SignalResult<()> {
        self.wait_until(name, None)
    }

    /// Block until `name` completes or `timeout` elapses
    pub fn wait_timeout(&self, name: SignalName, timeout: Duration) -> SignalResult<()> {
        self.wait_until(name, deadline_after(timeout))
    }

    /// Block until `name` completes or the optional deadline passes
    pub fn wait_until(&self, name: SignalName, deadline: Option<Instant>) -> SignalResult<()> {
        self.traced(name, |token| match name {
            SignalName::LoaderReady => self.loader_ready.wait_with(token, deadline).map(|_| ()),
            SignalName::PlayerJoined => self.player_joined.wait_with(token, deadline),
            SignalName::GameClosed => self.game_closed.wait_with(token, deadline),
        })
    }

    /// Release every blocked waiter with `Cancelled`
    ///
    /// Completed signals keep returning their payloads; pending ones can
    /// still be completed, but waits started through the registry fail
    /// while they are pending.
    pub fn shutdown(&self) -> WakeResult {
        let result = self.shutdown.cancel();
        info!(registry_id = %self.id, woken = result.count(), "readiness registry shut down");
        result
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled together with the registry, for use with `Signal::wait_with`
    pub fn cancel_token(&self) -> CancelToken {
        self.shutdown.child()
    }

    /// Point-in-time view of every signal
    pub fn snapshot(&self) -> RegistrySnapshot {
        let status = |name: SignalName, completed: bool, waiters: usize| SignalStatus {
            name,
            completed,
            waiters,
        };
        RegistrySnapshot {
            registry_id: self.id.to_string(),
            policy: self.policy,
            shut_down: self.is_shut_down(),
            signals: vec![
                status(
                    SignalName::LoaderReady,
                    self.loader_ready.is_completed(),
                    self.loader_ready.waiter_count(),
                ),
                status(
                    SignalName::PlayerJoined,
                    self.player_joined.is_completed(),
                    self.player_joined.waiter_count(),
                ),
                status(
                    SignalName::GameClosed,
                    self.game_closed.is_completed(),
                    self.game_closed.waiter_count(),
                ),
            ],
        }
    }

    fn traced<R>(
        &self,
        name: SignalName,
        wait: impl FnOnce(&CancelToken) -> SignalResult<R>,
    ) -> SignalResult<R> {
        let span = WaitSpan::new(name.as_str(), self.id);
        let result = {
            let _entered = span.enter();
            wait(&self.shutdown)
        };
        span.record_result(&result);
        result
    }
}

impl<H> Default for ReadinessRegistry<H>
where
    H: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// State of one signal inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStatus {
    pub name: SignalName,
    pub completed: bool,
    pub waiters: usize,
}

/// Serializable view of a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub registry_id: String,
    pub policy: DuplicatePolicy,
    pub shut_down: bool,
    pub signals: Vec<SignalStatus>,
}

impl RegistrySnapshot {
    /// Signals not yet completed
    pub fn pending(&self) -> impl Iterator<Item = SignalName> + '_ {
        self.signals.iter().filter(|s| !s.completed).map(|s| s.name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
