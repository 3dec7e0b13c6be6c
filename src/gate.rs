/*!
Cooldowns and confirmations.

These are the only parts of parsing with state that outlives a single
invocation. The state lives in a [`GateStore`], which can be shared between
several [`Gate`]s (and threads), and time comes from a [`Clock`], so that
tests can control it.

Every read-modify-write on the store is a single `DashMap` entry operation,
which holds the shard lock for the key: two invocations racing for the same
cooldown or confirmation can never both win.
*/

use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::debug;

use crate::{
    errors::{CommandParseError, CooldownScope},
    invoker::Invoker,
    options::{CooldownOptions, GateConfig},
};

/// A source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when it's told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    command: String,

    /// `None` for the global timer
    invoker: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    at: Instant,
    window: Duration,
}

impl Stamp {
    /// How much longer this cooldown lasts, if it hasn't expired
    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.window
            .checked_sub(now.saturating_duration_since(self.at))
            .filter(|remaining| !remaining.is_zero())
    }
}

/// The state shared by [`Gate`]s: last-use times and pending confirmations
#[derive(Debug, Default)]
pub struct GateStore {
    cooldowns: DashMap<Key, Stamp>,
    confirmations: DashMap<Key, Instant>,
}

impl GateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live and expired-but-unswept entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.cooldowns.len() + self.confirmations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of [`Gate::confirm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A pending confirmation was consumed; run the command
    Admitted,

    /// A confirmation is now pending; the invoker must run the command again
    /// before it expires
    Pending,
}

/// Enforces cooldowns and confirmations. See
/// [`Command::parse_strict`][crate::Command::parse_strict].
pub struct Gate {
    store: Arc<GateStore>,
    clock: Arc<dyn Clock>,
    config: GateConfig,
    checks: AtomicUsize,
}

impl Gate {
    /// A gate with its own store, using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(GateStore::new()),
            Arc::new(SystemClock),
            GateConfig::default(),
        )
    }

    #[must_use]
    pub fn with_parts(store: Arc<GateStore>, clock: Arc<dyn Clock>, config: GateConfig) -> Self {
        Self {
            store,
            clock,
            config,
            checks: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<GateStore> {
        &self.store
    }

    /// Run a sweep every `sweep_interval` checks
    fn tick(&self) {
        let interval = self.config.sweep_interval;

        if interval > 0 && (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % interval == 0 {
            self.sweep();
        }
    }

    /// Remove every expired cooldown and confirmation
    pub fn sweep(&self) {
        let now = self.clock.now();

        self.store
            .cooldowns
            .retain(|_, stamp| stamp.remaining(now).is_some());
        self.store
            .confirmations
            .retain(|_, expires| *expires > now);

        debug!(remaining = self.store.len(), "swept gate store");
    }

    fn timers<'a>(
        command: &'a str,
        invoker: &'a dyn Invoker,
        options: &'a CooldownOptions,
    ) -> impl Iterator<Item = (Key, Duration, CooldownScope)> + 'a {
        let bypass = options
            .bypass_permission
            .as_deref()
            .is_some_and(|node| invoker.has_permission(node));

        let per_invoker = options.per_invoker.map(|window| {
            let key = Key {
                command: command.to_owned(),
                invoker: Some(invoker.id().to_owned()),
            };
            (key, window, CooldownScope::Invoker)
        });

        let global = options.global.map(|window| {
            let key = Key {
                command: command.to_owned(),
                invoker: None,
            };
            (key, window, CooldownScope::Global)
        });

        per_invoker
            .into_iter()
            .chain(global)
            .filter(move |_| !bypass)
    }

    /// Reject the invocation if either of its cooldown timers is running
    pub fn check_cooldown(
        &self,
        command: &str,
        invoker: &dyn Invoker,
        options: &CooldownOptions,
    ) -> Result<(), CommandParseError> {
        self.tick();
        let now = self.clock.now();

        for (key, _, scope) in Self::timers(command, invoker, options) {
            let remaining = self
                .store
                .cooldowns
                .get(&key)
                .and_then(|stamp| stamp.remaining(now));

            if let Some(remaining) = remaining {
                debug!(command, invoker = invoker.id(), ?scope, ?remaining, "on cooldown");
                return Err(CommandParseError::Cooldown { remaining, scope });
            }
        }

        Ok(())
    }

    /**
    Start the cooldown timers for a successful invocation.

    Each timer is checked and set in one atomic step, so if another
    invocation started the same timer since [`check_cooldown`][Self::check_cooldown]
    passed, this one fails with a cooldown error instead. A failed commit
    leaves no timers behind: any this call already started are removed.
    */
    pub fn commit_cooldown(
        &self,
        command: &str,
        invoker: &dyn Invoker,
        options: &CooldownOptions,
    ) -> Result<(), CommandParseError> {
        let now = self.clock.now();
        let mut started: Vec<(Key, Stamp)> = Vec::new();

        for (key, window, scope) in Self::timers(command, invoker, options) {
            let stamp = Stamp { at: now, window };

            match self.store.cooldowns.entry(key.clone()) {
                Entry::Occupied(mut entry) => match entry.get().remaining(now) {
                    Some(remaining) => {
                        drop(entry);
                        debug!(command, ?scope, "lost a cooldown race");
                        self.rollback(started);
                        return Err(CommandParseError::Cooldown { remaining, scope });
                    }
                    None => {
                        entry.insert(stamp);
                    }
                },
                Entry::Vacant(entry) => {
                    entry.insert(stamp);
                }
            }

            started.push((key, stamp));
        }

        Ok(())
    }

    /// Remove timers started by a failed commit, unless something else has
    /// replaced them since
    fn rollback(&self, started: Vec<(Key, Stamp)>) {
        for (key, stamp) in started {
            self.store
                .cooldowns
                .remove_if(&key, |_, current| *current == stamp);
        }
    }

    /**
    Require an invoker to run a command twice within `timeout`.

    The first call stores a pending confirmation and returns
    [`Admission::Pending`]. A second call before the confirmation expires
    consumes it and returns [`Admission::Admitted`]; after it expires, the
    second call starts over with a new pending confirmation.
    */
    pub fn confirm(&self, command: &str, invoker: &dyn Invoker, timeout: Duration) -> Admission {
        self.tick();
        let now = self.clock.now();

        let key = Key {
            command: command.to_owned(),
            invoker: Some(invoker.id().to_owned()),
        };
        let expires = now.checked_add(timeout).unwrap_or(now);

        let admission = match self.store.confirmations.entry(key) {
            Entry::Occupied(entry) if *entry.get() > now => {
                entry.remove();
                Admission::Admitted
            }
            Entry::Occupied(mut entry) => {
                entry.insert(expires);
                Admission::Pending
            }
            Entry::Vacant(entry) => {
                entry.insert(expires);
                Admission::Pending
            }
        };

        debug!(command, invoker = invoker.id(), ?admission, "confirmation");
        admission
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
