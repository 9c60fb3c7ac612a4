//! # Pack Lifecycle State Machine
//!
//! Sequences one pack at a time from generation through reveal to archival.
//!
//! ## States
//!
//! ```text
//! IDLE ──start──▶ GENERATING ──ok──▶ PACK_ANIMATE ──animation_complete──▶ CARDS_READY
//!  ▲                  │                                                    │
//!  │               failure                                     reveal_card / start_auto_reveal
//!  │                  ▼                                                    ▼
//!  │                IDLE                                               REVEALING
//!  │                                                                       │
//!  └──────────────reset────────────── RESULTS ◀────────last card revealed──┘
//! ```
//!
//! ## Re-entrancy
//!
//! Every mutating operation takes `&mut self`, so overlapping calls cannot
//! be expressed. Repeated calls are handled by explicit guards:
//!
//! - `animation_complete()` past `PACK_ANIMATE` is a no-op.
//! - `start_auto_reveal()` while a task is live is a no-op.
//! - `stop_auto_reveal()` with no live task is a no-op.
//! - Revealing an already-revealed card is an error and changes nothing.
//!
//! Cancellation clears the auto-reveal task before returning, so no reveal
//! can fire after `stop_auto_reveal()`, `navigate_away()` or a manual reveal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dd_core::{CardCatalog, Pack, PackConfig, Timestamp};
use dd_pack::{
    AnomalyThresholds, FingerprintHistory, GenerationError, PackGenerator, PackValidator,
    ValidationContext, ValidationResult, DEFAULT_HISTORY_CAPACITY,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archive::PackSink;
use crate::auto_reveal::AutoRevealTask;

/// Default spacing between automatic reveals.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(800);

// ─── States ──────────────────────────────────────────────────────────

/// Where the current pack is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackLifecycleState {
    /// No pack.
    Idle,
    /// Generator and validator are running.
    Generating,
    /// Pack accepted; opening animation in progress.
    PackAnimate,
    /// Cards laid out face down.
    CardsReady,
    /// At least one card revealed, or auto-reveal running.
    Revealing,
    /// Every card revealed; pack archived.
    Results,
}

impl std::fmt::Display for PackLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Generating => "GENERATING",
            Self::PackAnimate => "PACK_ANIMATE",
            Self::CardsReady => "CARDS_READY",
            Self::Revealing => "REVEALING",
            Self::Results => "RESULTS",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors returned by lifecycle operations. A failed operation leaves the
/// lifecycle unchanged, except that a failed `start` returns it to `IDLE`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The event is not accepted in the current state.
    #[error("cannot {event} in state {state}")]
    InvalidTransition {
        state: PackLifecycleState,
        event: &'static str,
    },

    #[error("card index {index} out of range for a pack of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("card {index} is already revealed")]
    AlreadyRevealed { index: usize },

    #[error("pack generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("pack rejected by validator with {} violation(s)", .0.violations.len())]
    Rejected(ValidationResult),
}

// ─── Transition log ──────────────────────────────────────────────────

/// Record of one state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: PackLifecycleState,
    pub to: PackLifecycleState,
    pub timestamp: Timestamp,
    pub reason: String,
}

// ─── Options ─────────────────────────────────────────────────────────

/// Tunables for a lifecycle instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleOptions {
    /// Spacing between automatic reveals.
    pub reveal_delay: Duration,
    /// Number of recent fingerprints kept for duplicate detection.
    pub history_capacity: usize,
    /// Bounds for the validator's anomaly check.
    pub thresholds: AnomalyThresholds,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            thresholds: AnomalyThresholds::default(),
        }
    }
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Owns the current pack, its reveal flags and the auto-reveal task.
pub struct PackLifecycle<S: PackSink> {
    catalog: Arc<dyn CardCatalog + Send + Sync>,
    sink: S,
    options: LifecycleOptions,
    state: PackLifecycleState,
    pack: Option<Pack>,
    config: Option<PackConfig>,
    history: FingerprintHistory,
    auto_reveal: Option<AutoRevealTask>,
    last_token: u64,
    last_validation: Option<ValidationResult>,
    transitions: Vec<TransitionRecord>,
}

impl<S: PackSink> PackLifecycle<S> {
    /// Idle lifecycle with default options.
    pub fn new(catalog: Arc<dyn CardCatalog + Send + Sync>, sink: S) -> Self {
        Self::with_options(catalog, sink, LifecycleOptions::default())
    }

    pub fn with_options(
        catalog: Arc<dyn CardCatalog + Send + Sync>,
        sink: S,
        options: LifecycleOptions,
    ) -> Self {
        Self {
            catalog,
            sink,
            options,
            state: PackLifecycleState::Idle,
            pack: None,
            config: None,
            history: FingerprintHistory::new(options.history_capacity),
            auto_reveal: None,
            last_token: 0,
            last_validation: None,
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> PackLifecycleState {
        self.state
    }

    /// The current pack, if any. Shared access only.
    pub fn pack(&self) -> Option<&Pack> {
        self.pack.as_ref()
    }

    /// Configuration the current pack was generated from.
    pub fn config(&self) -> Option<&PackConfig> {
        self.config.as_ref()
    }

    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    pub fn history(&self) -> &FingerprintHistory {
        &self.history
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Result of the most recent validation, accepted or not.
    pub fn last_validation(&self) -> Option<&ValidationResult> {
        self.last_validation.as_ref()
    }

    /// State changes of the current pack, oldest first. The log is cleared
    /// by `start`, so it holds at most one pack's transitions plus the
    /// `reset` that ended it.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn revealed_count(&self) -> usize {
        self.pack.as_ref().map_or(0, Pack::revealed_count)
    }

    pub fn is_auto_reveal_active(&self) -> bool {
        self.auto_reveal.is_some()
    }

    /// Token of the live auto-reveal task.
    pub fn auto_reveal_token(&self) -> Option<u64> {
        self.auto_reveal.map(|task| task.token())
    }

    /// Deadline of the next automatic reveal.
    pub fn next_auto_reveal_due(&self) -> Option<Instant> {
        self.auto_reveal.map(|task| task.next_due())
    }

    /// IDLE → GENERATING → PACK_ANIMATE.
    ///
    /// Generates and validates synchronously. On failure the lifecycle
    /// returns to IDLE and no pack is stored. On success the pack's
    /// fingerprint enters the duplicate-detection history.
    pub fn start(&mut self, config: PackConfig, seed: Option<u64>) -> Result<&Pack, LifecycleError> {
        self.require_state(&[PackLifecycleState::Idle], "start")?;
        self.transitions.clear();
        self.do_transition(PackLifecycleState::Generating, "start requested");

        let catalog = Arc::clone(&self.catalog);
        let pack = match PackGenerator::new(&*catalog).generate(&config, seed) {
            Ok(pack) => pack,
            Err(e) => {
                tracing::warn!(error = %e, "pack generation failed");
                self.do_transition(PackLifecycleState::Idle, "generation failed");
                return Err(e.into());
            }
        };

        let ctx = ValidationContext::new(&self.history, &config, &*catalog)
            .with_thresholds(self.options.thresholds);
        let result = PackValidator::new(ctx).validate(&pack);
        self.last_validation = Some(result.clone());
        if !result.valid {
            self.do_transition(PackLifecycleState::Idle, "validation rejected pack");
            return Err(LifecycleError::Rejected(result));
        }

        self.history.record(pack.fingerprint());
        tracing::info!(
            pack = %pack.id(),
            seed = ?pack.seed(),
            best = ?pack.best_rarity(),
            "pack accepted"
        );
        self.config = Some(config);
        self.do_transition(PackLifecycleState::PackAnimate, "pack generated");
        Ok(&*self.pack.insert(pack))
    }

    /// PACK_ANIMATE → CARDS_READY. A no-op once past PACK_ANIMATE.
    pub fn animation_complete(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            PackLifecycleState::PackAnimate => {
                self.do_transition(PackLifecycleState::CardsReady, "animation complete");
                Ok(())
            }
            PackLifecycleState::CardsReady
            | PackLifecycleState::Revealing
            | PackLifecycleState::Results => {
                tracing::debug!(state = %self.state, "animation_complete ignored");
                Ok(())
            }
            PackLifecycleState::Idle | PackLifecycleState::Generating => {
                Err(LifecycleError::InvalidTransition {
                    state: self.state,
                    event: "complete animation",
                })
            }
        }
    }

    /// Reveal card `index` by hand. Cancels a running auto-reveal.
    pub fn reveal_card(&mut self, index: usize) -> Result<(), LifecycleError> {
        self.require_state(
            &[PackLifecycleState::CardsReady, PackLifecycleState::Revealing],
            "reveal a card",
        )?;
        let pack = self.pack.as_ref().ok_or(LifecycleError::InvalidTransition {
            state: self.state,
            event: "reveal a card",
        })?;
        match pack.is_revealed(index) {
            None => {
                return Err(LifecycleError::IndexOutOfRange {
                    index,
                    len: pack.len(),
                })
            }
            Some(true) => return Err(LifecycleError::AlreadyRevealed { index }),
            Some(false) => {}
        }

        self.cancel_auto_reveal("manual reveal");
        self.reveal_at(index, "manual reveal");
        Ok(())
    }

    /// Begin revealing cards automatically, the first one due at `now`.
    ///
    /// Returns `Ok(false)` without scheduling anything when a task is
    /// already live.
    pub fn start_auto_reveal(&mut self, now: Instant) -> Result<bool, LifecycleError> {
        self.require_state(
            &[PackLifecycleState::CardsReady, PackLifecycleState::Revealing],
            "start auto-reveal",
        )?;
        if self.auto_reveal.is_some() {
            tracing::debug!("auto-reveal already active");
            return Ok(false);
        }
        self.last_token += 1;
        self.auto_reveal = Some(AutoRevealTask::new(
            self.last_token,
            now,
            self.options.reveal_delay,
        ));
        if self.state == PackLifecycleState::CardsReady {
            self.do_transition(PackLifecycleState::Revealing, "auto-reveal started");
        }
        Ok(true)
    }

    /// Fire every automatic reveal due at `now`, lowest face-down index
    /// first. Returns the revealed indices.
    pub fn poll(&mut self, now: Instant) -> Vec<usize> {
        let mut fired = Vec::new();
        while let Some(mut task) = self.auto_reveal {
            if !task.is_due(now) {
                break;
            }
            let Some(index) = self.pack.as_ref().and_then(Pack::next_unrevealed) else {
                self.auto_reveal = None;
                break;
            };
            task.advance();
            self.auto_reveal = Some(task);
            // Revealing the last card finishes the pack and clears the task.
            self.reveal_at(index, "auto-reveal");
            fired.push(index);
        }
        fired
    }

    /// Like [`poll`](Self::poll), but only on behalf of the task identified
    /// by `token`. A stale token fires nothing.
    pub fn poll_task(&mut self, token: u64, now: Instant) -> Vec<usize> {
        if self.auto_reveal_token() != Some(token) {
            return Vec::new();
        }
        self.poll(now)
    }

    /// Cancel auto-reveal. Returns `false` if none was running. If nothing
    /// has been revealed yet the lifecycle goes back to CARDS_READY.
    pub fn stop_auto_reveal(&mut self) -> bool {
        self.cancel_auto_reveal("auto-reveal stopped")
    }

    /// The user left the reveal screen; same effect as
    /// [`stop_auto_reveal`](Self::stop_auto_reveal).
    pub fn navigate_away(&mut self) -> bool {
        self.cancel_auto_reveal("navigated away")
    }

    /// RESULTS → IDLE. Clears the pack and any auto-reveal state.
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        self.require_state(&[PackLifecycleState::Results], "reset")?;
        self.auto_reveal = None;
        self.pack = None;
        self.config = None;
        self.do_transition(PackLifecycleState::Idle, "reset");
        Ok(())
    }

    fn cancel_auto_reveal(&mut self, reason: &str) -> bool {
        let Some(task) = self.auto_reveal.take() else {
            return false;
        };
        tracing::debug!(token = task.token(), reason, "auto-reveal cancelled");
        if self.state == PackLifecycleState::Revealing && self.revealed_count() == 0 {
            self.do_transition(PackLifecycleState::CardsReady, reason);
        }
        true
    }

    // Callers have checked state, bounds and the revealed flag.
    fn reveal_at(&mut self, index: usize, reason: &str) {
        let finished = match self.pack.as_mut() {
            Some(pack) => {
                pack.mark_revealed(index);
                pack.is_fully_revealed()
            }
            None => return,
        };
        tracing::debug!(index, reason, "card revealed");
        if self.state == PackLifecycleState::CardsReady {
            self.do_transition(PackLifecycleState::Revealing, reason);
        }
        if finished {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.auto_reveal = None;
        self.do_transition(PackLifecycleState::Results, "all cards revealed");
        if let Some(pack) = &self.pack {
            match self.sink.archive(pack) {
                Ok(()) => tracing::info!(pack = %pack.id(), "pack archived"),
                Err(e) => tracing::warn!(pack = %pack.id(), error = %e, "failed to archive pack"),
            }
        }
    }

    fn require_state(
        &self,
        allowed: &[PackLifecycleState],
        event: &'static str,
    ) -> Result<(), LifecycleError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                state: self.state,
                event,
            })
        }
    }

    fn do_transition(&mut self, to: PackLifecycleState, reason: &str) {
        tracing::debug!(from = %self.state, %to, reason, "lifecycle transition");
        self.transitions.push(TransitionRecord {
            from: self.state,
            to,
            timestamp: Timestamp::now(),
            reason: reason.to_string(),
        });
        self.state = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
