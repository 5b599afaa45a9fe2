/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Page navigation engine.
//!
//! A `Navigator` is built once at startup and shared by handle
//! (`Arc<Navigator>`) between the presentation layer and automated tasks. It
//! resolves the current page through the recognition oracle, plans a route over
//! the frozen page graph, and drives the oracle along it, verifying every step.
//!
//! All navigation runs under one non-reentrant switch lock, so at most one
//! action stream reaches the game window at a time. Each retry is a fresh
//! attempt with its own lock acquisition, detection, and planning.

mod detect;
mod error;
mod execute;
mod recovery;

use std::sync::Arc;
use std::time::Instant;

use pagenav_core::{PageGraph, PageKey, PageRoute, RecognitionOracle, plan_path};
use parking_lot::{Mutex, RwLock};

pub use error::NavigationError;
pub use recovery::{EscapeRecovery, MainPageRecovery};

use crate::diagnostics::{
    CHANNEL_NAV_GOTO_FAILED, CHANNEL_NAV_GOTO_STARTED, CHANNEL_NAV_GOTO_SUCCEEDED,
    CHANNEL_NAV_RECOVERY_INVOKED, CHANNEL_NAV_RETRY_SCHEDULED, SPAN_NAV_GOTO, emit_message,
    emit_span_duration,
};
use crate::prefs::NavigatorPrefs;

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    /// `current` is `None` until detection for this attempt has finished.
    Navigating {
        current: Option<PageKey>,
        retries_left: u32,
    },
    Succeeded,
    Failed,
}

impl NavState {
    pub fn is_active(&self) -> bool {
        matches!(self, NavState::Navigating { .. })
    }
}

/// Marks an attempt that unwinds mid-flight as failed.
struct FailOnUnwind<'a>(&'a RwLock<NavState>);

impl Drop for FailOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut state = self.0.write();
            if state.is_active() {
                *state = NavState::Failed;
            }
        }
    }
}

pub struct Navigator {
    graph: Arc<PageGraph>,
    oracle: Arc<dyn RecognitionOracle>,
    recovery: Box<dyn MainPageRecovery>,
    prefs: NavigatorPrefs,
    switch_lock: Mutex<()>,
    state: RwLock<NavState>,
}

impl Navigator {
    pub fn new(
        graph: Arc<PageGraph>,
        oracle: Arc<dyn RecognitionOracle>,
        prefs: NavigatorPrefs,
    ) -> Self {
        let recovery = Box::new(EscapeRecovery::from_prefs(&prefs.recovery));
        Self {
            graph,
            oracle,
            recovery,
            prefs,
            switch_lock: Mutex::new(()),
            state: RwLock::new(NavState::Idle),
        }
    }

    pub fn with_recovery(mut self, recovery: impl MainPageRecovery + 'static) -> Self {
        self.recovery = Box::new(recovery);
        self
    }

    pub fn graph(&self) -> &PageGraph {
        &self.graph
    }

    pub fn oracle(&self) -> &dyn RecognitionOracle {
        self.oracle.as_ref()
    }

    pub fn prefs(&self) -> &NavigatorPrefs {
        &self.prefs
    }

    pub fn state(&self) -> NavState {
        *self.state.read()
    }

    fn set_state(&self, state: NavState) {
        *self.state.write() = state;
    }

    pub fn page_key(&self, name: &str) -> Result<PageKey, NavigationError> {
        self.graph
            .key_of(name)
            .ok_or_else(|| NavigationError::UnknownPage(name.to_string()))
    }

    /// Shortest route along declared links.
    pub fn plan_path(&self, current: PageKey, target: PageKey) -> Result<PageRoute, NavigationError> {
        plan_path(&self.graph, current, target).map_err(NavigationError::from)
    }

    /// Navigate with the configured retry budget.
    pub fn goto_page(&self, target: PageKey) -> Result<(), NavigationError> {
        self.goto_page_with_retry(target, self.prefs.max_retry)
    }

    pub fn goto_page_named(&self, name: &str) -> Result<(), NavigationError> {
        self.goto_page(self.page_key(name)?)
    }

    /// Navigate to `target`, making at most `max_retry + 1` full attempts.
    ///
    /// Only step verification failures are retried. Detection failure falls
    /// back to the main-page recovery routine inside the attempt; planning and
    /// graph defects are returned immediately.
    pub fn goto_page_with_retry(
        &self,
        target: PageKey,
        max_retry: u32,
    ) -> Result<(), NavigationError> {
        if self.graph.page(target).is_none() {
            return Err(NavigationError::UnknownPage(format!("{target:?}")));
        }
        let target_name = self.graph.name_of(target);
        log::info!("Goto page: {target_name}");
        emit_message(CHANNEL_NAV_GOTO_STARTED, &target_name);
        let started = Instant::now();

        let mut attempt: u32 = 0;
        let result = loop {
            let retries_left = max_retry - attempt;
            let outcome = {
                let _guard = self.switch_lock.lock();
                let _unwind = FailOnUnwind(&self.state);
                let outcome = self.attempt(target, retries_left);
                match &outcome {
                    Ok(()) => self.set_state(NavState::Succeeded),
                    Err(err) if !err.is_retryable() || retries_left == 0 => {
                        self.set_state(NavState::Failed)
                    }
                    Err(_) => {}
                }
                outcome
            };

            match outcome {
                Ok(()) => break Ok(()),
                Err(err) if err.is_retryable() && retries_left > 0 => {
                    attempt += 1;
                    log::warn!("{err}. Retrying ({attempt}/{max_retry})");
                    emit_message(CHANNEL_NAV_RETRY_SCHEDULED, &target_name);
                }
                Err(err) if err.is_retryable() => {
                    break Err(NavigationError::RetriesExhausted {
                        target: target_name.clone(),
                        max_retry,
                        last_failure: Box::new(err),
                    });
                }
                Err(err) => break Err(err),
            }
        };

        emit_span_duration(SPAN_NAV_GOTO, started.elapsed().as_micros() as u64);
        match &result {
            Ok(()) => emit_message(CHANNEL_NAV_GOTO_SUCCEEDED, &target_name),
            Err(err) => {
                log::error!("goto_page failed: {err}");
                emit_message(CHANNEL_NAV_GOTO_FAILED, &target_name);
            }
        }
        result
    }

    /// Navigate only if `page` is not already showing.
    pub fn ensure_page(&self, page: PageKey) -> Result<(), NavigationError> {
        if self.verify_page(page) {
            return Ok(());
        }
        self.goto_page(page)
    }

    /// One detect, plan, execute pass. Caller holds the switch lock.
    fn attempt(&self, target: PageKey, retries_left: u32) -> Result<(), NavigationError> {
        self.set_state(NavState::Navigating {
            current: None,
            retries_left,
        });
        self.wait_for_loading();

        let current = match self.get_current_page() {
            Ok(current) => current,
            Err(err) => {
                log::warn!("Cannot recognize current page, going back to main page: {err}");
                emit_message(CHANNEL_NAV_RECOVERY_INVOKED, &err.to_string());
                self.recovery.recover(&self.graph, self.oracle.as_ref());
                self.graph.main()
            }
        };
        self.set_state(NavState::Navigating {
            current: Some(current),
            retries_left,
        });

        let target_name = self.graph.name_of(target);
        if current == target {
            log::debug!("Already at destination page: {target_name}");
            return Ok(());
        }

        let route = self.plan_path(current, target)?;
        log::info!("Navigation path: {}", route.describe(&self.graph));
        self.run_route(&route)?;
        log::info!("Successfully arrived at {target_name}");
        Ok(())
    }
}
