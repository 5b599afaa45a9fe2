/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Channel-keyed diagnostic events for the navigation engine.
//!
//! Emitters never block and never fail: with no sender installed an event is
//! dropped. A `DiagnosticsState` owns the receiving end and aggregates counts.

use std::collections::{BTreeMap, VecDeque};
use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde_json::{Value, json};

pub const CHANNEL_NAV_GOTO_STARTED: &str = "navigation.goto.started";
pub const CHANNEL_NAV_GOTO_SUCCEEDED: &str = "navigation.goto.succeeded";
pub const CHANNEL_NAV_GOTO_FAILED: &str = "navigation.goto.failed";
pub const CHANNEL_NAV_STEP_PERFORMED: &str = "navigation.step.performed";
pub const CHANNEL_NAV_STEP_VERIFICATION_FAILED: &str = "navigation.step.verification_failed";
pub const CHANNEL_NAV_DETECT_UNRECOGNIZED: &str = "navigation.detect.unrecognized";
pub const CHANNEL_NAV_RECOVERY_INVOKED: &str = "navigation.recovery.invoked";
pub const CHANNEL_NAV_RETRY_SCHEDULED: &str = "navigation.retry.scheduled";
pub const CHANNEL_NAV_LOADING_WAITED: &str = "navigation.loading.waited";

pub const SPAN_NAV_GOTO: &str = "navigation.goto";

const EVENT_RING_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    MessageSent {
        channel_id: &'static str,
        byte_len: usize,
    },
    MessageReceived {
        channel_id: &'static str,
        latency_us: u64,
    },
    Span {
        name: &'static str,
        duration_us: u64,
    },
}

static GLOBAL_DIAGNOSTICS_TX: OnceLock<Sender<DiagnosticEvent>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_DIAGNOSTICS_TX: std::cell::RefCell<Option<Sender<DiagnosticEvent>>> =
        const { std::cell::RefCell::new(None) };
}

/// First installation wins for the process-wide sender.
pub fn install_global_sender(sender: Sender<DiagnosticEvent>) {
    #[cfg(test)]
    {
        TEST_DIAGNOSTICS_TX.with(|slot| {
            *slot.borrow_mut() = Some(sender.clone());
        });
    }

    let _ = GLOBAL_DIAGNOSTICS_TX.set(sender);
}

pub fn emit_event(event: DiagnosticEvent) {
    // Unit tests run in parallel; each only sees events from its own thread.
    #[cfg(test)]
    {
        TEST_DIAGNOSTICS_TX.with(|slot| {
            if let Some(tx) = slot.borrow().as_ref() {
                let _ = tx.send(event);
            }
        });
    }

    #[cfg(not(test))]
    {
        if let Some(tx) = GLOBAL_DIAGNOSTICS_TX.get() {
            let _ = tx.send(event);
        }
    }
}

/// Shorthand for a `MessageSent` whose payload is a page or route name.
pub fn emit_message(channel_id: &'static str, payload: &str) {
    emit_event(DiagnosticEvent::MessageSent {
        channel_id,
        byte_len: payload.len(),
    });
}

pub fn emit_span_duration(name: &'static str, duration_us: u64) {
    emit_event(DiagnosticEvent::Span { name, duration_us });
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpanTotals {
    pub count: u64,
    pub total_us: u64,
    pub max_us: u64,
}

pub struct DiagnosticsState {
    event_tx: Sender<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    message_counts: BTreeMap<&'static str, u64>,
    span_totals: BTreeMap<&'static str, SpanTotals>,
    event_ring: VecDeque<DiagnosticEvent>,
}

impl DiagnosticsState {
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            event_tx,
            event_rx,
            message_counts: BTreeMap::new(),
            span_totals: BTreeMap::new(),
            event_ring: VecDeque::with_capacity(EVENT_RING_CAPACITY),
        }
    }

    pub fn sender(&self) -> Sender<DiagnosticEvent> {
        self.event_tx.clone()
    }

    /// Install this state's sender as the process-wide sink.
    pub fn install(&self) {
        install_global_sender(self.sender());
    }

    /// Pull everything queued so far. Returns how many events were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: DiagnosticEvent) {
        match &event {
            DiagnosticEvent::MessageSent { channel_id, .. }
            | DiagnosticEvent::MessageReceived { channel_id, .. } => {
                *self.message_counts.entry(channel_id).or_default() += 1;
            }
            DiagnosticEvent::Span { name, duration_us } => {
                let totals = self.span_totals.entry(name).or_default();
                totals.count += 1;
                totals.total_us = totals.total_us.saturating_add(*duration_us);
                totals.max_us = totals.max_us.max(*duration_us);
            }
        }
        if self.event_ring.len() == EVENT_RING_CAPACITY {
            self.event_ring.pop_front();
        }
        self.event_ring.push_back(event);
    }

    pub fn message_count(&self, channel_id: &str) -> u64 {
        self.message_counts.get(channel_id).copied().unwrap_or(0)
    }

    pub fn span_totals(&self, name: &str) -> SpanTotals {
        self.span_totals.get(name).copied().unwrap_or_default()
    }

    pub fn recent_events(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.event_ring.iter()
    }

    pub fn snapshot_json(&self) -> Value {
        let spans: BTreeMap<&str, Value> = self
            .span_totals
            .iter()
            .map(|(name, totals)| {
                (
                    *name,
                    json!({
                        "count": totals.count,
                        "total_us": totals.total_us,
                        "max_us": totals.max_us,
                    }),
                )
            })
            .collect();
        json!({
            "channels": self.message_counts,
            "spans": spans,
            "recent_event_count": self.event_ring.len(),
        })
    }
}

impl Default for DiagnosticsState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_counts_messages_per_channel() {
        let mut state = DiagnosticsState::new();
        state.install();
        emit_message(CHANNEL_NAV_GOTO_STARTED, "map");
        emit_message(CHANNEL_NAV_GOTO_STARTED, "bag");
        emit_event(DiagnosticEvent::MessageReceived {
            channel_id: CHANNEL_NAV_GOTO_SUCCEEDED,
            latency_us: 12,
        });

        assert_eq!(state.drain(), 3);
        assert_eq!(state.message_count(CHANNEL_NAV_GOTO_STARTED), 2);
        assert_eq!(state.message_count(CHANNEL_NAV_GOTO_SUCCEEDED), 1);
        assert_eq!(state.message_count(CHANNEL_NAV_GOTO_FAILED), 0);
    }

    #[test]
    fn events_from_other_threads_are_not_counted() {
        let mut state = DiagnosticsState::new();
        state.install();
        std::thread::spawn(|| emit_message(CHANNEL_NAV_GOTO_FAILED, "elsewhere"))
            .join()
            .unwrap();
        emit_message(CHANNEL_NAV_GOTO_STARTED, "map");

        assert_eq!(state.drain(), 1);
        assert_eq!(state.message_count(CHANNEL_NAV_GOTO_FAILED), 0);
    }

    #[test]
    fn spans_accumulate_totals_and_max() {
        let mut state = DiagnosticsState::new();
        state.install();
        emit_span_duration(SPAN_NAV_GOTO, 40);
        emit_span_duration(SPAN_NAV_GOTO, 100);
        state.drain();

        let totals = state.span_totals(SPAN_NAV_GOTO);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total_us, 140);
        assert_eq!(totals.max_us, 100);
        assert_eq!(state.snapshot_json()["spans"][SPAN_NAV_GOTO]["max_us"], 100);
    }

    #[test]
    fn event_ring_is_bounded() {
        let mut state = DiagnosticsState::new();
        let tx = state.sender();
        for _ in 0..(EVENT_RING_CAPACITY + 10) {
            let _ = tx.send(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_NAV_STEP_PERFORMED,
                byte_len: 1,
            });
        }
        state.drain();
        assert_eq!(state.recent_events().count(), EVENT_RING_CAPACITY);
        assert_eq!(
            state.message_count(CHANNEL_NAV_STEP_PERFORMED),
            (EVENT_RING_CAPACITY + 10) as u64
        );
    }
}
