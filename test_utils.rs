/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shared fixtures for unit tests and the scenario suite.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::Duration;

use pagenav_core::{
    Anchor, PageGraph, PageKey, RecognitionOracle, ScreenRegion, TextAnchor, VisualAnchor,
};
use parking_lot::Mutex;

use crate::catalog::{DemoCatalog, demo_catalog};
use crate::navigation::{MainPageRecovery, Navigator};
use crate::oracle::SimulatedGame;
use crate::prefs::NavigatorPrefs;

/// Recovery routine that only counts its invocations.
#[derive(Debug, Clone, Default)]
pub struct CountingRecovery {
    calls: Arc<AtomicUsize>,
}

impl CountingRecovery {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MainPageRecovery for CountingRecovery {
    fn recover(&self, _graph: &PageGraph, _oracle: &dyn RecognitionOracle) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleCall {
    ReadTitle,
    DetectVisual(String),
    DetectText(String),
    Key(String),
    Click(Anchor),
    Sleep,
}

impl OracleCall {
    pub fn is_action(&self) -> bool {
        matches!(self, OracleCall::Key(_) | OracleCall::Click(_))
    }
}

/// Forwards to a `SimulatedGame` and journals every call with the calling
/// thread. Sleeps yield so concurrent callers get a chance to interleave.
pub struct RecordingOracle {
    game: Arc<SimulatedGame>,
    journal: Mutex<Vec<(ThreadId, OracleCall)>>,
}

impl RecordingOracle {
    pub fn new(game: Arc<SimulatedGame>) -> Self {
        Self {
            game,
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn game(&self) -> &SimulatedGame {
        &self.game
    }

    pub fn journal(&self) -> Vec<(ThreadId, OracleCall)> {
        self.journal.lock().clone()
    }

    /// Number of maximal runs of consecutive calls made by the same thread.
    pub fn thread_runs(&self) -> usize {
        let journal = self.journal.lock();
        let mut runs = 0;
        let mut last = None;
        for (thread, _) in journal.iter() {
            if last != Some(*thread) {
                runs += 1;
                last = Some(*thread);
            }
        }
        runs
    }

    fn record(&self, call: OracleCall) {
        self.journal.lock().push((thread::current().id(), call));
    }
}

impl RecognitionOracle for RecordingOracle {
    fn read_title_text(&self, region: &ScreenRegion) -> String {
        self.record(OracleCall::ReadTitle);
        self.game.read_title_text(region)
    }

    fn detect_visual_anchor(&self, anchor: &VisualAnchor) -> bool {
        self.record(OracleCall::DetectVisual(anchor.name.clone()));
        self.game.detect_visual_anchor(anchor)
    }

    fn detect_text_anchor(&self, anchor: &TextAnchor) -> bool {
        self.record(OracleCall::DetectText(anchor.text.clone()));
        self.game.detect_text_anchor(anchor)
    }

    fn perform_key(&self, token: &str) {
        self.record(OracleCall::Key(token.to_string()));
        self.game.perform_key(token);
    }

    fn perform_click(&self, anchor: &Anchor) {
        self.record(OracleCall::Click(anchor.clone()));
        self.game.perform_click(anchor);
    }

    fn sleep(&self, duration: Duration, reason: &str) {
        self.record(OracleCall::Sleep);
        self.game.sleep(duration, reason);
        thread::yield_now();
    }
}

pub struct DemoRig {
    pub catalog: DemoCatalog,
    pub game: Arc<SimulatedGame>,
    pub navigator: Arc<Navigator>,
}

/// Demo catalog, a simulated game on `start` and a navigator with default prefs.
pub fn demo_rig(start: impl Fn(&DemoCatalog) -> PageKey) -> DemoRig {
    let catalog = demo_catalog().expect("demo catalog is well formed");
    let game = Arc::new(SimulatedGame::new(catalog.graph.clone(), start(&catalog)));
    let navigator = Arc::new(Navigator::new(
        catalog.graph.clone(),
        game.clone(),
        NavigatorPrefs::default(),
    ));
    DemoRig {
        catalog,
        game,
        navigator,
    }
}
