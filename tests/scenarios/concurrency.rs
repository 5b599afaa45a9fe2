/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pagenav::catalog::demo_catalog;
use pagenav::oracle::SimulatedGame;
use pagenav::test_utils::{OracleCall, RecordingOracle};
use pagenav::{
    Anchor, NavState, Navigator, NavigatorPrefs, RecognitionOracle, ScreenRegion, TextAnchor,
    VisualAnchor,
};

#[test]
fn concurrent_navigations_do_not_interleave() {
    let catalog = demo_catalog().unwrap();
    let game = Arc::new(SimulatedGame::new(catalog.graph.clone(), catalog.main));
    game.set_loading_frames_per_transition(1);
    let oracle = Arc::new(RecordingOracle::new(game.clone()));
    let navigator = Arc::new(Navigator::new(
        catalog.graph.clone(),
        oracle.clone(),
        NavigatorPrefs::default(),
    ));

    let targets = [catalog.shop, catalog.crafting, catalog.quests, catalog.map];
    let barrier = Arc::new(Barrier::new(targets.len()));
    let handles: Vec<_> = targets
        .into_iter()
        .map(|target| {
            let navigator = navigator.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                navigator.goto_page(target)
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // every goto_page touches the oracle only while holding the switch lock
    assert!(oracle.thread_runs() <= targets.len());
    assert!(oracle.journal().iter().any(|(_, call)| call.is_action()));
    assert_eq!(navigator.state(), NavState::Succeeded);
}

/// Panics on the first key press, then behaves like the wrapped game.
struct FlakyOracle {
    game: Arc<SimulatedGame>,
    panicked: AtomicBool,
}

impl RecognitionOracle for FlakyOracle {
    fn read_title_text(&self, region: &ScreenRegion) -> String {
        self.game.read_title_text(region)
    }

    fn detect_visual_anchor(&self, anchor: &VisualAnchor) -> bool {
        self.game.detect_visual_anchor(anchor)
    }

    fn detect_text_anchor(&self, anchor: &TextAnchor) -> bool {
        self.game.detect_text_anchor(anchor)
    }

    fn perform_key(&self, token: &str) {
        if !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("input device went away");
        }
        self.game.perform_key(token);
    }

    fn perform_click(&self, anchor: &Anchor) {
        self.game.perform_click(anchor);
    }

    fn sleep(&self, duration: Duration, reason: &str) {
        self.game.sleep(duration, reason);
    }
}

#[test]
fn switch_lock_is_released_when_an_action_panics() {
    let catalog = demo_catalog().unwrap();
    let game = Arc::new(SimulatedGame::new(catalog.graph.clone(), catalog.main));
    let oracle = Arc::new(FlakyOracle {
        game: game.clone(),
        panicked: AtomicBool::new(false),
    });
    let navigator = Navigator::new(catalog.graph.clone(), oracle, NavigatorPrefs::default());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| navigator.goto_page(catalog.map)));
    assert!(outcome.is_err());
    assert_eq!(navigator.state(), NavState::Failed);
    assert!(!navigator.state().is_active());

    navigator.goto_page(catalog.map).unwrap();
    assert_eq!(game.current_page(), catalog.map);
    assert_eq!(navigator.state(), NavState::Succeeded);
}

#[test]
fn recording_oracle_sees_detection_before_actions() {
    let catalog = demo_catalog().unwrap();
    let game = Arc::new(SimulatedGame::new(catalog.graph.clone(), catalog.inventory));
    let oracle = Arc::new(RecordingOracle::new(game));
    let navigator = Navigator::new(
        catalog.graph.clone(),
        oracle.clone(),
        NavigatorPrefs::default(),
    );

    navigator.goto_page(catalog.main).unwrap();
    let journal: Vec<OracleCall> = oracle.journal().into_iter().map(|(_, call)| call).collect();
    let first_action = journal.iter().position(OracleCall::is_action).unwrap();
    assert!(journal[..first_action].contains(&OracleCall::ReadTitle));
    assert_eq!(journal[first_action], OracleCall::Key("i".into()));
    assert_eq!(journal[first_action + 1], OracleCall::Sleep);
}
