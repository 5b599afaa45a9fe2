/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use pagenav::catalog::DemoCatalog;
use pagenav::oracle::SimulatedInput;
use pagenav::test_utils::{CountingRecovery, demo_rig};
use pagenav::{NavState, NavigationError, Navigator, NavigatorPrefs, PageRoute, TextAnchor};
use pagenav_core::plan_path;
use proptest::prelude::*;
use rstest::rstest;

fn key(token: &str) -> SimulatedInput {
    SimulatedInput::Key(token.to_string())
}

#[test]
fn inventory_to_map_goes_through_main() {
    let rig = demo_rig(|c| c.inventory);
    rig.navigator.goto_page(rig.catalog.map).unwrap();

    assert_eq!(rig.game.current_page(), rig.catalog.map);
    assert_eq!(rig.game.inputs(), vec![key("i"), key("m")]);
    assert_eq!(rig.navigator.state(), NavState::Succeeded);
}

#[test]
fn titled_pages_are_detected_and_left() {
    let rig = demo_rig(|c| c.shop);
    rig.navigator.goto_page_named("quests").unwrap();

    assert_eq!(
        rig.game.inputs(),
        vec![
            key("esc"),
            key("esc"),
            key("f1"),
            SimulatedInput::Click(TextAnchor::new("Quests").into()),
        ]
    );
}

#[rstest]
#[case("main")]
#[case("inventory")]
#[case("shop")]
#[case("event")]
fn navigating_to_the_current_page_is_a_no_op(#[case] page: &str) {
    let rig = demo_rig(|c| c.key(page).unwrap());
    rig.navigator.goto_page_named(page).unwrap();
    assert!(rig.game.inputs().is_empty());
    assert_eq!(rig.game.sleep_count(), 0);
}

#[test]
fn unreachable_target_fails_before_any_input() {
    let rig = demo_rig(|c| c.map);
    let err = rig.navigator.goto_page(rig.catalog.event).unwrap_err();

    assert_eq!(
        err,
        NavigationError::NoPath {
            from: "map".into(),
            to: "event".into()
        }
    );
    assert!(rig.game.inputs().is_empty());
    assert_eq!(rig.navigator.state(), NavState::Failed);
}

#[test]
fn ensure_page_does_nothing_when_already_there() {
    let rig = demo_rig(|c| c.crafting);
    rig.navigator.ensure_page(rig.catalog.crafting).unwrap();
    assert!(rig.game.inputs().is_empty());
    assert_eq!(rig.navigator.state(), NavState::Idle);
}

#[test]
fn popup_is_dismissed_before_planning_from_main() {
    let rig = demo_rig(|c| c.inventory);
    rig.game.show_popup();
    assert!(!rig.navigator.is_valid_page());

    rig.navigator.goto_page(rig.catalog.map).unwrap();
    assert_eq!(rig.game.inputs(), vec![key("esc"), key("m")]);
}

#[test]
fn recovery_is_invoked_once_per_unrecognized_attempt() {
    let rig = demo_rig(|c| c.inventory);
    rig.game.show_popup();
    let recovery = CountingRecovery::default();
    let navigator = Navigator::new(
        rig.catalog.graph.clone(),
        rig.game.clone(),
        NavigatorPrefs::default(),
    )
    .with_recovery(recovery.clone());

    let err = navigator.goto_page_with_retry(rig.catalog.map, 2).unwrap_err();
    assert!(matches!(err, NavigationError::RetriesExhausted { max_retry: 2, .. }));
    assert_eq!(recovery.calls(), 3);
}

#[test]
fn loading_screens_are_waited_out() {
    let rig = demo_rig(|c| c.main);
    rig.game.set_loading_frames_per_transition(3);
    rig.game.begin_loading(2);

    rig.navigator.goto_page(rig.catalog.shop).unwrap();
    assert_eq!(rig.game.current_page(), rig.catalog.shop);
    assert_eq!(rig.game.inputs().len(), 2);
    // two polls before detection, then one settle and two polls per step
    assert_eq!(rig.game.sleep_count(), 2 + 2 * 3);
}

#[test]
fn stale_route_reports_missing_edge() {
    let rig = demo_rig(|c| c.main);
    let route = PageRoute::new(vec![rig.catalog.main, rig.catalog.shop]).unwrap();
    let err = rig.navigator.execute_path(&route).unwrap_err();
    assert!(matches!(err, NavigationError::MissingEdge { .. }));
    assert!(rig.game.inputs().is_empty());
}

#[test]
fn retry_budget_comes_from_prefs() {
    let rig = demo_rig(|c| c.main);
    let prefs = NavigatorPrefs::from_toml_str("max_retry = 0\n").unwrap();
    let navigator = Navigator::new(rig.catalog.graph.clone(), rig.game.clone(), prefs);
    rig.game.ignore_next_inputs(1);

    let err = navigator.goto_page(rig.catalog.map).unwrap_err();
    assert!(matches!(err, NavigationError::RetriesExhausted { max_retry: 0, .. }));
    assert_eq!(rig.game.inputs(), vec![key("m")]);
}

const REACHABLE: [&str; 8] = [
    "main", "inventory", "crafting", "map", "shop", "handbook", "quests", "main",
];

fn page(catalog: &DemoCatalog, index: usize) -> pagenav::PageKey {
    catalog.key(REACHABLE[index % REACHABLE.len()]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn dropped_inputs_cost_one_attempt_each(
        from in 0usize..8,
        to in 0usize..8,
        drops in 0u32..4,
        max_retry in 0u32..3,
    ) {
        let rig = demo_rig(|c| page(c, from));
        let (from, to) = (page(&rig.catalog, from), page(&rig.catalog, to));
        let hops = plan_path(&rig.catalog.graph, from, to).unwrap().hops();
        prop_assume!(hops > 0);
        rig.game.ignore_next_inputs(drops);

        let result = rig.navigator.goto_page_with_retry(to, max_retry);
        let inputs = rig.game.inputs().len();

        prop_assert!(inputs <= (max_retry as usize + 1) * hops);
        if drops <= max_retry {
            prop_assert!(result.is_ok());
            prop_assert_eq!(inputs, drops as usize + hops);
            prop_assert_eq!(rig.game.current_page(), to);
        } else {
            let is_exhausted = matches!(result, Err(NavigationError::RetriesExhausted { .. }));
            prop_assert!(is_exhausted);
            prop_assert_eq!(inputs, max_retry as usize + 1);
        }
    }
}

#[test]
fn navigator_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Navigator>();
    assert_send_sync::<Arc<Navigator>>();
}
