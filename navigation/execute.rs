/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Route execution with per-step verification.

use pagenav_core::{PageAction, PageRoute};

use super::{NavigationError, Navigator};
use crate::diagnostics::{
    CHANNEL_NAV_STEP_PERFORMED, CHANNEL_NAV_STEP_VERIFICATION_FAILED, emit_message,
};

impl Navigator {
    /// Execute a route under the switch lock.
    ///
    /// The first step whose destination does not verify aborts the rest of the
    /// route; nothing is re-planned here.
    pub fn execute_path(&self, route: &PageRoute) -> Result<(), NavigationError> {
        let _guard = self.switch_lock.lock();
        self.run_route(route)
    }

    /// Caller holds the switch lock.
    pub(super) fn run_route(&self, route: &PageRoute) -> Result<(), NavigationError> {
        let graph = self.graph();
        let hops = route.hops();

        for (index, (from, to)) in route.steps().enumerate() {
            let action = graph
                .action(from, to)
                .ok_or_else(|| NavigationError::MissingEdge {
                    from: graph.name_of(from),
                    to: graph.name_of(to),
                })?;

            let to_name = graph.name_of(to);
            log::debug!("Page switch: {} -> {to_name} ({action})", graph.name_of(from));
            self.perform_action(action);
            emit_message(CHANNEL_NAV_STEP_PERFORMED, &to_name);

            self.oracle()
                .sleep(self.prefs().settle_delay(), "goto_page is waiting for page transition");
            self.wait_for_loading();

            if !self.verify_page(to) {
                log::warn!("Expected to be at {to_name}, but verification failed");
                emit_message(CHANNEL_NAV_STEP_VERIFICATION_FAILED, &to_name);
                return Err(NavigationError::StepVerification {
                    from: graph.name_of(from),
                    expected: to_name,
                    step: index + 1,
                    hops,
                });
            }
        }
        Ok(())
    }

    fn perform_action(&self, action: &PageAction) {
        match action {
            PageAction::Key(token) => self.oracle().perform_key(token),
            PageAction::Click(anchor) => self.oracle().perform_click(anchor),
        }
    }
}
