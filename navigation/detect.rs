/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Current-page detection. None of these take the switch lock.

use pagenav_core::PageKey;

use super::{NavigationError, Navigator};
use crate::diagnostics::{
    CHANNEL_NAV_DETECT_UNRECOGNIZED, CHANNEL_NAV_LOADING_WAITED, DiagnosticEvent, emit_event,
};

impl Navigator {
    /// First matching page: titled pages by a single title read, then anchored
    /// pages in catalog order.
    pub fn get_current_page(&self) -> Result<PageKey, NavigationError> {
        let graph = self.graph();
        let oracle = self.oracle();

        if graph.has_titled_pages() {
            let title_text = oracle.read_title_text(graph.title_region());
            let titled = graph.detection_order().iter().copied().find(|key| {
                graph
                    .page(*key)
                    .and_then(|page| page.title())
                    .is_some_and(|title| title == title_text)
            });
            if let Some(key) = titled {
                return Ok(key);
            }
        }

        let anchored = graph.detection_order().iter().copied().find(|key| {
            graph.page(*key).is_some_and(|page| {
                !page.is_titled()
                    && page
                        .check_anchors()
                        .iter()
                        .any(|anchor| oracle.detect_anchor(anchor))
            })
        });

        anchored.ok_or_else(|| {
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_NAV_DETECT_UNRECOGNIZED,
                byte_len: 0,
            });
            NavigationError::PageNotRecognized
        })
    }

    /// Side-effect free predicate check.
    pub fn verify_page(&self, page: PageKey) -> bool {
        self.graph().is_current(page, self.oracle())
    }

    pub fn is_valid_page(&self) -> bool {
        self.get_current_page().is_ok()
    }

    /// Blocks while the loading sentinel is on screen. Unbounded: load times
    /// belong to the game. Returns the number of polls.
    pub(crate) fn wait_for_loading(&self) -> u32 {
        let loading = self.graph().loading();
        let interval = self.prefs().loading_poll_interval();
        let mut polls: u32 = 0;
        while self.verify_page(loading) {
            self.oracle().sleep(interval, "game is loading...");
            polls = polls.saturating_add(1);
        }
        if polls > 0 {
            emit_event(DiagnosticEvent::MessageReceived {
                channel_id: CHANNEL_NAV_LOADING_WAITED,
                latency_us: interval.as_micros() as u64 * u64::from(polls),
            });
        }
        polls
    }
}
