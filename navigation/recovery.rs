/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Out-of-band return to the main page, used when detection fails.

use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use pagenav_core::{PageGraph, RecognitionOracle};

use crate::prefs::RecoveryPrefs;

/// Drives the game back toward the main page without consulting the graph's
/// links. Returns whether main was verified afterwards; the engine assumes
/// main either way.
pub trait MainPageRecovery: Send + Sync {
    fn recover(&self, graph: &PageGraph, oracle: &dyn RecognitionOracle) -> bool;
}

/// Presses a dismiss key until the main page shows, backing off between presses.
#[derive(Debug, Clone)]
pub struct EscapeRecovery {
    key: String,
    max_presses: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl EscapeRecovery {
    pub fn from_prefs(prefs: &RecoveryPrefs) -> Self {
        Self {
            key: prefs.key.clone(),
            max_presses: prefs.max_presses,
            min_delay: prefs.min_delay(),
            max_delay: prefs.max_delay(),
        }
    }

    fn press_delays(&self) -> impl Iterator<Item = Duration> {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_presses as usize)
            .build()
    }
}

impl Default for EscapeRecovery {
    fn default() -> Self {
        Self::from_prefs(&RecoveryPrefs::default())
    }
}

impl MainPageRecovery for EscapeRecovery {
    fn recover(&self, graph: &PageGraph, oracle: &dyn RecognitionOracle) -> bool {
        let main = graph.main();
        if graph.is_current(main, oracle) {
            return true;
        }

        let mut delays = self.press_delays();
        for press in 1..=self.max_presses {
            oracle.perform_key(&self.key);
            let delay = delays.next().unwrap_or(self.max_delay);
            oracle.sleep(delay, "recovery is waiting for the main page");
            if graph.is_current(main, oracle) {
                log::debug!("Main page reached after {press} '{}' presses", self.key);
                return true;
            }
        }

        log::warn!(
            "Main page still not detected after {} '{}' presses",
            self.max_presses,
            self.key
        );
        false
    }
}
