/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recognition oracle implementations.
//!
//! Real screen capture and input injection live outside this crate; the
//! simulated game here drives the CLI and the test suites.

mod simulated;

pub use pagenav_core::RecognitionOracle;
pub use simulated::{DISMISS_KEY, SimulatedGame, SimulatedInput};
