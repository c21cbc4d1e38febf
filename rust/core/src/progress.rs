// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch loading progress.

use serde::Serialize;

/// Completed and total fragment counts for one batch.
///
/// `current` never exceeds `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadingProgress {
    pub current: usize,
    pub total: usize,
}

impl LoadingProgress {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Count one more completed fragment. Saturates at `total`.
    pub fn advance(&mut self) {
        if self.current < self.total {
            self.current += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 * 100.0 / self.total as f64
        }
    }
}
