// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An injectable clock, so expiry logic can be tested without sleeping.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::{DateTime, TimeZone, Utc};

    use super::Clock;

    /// A clock the tests can wind forward without waiting, grounded the
    /// same way the rest of this workspace injects a clock+rng pair into
    /// handlers rather than reaching for `Utc::now()` inline.
    pub struct MockClock {
        now: AtomicI64,
    }

    impl MockClock {
        #[must_use]
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: AtomicI64::new(start.timestamp()),
            }
        }

        pub fn advance(&self, seconds: i64) {
            self.now.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(self.now.load(Ordering::SeqCst), 0).unwrap()
        }
    }
}
