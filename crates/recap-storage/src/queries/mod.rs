// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each function takes a [`Database`](crate::Database)
//! and runs its statements inside one `call` closure.

use chrono::{DateTime, Utc};

pub mod groups;
pub mod messages;

/// Stored timestamp format: RFC 3339 UTC with millisecond precision.
///
/// Fixed width, so lexicographic order equals chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_have_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(format_timestamp(at), "2026-03-01T09:05:07.000Z");
    }
}
