/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use chrono::Duration;

/// Cut-off for "older than `minutes`": records created strictly before the returned instant qualify.
pub fn minutes_before(TimeStamp(now): TimeStamp, minutes: u32) -> TimeStamp {
    TimeStamp(now - Duration::minutes(i64::from(minutes)))
}

/// Whole minutes from `from` to `to`, floored.
pub fn elapsed_minutes(TimeStamp(from): TimeStamp, TimeStamp(to): TimeStamp) -> Minutes {
    Minutes((to - from).num_seconds().div_euclid(60))
}
