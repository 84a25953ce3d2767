/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{common::types::*, tracker::event::TrackerEvent};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FlyTo {
    pub lat: Latitude,
    pub lng: Longitude,
}

/// Driver the view is centred on. `fly_to` keeps the last known target after the driver
/// disappears from the mapping.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub driver_id: DriverId,
    pub fly_to: Option<FlyTo>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppliedChange {
    Upserted { position: DriverPosition },
    Removed { driver_id: DriverId },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub lat: Latitude,
    pub lng: Longitude,
    pub updated_at: Option<TimeStamp>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackerSnapshot {
    pub drivers: FxHashMap<DriverId, PositionView>,
    pub focus: Option<FocusState>,
}

#[derive(Debug, Default)]
pub struct TrackerState {
    positions: FxHashMap<DriverId, DriverPosition>,
    focus: Option<FocusState>,
}

impl TrackerState {
    /// Seeds the mapping from a bulk read. Entries already written by change events win.
    pub fn load(&mut self, positions: Vec<DriverPosition>) -> usize {
        let mut loaded = 0;
        for position in positions {
            self.positions
                .entry(position.driver_id.to_owned())
                .or_insert_with(|| {
                    loaded += 1;
                    position
                });
        }
        self.refresh_focus();
        loaded
    }

    /// Applies one decoded event. Last arrival wins; `updated_at` is carried, never compared.
    pub fn apply(&mut self, event: TrackerEvent) -> Option<AppliedChange> {
        match event {
            TrackerEvent::Upsert(position) => {
                self.positions
                    .insert(position.driver_id.to_owned(), position.to_owned());
                self.refresh_focus();
                Some(AppliedChange::Upserted { position })
            }
            TrackerEvent::Remove(driver_id) => self
                .positions
                .remove(&driver_id)
                .map(|_| AppliedChange::Removed { driver_id }),
            TrackerEvent::Ignore(_) => None,
        }
    }

    pub fn focus(&mut self, driver_id: DriverId) -> FocusState {
        let fly_to = self.positions.get(&driver_id).map(fly_to);
        let focus = FocusState { driver_id, fly_to };
        self.focus = Some(focus.to_owned());
        focus
    }

    pub fn focused(&self) -> Option<&FocusState> {
        self.focus.as_ref()
    }

    pub fn get(&self, driver_id: &DriverId) -> Option<&DriverPosition> {
        self.positions.get(driver_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            drivers: self
                .positions
                .iter()
                .map(|(driver_id, position)| {
                    (
                        driver_id.to_owned(),
                        PositionView {
                            lat: position.lat,
                            lng: position.lng,
                            updated_at: position.updated_at,
                        },
                    )
                })
                .collect(),
            focus: self.focus.to_owned(),
        }
    }

    fn refresh_focus(&mut self) {
        if let Some(focus) = self.focus.as_mut() {
            if let Some(position) = self.positions.get(&focus.driver_id) {
                focus.fly_to = Some(fly_to(position));
            }
        }
    }
}

fn fly_to(position: &DriverPosition) -> FlyTo {
    FlyTo {
        lat: position.lat,
        lng: position.lng,
    }
}
