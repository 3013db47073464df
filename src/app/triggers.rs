//! Action trigger sets and edge-triggered membership filtering.
//!
//! A [`TriggerSet`] is a bitmask over [`Condition`]s, one bit per variant
//! (see [`Condition::mask`]).  [`select`] picks the sensors that *just
//! entered* a member condition. A sensor sitting in `Dry` for ten cycles
//! fires once, on entry.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::MAX_SENSORS;
use crate::sensors::moisture::{Condition, MoistureSensor, SensorId};

/// Set of conditions that fire one action category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Condition, 5>", into = "Vec<Condition, 5>")]
pub struct TriggerSet(u8);

impl TriggerSet {
    pub const EMPTY: TriggerSet = TriggerSet(0);

    pub const fn of(conditions: &[Condition]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < conditions.len() {
            bits |= conditions[i].mask();
            i += 1;
        }
        Self(bits)
    }

    pub fn contains(self, condition: Condition) -> bool {
        self.0 & condition.mask() != 0
    }

    pub fn insert(&mut self, condition: Condition) {
        self.0 |= condition.mask();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Member conditions in discriminant order.
    pub fn iter(self) -> impl Iterator<Item = Condition> {
        Condition::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Vec<Condition, 5>> for TriggerSet {
    fn from(list: Vec<Condition, 5>) -> Self {
        Self::of(&list)
    }
}

impl From<TriggerSet> for Vec<Condition, 5> {
    fn from(set: TriggerSet) -> Self {
        set.iter().collect()
    }
}

/// How a sensor's first classification is treated by [`select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstReading {
    /// The move out of `Startup` is not a transition.
    #[default]
    Ignore,
    /// The first classification counts as entering that condition.
    Trigger,
}

/// Sensors whose current condition is in `set` and which just entered it,
/// in the hub's stable order.
pub fn select(
    sensors: &[MoistureSensor],
    set: TriggerSet,
    first: FirstReading,
) -> Vec<SensorId, MAX_SENSORS> {
    sensors
        .iter()
        .filter(|s| set.contains(s.current_condition()))
        .filter(|s| {
            s.did_change() || (first == FirstReading::Trigger && s.is_first_reading())
        })
        .map(MoistureSensor::id)
        .collect()
}
