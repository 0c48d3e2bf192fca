//! Butterfly effects
//!
//! Successful deliveries are recorded per era. While any other era has a
//! success on record, the current level may sprout helper platforms, up to a
//! per-level cap.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::level::{EraId, Level};
use crate::tuning::ButterflyTuning;

/// What happened in the past
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    SuccessfulDelivery,
}

/// One recorded past outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub kind: EffectKind,
    pub source_era: EraId,
    /// Simulation tick of the outcome
    pub tick: u64,
    /// Wall-clock time of the outcome
    pub timestamp: Duration,
}

/// Append-only per-era outcome log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButterflyLedger {
    records: BTreeMap<EraId, Vec<EffectRecord>>,
}

impl ButterflyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed delivery in `era`
    pub fn record_success(&mut self, era: EraId, tick: u64, timestamp: Duration) {
        self.records.entry(era).or_default().push(EffectRecord {
            kind: EffectKind::SuccessfulDelivery,
            source_era: era,
            tick,
            timestamp,
        });
    }

    pub fn records(&self, era: EraId) -> &[EffectRecord] {
        self.records.get(&era).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn success_count(&self, era: EraId) -> usize {
        self.records(era)
            .iter()
            .filter(|r| r.kind == EffectKind::SuccessfulDelivery)
            .count()
    }

    /// Eras other than `current` with at least one success
    pub fn influencing_eras(&self, current: EraId) -> impl Iterator<Item = EraId> + '_ {
        self.records
            .iter()
            .filter(move |(era, records)| {
                **era != current
                    && records
                        .iter()
                        .any(|r| r.kind == EffectKind::SuccessfulDelivery)
            })
            .map(|(era, _)| *era)
    }

    /// Whether past successes elsewhere can reshape `current`
    pub fn influences(&self, current: EraId) -> bool {
        self.influencing_eras(current).next().is_some()
    }
}

/// Roll for a helper platform in `level`. Returns the platform if one was added.
pub fn apply_to_level<R: Rng>(
    ledger: &ButterflyLedger,
    level: &mut Level,
    tuning: &ButterflyTuning,
    rng: &mut R,
) -> Option<Rect> {
    if !ledger.influences(level.era()) {
        return None;
    }
    if level.effects().len() >= tuning.effect_cap {
        return None;
    }
    if !rng.random_bool(tuning.probability) {
        return None;
    }
    let pos = Vec2::new(
        rng.random_range(tuning.region_min.x..tuning.region_max.x),
        rng.random_range(tuning.region_min.y..tuning.region_max.y),
    );
    let rect = Rect::from_pos_size(pos, tuning.platform_size);
    level.add_helper_platform(rect);
    Some(rect)
}
