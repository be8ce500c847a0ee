//! Buff aggregation module.
//!
//! Given a squad, computes per unit and per stat channel the final
//! applied value under the stacking rules, with a breakdown attributing
//! contributions to the unit's own buffs versus allied buffs.
//!
//! The pass is `O(units × buffs × units)`: every buff of every occupied
//! slot is tested against every occupied slot for applicability. It never
//! mutates its inputs and is safe to re-run on every squad edit.

use std::collections::HashMap;

use crate::buff::{Buff, DynamicKind};
use crate::env::Environment;
use crate::stat::{BuffMode, BuffSource, Stat};
use crate::unit::{Squad, Unit};
use log::trace;

/// Final value of one stat channel with contribution attribution.
///
/// `value = base + own + allied` holds for every breakdown the
/// aggregator produces.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct StatBreakdown {
    pub base: f64,
    /// Contribution from the unit's own buffs.
    pub own: f64,
    /// Contribution from other squad members' buffs.
    pub allied: f64,
    pub value: f64,
}

impl StatBreakdown {
    fn new(base: f64) -> Self {
        Self {
            base,
            own: 0.0,
            allied: 0.0,
            value: base,
        }
    }
}

/// Per-stat results for one unit.
pub type PerStatResult = HashMap<Stat, StatBreakdown>;

/// Running percent-max state for one `(unit, stat)` channel: the single
/// highest-magnitude percent buff counted so far, with enough recorded to
/// roll its contribution back when a higher one replaces it.
struct PercentMaxState {
    magnitude: f64,
    contribution: f64,
    from_own: bool,
}

/// The skill multiplier of a unit: the value of its active absolute-set
/// buff on the skill-multiplier channel, defaulting to 1. Scales the
/// unit's passive-sourced buffs only.
pub fn skill_multiplier_of(unit: &Unit) -> f64 {
    unit.buffs()
        .filter(|b| b.is_active && b.stat == Stat::SkillMultiplier && b.mode == BuffMode::AbsoluteSet)
        .map(|b| b.value)
        .last()
        .unwrap_or(1.0)
}

/// Effective magnitude of a buff under the environment: the stored value
/// scaled by the owner's skill multiplier (passive buffs only) and by
/// dynamic runtime counts.
///
/// Flat dynamic buffs scale linearly with the count. Percent dynamic
/// buffs stack multiplicatively across instances:
/// `((1 + v/100)^count − 1) × 100`.
pub(crate) fn effective_value(buff: &Buff, skill_multiplier: f64, env: &Environment) -> f64 {
    let mut value = buff.value;
    if buff.source == BuffSource::Passive {
        value *= skill_multiplier;
    }
    if let Some(dynamic) = buff.dynamic {
        let count = match dynamic.kind {
            DynamicKind::PerAlly => env.dynamic_count(env.ally_count),
            DynamicKind::PerEnemy => env.dynamic_count(env.enemy_count),
        };
        value = match buff.mode {
            BuffMode::PercentMax => ((1.0 + value / 100.0).powi(count as i32) - 1.0) * 100.0,
            _ => value * count as f64,
        };
    }
    value
}

/// Whether a buff emitted by the unit in `source_slot` applies to the
/// unit in `target_slot`: every condition tag must hold for the target
/// unit, and the target selector must include the pair.
pub(crate) fn buff_applies(
    buff: &Buff,
    source_slot: usize,
    target_slot: usize,
    target: &Unit,
    env: &Environment,
) -> bool {
    buff.is_active
        && buff.target.includes(source_slot, target_slot)
        && buff.condition_tags.iter().all(|t| t.evaluate(target, env))
}

/// Ambush self-stacking factor for a unit (1 when the unit has no ambush
/// descriptor). The count defaults to the descriptor's configured maximum
/// when the environment does not supply one.
pub fn ambush_factor(unit: &Unit, env: &Environment) -> f64 {
    match unit.ambush {
        Some(ambush) => {
            let count = env.ambush_count.unwrap_or(ambush.max_count).max(1);
            if ambush.is_multiplicative {
                ambush.multiplier.powi(count as i32)
            } else {
                1.0 + (ambush.multiplier - 1.0) * count as f64
            }
        }
        None => 1.0,
    }
}

/// Aggregate all buffs across the squad.
///
/// The result maps unit id to the per-stat breakdowns for that unit.
/// Channels appear when the unit has a base entry for them or when at
/// least one applicable buff touches them.
///
/// # Examples
///
/// ```rust
/// use squadstat::unit::{Squad, UnitBuilder};
/// use squadstat::tag::WeaponClass;
/// use squadstat::{aggregate, Environment, Stat};
///
/// let mut squad = Squad::new();
/// squad.set(0, UnitBuilder::new("u1", "Knight", WeaponClass::Sword)
///     .base_stat(Stat::Attack, 100.0)
///     .build()).unwrap();
///
/// let result = aggregate(&squad, &Environment::default());
/// assert_eq!(result["u1"][&Stat::Attack].value, 100.0);
/// ```
pub fn aggregate(squad: &Squad, env: &Environment) -> HashMap<String, PerStatResult> {
    let mut result = HashMap::new();

    for (target_slot, target) in squad.units() {
        let mut stats: PerStatResult = target
            .base_stats
            .iter()
            .map(|(&stat, &base)| (stat, StatBreakdown::new(base)))
            .collect();
        let mut percent_max: HashMap<Stat, PercentMaxState> = HashMap::new();

        for (source_slot, source) in squad.units() {
            let skill_multiplier = skill_multiplier_of(source);
            for buff in source.buffs() {
                if buff.stat == Stat::SkillMultiplier {
                    continue;
                }
                if !buff_applies(buff, source_slot, target_slot, target, env) {
                    continue;
                }

                let value = effective_value(buff, skill_multiplier, env);
                let from_own = source_slot == target_slot;
                let entry = stats
                    .entry(buff.stat)
                    .or_insert_with(|| StatBreakdown::new(target.base_stat(buff.stat)));
                trace!(
                    "buff {} ({:?} {:+}) from slot {} onto {}",
                    buff.id,
                    buff.mode,
                    value,
                    source_slot,
                    target.id
                );

                match buff.mode {
                    BuffMode::FlatSum => {
                        entry.value += value;
                        bucket(entry, from_own, value);
                    }
                    BuffMode::PercentMax => {
                        let contribution = entry.base * value / 100.0;
                        let replaces = percent_max
                            .get(&buff.stat)
                            .map_or(true, |state| value.abs() > state.magnitude.abs());
                        if replaces {
                            // Replace, never add: roll the previous
                            // winner's contribution back out of the
                            // bucket that recorded it.
                            let prev = percent_max.insert(
                                buff.stat,
                                PercentMaxState {
                                    magnitude: value,
                                    contribution,
                                    from_own,
                                },
                            );
                            if let Some(prev) = prev {
                                entry.value -= prev.contribution;
                                bucket(entry, prev.from_own, -prev.contribution);
                            }
                            entry.value += contribution;
                            bucket(entry, from_own, contribution);
                        }
                    }
                    BuffMode::PercentReduction => {
                        let reduction = entry.base * value / 100.0;
                        entry.value -= reduction;
                        bucket(entry, from_own, -reduction);
                    }
                    BuffMode::AbsoluteSet => {
                        let delta = value - entry.value;
                        entry.value = value;
                        bucket(entry, from_own, delta);
                    }
                }
            }
        }

        result.insert(target.id.clone(), stats);
    }

    result
}

fn bucket(entry: &mut StatBreakdown, from_own: bool, delta: f64) {
    if from_own {
        entry.own += delta;
    } else {
        entry.allied += delta;
    }
}
