//! Environment overlay module.
//!
//! The `Environment` is a caller-supplied numeric overlay describing
//! ambient battle state not tied to any unit: global damage percentages,
//! enemy defense figures, and the runtime counts that drive dynamic and
//! ambush buffs. Every field is optional or neutral by default; the core
//! never interprets absent fields as anything but "no effect" (or, for
//! condition gates, "cannot check, treat as satisfied").

use crate::tag::EnemyKind;
use serde::{Deserialize, Serialize};

/// Ambient battle configuration supplied by the caller.
///
/// # Examples
///
/// ```rust
/// use squadstat::Environment;
///
/// let mut env = Environment::default();
/// env.enemy_defense = 400.0;
/// env.damage_dealt_percent = 20.0;
/// env.ally_count = Some(3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Flat attack added before percent bonuses (phase 1).
    pub flat_attack: f64,
    /// Global damage-dealt percentage (phase 4).
    pub damage_dealt_percent: f64,
    /// Global damage-taken percentage of the enemy (phase 4).
    pub damage_taken_percent: f64,
    /// Ambient attack-speed percentage, added to the unit's own.
    pub attack_speed_percent: f64,
    /// Ambient attack-gap reduction percentage, added to the unit's own.
    pub attack_gap_percent: f64,
    /// Enemy defense before debuffs (phase 3).
    pub enemy_defense: f64,
    /// Ambient flat enemy-defense debuff (phase 3).
    pub enemy_defense_debuff_flat: f64,
    /// Ambient percent enemy-defense debuff (phase 3, capped at 100).
    pub enemy_defense_debuff_percent: f64,
    /// Enemy HP percentage, available to future gates.
    pub enemy_hp_percent: Option<f64>,
    /// Multiplier applied for duplicate deployments of the same unit.
    pub duplicate_factor: Option<f64>,

    // Runtime counts for dynamic and ambush buffs.
    /// Number of allies deployed; drives "per ally" dynamic buffs.
    pub ally_count: Option<u32>,
    /// Number of enemies in range; drives "per enemy" dynamic buffs.
    pub enemy_count: Option<u32>,
    /// Current count of co-deployed copies for ambush stacking.
    pub ambush_count: Option<u32>,

    // Condition-gate context.
    /// Current giant stage of the unit being evaluated (1..=5).
    pub giant_stage: Option<u8>,
    /// Current HP percentage of the unit being evaluated.
    pub unit_hp_percent: Option<f64>,
    /// Kind of the enemy currently targeted.
    pub enemy_kind: Option<EnemyKind>,
    /// Fully-buffed range, set by the damage resolver for range gates.
    pub final_range: Option<f64>,
}

impl Environment {
    /// A neutral environment: no ambient buffs, no context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count used for a dynamic buff of the given runtime kind. Defaults
    /// to 1 when the environment count is zero or unset, so a dynamic
    /// buff never silently evaluates to "no effect" in previews.
    pub fn dynamic_count(&self, count: Option<u32>) -> u32 {
        match count {
            Some(n) if n > 0 => n,
            _ => 1,
        }
    }
}
