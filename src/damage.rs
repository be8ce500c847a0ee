//! Damage resolution module.
//!
//! Runs one unit through the five-phase damage formula against an
//! environment, then computes frame-based attack timing, DPS and blended
//! cycle DPS for periodic boosted attacks.
//!
//! The five phases are ordered and none may be skipped:
//!
//! 1. attack finalization (flat bonuses, range conversion, percent
//!    bonuses, duplicate and ambush factors);
//! 2. damage multiplier application;
//! 3. defense mitigation, with the minimum-damage floor of 1 applied at
//!    this boundary only;
//! 4. environmental damage-dealt/taken adjustment;
//! 5. multi-hit multiplication.
//!
//! Every function here is total over well-typed input; malformed numbers
//! (NaN, absurd counts) are a caller validation concern.

use crate::aggregate::{ambush_factor, buff_applies, effective_value, skill_multiplier_of};
use crate::env::Environment;
use crate::stat::{BuffMode, Stat};
use crate::tag::WeaponClass;
use crate::unit::{CycleBoost, Unit};
use log::debug;

/// Fixed `(attack_frames, gap_frames)` pair for a weapon class.
pub fn frame_pair(weapon: WeaponClass) -> (f64, f64) {
    match weapon {
        WeaponClass::Sword => (19.0, 22.0),
        WeaponClass::Spear => (23.0, 26.0),
        WeaponClass::Axe => (28.0, 33.0),
        WeaponClass::Bow => (25.0, 30.0),
        WeaponClass::Cannon => (40.0, 45.0),
        WeaponClass::Staff => (30.0, 36.0),
        WeaponClass::Shield => (26.0, 31.0),
    }
}

/// Full phase-by-phase damage breakdown. Complete enough to render every
/// phase without recomputation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DamageResult {
    // Phase 1.
    pub base_attack: f64,
    /// Ordinary flat bonuses (buffs plus environment flat attack).
    pub flat_bonus: f64,
    /// Flat bonus from range-to-attack conversion; reported separately so
    /// it is distinguishable from ordinary flat bonuses.
    pub range_converted_bonus: f64,
    /// Winning percent attack bonus (percentage points).
    pub percent_bonus: f64,
    pub duplicate_factor: f64,
    pub ambush_factor: f64,
    pub final_attack: f64,
    // Phase 2.
    pub damage_multiplier: f64,
    pub boosted_attack: f64,
    // Phase 3.
    pub effective_defense: f64,
    /// Damage of one hit after mitigation, floored at 1.
    pub damage_per_hit: f64,
    // Phase 4.
    pub adjusted_damage: f64,
    // Phase 5.
    pub hit_count: u32,
    /// Damage of one full attack (all hits).
    pub total_damage: f64,
    // Timing.
    pub final_range: f64,
    pub attack_frames: f64,
    pub gap_frames: f64,
    pub attacks_per_second: f64,
    pub dps: f64,
    /// Blended DPS of the special-attack cycle, when the unit has one.
    pub special_cycle_dps: Option<f64>,
    /// Blended DPS of the activated-ability-damage cycle, when configured.
    pub activated_cycle_dps: Option<f64>,
}

/// Per-channel components of a unit's own buffs, split the way the phase
/// formula consumes them.
#[derive(Debug, Default, Clone, Copy)]
struct ChannelParts {
    flat: f64,
    /// Winning percent-max magnitude.
    percent: f64,
    /// Summed percent reductions.
    reduction: f64,
}

fn channel_parts(unit: &Unit, stat: Stat, env: &Environment) -> ChannelParts {
    let skill_multiplier = skill_multiplier_of(unit);
    let mut parts = ChannelParts::default();
    for buff in unit.buffs() {
        if buff.stat != stat || !buff_applies(buff, 0, 0, unit, env) {
            continue;
        }
        let value = effective_value(buff, skill_multiplier, env);
        match buff.mode {
            BuffMode::FlatSum => parts.flat += value,
            BuffMode::PercentMax => {
                if value.abs() > parts.percent.abs() {
                    parts.percent = value;
                }
            }
            BuffMode::PercentReduction => parts.reduction += value,
            BuffMode::AbsoluteSet => {}
        }
    }
    parts
}

/// Historical defense calculation: damage floored at 0 rather than 1.
/// Kept alongside the phase-3 floor-of-1 path; the two are deliberately
/// not unified, since legacy comparison views still expect a 0 floor.
pub fn raw_defended_damage(attack: f64, defense: f64) -> f64 {
    (attack - defense).max(0.0)
}

/// Resolve one unit's damage output against an environment.
///
/// # Examples
///
/// ```rust
/// use squadstat::unit::UnitBuilder;
/// use squadstat::tag::WeaponClass;
/// use squadstat::{resolve, Environment, Stat};
///
/// let unit = UnitBuilder::new("u1", "Knight", WeaponClass::Sword)
///     .base_stat(Stat::Attack, 1000.0)
///     .build();
/// let result = resolve(&unit, &Environment::default());
/// assert_eq!(result.final_attack, 1000.0);
/// assert!((result.dps - 1463.41).abs() < 0.01);
/// ```
pub fn resolve(unit: &Unit, env: &Environment) -> DamageResult {
    // Range is finalized first so range-threshold gates and the
    // range-to-attack conversion see the fully-buffed value.
    let range_parts = channel_parts(unit, Stat::Range, env);
    let final_range = (unit.base_stat(Stat::Range) + range_parts.flat)
        * (1.0 + range_parts.percent / 100.0);
    let mut env = env.clone();
    if env.final_range.is_none() {
        env.final_range = Some(final_range);
    }

    // Phase 1: attack finalization.
    let base_attack = unit.base_stat(Stat::Attack);
    let attack_parts = channel_parts(unit, Stat::Attack, &env);
    let flat_bonus = attack_parts.flat + env.flat_attack;
    let range_converted_bonus = match unit.range_conversion {
        Some(conversion) if conversion.threshold.map_or(true, |t| final_range >= t) => final_range,
        _ => 0.0,
    };
    let duplicate_factor = env.duplicate_factor.unwrap_or(1.0);
    let ambush = ambush_factor(unit, &env);
    let final_attack = ((base_attack + flat_bonus + range_converted_bonus)
        * (1.0 + attack_parts.percent / 100.0)
        * duplicate_factor
        * ambush)
        .max(0.0);

    // Phase 2: general-purpose damage multipliers. Special-attack-scoped
    // multipliers are withheld here and applied only to the special
    // instance inside the cycle model.
    let damage_parts = channel_parts(unit, Stat::DamageDealt, &env);
    let damage_multiplier = 1.0 + damage_parts.percent / 100.0;
    let boosted_attack = final_attack * damage_multiplier;

    // Phase 3: defense mitigation, minimum-damage floor of 1.
    let effective_defense = effective_enemy_defense(unit, &env);
    let damage_per_hit = (boosted_attack - effective_defense).max(1.0);

    // Phase 4: environmental damage-dealt/taken adjustment.
    let adjusted_damage = damage_per_hit
        * (1.0 + env.damage_dealt_percent / 100.0)
        * (1.0 + env.damage_taken_percent / 100.0);

    // Phase 5: multi-hit multiplication.
    let hit_count = unit.hit_count.max(1);
    let total_damage = adjusted_damage * hit_count as f64;

    // Frame timing.
    let (base_attack_frames, base_gap_frames) = frame_pair(unit.weapon);
    let speed_parts = channel_parts(unit, Stat::AttackSpeed, &env);
    let gap_parts = channel_parts(unit, Stat::AttackGap, &env);
    let speed_percent = speed_parts.percent + env.attack_speed_percent;
    let gap_reduction = gap_parts.reduction + env.attack_gap_percent;
    let attack_frames = base_attack_frames / (1.0 + speed_percent / 100.0);
    let gap_frames = base_gap_frames * (1.0 - gap_reduction / 100.0);
    let attacks_per_second = 60.0 / (attack_frames + gap_frames);
    let dps = total_damage * attacks_per_second;

    let special_cycle_dps = unit.special_attack.map(|boost| {
        let scope = channel_parts(unit, Stat::SpecialDamage, &env);
        cycle_dps(unit, &env, boost, scope.percent, total_damage, attacks_per_second)
    });
    let activated_cycle_dps = unit.activated_damage.map(|boost| {
        let scope = channel_parts(unit, Stat::ActivatedDamage, &env);
        cycle_dps(unit, &env, boost, scope.percent, total_damage, attacks_per_second)
    });

    debug!(
        "resolved {}: attack {:.1} -> per-hit {:.1}, dps {:.1}",
        unit.id, final_attack, damage_per_hit, dps
    );

    DamageResult {
        base_attack,
        flat_bonus,
        range_converted_bonus,
        percent_bonus: attack_parts.percent,
        duplicate_factor,
        ambush_factor: ambush,
        final_attack,
        damage_multiplier,
        boosted_attack,
        effective_defense,
        damage_per_hit,
        adjusted_damage,
        hit_count,
        total_damage,
        final_range,
        attack_frames,
        gap_frames,
        attacks_per_second,
        dps,
        special_cycle_dps,
        activated_cycle_dps,
    }
}

/// Enemy defense after debuffs: flat debuffs first (floor 0), then
/// percent debuffs capped at 100% (floor 0). A defense-ignore flag zeroes
/// it outright.
fn effective_enemy_defense(unit: &Unit, env: &Environment) -> f64 {
    if unit.ignores_defense {
        return 0.0;
    }
    let parts = channel_parts(unit, Stat::EnemyDefense, env);
    // Buff values carry their natural sign: "enemy defense -20%" stores
    // -20, so the flat part subtracts and the percent part scales down.
    let after_flat = (env.enemy_defense - env.enemy_defense_debuff_flat + parts.flat).max(0.0);
    let percent_reduction = (env.enemy_defense_debuff_percent - parts.percent).clamp(0.0, 100.0);
    (after_flat * (1.0 - percent_reduction / 100.0)).max(0.0)
}

/// Blended DPS across one boosted-attack cycle: once every `boost.every`
/// attacks, the boosted hit substitutes for a normal hit rather than
/// adding on top of it.
fn cycle_dps(
    unit: &Unit,
    env: &Environment,
    boost: CycleBoost,
    scoped_percent: f64,
    normal_damage: f64,
    attacks_per_second: f64,
) -> f64 {
    let every = boost.every.max(1);
    // The scoped percent applies to the boosted instance only, before
    // mitigation: re-run phases 2-5 for that one hit.
    let boosted = boosted_instance_damage(unit, env, boost.multiplier, scoped_percent);
    let cycle_total = (every - 1) as f64 * normal_damage + boosted;
    let cycle_seconds = every as f64 / attacks_per_second;
    cycle_total / cycle_seconds
}

/// Phases 2-5 for one boosted (special or activated) attack instance.
fn boosted_instance_damage(
    unit: &Unit,
    env: &Environment,
    multiplier: f64,
    scoped_percent: f64,
) -> f64 {
    let range_parts = channel_parts(unit, Stat::Range, env);
    let final_range = (unit.base_stat(Stat::Range) + range_parts.flat)
        * (1.0 + range_parts.percent / 100.0);
    let attack_parts = channel_parts(unit, Stat::Attack, env);
    let range_converted_bonus = match unit.range_conversion {
        Some(conversion) if conversion.threshold.map_or(true, |t| final_range >= t) => final_range,
        _ => 0.0,
    };
    let final_attack = ((unit.base_stat(Stat::Attack) + attack_parts.flat + env.flat_attack
        + range_converted_bonus)
        * (1.0 + attack_parts.percent / 100.0)
        * env.duplicate_factor.unwrap_or(1.0)
        * ambush_factor(unit, env))
    .max(0.0);

    let damage_parts = channel_parts(unit, Stat::DamageDealt, env);
    let boosted_attack = final_attack
        * (1.0 + damage_parts.percent / 100.0)
        * (1.0 + scoped_percent / 100.0)
        * multiplier;
    let damage_per_hit = (boosted_attack - effective_enemy_defense(unit, env)).max(1.0);
    damage_per_hit
        * (1.0 + env.damage_dealt_percent / 100.0)
        * (1.0 + env.damage_taken_percent / 100.0)
        * unit.hit_count.max(1) as f64
}
