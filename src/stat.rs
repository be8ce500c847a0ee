//! Stat taxonomy module.
//!
//! Provides the closed `Stat` enumeration naming every numeric channel a
//! buff can affect, plus the `BuffMode`, `BuffSource` and `BuffTarget`
//! classifications that govern stacking, provenance rules and target
//! resolution.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A numeric channel a buff can affect.
///
/// The enumeration is closed: the engine never invents stat names at
/// runtime. Channels split into three groups:
///
/// - primary own stats (`Attack`, `Defense`, `Hp`, ...),
/// - derived/meta stats (`AttackSpeed`, `TargetCount`, `SkillMultiplier`, ...),
/// - enemy-facing debuff channels (`EnemyAttack`, `EnemyDefense`, ...).
///
/// Enemy-facing channels are semantically debuffs applied to the opposing
/// side and are never conflated with the unit's own stats; use
/// [`Stat::is_enemy_facing`] to tell them apart.
///
/// # Examples
///
/// ```rust
/// use squadstat::Stat;
/// use strum::IntoEnumIterator;
///
/// assert!(Stat::EnemyDefense.is_enemy_facing());
/// assert!(!Stat::Defense.is_enemy_facing());
/// assert!(Stat::iter().count() >= 40);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Stat {
    // Primary own stats.
    Attack,
    Defense,
    Hp,
    Range,
    Recovery,
    Cost,
    Movement,

    // Derived and meta stats.
    AttackSpeed,
    AttackGap,
    AttackCount,
    TargetCount,
    CritRate,
    CritDamage,
    Accuracy,
    DamageDealt,
    DamageTaken,
    SpecialDamage,
    ActivatedDamage,
    RecastTime,
    SummonTime,
    Knockback,
    ShieldStrength,
    HealPower,
    SkillMultiplier,
    GiantStageSpeed,
    DeployCount,
    ExperienceGain,
    GoldGain,

    // Enemy-facing debuff channels.
    EnemyAttack,
    EnemyDefense,
    EnemyMovement,
    EnemyAttackSpeed,
    EnemyRange,
    EnemyHp,
    EnemyRecovery,
    EnemyDamageDealt,
    EnemyCritRate,
    EnemyTargetCount,
    EnemyKnockback,
    EnemyAccuracy,
}

impl Stat {
    /// True for debuff channels applied to the opposing side.
    pub fn is_enemy_facing(self) -> bool {
        matches!(
            self,
            Stat::EnemyAttack
                | Stat::EnemyDefense
                | Stat::EnemyMovement
                | Stat::EnemyAttackSpeed
                | Stat::EnemyRange
                | Stat::EnemyHp
                | Stat::EnemyRecovery
                | Stat::EnemyDamageDealt
                | Stat::EnemyCritRate
                | Stat::EnemyTargetCount
                | Stat::EnemyKnockback
                | Stat::EnemyAccuracy
        )
    }
}

/// Stacking rule family for buffs on the same stat.
///
/// The mode decides how multiple buffs affecting the same `(unit, stat)`
/// pair combine during aggregation:
///
/// - `PercentMax`: only the single highest-magnitude percent buff counts;
///   a higher one *replaces* (never adds to) the previous winner.
/// - `FlatSum`: every applicable value is summed unconditionally.
/// - `PercentReduction`: subtracted as `base × value / 100`; stacks
///   additively across sources (used for recast-time style reductions
///   that do not participate in the max rule).
/// - `AbsoluteSet`: overwrites the stat to the buff's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffMode {
    PercentMax,
    FlatSum,
    PercentReduction,
    AbsoluteSet,
}

/// Provenance of a buff.
///
/// Provenance gates provenance-sensitive rules: the per-unit skill
/// multiplier scales only `Passive`-sourced buffs, never `Activated` or
/// `Special` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffSource {
    /// From the unit's own passive ability text.
    Passive,
    /// Granted by an allied unit.
    AllyGranted,
    /// From an activated (strategy) ability.
    Activated,
    /// From squad formation bonuses.
    Formation,
    /// From the unit's special ability text.
    Special,
}

/// Target selector deciding which squad members receive a buff.
///
/// Absent a spatial model, every selector except `SelfOnly` and
/// `AllExceptSelf` currently resolves to the whole squad; the collapse is
/// isolated in [`BuffTarget::includes`] so a future range model changes
/// only that function.
///
/// `AllExceptSelf` never appears in source text: it is produced by the
/// extractor when a self-scoped global effect multiplier forces a broad
/// buff to carry different magnitudes for self and for others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffTarget {
    SelfOnly,
    Ally,
    All,
    InRange,
    OutOfRange,
    Field,
    AllExceptSelf,
}

impl BuffTarget {
    /// Whether a buff owned by the unit in `source_slot` reaches the unit
    /// in `target_slot`.
    ///
    /// This is the single seam through which the (currently collapsed)
    /// spatial semantics flow.
    pub fn includes(self, source_slot: usize, target_slot: usize) -> bool {
        match self {
            BuffTarget::SelfOnly => source_slot == target_slot,
            BuffTarget::AllExceptSelf => source_slot != target_slot,
            // No spatial model yet: every remaining selector reaches the
            // whole squad.
            BuffTarget::Ally
            | BuffTarget::All
            | BuffTarget::InRange
            | BuffTarget::OutOfRange
            | BuffTarget::Field => true,
        }
    }

    /// True for selectors that reach units other than the owner.
    pub fn is_broad(self) -> bool {
        !matches!(self, BuffTarget::SelfOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stat_count_and_names() {
        assert_eq!(Stat::iter().count(), 40);
        assert_eq!(Stat::AttackSpeed.to_string(), "attack_speed");
        assert_eq!(Stat::EnemyDefense.to_string(), "enemy_defense");
    }

    #[test]
    fn test_enemy_facing_partition() {
        let enemy = Stat::iter().filter(|s| s.is_enemy_facing()).count();
        assert_eq!(enemy, 12);
        assert!(Stat::EnemyAttack.is_enemy_facing());
        assert!(!Stat::Attack.is_enemy_facing());
    }

    #[test]
    fn test_target_includes_self_only() {
        assert!(BuffTarget::SelfOnly.includes(2, 2));
        assert!(!BuffTarget::SelfOnly.includes(2, 3));
    }

    #[test]
    fn test_target_includes_all_except_self() {
        assert!(!BuffTarget::AllExceptSelf.includes(1, 1));
        assert!(BuffTarget::AllExceptSelf.includes(1, 4));
    }

    #[test]
    fn test_broad_selectors_reach_everyone() {
        for target in [
            BuffTarget::Ally,
            BuffTarget::All,
            BuffTarget::InRange,
            BuffTarget::OutOfRange,
            BuffTarget::Field,
        ] {
            assert!(target.includes(0, 0));
            assert!(target.includes(0, 7));
        }
    }
}
