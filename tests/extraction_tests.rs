use squadstat::tag::{ConditionTag, EnemyKind, WeaponClass};
use squadstat::*;

fn extract(text: &str) -> Vec<PartialBuff> {
    Extractor::new().extract(text)
}

/// Test the full extraction of a realistic multi-sentence passive.
#[test]
fn test_multi_sentence_passive() {
    let buffs = extract(
        "Attack +30% for sword units. Defense +50 for allies. Deals x1.4 damage against boss enemies.",
    );
    assert_eq!(buffs.len(), 3);

    let attack = buffs.iter().find(|b| b.stat == Stat::Attack).unwrap();
    assert_eq!(attack.mode, BuffMode::PercentMax);
    assert_eq!(attack.value, 30.0);
    assert_eq!(attack.condition_tags, vec![ConditionTag::Weapon(WeaponClass::Sword)]);

    let defense = buffs.iter().find(|b| b.stat == Stat::Defense).unwrap();
    assert_eq!(defense.mode, BuffMode::FlatSum);
    assert_eq!(defense.value, 50.0);
    assert_eq!(defense.target, BuffTarget::Ally);

    // x1.4 normalized to +40 percentage points.
    let damage = buffs.iter().find(|b| b.stat == Stat::DamageDealt).unwrap();
    assert_eq!(damage.value, 40.0);
    assert_eq!(damage.condition_tags, vec![ConditionTag::VsEnemy(EnemyKind::Boss)]);
}

/// Scope propagation: only clauses after the "per giant stage" trigger
/// are scaled by 5, even with no punctuation separating the clauses.
#[test]
fn test_giant_stage_scope_is_not_retroactive() {
    let buffs = extract(
        "Summons a burning blade and attack +20% per giant stage attack +10 and attack speed +10%.",
    );

    let percent = buffs
        .iter()
        .find(|b| b.stat == Stat::Attack && b.mode == BuffMode::PercentMax)
        .unwrap();
    assert_eq!(percent.value, 20.0);

    // +10 × 5 stages.
    let flat = buffs
        .iter()
        .find(|b| b.stat == Stat::Attack && b.mode == BuffMode::FlatSum)
        .unwrap();
    assert_eq!(flat.value, 50.0);

    let speed = buffs.iter().find(|b| b.stat == Stat::AttackSpeed).unwrap();
    assert_eq!(speed.value, 50.0);
}

/// A trigger-condition phrase closes an open giant-stage scope.
#[test]
fn test_trigger_phrase_closes_giant_scope() {
    let buffs = extract("Per giant stage, defense +5. On deployment, attack +30%.");
    let defense = buffs.iter().find(|b| b.stat == Stat::Defense).unwrap();
    assert_eq!(defense.value, 25.0);
    let attack = buffs.iter().find(|b| b.stat == Stat::Attack).unwrap();
    assert_eq!(attack.value, 30.0);
}

/// Re-running extraction on the same text yields an identical buff set.
#[test]
fn test_extraction_round_trip_idempotence() {
    let text = "Attack +25% for fire units. Per giant stage, range +20. \
                Enemy defense -15%. Effects x2 for self.";
    let first = extract(text);
    let second = extract(text);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

/// The self-scoped global multiplier splits a broad buff so that self and
/// allies receive different magnitudes from the same line.
#[test]
fn test_global_multiplier_self_split() {
    let buffs = extract("Attack +20% for allies. Effects x2 for self.");
    assert_eq!(buffs.len(), 2);

    let others = buffs
        .iter()
        .find(|b| b.target == BuffTarget::AllExceptSelf)
        .unwrap();
    assert_eq!(others.value, 20.0);

    let own = buffs.iter().find(|b| b.target == BuffTarget::SelfOnly).unwrap();
    assert_eq!(own.value, 40.0);
}

/// Specific phrasings exclude the generic fallback on the same span.
#[test]
fn test_specific_patterns_exclude_generic() {
    let buffs = extract("Damage dealt to special attacks +40%. Damage dealt +25%.");
    assert_eq!(buffs.len(), 2);
    assert!(buffs.iter().any(|b| b.stat == Stat::SpecialDamage && b.value == 40.0));
    assert!(buffs.iter().any(|b| b.stat == Stat::DamageDealt && b.value == 25.0));
}

/// Enemy-facing channels never leak into the unit's own stats.
#[test]
fn test_enemy_facing_channels_stay_separate() {
    let buffs = extract("Enemy defense -20% and defense +10%.");
    assert_eq!(buffs.len(), 2);

    let enemy = buffs.iter().find(|b| b.stat == Stat::EnemyDefense).unwrap();
    assert_eq!(enemy.value, -20.0);
    assert!(enemy.stat.is_enemy_facing());

    let own = buffs.iter().find(|b| b.stat == Stat::Defense).unwrap();
    assert_eq!(own.value, 10.0);
    assert!(!own.stat.is_enemy_facing());
}

/// A sentence may match the same pattern at several offsets and several
/// distinct patterns at once.
#[test]
fn test_unanchored_repeated_matching() {
    let buffs = extract("Attack +10, attack +20 and defense +5.");
    assert_eq!(buffs.len(), 3);
}

/// Unit assembly attaches provenance per ability list and fresh ids from
/// the caller's generator.
#[test]
fn test_assembly_provenance() {
    let raw = unit::RawUnit {
        id: "mage".to_string(),
        name: "Mage".to_string(),
        weapon: Some(WeaponClass::Staff),
        passive_lines: vec!["Attack +20%.".to_string()],
        activated_lines: vec!["Deals x2 damage.".to_string()],
        ..unit::RawUnit::default()
    };
    let mut ids = BuffIdGen::new();
    let unit = assemble(raw, &Extractor::new(), &mut ids);

    assert_eq!(unit.passive_buffs[0].source, BuffSource::Passive);
    assert_eq!(unit.activated_buffs[0].source, BuffSource::Activated);
    assert_ne!(unit.passive_buffs[0].id, unit.activated_buffs[0].id);

    // Two raw units assembled with independent generators reuse ids;
    // the generator, not a process-wide counter, owns allocation.
    let mut other_ids = BuffIdGen::new();
    assert_eq!(other_ids.next_id(), 0);
}
