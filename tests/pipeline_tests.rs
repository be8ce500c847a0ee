use squadstat::tag::WeaponClass;
use squadstat::unit::{AmbushStacking, RawUnit, Squad, UnitBuilder};
use squadstat::*;

fn assemble_unit(id: &str, weapon: WeaponClass, attack: f64, passive: &str) -> Unit {
    let raw = RawUnit {
        id: id.to_string(),
        name: id.to_string(),
        weapon: Some(weapon),
        base_stats: [(Stat::Attack, attack)].into_iter().collect(),
        passive_lines: vec![passive.to_string()],
        ..RawUnit::default()
    };
    let mut ids = BuffIdGen::new();
    assemble(raw, &Extractor::new(), &mut ids)
}

/// Percent-max stacking end to end: +20% and +30% on the same stat
/// aggregate to the effect of +30% alone, not +50%.
#[test]
fn test_percent_max_through_pipeline() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 100.0, "Attack +20%. Attack +30%.");
    let mut squad = Squad::new();
    squad.set(0, unit).unwrap();

    let totals = aggregate(&squad, &Environment::default());
    // 100 + 100 × 0.30
    assert_eq!(totals["u1"][&Stat::Attack].value, 130.0);
}

/// Flat-sum stacking end to end: +50 and +30 on base 100 give 180.
#[test]
fn test_flat_sum_through_pipeline() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 100.0, "Attack +50. Attack +30.");
    let mut squad = Squad::new();
    squad.set(0, unit).unwrap();

    let totals = aggregate(&squad, &Environment::default());
    assert_eq!(totals["u1"][&Stat::Attack].value, 180.0);
}

/// An ally buff lands in the allied attribution bucket of the receiver.
#[test]
fn test_allied_attribution() {
    let support = assemble_unit("support", WeaponClass::Staff, 50.0, "Attack +40 for allies.");
    let carry = assemble_unit("carry", WeaponClass::Bow, 200.0, "No passive.");

    let mut squad = Squad::new();
    squad.set(0, support).unwrap();
    squad.set(1, carry).unwrap();

    let totals = aggregate(&squad, &Environment::default());
    let carry_attack = &totals["carry"][&Stat::Attack];
    assert_eq!(carry_attack.base, 200.0);
    assert_eq!(carry_attack.allied, 40.0);
    assert_eq!(carry_attack.own, 0.0);
    assert_eq!(carry_attack.value, 240.0);
}

/// Weapon-gated ally buffs apply only to matching squad members.
#[test]
fn test_weapon_gate_across_squad() {
    let banner = assemble_unit("banner", WeaponClass::Shield, 10.0, "Attack +20% for bow units.");
    let archer = assemble_unit("archer", WeaponClass::Bow, 100.0, "No passive.");
    let knight = assemble_unit("knight", WeaponClass::Sword, 100.0, "No passive.");

    let mut squad = Squad::new();
    squad.set(0, banner).unwrap();
    squad.set(1, archer).unwrap();
    squad.set(2, knight).unwrap();

    let totals = aggregate(&squad, &Environment::default());
    assert_eq!(totals["archer"][&Stat::Attack].value, 120.0);
    assert_eq!(totals["knight"][&Stat::Attack].value, 100.0);
}

/// Defense floor: enemy defense 2000 against attack 1000 deals exactly 1.
#[test]
fn test_defense_floor_end_to_end() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 1000.0, "No passive.");
    let mut env = Environment::default();
    env.enemy_defense = 2000.0;

    let result = resolve(&unit, &env);
    assert_eq!(result.damage_per_hit, 1.0);
    // The legacy calculation floors at 0 instead.
    assert_eq!(raw_defended_damage(result.boosted_attack, 2000.0), 0.0);
}

/// Ambush multiplicative stacking: 1.4² on the base attack at count 2.
#[test]
fn test_ambush_stacking_end_to_end() {
    let unit = UnitBuilder::new("u1", "Stalker", WeaponClass::Sword)
        .base_stat(Stat::Attack, 100.0)
        .ambush(AmbushStacking {
            multiplier: 1.4,
            is_multiplicative: true,
            max_count: 4,
        })
        .build();

    let mut env = Environment::default();
    env.ambush_count = Some(2);
    let result = resolve(&unit, &env);
    assert!((result.final_attack - 196.0).abs() < 1e-9);
}

/// DPS baseline: frame pair (19, 22), attack 1000, no buffs, defense 0.
#[test]
fn test_dps_baseline() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 1000.0, "No passive.");
    let result = resolve(&unit, &Environment::default());
    // 60 / (19 + 22) × 1000 ≈ 1463
    assert!((result.dps - 1463.0).abs() < 1.0);
}

/// A text-extracted attack-speed buff shortens attack frames in the
/// damage result.
#[test]
fn test_text_to_timing() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 1000.0, "Attack speed +100%.");
    let result = resolve(&unit, &Environment::default());
    assert_eq!(result.attack_frames, 9.5);
    assert!(result.dps > 1463.0);
}

/// Dynamic per-ally buffs read their count from the environment; the
/// count never defaults to zero.
#[test]
fn test_dynamic_buff_through_pipeline() {
    let unit = assemble_unit(
        "u1",
        WeaponClass::Sword,
        100.0,
        "Gains +10 attack per ally deployed.",
    );
    let mut squad = Squad::new();
    squad.set(0, unit).unwrap();

    let mut env = Environment::default();
    env.ally_count = Some(3);
    let totals = aggregate(&squad, &env);
    assert_eq!(totals["u1"][&Stat::Attack].value, 130.0);

    let totals = aggregate(&squad, &Environment::default());
    assert_eq!(totals["u1"][&Stat::Attack].value, 110.0);
}

/// The aggregator and resolver agree on a plain percent buff.
#[test]
fn test_aggregate_and_resolve_agree() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 1000.0, "Attack +50%.");
    let mut squad = Squad::new();
    squad.set(0, unit.clone()).unwrap();

    let totals = aggregate(&squad, &Environment::default());
    let result = resolve(&unit, &Environment::default());
    assert_eq!(totals["u1"][&Stat::Attack].value, result.final_attack);
}

/// Squad validation catches a duplicate unit id; the aggregator itself
/// does not deduplicate.
#[test]
fn test_squad_validation() {
    let a = assemble_unit("dup", WeaponClass::Sword, 100.0, "No passive.");
    let b = assemble_unit("dup", WeaponClass::Bow, 100.0, "No passive.");

    let mut squad = Squad::new();
    squad.set(0, a).unwrap();
    squad.set(5, b).unwrap();
    assert_eq!(
        squad.validate(),
        Err(SquadError::DuplicateUnit { id: "dup".to_string() })
    );
}

/// Persisted records survive a round trip and tolerate unknown fields.
#[test]
fn test_persistence_round_trip() {
    let unit = assemble_unit("u1", WeaponClass::Sword, 100.0, "Attack +30% for allies.");
    let saved = SavedUnit::new(unit, "2024-06-01T12:00:00Z");

    let mut value: serde_json::Value = serde_json::from_str(&saved.to_json().unwrap()).unwrap();
    value["editor_metadata"] = serde_json::json!({"pinned": true});

    let decoded = SavedUnit::from_json(&value.to_string()).unwrap();
    assert_eq!(decoded.unit, saved.unit);
    assert_eq!(decoded.saved_at, saved.saved_at);
}
