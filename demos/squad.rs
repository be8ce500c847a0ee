//! Squad example: Aggregating buffs across a full squad
//!
//! This example demonstrates:
//! - Building a squad of several units
//! - Squad-wide aggregation with own/allied attribution
//! - Condition-gated ally buffs

use squadstat::tag::WeaponClass;
use squadstat::unit::{RawUnit, Squad};
use squadstat::*;

fn make_unit(id: &str, weapon: WeaponClass, attack: f64, passive: &str, ids: &mut BuffIdGen) -> Unit {
    let raw = RawUnit {
        id: id.to_string(),
        name: id.to_string(),
        weapon: Some(weapon),
        base_stats: [(Stat::Attack, attack)].into_iter().collect(),
        passive_lines: vec![passive.to_string()],
        ..RawUnit::default()
    };
    assemble(raw, &Extractor::new(), ids)
}

fn main() -> Result<(), SquadError> {
    let extractor_ids = &mut BuffIdGen::new();

    let mut squad = Squad::new();
    squad.set(
        0,
        make_unit(
            "banner",
            WeaponClass::Shield,
            300.0,
            "Attack +20% for allies.",
            extractor_ids,
        ),
    )?;
    squad.set(
        1,
        make_unit(
            "archer",
            WeaponClass::Bow,
            900.0,
            "Attack +30%. Attack speed +25%.",
            extractor_ids,
        ),
    )?;
    squad.set(
        2,
        make_unit(
            "drummer",
            WeaponClass::Staff,
            100.0,
            "Attack +15% for bow units.",
            extractor_ids,
        ),
    )?;

    squad.validate()?;

    let mut env = Environment::default();
    env.ally_count = Some(3);

    let totals = aggregate(&squad, &env);

    println!("=== Squad attack totals ===\n");
    for (_, unit) in squad.units() {
        let attack = &totals[&unit.id][&Stat::Attack];
        println!(
            "  {:<8} base {:>6.1}  own {:>+7.1}  allied {:>+7.1}  => {:>7.1}",
            unit.id, attack.base, attack.own, attack.allied, attack.value
        );
    }

    // The archer keeps only the strongest percent buff: its own +30%
    // outranks both ally-granted percent buffs.
    let archer = &totals["archer"][&Stat::Attack];
    assert_eq!(archer.value, archer.base + archer.own + archer.allied);

    println!("\n=== Archer damage ===\n");
    let archer_unit = squad.get(1).expect("slot 1 occupied");
    let result = resolve(archer_unit, &env);
    println!("  final attack: {:.1}", result.final_attack);
    println!("  dps:          {:.1}", result.dps);

    Ok(())
}
