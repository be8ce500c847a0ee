//! Basic example: Extracting buffs from ability text and resolving damage
//!
//! This example demonstrates:
//! - Assembling a unit from raw ability text
//! - Inspecting the extracted buffs
//! - Resolving the five-phase damage breakdown

use squadstat::tag::WeaponClass;
use squadstat::unit::RawUnit;
use squadstat::*;

fn main() {
    // Raw material: base numbers plus ability text, as a document
    // extractor would deliver them.
    let raw = RawUnit {
        id: "flame-knight".to_string(),
        name: "Flame Knight".to_string(),
        weapon: Some(WeaponClass::Sword),
        base_stats: [(Stat::Attack, 1200.0), (Stat::Range, 150.0)]
            .into_iter()
            .collect(),
        passive_lines: vec![
            "Attack +30% for sword units.".to_string(),
            "Per giant stage, attack +10.".to_string(),
        ],
        activated_lines: vec!["Deals x1.4 damage for 10 seconds.".to_string()],
        ..RawUnit::default()
    };

    let mut ids = BuffIdGen::new();
    let unit = assemble(raw, &Extractor::new(), &mut ids);

    println!("=== Extracted buffs ===\n");
    for buff in unit.buffs() {
        println!(
            "  [{}] {:?} {:?} {:+} (target {:?}, tags {:?})",
            buff.id, buff.stat, buff.mode, buff.value, buff.target, buff.condition_tags
        );
    }

    // Resolve damage against a defended enemy.
    let mut env = Environment::default();
    env.enemy_defense = 400.0;

    let result = resolve(&unit, &env);

    println!("\n=== Damage breakdown ===\n");
    println!("  Phase 1  final attack:   {:.1}", result.final_attack);
    println!("    flat bonus:            {:+.1}", result.flat_bonus);
    println!("    percent bonus:         {:+.1}%", result.percent_bonus);
    println!("  Phase 2  boosted attack: {:.1}", result.boosted_attack);
    println!("  Phase 3  per hit:        {:.1}", result.damage_per_hit);
    println!("  Phase 4  adjusted:       {:.1}", result.adjusted_damage);
    println!("  Phase 5  total:          {:.1}", result.total_damage);
    println!("\n  attacks per second:      {:.3}", result.attacks_per_second);
    println!("  dps:                     {:.1}", result.dps);
}
