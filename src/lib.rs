//! # squadstat - Squad Buff & Damage Rules Engine
//!
//! A rules engine for a tactical team-building game that provides:
//! - **Text extraction**: free-form ability descriptions become
//!   canonical numeric modifiers ("buffs")
//! - **Condition tags**: situational predicates gating buff
//!   applicability
//! - **Squad aggregation**: per-unit, per-stat totals across an
//!   eight-slot squad under game-specific stacking rules
//! - **Damage resolution**: a five-phase damage formula with
//!   frame-based DPS and blended cycle DPS
//!
//! ## Core Concepts
//!
//! ### Pipeline
//!
//! ```text
//! raw text → [Extractor] → [assemble] → Unit → [aggregate] / [resolve]
//! ```
//!
//! 1. The **extractor** turns each ability line into partial buffs
//!    (stat, stacking mode, normalized value, target, condition tags)
//! 2. The **assembler** completes them with ids and provenance
//!    (passive / activated / special) into an immutable [`Unit`]
//! 3. The **aggregator** and the **damage resolver** are independent
//!    consumers of the same unit record
//!
//! ### Key Properties
//!
//! - **Deterministic**: same input always yields the same output
//! - **Total**: extraction never fails; unrecognized text yields no
//!   buffs, and gates missing their context default to satisfied
//! - **Non-mutating**: aggregation and resolution produce new result
//!   records and can be re-run on every squad edit
//!
//! ## Example
//!
//! ```rust
//! use squadstat::tag::WeaponClass;
//! use squadstat::unit::{assemble, RawUnit, Squad};
//! use squadstat::{aggregate, resolve, BuffIdGen, Environment, Extractor, Stat};
//!
//! let raw = RawUnit {
//!     id: "knight".to_string(),
//!     name: "Knight".to_string(),
//!     weapon: Some(WeaponClass::Sword),
//!     base_stats: [(Stat::Attack, 1000.0)].into_iter().collect(),
//!     passive_lines: vec!["Attack +50% for allies.".to_string()],
//!     ..RawUnit::default()
//! };
//!
//! let mut ids = BuffIdGen::new();
//! let unit = assemble(raw, &Extractor::new(), &mut ids);
//!
//! let mut squad = Squad::new();
//! squad.set(0, unit.clone()).unwrap();
//!
//! let totals = aggregate(&squad, &Environment::default());
//! assert_eq!(totals["knight"][&Stat::Attack].value, 1500.0);
//!
//! let damage = resolve(&unit, &Environment::default());
//! assert_eq!(damage.final_attack, 1500.0);
//! ```
//!
//! ## Modules
//!
//! - [`pattern`] - Phrase templates with numeric capture
//! - [`stat`] - Stat channels, stacking modes, targets, provenance
//! - [`tag`] - Condition tag taxonomy, extraction and evaluation
//! - [`buff`] - Buff records and id generation
//! - [`extract`] - The pattern-matching extractor
//! - [`unit`] - Units, assembly, squads and persistence records
//! - [`env`] - Caller-supplied environment overlay
//! - [`aggregate`] - Squad-wide stacking and attribution
//! - [`damage`] - Five-phase damage resolution and cycle DPS
//! - [`error`] - Validation and persistence errors

pub mod aggregate;
pub mod buff;
pub mod damage;
pub mod env;
pub mod error;
pub mod extract;
pub mod pattern;
pub mod stat;
pub mod tag;
pub mod unit;

pub use aggregate::{aggregate, ambush_factor, skill_multiplier_of, PerStatResult, StatBreakdown};
pub use buff::{Buff, BuffId, BuffIdGen, DynamicKind, DynamicScaling, PartialBuff};
pub use damage::{frame_pair, raw_defended_damage, resolve, DamageResult};
pub use env::Environment;
pub use error::SquadError;
pub use extract::Extractor;
pub use stat::{BuffMode, BuffSource, BuffTarget, Stat};
pub use tag::{ConditionTag, DisplayLevel};
pub use unit::{assemble, RawUnit, SavedUnit, Squad, Unit, UnitBuilder, SQUAD_SIZE};
