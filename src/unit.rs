//! Unit, squad and assembly module.
//!
//! A [`Unit`] is an immutable value object: the assembler builds it once
//! from raw text and base stats, and the aggregator and damage resolver
//! only ever read it, producing new result records.

use std::collections::HashMap;

use crate::buff::{Buff, BuffIdGen};
use crate::error::SquadError;
use crate::extract::Extractor;
use crate::stat::{BuffSource, Stat};
use crate::tag::{Element, UnitKind, WeaponClass};
use log::debug;
use serde::{Deserialize, Serialize};

/// Number of slots in a squad.
pub const SQUAD_SIZE: usize = 8;

/// Self-stacking descriptor for a unit whose power scales with the count
/// of co-deployed copies of itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbushStacking {
    /// Per-copy attack multiplier.
    pub multiplier: f64,
    /// Multiplicative stacking (`m^count`) versus additive
    /// (`1 + (m - 1) × count`).
    pub is_multiplicative: bool,
    /// Count used when the environment does not supply one.
    pub max_count: u32,
}

/// Range-to-attack conversion descriptor: the fully-buffed range value is
/// added to attack as a flat bonus, gated on an optional range threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeConversion {
    /// Minimum fully-buffed range for the conversion to apply. `None`
    /// means it always applies.
    pub threshold: Option<f64>,
}

/// A periodic boosted attack: once every `every` normal attacks, one hit
/// is replaced by a hit dealing `multiplier` times normal damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleBoost {
    pub every: u32,
    pub multiplier: f64,
}

/// An assembled unit.
///
/// Base stats default to 0 for every channel not present in the table.
/// The three buff lists carry provenance: the skill multiplier scales
/// passive buffs only, so the lists are kept separate rather than merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub weapon: WeaponClass,
    #[serde(default)]
    pub elements: Vec<Element>,
    pub kind: UnitKind,
    #[serde(default)]
    pub base_stats: HashMap<Stat, f64>,
    #[serde(default)]
    pub passive_buffs: Vec<Buff>,
    #[serde(default)]
    pub activated_buffs: Vec<Buff>,
    #[serde(default)]
    pub special_buffs: Vec<Buff>,
    #[serde(default)]
    pub ambush: Option<AmbushStacking>,
    #[serde(default)]
    pub range_conversion: Option<RangeConversion>,
    /// Hits per attack animation, default 1.
    #[serde(default = "default_hit_count")]
    pub hit_count: u32,
    #[serde(default)]
    pub ignores_defense: bool,
    #[serde(default)]
    pub special_attack: Option<CycleBoost>,
    #[serde(default)]
    pub activated_damage: Option<CycleBoost>,
}

fn default_hit_count() -> u32 {
    1
}

impl Unit {
    /// Base value of a stat channel; channels absent from the table are 0.
    pub fn base_stat(&self, stat: Stat) -> f64 {
        self.base_stats.get(&stat).copied().unwrap_or(0.0)
    }

    /// All buffs of the unit in provenance order: passive, activated,
    /// special.
    pub fn buffs(&self) -> impl Iterator<Item = &Buff> {
        self.passive_buffs
            .iter()
            .chain(self.activated_buffs.iter())
            .chain(self.special_buffs.iter())
    }
}

/// Raw material for assembly: base numbers plus the three ordered lists
/// of ability text lines, as produced by an external document extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawUnit {
    pub id: String,
    pub name: String,
    pub weapon: Option<WeaponClass>,
    pub elements: Vec<Element>,
    pub kind: Option<UnitKind>,
    pub base_stats: HashMap<Stat, f64>,
    pub passive_lines: Vec<String>,
    pub activated_lines: Vec<String>,
    pub special_lines: Vec<String>,
    pub ambush: Option<AmbushStacking>,
    pub range_conversion: Option<RangeConversion>,
    pub hit_count: Option<u32>,
    pub ignores_defense: bool,
    pub special_attack: Option<CycleBoost>,
    pub activated_damage: Option<CycleBoost>,
}

/// Assemble a unit from raw text and base stats.
///
/// Each line of each ability list runs through the extractor; the
/// resulting partial buffs are completed with ids from the caller's
/// generator and the provenance of their list.
///
/// # Examples
///
/// ```rust
/// use squadstat::unit::{assemble, RawUnit};
/// use squadstat::tag::WeaponClass;
/// use squadstat::{BuffIdGen, Extractor, Stat};
///
/// let raw = RawUnit {
///     id: "u1".to_string(),
///     name: "Knight".to_string(),
///     weapon: Some(WeaponClass::Sword),
///     base_stats: [(Stat::Attack, 100.0)].into_iter().collect(),
///     passive_lines: vec!["Attack +30%.".to_string()],
///     ..RawUnit::default()
/// };
/// let mut ids = BuffIdGen::new();
/// let unit = assemble(raw, &Extractor::new(), &mut ids);
/// assert_eq!(unit.passive_buffs.len(), 1);
/// assert_eq!(unit.base_stat(Stat::Attack), 100.0);
/// ```
pub fn assemble(raw: RawUnit, extractor: &Extractor, ids: &mut BuffIdGen) -> Unit {
    let mut extract_list = |lines: &[String], source: BuffSource| {
        let mut buffs = Vec::new();
        for line in lines {
            for partial in extractor.extract(line) {
                buffs.push(Buff::from_partial(ids.next_id(), source, partial));
            }
        }
        buffs
    };

    let passive_buffs = extract_list(&raw.passive_lines, BuffSource::Passive);
    let activated_buffs = extract_list(&raw.activated_lines, BuffSource::Activated);
    let special_buffs = extract_list(&raw.special_lines, BuffSource::Special);
    debug!(
        "assembled {}: {} passive, {} activated, {} special buffs",
        raw.id,
        passive_buffs.len(),
        activated_buffs.len(),
        special_buffs.len()
    );

    Unit {
        id: raw.id,
        name: raw.name,
        weapon: raw.weapon.unwrap_or(WeaponClass::Sword),
        elements: raw.elements,
        kind: raw.kind.unwrap_or(UnitKind::Ground),
        base_stats: raw.base_stats,
        passive_buffs,
        activated_buffs,
        special_buffs,
        ambush: raw.ambush,
        range_conversion: raw.range_conversion,
        hit_count: raw.hit_count.unwrap_or(1),
        ignores_defense: raw.ignores_defense,
        special_attack: raw.special_attack,
        activated_damage: raw.activated_damage,
    }
}

/// Fluent construction of units in code (tests, demos, formation buffs
/// added by callers). Assembly from raw text goes through [`assemble`].
#[derive(Debug, Clone)]
pub struct UnitBuilder {
    unit: Unit,
}

impl UnitBuilder {
    pub fn new(id: &str, name: &str, weapon: WeaponClass) -> Self {
        Self {
            unit: Unit {
                id: id.to_string(),
                name: name.to_string(),
                weapon,
                elements: Vec::new(),
                kind: UnitKind::Ground,
                base_stats: HashMap::new(),
                passive_buffs: Vec::new(),
                activated_buffs: Vec::new(),
                special_buffs: Vec::new(),
                ambush: None,
                range_conversion: None,
                hit_count: 1,
                ignores_defense: false,
                special_attack: None,
                activated_damage: None,
            },
        }
    }

    pub fn element(mut self, element: Element) -> Self {
        self.unit.elements.push(element);
        self
    }

    pub fn kind(mut self, kind: UnitKind) -> Self {
        self.unit.kind = kind;
        self
    }

    pub fn base_stat(mut self, stat: Stat, value: f64) -> Self {
        self.unit.base_stats.insert(stat, value);
        self
    }

    pub fn passive(mut self, buff: Buff) -> Self {
        self.unit.passive_buffs.push(buff);
        self
    }

    pub fn activated(mut self, buff: Buff) -> Self {
        self.unit.activated_buffs.push(buff);
        self
    }

    pub fn special(mut self, buff: Buff) -> Self {
        self.unit.special_buffs.push(buff);
        self
    }

    pub fn ambush(mut self, ambush: AmbushStacking) -> Self {
        self.unit.ambush = Some(ambush);
        self
    }

    pub fn range_conversion(mut self, conversion: RangeConversion) -> Self {
        self.unit.range_conversion = Some(conversion);
        self
    }

    pub fn hit_count(mut self, hits: u32) -> Self {
        self.unit.hit_count = hits;
        self
    }

    pub fn ignores_defense(mut self) -> Self {
        self.unit.ignores_defense = true;
        self
    }

    pub fn special_attack(mut self, boost: CycleBoost) -> Self {
        self.unit.special_attack = Some(boost);
        self
    }

    pub fn activated_damage(mut self, boost: CycleBoost) -> Self {
        self.unit.activated_damage = Some(boost);
        self
    }

    pub fn build(self) -> Unit {
        self.unit
    }
}

/// An ordered, fixed-size squad of unit-or-empty slots.
///
/// The aggregator does not deduplicate unit ids; `validate` is the
/// caller-facing check for squad-shape violations.
///
/// # Examples
///
/// ```rust
/// use squadstat::unit::{Squad, UnitBuilder};
/// use squadstat::tag::WeaponClass;
///
/// let mut squad = Squad::new();
/// squad.set(0, UnitBuilder::new("u1", "Knight", WeaponClass::Sword).build()).unwrap();
/// assert!(squad.get(0).is_some());
/// assert!(squad.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    slots: Vec<Option<Unit>>,
}

impl Squad {
    /// An empty squad of [`SQUAD_SIZE`] slots.
    pub fn new() -> Self {
        Self {
            slots: vec![None; SQUAD_SIZE],
        }
    }

    /// Place a unit in a slot, replacing any previous occupant.
    pub fn set(&mut self, slot: usize, unit: Unit) -> Result<(), SquadError> {
        let entry = self.slot_mut(slot)?;
        *entry = Some(unit);
        Ok(())
    }

    /// Empty a slot.
    pub fn clear(&mut self, slot: usize) -> Result<(), SquadError> {
        let entry = self.slot_mut(slot)?;
        *entry = None;
        Ok(())
    }

    /// The unit in a slot, if any. Out-of-range slots read as empty.
    pub fn get(&self, slot: usize) -> Option<&Unit> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Occupied slots in order, with their indices.
    pub fn units(&self) -> impl Iterator<Item = (usize, &Unit)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|unit| (i, unit)))
    }

    /// Check squad-shape invariants: no unit id in two slots.
    pub fn validate(&self) -> Result<(), SquadError> {
        let mut seen: Vec<&str> = Vec::new();
        for (_, unit) in self.units() {
            if seen.contains(&unit.id.as_str()) {
                return Err(SquadError::DuplicateUnit {
                    id: unit.id.clone(),
                });
            }
            seen.push(&unit.id);
        }
        Ok(())
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut Option<Unit>, SquadError> {
        let size = self.slots.len();
        self.slots
            .get_mut(slot)
            .ok_or(SquadError::SlotOutOfRange { slot, size })
    }
}

/// Persisted unit record: a strict superset of [`Unit`] carrying a save
/// timestamp. Decoding tolerates and ignores unknown extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedUnit {
    #[serde(flatten)]
    pub unit: Unit,
    /// Caller-supplied save timestamp, opaque to the core.
    #[serde(default)]
    pub saved_at: Option<String>,
}

impl SavedUnit {
    pub fn new(unit: Unit, saved_at: impl Into<String>) -> Self {
        Self {
            unit,
            saved_at: Some(saved_at.into()),
        }
    }

    /// Decode a persisted record, ignoring unknown fields.
    pub fn from_json(json: &str) -> Result<Self, SquadError> {
        serde_json::from_str(json).map_err(|e| SquadError::Persistence(e.to_string()))
    }

    /// Encode for persistence.
    pub fn to_json(&self) -> Result<String, SquadError> {
        serde_json::to_string(self).map_err(|e| SquadError::Persistence(e.to_string()))
    }
}
