//! Condition tag module.
//!
//! Condition tags are situational predicates gating a buff's
//! applicability: weapon class, elemental attribute, unit kind, HP
//! thresholds, giant-stage level, enemy type and ally count. The module
//! provides tag extraction from raw text, pure predicate evaluation, and
//! the display tier used by presentation layers.

use crate::env::Environment;
use crate::pattern::PhraseTemplate;
use crate::unit::Unit;
use log::trace;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Weapon class of a unit. Also keys the attack/gap frame table used by
/// the damage resolver.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum WeaponClass {
    Sword,
    Spear,
    Axe,
    Bow,
    Cannon,
    Staff,
    Shield,
}

/// Elemental attribute. A unit may carry more than one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Wind,
    Earth,
    Light,
    Dark,
}

/// Broad unit kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum UnitKind {
    Ground,
    Flying,
    Building,
}

/// Enemy classification used by enemy-gated tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum EnemyKind {
    Normal,
    Flying,
    Giant,
    Boss,
}

/// Display prominence tier for a tag, a pure function of its priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayLevel {
    Prominent,
    Normal,
    Subtle,
}

/// A situational predicate gating a buff.
///
/// Predicates fall into two families:
///
/// - intrinsic unit properties (weapon class, element, unit kind) —
///   always resolvable from the unit record alone;
/// - context-dependent thresholds (HP percentage, giant stage, enemy
///   type, ally count, final range) — when the required context value is
///   absent, evaluation returns `true`. The permissive default is a
///   deliberate preview-mode behavior: a buff whose gate cannot be
///   checked is treated as active rather than hidden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConditionTag {
    /// Unit must carry this weapon class.
    Weapon(WeaponClass),
    /// Unit must carry this elemental attribute.
    Element(Element),
    /// Unit must be of this kind.
    Kind(UnitKind),
    /// Unit HP percentage must be at or below the threshold.
    HpBelow(u32),
    /// Unit HP percentage must be at or above the threshold.
    HpAbove(u32),
    /// Giant stage must be at or above the given level.
    GiantStageAtLeast(u8),
    /// Giant stage must be at the maximum (5).
    MaxGiantStage,
    /// The current enemy must be of this kind.
    VsEnemy(EnemyKind),
    /// At least this many allies must be deployed.
    AllyCountAtLeast(u32),
    /// The unit's fully-buffed range must be at least this value.
    /// Evaluated by the damage resolver against the final range; in every
    /// other context it is gated on `Environment::final_range`.
    RangeAtLeast(u32),
}

/// The maximum giant stage; "per giant stage" scaling multiplies by this.
pub const MAX_GIANT_STAGE: u8 = 5;

impl ConditionTag {
    /// Evaluate this tag for a target unit under an optional environment.
    ///
    /// Intrinsic predicates read only the unit. Context-dependent
    /// predicates return `true` whenever the environment does not carry
    /// the value they need (permissive preview default).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use squadstat::{ConditionTag, Environment};
    /// use squadstat::tag::WeaponClass;
    /// use squadstat::unit::UnitBuilder;
    ///
    /// let unit = UnitBuilder::new("u1", "Knight", WeaponClass::Sword).build();
    /// let env = Environment::default();
    ///
    /// assert!(ConditionTag::Weapon(WeaponClass::Sword).evaluate(&unit, &env));
    /// assert!(!ConditionTag::Weapon(WeaponClass::Bow).evaluate(&unit, &env));
    /// // HP context absent: permissive.
    /// assert!(ConditionTag::HpBelow(50).evaluate(&unit, &env));
    /// ```
    pub fn evaluate(&self, unit: &Unit, env: &Environment) -> bool {
        match *self {
            ConditionTag::Weapon(class) => unit.weapon == class,
            ConditionTag::Element(element) => unit.elements.contains(&element),
            ConditionTag::Kind(kind) => unit.kind == kind,
            ConditionTag::HpBelow(pct) => match env.unit_hp_percent {
                Some(hp) => hp <= pct as f64,
                None => true,
            },
            ConditionTag::HpAbove(pct) => match env.unit_hp_percent {
                Some(hp) => hp >= pct as f64,
                None => true,
            },
            ConditionTag::GiantStageAtLeast(stage) => match env.giant_stage {
                Some(current) => current >= stage,
                None => true,
            },
            ConditionTag::MaxGiantStage => match env.giant_stage {
                Some(current) => current >= MAX_GIANT_STAGE,
                None => true,
            },
            ConditionTag::VsEnemy(kind) => match env.enemy_kind {
                Some(current) => current == kind,
                None => true,
            },
            ConditionTag::AllyCountAtLeast(n) => match env.ally_count {
                Some(count) => count >= n,
                None => true,
            },
            ConditionTag::RangeAtLeast(threshold) => match env.final_range {
                Some(range) => range >= threshold as f64,
                None => true,
            },
        }
    }

    /// Display priority of the tag. Higher sorts first in extraction
    /// output and maps to a more prominent display tier.
    pub fn priority(&self) -> u8 {
        match self {
            ConditionTag::MaxGiantStage => 90,
            ConditionTag::GiantStageAtLeast(_) => 85,
            ConditionTag::HpBelow(_) | ConditionTag::HpAbove(_) => 80,
            ConditionTag::VsEnemy(_) => 60,
            ConditionTag::Weapon(_) => 50,
            ConditionTag::Element(_) => 45,
            ConditionTag::Kind(_) => 40,
            ConditionTag::AllyCountAtLeast(_) => 30,
            ConditionTag::RangeAtLeast(_) => 20,
        }
    }

    /// Display tier, a pure function of the priority band. Consumed only
    /// by presentation layers.
    pub fn display_level(&self) -> DisplayLevel {
        match self.priority() {
            80..=u8::MAX => DisplayLevel::Prominent,
            40..=79 => DisplayLevel::Normal,
            _ => DisplayLevel::Subtle,
        }
    }

    /// Stable lowercase name used as the lexicographic tie-breaker when
    /// sorting extracted tags.
    pub fn name(&self) -> String {
        match self {
            ConditionTag::Weapon(w) => format!("weapon:{w}"),
            ConditionTag::Element(e) => format!("element:{e}"),
            ConditionTag::Kind(k) => format!("kind:{k}"),
            ConditionTag::HpBelow(p) => format!("hp_below:{p}"),
            ConditionTag::HpAbove(p) => format!("hp_above:{p}"),
            ConditionTag::GiantStageAtLeast(s) => format!("giant_stage_at_least:{s}"),
            ConditionTag::MaxGiantStage => "max_giant_stage".to_string(),
            ConditionTag::VsEnemy(k) => format!("vs_enemy:{k}"),
            ConditionTag::AllyCountAtLeast(n) => format!("ally_count_at_least:{n}"),
            ConditionTag::RangeAtLeast(r) => format!("range_at_least:{r}"),
        }
    }
}

/// Tag-table category. For `exclusive` rules at most one match per
/// category is kept, first by table priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagCategory {
    Weapon,
    Element,
    Kind,
    Hp,
    GiantStage,
    Enemy,
    AllyCount,
    Range,
}

/// One entry of the tag extraction table.
struct TagRule {
    priority: u8,
    exclusive: bool,
    category: TagCategory,
    template: PhraseTemplate,
    build: fn(&[f64]) -> ConditionTag,
}

impl TagRule {
    fn new(
        priority: u8,
        exclusive: bool,
        category: TagCategory,
        template: &str,
        build: fn(&[f64]) -> ConditionTag,
    ) -> Self {
        Self {
            priority,
            exclusive,
            category,
            template: PhraseTemplate::parse(template),
            build,
        }
    }
}

/// Phrases that look like conditions but describe timing or duration, not
/// applicability. They are removed before tag matching.
const TRIGGER_DURATION_PHRASES: &[&str] = &[
    "while the activated ability is active",
    "while activated",
    "for {num} seconds",
    "for a short time",
    "until the next attack",
];

fn tag_rules() -> Vec<TagRule> {
    use TagCategory as C;
    let mut rules = Vec::new();

    // Giant stage (exclusive per category, most specific first).
    rules.push(TagRule::new(90, true, C::GiantStage, "at max giant stage", |_| {
        ConditionTag::MaxGiantStage
    }));
    rules.push(TagRule::new(
        85,
        true,
        C::GiantStage,
        "at giant stage {num} or above",
        |n| ConditionTag::GiantStageAtLeast(n[0] as u8),
    ));

    // HP thresholds (exclusive: one HP gate per line).
    rules.push(TagRule::new(80, true, C::Hp, "while hp is below {num}%", |n| {
        ConditionTag::HpBelow(n[0] as u32)
    }));
    rules.push(TagRule::new(80, true, C::Hp, "while hp is above {num}%", |n| {
        ConditionTag::HpAbove(n[0] as u32)
    }));

    // Enemy gates (non-exclusive; "against flying giant enemies" keeps both).
    rules.push(TagRule::new(60, false, C::Enemy, "against flying enemies", |_| {
        ConditionTag::VsEnemy(EnemyKind::Flying)
    }));
    rules.push(TagRule::new(60, false, C::Enemy, "against giant enemies", |_| {
        ConditionTag::VsEnemy(EnemyKind::Giant)
    }));
    rules.push(TagRule::new(60, false, C::Enemy, "against boss enemies", |_| {
        ConditionTag::VsEnemy(EnemyKind::Boss)
    }));

    // Weapon classes (exclusive: a buff is scoped to one class).
    for class in [
        WeaponClass::Sword,
        WeaponClass::Spear,
        WeaponClass::Axe,
        WeaponClass::Bow,
        WeaponClass::Cannon,
        WeaponClass::Staff,
        WeaponClass::Shield,
    ] {
        let phrase = format!("for {class} units");
        let build: fn(&[f64]) -> ConditionTag = match class {
            WeaponClass::Sword => |_| ConditionTag::Weapon(WeaponClass::Sword),
            WeaponClass::Spear => |_| ConditionTag::Weapon(WeaponClass::Spear),
            WeaponClass::Axe => |_| ConditionTag::Weapon(WeaponClass::Axe),
            WeaponClass::Bow => |_| ConditionTag::Weapon(WeaponClass::Bow),
            WeaponClass::Cannon => |_| ConditionTag::Weapon(WeaponClass::Cannon),
            WeaponClass::Staff => |_| ConditionTag::Weapon(WeaponClass::Staff),
            WeaponClass::Shield => |_| ConditionTag::Weapon(WeaponClass::Shield),
        };
        rules.push(TagRule::new(50, true, C::Weapon, &phrase, build));
    }

    // Elements (non-exclusive: multi-element scoping is legal).
    for element in [
        Element::Fire,
        Element::Water,
        Element::Wind,
        Element::Earth,
        Element::Light,
        Element::Dark,
    ] {
        let phrase = format!("for {element} units");
        let build: fn(&[f64]) -> ConditionTag = match element {
            Element::Fire => |_| ConditionTag::Element(Element::Fire),
            Element::Water => |_| ConditionTag::Element(Element::Water),
            Element::Wind => |_| ConditionTag::Element(Element::Wind),
            Element::Earth => |_| ConditionTag::Element(Element::Earth),
            Element::Light => |_| ConditionTag::Element(Element::Light),
            Element::Dark => |_| ConditionTag::Element(Element::Dark),
        };
        rules.push(TagRule::new(45, false, C::Element, &phrase, build));
    }

    // Unit kinds (exclusive).
    rules.push(TagRule::new(40, true, C::Kind, "for flying units", |_| {
        ConditionTag::Kind(UnitKind::Flying)
    }));
    rules.push(TagRule::new(40, true, C::Kind, "for ground units", |_| {
        ConditionTag::Kind(UnitKind::Ground)
    }));
    rules.push(TagRule::new(40, true, C::Kind, "for building units", |_| {
        ConditionTag::Kind(UnitKind::Building)
    }));

    // Counts and range thresholds.
    rules.push(TagRule::new(
        30,
        true,
        C::AllyCount,
        "with {num} or more allies deployed",
        |n| ConditionTag::AllyCountAtLeast(n[0] as u32),
    ));
    rules.push(TagRule::new(20, true, C::Range, "when range is {num} or more", |n| {
        ConditionTag::RangeAtLeast(n[0] as u32)
    }));

    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
}

/// Extract the condition tags gating a description line.
///
/// Trigger and duration phrases are stripped first since they describe
/// timing, not eligibility. The rule table is then matched in descending
/// priority order; for exclusive rules at most one tag per category is
/// kept. The result is deduplicated and sorted by per-tag priority
/// descending, ties broken lexicographically on the tag name.
///
/// # Examples
///
/// ```rust
/// use squadstat::tag::{extract_tags, ConditionTag, WeaponClass};
///
/// let tags = extract_tags("Attack +20% for sword units while hp is below 30%.");
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags[0], ConditionTag::HpBelow(30));
/// assert_eq!(tags[1], ConditionTag::Weapon(WeaponClass::Sword));
/// ```
pub fn extract_tags(text: &str) -> Vec<ConditionTag> {
    let mut stripped = text.to_lowercase();
    for phrase in TRIGGER_DURATION_PHRASES {
        let template = PhraseTemplate::parse(phrase);
        for m in template.find_all(&stripped) {
            stripped.replace_range(m.start..m.end, &" ".repeat(m.end - m.start));
        }
    }

    let mut tags: Vec<ConditionTag> = Vec::new();
    let mut claimed_categories: Vec<TagCategory> = Vec::new();
    for rule in tag_rules() {
        if !rule.template.is_match(&stripped) {
            continue;
        }
        if rule.exclusive && claimed_categories.contains(&rule.category) {
            continue;
        }
        for m in rule.template.find_all(&stripped) {
            let tag = (rule.build)(&m.numbers);
            if !tags.contains(&tag) {
                trace!("tag matched: {}", tag.name());
                tags.push(tag);
            }
            if rule.exclusive {
                break;
            }
        }
        if rule.exclusive {
            claimed_categories.push(rule.category);
        }
    }

    tags.sort_by(|a, b| b.priority().cmp(&a.priority()).then_with(|| a.name().cmp(&b.name())));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitBuilder;

    #[test]
    fn test_extract_weapon_tag() {
        let tags = extract_tags("Attack +20% for spear units.");
        assert_eq!(tags, vec![ConditionTag::Weapon(WeaponClass::Spear)]);
    }

    #[test]
    fn test_exclusive_weapon_category_keeps_first() {
        // Two weapon scopes in one line: only the first by priority order
        // survives (both have priority 50; table order decides).
        let tags = extract_tags("Attack +20% for sword units and for bow units.");
        let weapons: Vec<_> = tags
            .iter()
            .filter(|t| matches!(t, ConditionTag::Weapon(_)))
            .collect();
        assert_eq!(weapons.len(), 1);
    }

    #[test]
    fn test_non_exclusive_elements_keep_all() {
        let tags = extract_tags("Defense +10% for fire units and for water units.");
        assert!(tags.contains(&ConditionTag::Element(Element::Fire)));
        assert!(tags.contains(&ConditionTag::Element(Element::Water)));
    }

    #[test]
    fn test_duration_phrase_is_not_a_gate() {
        let tags = extract_tags("Attack +30% for 10 seconds.");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_hp_threshold_capture() {
        let tags = extract_tags("Recovery +50% while hp is below 25%.");
        assert_eq!(tags, vec![ConditionTag::HpBelow(25)]);
    }

    #[test]
    fn test_sort_order_priority_then_name() {
        let tags = extract_tags(
            "Attack +10% for sword units against flying enemies at max giant stage.",
        );
        assert_eq!(tags[0], ConditionTag::MaxGiantStage);
        assert_eq!(tags[1], ConditionTag::VsEnemy(EnemyKind::Flying));
        assert_eq!(tags[2], ConditionTag::Weapon(WeaponClass::Sword));
    }

    #[test]
    fn test_evaluate_intrinsic() {
        let unit = UnitBuilder::new("u", "U", WeaponClass::Bow)
            .element(Element::Fire)
            .build();
        let env = Environment::default();
        assert!(ConditionTag::Weapon(WeaponClass::Bow).evaluate(&unit, &env));
        assert!(ConditionTag::Element(Element::Fire).evaluate(&unit, &env));
        assert!(!ConditionTag::Element(Element::Dark).evaluate(&unit, &env));
    }

    #[test]
    fn test_evaluate_context_gated() {
        let unit = UnitBuilder::new("u", "U", WeaponClass::Bow).build();
        let mut env = Environment::default();

        // Absent context: permissive.
        assert!(ConditionTag::HpBelow(50).evaluate(&unit, &env));
        assert!(ConditionTag::MaxGiantStage.evaluate(&unit, &env));

        env.unit_hp_percent = Some(80.0);
        assert!(!ConditionTag::HpBelow(50).evaluate(&unit, &env));
        assert!(ConditionTag::HpAbove(50).evaluate(&unit, &env));

        env.giant_stage = Some(3);
        assert!(!ConditionTag::MaxGiantStage.evaluate(&unit, &env));
        assert!(ConditionTag::GiantStageAtLeast(3).evaluate(&unit, &env));
    }

    #[test]
    fn test_display_levels() {
        assert_eq!(ConditionTag::MaxGiantStage.display_level(), DisplayLevel::Prominent);
        assert_eq!(
            ConditionTag::Weapon(WeaponClass::Sword).display_level(),
            DisplayLevel::Normal
        );
        assert_eq!(ConditionTag::RangeAtLeast(300).display_level(), DisplayLevel::Subtle);
    }
}
