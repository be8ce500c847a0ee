//! Pattern-matching extraction module.
//!
//! Turns one raw ability description into zero or more canonical
//! [`PartialBuff`]s. Extraction never fails: text matching no rule
//! yields an empty list.
//!
//! The pipeline per description:
//!
//! 1. detect and strip a single optional global effect multiplier clause
//!    ("effects x2 for self");
//! 2. split into sentences, with an implicit split immediately before any
//!    "per giant stage" phrase;
//! 3. track the giant-stage scope flag across sentences ("per giant
//!    stage" sets it, a trigger-condition phrase clears it); while set,
//!    extracted values are multiplied by the stage count (5);
//! 4. run every rule of the ordered table against each sentence with
//!    unanchored repeated matching;
//! 5. normalize values (multiplier phrasing becomes percentage points);
//! 6. deduplicate identical extractions;
//! 7. apply the global multiplier, splitting broad buffs when the
//!    multiplier is self-scoped.
//!
//! Rules carry explicit numeric priorities: within one family (a group
//! of rules sharing vocabulary, like `attack` / `enemy attack` /
//! `attack speed`), a higher-priority match claims its text span and
//! blocks overlapping lower-priority matches, so specific phrasings
//! always win over the generic fallback for the same stat.

use crate::buff::{DynamicKind, DynamicScaling, PartialBuff};
use crate::pattern::PhraseTemplate;
use crate::stat::{BuffMode, BuffTarget, Stat};
use crate::tag::{extract_tags, MAX_GIANT_STAGE};
use log::debug;

/// Numeric normalization applied to a captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTransform {
    /// Use the captured value as-is.
    None,
    /// Convert a raw multiplier to percentage points:
    /// `(m - 1) × 100`, rounded to 2 decimals.
    MultiplierToPercent,
    /// Flip the sign; used for reduction channels where "-20%" in text
    /// means a reduction magnitude of 20.
    Negate,
}

/// One entry of the extraction rule table.
struct ExtractRule {
    /// Explicit rule priority; the table is sorted descending on
    /// construction, so insertion order carries no meaning.
    priority: u16,
    /// Vocabulary family for span-claim exclusion.
    family: &'static str,
    template: PhraseTemplate,
    stat: Stat,
    mode: BuffMode,
    transform: ValueTransform,
    /// Overrides sentence-level target inference (enemy-facing channels
    /// and self-scoped meta buffs).
    target_override: Option<BuffTarget>,
    dynamic: Option<DynamicKind>,
}

impl ExtractRule {
    fn new(
        priority: u16,
        family: &'static str,
        template: &str,
        stat: Stat,
        mode: BuffMode,
    ) -> Self {
        Self {
            priority,
            family,
            template: PhraseTemplate::parse(template),
            stat,
            mode,
            transform: ValueTransform::None,
            target_override: None,
            dynamic: None,
        }
    }

    fn transform(mut self, transform: ValueTransform) -> Self {
        self.transform = transform;
        self
    }

    fn target(mut self, target: BuffTarget) -> Self {
        self.target_override = Some(target);
        self
    }

    fn dynamic(mut self, kind: DynamicKind) -> Self {
        self.dynamic = Some(kind);
        self
    }
}

/// A detected global effect multiplier clause.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GlobalMultiplier {
    target: BuffTarget,
    factor: f64,
}

/// Phrases that open a new trigger condition and therefore close a
/// "per giant stage" scope.
const SCOPE_CLEARING_PHRASES: &[&str] = &[
    "at max giant stage",
    "on deployment",
    "on retreat",
    "on enemy defeat",
];

const GIANT_STAGE_PHRASE: &str = "per giant stage";

/// The pattern-matching extractor.
///
/// Construction compiles the full rule table; one extractor can be
/// reused across any number of descriptions. Extraction is deterministic
/// and idempotent: the same text always yields the same buffs.
///
/// # Examples
///
/// ```rust
/// use squadstat::{Extractor, Stat};
///
/// let extractor = Extractor::new();
/// let buffs = extractor.extract("Attack +30% for allies.");
/// assert_eq!(buffs.len(), 1);
/// assert_eq!(buffs[0].stat, Stat::Attack);
/// assert_eq!(buffs[0].value, 30.0);
///
/// assert!(extractor.extract("A proud unit with a long spear.").is_empty());
/// ```
pub struct Extractor {
    rules: Vec<ExtractRule>,
    giant_stage: PhraseTemplate,
    scope_clearers: Vec<PhraseTemplate>,
    global_multipliers: Vec<(PhraseTemplate, BuffTarget)>,
}

impl Extractor {
    /// Build an extractor with the full rule table.
    pub fn new() -> Self {
        Self {
            rules: rule_table(),
            giant_stage: PhraseTemplate::parse(GIANT_STAGE_PHRASE),
            scope_clearers: SCOPE_CLEARING_PHRASES
                .iter()
                .map(|p| PhraseTemplate::parse(p))
                .collect(),
            global_multipliers: vec![
                (
                    PhraseTemplate::parse("effects x{num} for self"),
                    BuffTarget::SelfOnly,
                ),
                (
                    PhraseTemplate::parse("effects x{num} for allies"),
                    BuffTarget::Ally,
                ),
                (
                    PhraseTemplate::parse("effects x{num} for all units"),
                    BuffTarget::All,
                ),
            ],
        }
    }

    /// Extract every buff from one description. Never fails; text
    /// matching no rule yields an empty vector.
    pub fn extract(&self, text: &str) -> Vec<PartialBuff> {
        let mut body = text.to_lowercase();
        let global = self.take_global_multiplier(&mut body);

        let mut buffs = Vec::new();
        // Scope flag: set by "per giant stage", cleared by a trigger
        // phrase, never applied retroactively to earlier sentences.
        let mut giant_scope = false;
        for sentence in split_sentences(&body) {
            if self.scope_clearers.iter().any(|t| t.is_match(&sentence)) {
                giant_scope = false;
            }
            if self.giant_stage.is_match(&sentence) {
                giant_scope = true;
            }
            self.extract_sentence(&sentence, giant_scope, &mut buffs);
        }

        dedup(&mut buffs);

        if let Some(global) = global {
            buffs = apply_global_multiplier(buffs, global);
        }
        buffs
    }

    /// Detect, record and strip a single global effect multiplier clause.
    fn take_global_multiplier(&self, body: &mut String) -> Option<GlobalMultiplier> {
        for (template, target) in &self.global_multipliers {
            if let Some(m) = template.find_all(body).into_iter().next() {
                let factor = m.numbers[0];
                body.replace_range(m.start..m.end, &" ".repeat(m.end - m.start));
                debug!("global effect multiplier x{factor} for {target:?}");
                return Some(GlobalMultiplier {
                    target: *target,
                    factor,
                });
            }
        }
        None
    }

    /// Run the rule table over one sentence.
    fn extract_sentence(&self, sentence: &str, giant_scope: bool, out: &mut Vec<PartialBuff>) {
        let inferred_target = infer_target(sentence);
        let tags = extract_tags(sentence);
        // Spans already claimed by a higher-priority rule, per family.
        let mut claimed: Vec<(&'static str, usize, usize)> = Vec::new();

        for rule in &self.rules {
            for m in rule.template.find_all(sentence) {
                let blocked = claimed.iter().any(|&(family, start, end)| {
                    family == rule.family && m.start < end && start < m.end
                });
                if blocked {
                    continue;
                }
                claimed.push((rule.family, m.start, m.end));

                let mut value = match rule.transform {
                    ValueTransform::None => m.numbers[0],
                    ValueTransform::MultiplierToPercent => round_to((m.numbers[0] - 1.0) * 100.0, 2),
                    ValueTransform::Negate => -m.numbers[0],
                };
                if giant_scope {
                    value = round_to(value * MAX_GIANT_STAGE as f64, 6);
                }

                debug!(
                    "rule p{} matched {:?} -> {} {:?} {}",
                    rule.priority, m.text, rule.stat, rule.mode, value
                );
                out.push(PartialBuff {
                    stat: rule.stat,
                    mode: rule.mode,
                    value,
                    target: rule.target_override.unwrap_or(inferred_target),
                    condition_tags: tags.clone(),
                    dynamic: rule.dynamic.map(|kind| DynamicScaling { kind }),
                    matched_text: m.text,
                });
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

/// Split a description into sentences.
///
/// Sentence terminators are `.`, `!` and `;`, except a `.` between two
/// digits (decimal point). An implicit split is inserted immediately
/// before any "per giant stage" phrase so that clauses preceding the
/// trigger are never scaled, even without terminating punctuation.
fn split_sentences(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut raw = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let decimal_point = b == b'.'
            && i > 0
            && i + 1 < bytes.len()
            && bytes[i - 1].is_ascii_digit()
            && bytes[i + 1].is_ascii_digit();
        if (b == b'.' || b == b'!' || b == b';') && !decimal_point {
            raw.push(&text[start..i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        raw.push(&text[start..]);
    }

    let giant = PhraseTemplate::parse(GIANT_STAGE_PHRASE);
    let mut sentences = Vec::new();
    for piece in raw {
        let mut rest = piece;
        // Implicit split before each "per giant stage" occurrence that is
        // not already at the start of the piece.
        loop {
            let matches = giant.find_all(rest);
            match matches.iter().find(|m| m.start > 0) {
                Some(m) => {
                    sentences.push(rest[..m.start].trim().to_string());
                    rest = &rest[m.start..];
                }
                None => break,
            }
        }
        let trimmed = rest.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Infer the target selector from sentence vocabulary. Rule overrides
/// (enemy-facing channels, self-scoped meta buffs) take precedence over
/// this inference.
fn infer_target(sentence: &str) -> BuffTarget {
    if sentence.contains("allies") || sentence.contains("allied") {
        BuffTarget::Ally
    } else if sentence.contains("all units") {
        BuffTarget::All
    } else if sentence.contains("units in range") {
        BuffTarget::InRange
    } else if sentence.contains("units out of range") {
        BuffTarget::OutOfRange
    } else if sentence.contains("on the field") {
        BuffTarget::Field
    } else if sentence.contains("units") {
        // Class-scoped phrasing ("for bow units"): squad-wide, gated by
        // the extracted condition tag rather than the selector.
        BuffTarget::All
    } else {
        BuffTarget::SelfOnly
    }
}

/// Drop identical `(stat, mode, value, target, matched_text)` tuples,
/// keeping first occurrences in order.
fn dedup(buffs: &mut Vec<PartialBuff>) {
    let mut seen = Vec::new();
    buffs.retain(|b| {
        let key = b.dedup_key();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

/// Apply a stripped global effect multiplier to the extracted buffs.
///
/// A buff whose target equals the multiplier's class is scaled in place.
/// When the multiplier is self-scoped but a buff is broader, the buff is
/// split: the original is retargeted to everyone except the owner, and a
/// scaled self-only copy is added, so self and others receive different
/// magnitudes from the same source line.
fn apply_global_multiplier(buffs: Vec<PartialBuff>, global: GlobalMultiplier) -> Vec<PartialBuff> {
    let mut out = Vec::with_capacity(buffs.len());
    for mut buff in buffs {
        if buff.target == global.target {
            buff.value = round_to(buff.value * global.factor, 2);
            out.push(buff);
        } else if global.target == BuffTarget::SelfOnly && buff.target.is_broad() {
            let mut own = buff.clone();
            own.target = BuffTarget::SelfOnly;
            own.value = round_to(own.value * global.factor, 2);
            buff.target = BuffTarget::AllExceptSelf;
            out.push(buff);
            out.push(own);
        } else {
            out.push(buff);
        }
    }
    out
}

/// The full extraction rule table, sorted by descending priority.
///
/// Priorities are data, not implementation order: new rules are inserted
/// with a deliberate priority relative to their family, and the sort
/// makes insertion position irrelevant.
fn rule_table() -> Vec<ExtractRule> {
    use BuffMode::{AbsoluteSet, FlatSum, PercentMax, PercentReduction};
    use DynamicKind::{PerAlly, PerEnemy};
    use ValueTransform::{MultiplierToPercent, Negate};

    let mut rules = vec![
        // Dynamic phrasings bind tighter than anything in their family.
        ExtractRule::new(910, "attack", "{num}% attack per ally deployed", Stat::Attack, PercentMax)
            .dynamic(PerAlly),
        ExtractRule::new(905, "attack", "{num} attack per ally deployed", Stat::Attack, FlatSum)
            .dynamic(PerAlly),
        ExtractRule::new(903, "attack", "{num}% attack per enemy in range", Stat::Attack, PercentMax)
            .dynamic(PerEnemy),
        ExtractRule::new(901, "attack", "{num} attack per enemy in range", Stat::Attack, FlatSum)
            .dynamic(PerEnemy),

        // Damage family: special-scoped and activated-scoped channels
        // outrank the generic "damage dealt" fallback and its short form.
        ExtractRule::new(
            900,
            "damage",
            "damage dealt to special attacks {num}%",
            Stat::SpecialDamage,
            PercentMax,
        ),
        ExtractRule::new(
            890,
            "damage",
            "activated ability damage {num}%",
            Stat::ActivatedDamage,
            PercentMax,
        ),
        ExtractRule::new(700, "damage", "damage dealt {num}%", Stat::DamageDealt, PercentMax),
        ExtractRule::new(690, "damage", "deals x{num} damage", Stat::DamageDealt, PercentMax)
            .transform(MultiplierToPercent),
        ExtractRule::new(650, "damage", "dmg {num}%", Stat::DamageDealt, PercentMax),
        ExtractRule::new(640, "damage", "damage taken {num}%", Stat::DamageTaken, PercentMax),

        // Attack family: enemy-facing and compound stats outrank the
        // bare "attack" fallbacks.
        ExtractRule::new(598, "attack", "enemy attack speed {num}%", Stat::EnemyAttackSpeed, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(596, "attack", "enemy attack {num}%", Stat::EnemyAttack, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(594, "attack", "enemy attack {num}", Stat::EnemyAttack, FlatSum)
            .target(BuffTarget::Field),
        ExtractRule::new(590, "attack", "attack speed {num}%", Stat::AttackSpeed, PercentMax),
        ExtractRule::new(585, "attack", "attack gap {num}%", Stat::AttackGap, PercentReduction)
            .transform(Negate),
        ExtractRule::new(580, "attack", "attack count {num}", Stat::AttackCount, FlatSum),
        ExtractRule::new(560, "attack", "attack {num}%", Stat::Attack, PercentMax),
        ExtractRule::new(550, "attack", "attack {num}", Stat::Attack, FlatSum),

        // Target count.
        ExtractRule::new(540, "target", "target count {num}", Stat::TargetCount, FlatSum),

        // Defense family.
        ExtractRule::new(500, "defense", "enemy defense {num}%", Stat::EnemyDefense, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(495, "defense", "enemy defense {num}", Stat::EnemyDefense, FlatSum)
            .target(BuffTarget::Field),
        ExtractRule::new(490, "defense", "defense {num}%", Stat::Defense, PercentMax),
        ExtractRule::new(485, "defense", "defense {num}", Stat::Defense, FlatSum),

        // HP family.
        ExtractRule::new(460, "hp", "enemy hp {num}%", Stat::EnemyHp, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(455, "hp", "hp {num}%", Stat::Hp, PercentMax),
        ExtractRule::new(450, "hp", "hp {num}", Stat::Hp, FlatSum),

        // Range family.
        ExtractRule::new(440, "range", "enemy range {num}%", Stat::EnemyRange, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(435, "range", "range {num}%", Stat::Range, PercentMax),
        ExtractRule::new(430, "range", "range {num}", Stat::Range, FlatSum),

        // Movement family.
        ExtractRule::new(420, "movement", "enemy movement {num}%", Stat::EnemyMovement, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(415, "movement", "movement {num}%", Stat::Movement, PercentMax),

        // Recovery family.
        ExtractRule::new(405, "recovery", "enemy recovery {num}%", Stat::EnemyRecovery, PercentMax)
            .target(BuffTarget::Field),
        ExtractRule::new(400, "recovery", "recovery {num}%", Stat::Recovery, PercentMax),
        ExtractRule::new(395, "recovery", "recovery {num}", Stat::Recovery, FlatSum),

        // Cost family (negative captures are discounts).
        ExtractRule::new(380, "cost", "cost {num}%", Stat::Cost, PercentMax),
        ExtractRule::new(375, "cost", "cost {num}", Stat::Cost, FlatSum),

        // Critical hits: rate adds percentage points, damage competes.
        ExtractRule::new(360, "crit", "critical rate {num}%", Stat::CritRate, FlatSum),
        ExtractRule::new(355, "crit", "critical damage {num}%", Stat::CritDamage, PercentMax),

        // Reduction channels: "-20%" in text is a reduction of 20.
        ExtractRule::new(340, "recast", "recast time {num}%", Stat::RecastTime, PercentReduction)
            .transform(Negate),
        ExtractRule::new(335, "summon", "summon time {num}%", Stat::SummonTime, PercentReduction)
            .transform(Negate),

        // Knockback.
        ExtractRule::new(325, "knockback", "enemy knockback {num}", Stat::EnemyKnockback, FlatSum)
            .target(BuffTarget::Field),
        ExtractRule::new(320, "knockback", "knockback {num}", Stat::Knockback, FlatSum),

        // Remaining single-channel phrasings.
        ExtractRule::new(300, "shield", "shield strength {num}%", Stat::ShieldStrength, PercentMax),
        ExtractRule::new(290, "heal", "healing {num}%", Stat::HealPower, PercentMax),
        // The skill multiplier is a multiplier-valued meta stat: the
        // absolute-set value is the multiplier itself, not a percentage.
        ExtractRule::new(280, "skill", "skill effects x{num}", Stat::SkillMultiplier, AbsoluteSet)
            .target(BuffTarget::SelfOnly),
        ExtractRule::new(270, "accuracy", "accuracy {num}%", Stat::Accuracy, FlatSum),
        ExtractRule::new(260, "reward", "experience gained {num}%", Stat::ExperienceGain, PercentMax),
        ExtractRule::new(255, "reward", "gold gained {num}%", Stat::GoldGain, PercentMax),
    ];

    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::ConditionTag;
    use crate::tag::WeaponClass;

    fn extractor() -> Extractor {
        Extractor::new()
    }

    #[test]
    fn test_unrecognized_text_yields_nothing() {
        assert!(extractor().extract("A brave knight of the realm.").is_empty());
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_simple_percent_and_flat() {
        let buffs = extractor().extract("Attack +30%. Attack +50.");
        assert_eq!(buffs.len(), 2);
        assert_eq!((buffs[0].stat, buffs[0].mode, buffs[0].value), (Stat::Attack, BuffMode::PercentMax, 30.0));
        assert_eq!((buffs[1].stat, buffs[1].mode, buffs[1].value), (Stat::Attack, BuffMode::FlatSum, 50.0));
    }

    #[test]
    fn test_percent_rule_excludes_flat_fallback_on_same_span() {
        let buffs = extractor().extract("Attack +30%.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].mode, BuffMode::PercentMax);
    }

    #[test]
    fn test_enemy_attack_does_not_leak_into_own_attack() {
        let buffs = extractor().extract("Enemy attack -10%.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].stat, Stat::EnemyAttack);
        assert_eq!(buffs[0].value, -10.0);
        assert_eq!(buffs[0].target, BuffTarget::Field);
    }

    #[test]
    fn test_enemy_attack_speed_claims_attack_speed_span() {
        let buffs = extractor().extract("Enemy attack speed -20%.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].stat, Stat::EnemyAttackSpeed);
    }

    #[test]
    fn test_multiplier_phrasing_normalized_to_percent() {
        let buffs = extractor().extract("Deals x1.4 damage.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].stat, Stat::DamageDealt);
        assert_eq!(buffs[0].value, 40.0);
    }

    #[test]
    fn test_special_damage_outranks_generic_damage() {
        let buffs = extractor().extract("Damage dealt to special attacks +40%.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].stat, Stat::SpecialDamage);
    }

    #[test]
    fn test_reduction_channel_sign_normalization() {
        let buffs = extractor().extract("Recast time -20%.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].stat, Stat::RecastTime);
        assert_eq!(buffs[0].mode, BuffMode::PercentReduction);
        assert_eq!(buffs[0].value, 20.0);
    }

    #[test]
    fn test_target_inference() {
        let buffs = extractor().extract("Defense +20% for allies.");
        assert_eq!(buffs[0].target, BuffTarget::Ally);

        let buffs = extractor().extract("Defense +20% for all units.");
        assert_eq!(buffs[0].target, BuffTarget::All);

        let buffs = extractor().extract("Defense +20%.");
        assert_eq!(buffs[0].target, BuffTarget::SelfOnly);
    }

    #[test]
    fn test_condition_tags_attach_to_sentence_buffs() {
        let buffs = extractor().extract("Attack +20% for sword units.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].condition_tags, vec![ConditionTag::Weapon(WeaponClass::Sword)]);
    }

    #[test]
    fn test_dynamic_per_ally() {
        let buffs = extractor().extract("Gains +5% attack per ally deployed.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].value, 5.0);
        assert_eq!(buffs[0].dynamic, Some(DynamicScaling { kind: DynamicKind::PerAlly }));
        assert_eq!(buffs[0].target, BuffTarget::SelfOnly);
    }

    #[test]
    fn test_giant_stage_scales_following_clauses_only() {
        // No terminating punctuation between the leading clause and the
        // "per giant stage" trigger: the implicit split still protects it.
        let buffs =
            extractor().extract("Attack +20% per giant stage attack +10 and attack speed +10%.");
        assert_eq!(buffs.len(), 3);
        let percent = buffs.iter().find(|b| b.mode == BuffMode::PercentMax && b.stat == Stat::Attack).unwrap();
        assert_eq!(percent.value, 20.0);
        let flat = buffs.iter().find(|b| b.mode == BuffMode::FlatSum).unwrap();
        assert_eq!(flat.value, 50.0);
        let speed = buffs.iter().find(|b| b.stat == Stat::AttackSpeed).unwrap();
        assert_eq!(speed.value, 50.0);
    }

    #[test]
    fn test_trigger_phrase_clears_giant_scope() {
        let buffs = extractor()
            .extract("Per giant stage, attack +10. At max giant stage, defense +20%.");
        let attack = buffs.iter().find(|b| b.stat == Stat::Attack).unwrap();
        assert_eq!(attack.value, 50.0);
        let defense = buffs.iter().find(|b| b.stat == Stat::Defense).unwrap();
        assert_eq!(defense.value, 20.0);
        assert_eq!(defense.condition_tags, vec![ConditionTag::MaxGiantStage]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "Attack +30% for allies. Per giant stage, range +10. Deals x1.4 damage.";
        let first = extractor().extract(text);
        let second = extractor().extract(text);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_dedup_identical_extractions() {
        // The same value phrased twice in one sentence at different
        // offsets is two distinct matched spans, kept; an identical
        // span is not duplicated.
        let buffs = extractor().extract("Attack +30%, attack +30%.");
        assert_eq!(buffs.len(), 1);
    }

    #[test]
    fn test_global_multiplier_same_target_scales() {
        let buffs = extractor().extract("Attack +20%. Effects x2 for self.");
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].value, 40.0);
        assert_eq!(buffs[0].target, BuffTarget::SelfOnly);
    }

    #[test]
    fn test_global_self_multiplier_splits_broad_buff() {
        let buffs = extractor().extract("Attack +20% for allies. Effects x2 for self.");
        assert_eq!(buffs.len(), 2);
        let others = buffs.iter().find(|b| b.target == BuffTarget::AllExceptSelf).unwrap();
        assert_eq!(others.value, 20.0);
        let own = buffs.iter().find(|b| b.target == BuffTarget::SelfOnly).unwrap();
        assert_eq!(own.value, 40.0);
    }

    #[test]
    fn test_decimal_point_does_not_split_sentence() {
        let sentences = split_sentences("deals x1.4 damage. attack +10");
        assert_eq!(sentences, vec!["deals x1.4 damage".to_string(), "attack +10".to_string()]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(39.99999999, 2), 40.0);
        assert_eq!(round_to(1.0000004, 6), 1.0);
    }
}
