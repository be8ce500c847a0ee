//! Buff record module.
//!
//! A buff is a canonical, normalized effect on one numeric stat channel.
//! The extractor produces [`PartialBuff`]s (no identity or provenance
//! yet); the unit assembler completes them into [`Buff`]s by attaching an
//! id and a [`BuffSource`].
//!
//! Invariant: `value` is always the already-normalized delta (percentage
//! points or a flat amount), never a raw multiplier. Any "×1.4" phrasing
//! in source text is converted to "+40" at extraction time.

use crate::stat::{BuffMode, BuffSource, BuffTarget, Stat};
use crate::tag::ConditionTag;
use serde::{Deserialize, Serialize};

/// Identifier of a buff within one assembly run.
///
/// Ids are assigned by a [`BuffIdGen`] passed explicitly into each
/// assembly call; they are not meaningful across process restarts and not
/// stable across two assemblies of the same raw text.
pub type BuffId = u32;

/// Runtime quantity a dynamic buff scales with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicKind {
    /// Scales with the number of allies deployed.
    PerAlly,
    /// Scales with the number of enemies in range.
    PerEnemy,
}

/// Descriptor for a buff whose magnitude scales with a runtime count.
///
/// Flat dynamic buffs scale linearly with the count. Percent dynamic
/// buffs scale multiplicatively — `(1 + value/100)^count` — because they
/// represent independently stacking instances, not competing sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicScaling {
    pub kind: DynamicKind,
}

/// A modifier produced by the extractor, before identity and provenance
/// are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialBuff {
    /// The stat channel affected.
    pub stat: Stat,
    /// Stacking rule family.
    pub mode: BuffMode,
    /// Normalized delta: percentage points or a flat amount.
    pub value: f64,
    /// Target selector.
    pub target: BuffTarget,
    /// Situational gates; empty means unconditional.
    pub condition_tags: Vec<ConditionTag>,
    /// Present when the magnitude scales with a runtime count.
    pub dynamic: Option<DynamicScaling>,
    /// The raw text span this buff was extracted from (lowercased).
    pub matched_text: String,
}

impl PartialBuff {
    /// Key used for extraction-time deduplication. The value enters as
    /// raw bits so the key is `Eq`-comparable.
    pub(crate) fn dedup_key(&self) -> (Stat, BuffMode, u64, BuffTarget, String) {
        (
            self.stat,
            self.mode,
            self.value.to_bits(),
            self.target,
            self.matched_text.clone(),
        )
    }
}

/// A complete modifier attached to a unit.
///
/// # Examples
///
/// ```rust
/// use squadstat::{Buff, BuffMode, BuffSource, BuffTarget, Stat};
///
/// let buff = Buff::new(7, Stat::Attack, BuffMode::PercentMax, 30.0,
///                      BuffSource::Passive, BuffTarget::SelfOnly);
/// assert!(buff.is_active);
/// assert!(buff.condition_tags.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub id: BuffId,
    pub stat: Stat,
    pub mode: BuffMode,
    /// Normalized delta: percentage points or a flat amount.
    pub value: f64,
    /// Provenance; gates provenance-sensitive rules such as the skill
    /// multiplier, which scales passive-sourced buffs only.
    pub source: BuffSource,
    pub target: BuffTarget,
    #[serde(default)]
    pub condition_tags: Vec<ConditionTag>,
    /// Inactive buffs are skipped by aggregation and resolution.
    pub is_active: bool,
    #[serde(default)]
    pub dynamic: Option<DynamicScaling>,
    /// The raw text span this buff was extracted from.
    #[serde(default)]
    pub matched_text: String,
}

impl Buff {
    /// Create an unconditional, active buff. Used by callers adding
    /// formation or ally-granted modifiers outside of text assembly.
    pub fn new(
        id: BuffId,
        stat: Stat,
        mode: BuffMode,
        value: f64,
        source: BuffSource,
        target: BuffTarget,
    ) -> Self {
        Self {
            id,
            stat,
            mode,
            value,
            source,
            target,
            condition_tags: Vec::new(),
            is_active: true,
            dynamic: None,
            matched_text: String::new(),
        }
    }

    /// Complete a partial buff with an id and provenance.
    pub fn from_partial(id: BuffId, source: BuffSource, partial: PartialBuff) -> Self {
        Self {
            id,
            stat: partial.stat,
            mode: partial.mode,
            value: partial.value,
            source,
            target: partial.target,
            condition_tags: partial.condition_tags,
            is_active: true,
            dynamic: partial.dynamic,
            matched_text: partial.matched_text,
        }
    }
}

/// Explicit buff-id generator.
///
/// One generator is passed into each assembly call, making assembly
/// referentially transparent and safe under concurrent or test-parallel
/// execution: two threads assembling with their own generators never
/// contend or interleave.
///
/// # Examples
///
/// ```rust
/// use squadstat::BuffIdGen;
///
/// let mut ids = BuffIdGen::new();
/// assert_eq!(ids.next_id(), 0);
/// assert_eq!(ids.next_id(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffIdGen {
    next: BuffId,
}

impl BuffIdGen {
    /// A generator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> BuffId {
        let id = self.next;
        self.next += 1;
        id
    }
}
