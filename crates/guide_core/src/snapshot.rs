use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_EDUCATION: &str = "Not specified";
pub const DEFAULT_GOAL: &str = "Undecided";

/// Coarse career-progress label shown on the snapshot panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    Exploration,
    Learning,
    Applying,
    Growing,
    #[default]
    Unknown,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Exploration,
        Stage::Learning,
        Stage::Applying,
        Stage::Growing,
        Stage::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Exploration => "Exploration",
            Stage::Learning => "Learning",
            Stage::Applying => "Applying",
            Stage::Growing => "Growing",
            Stage::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage '{0}'")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStage(wanted.to_string()))
    }
}

/// Structured summary of what the student has told us so far.
///
/// Every field always holds a value; the defaults stand in until the quiz,
/// the extractor or a manual edit provides a real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerSnapshot {
    pub education: String,
    pub skills: Vec<String>,
    pub goal: String,
    pub stage: Stage,
    pub gaps: Vec<String>,
}

impl Default for CareerSnapshot {
    fn default() -> Self {
        Self {
            education: DEFAULT_EDUCATION.to_string(),
            skills: Vec::new(),
            goal: DEFAULT_GOAL.to_string(),
            stage: Stage::Unknown,
            gaps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapshotField {
    Education,
    Skills,
    Goal,
    Stage,
    Gaps,
}

impl SnapshotField {
    pub const ALL: [SnapshotField; 5] = [
        SnapshotField::Education,
        SnapshotField::Skills,
        SnapshotField::Goal,
        SnapshotField::Stage,
        SnapshotField::Gaps,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SnapshotField::Education => "Education",
            SnapshotField::Skills => "Skills",
            SnapshotField::Goal => "Goal",
            SnapshotField::Stage => "Stage",
            SnapshotField::Gaps => "Gaps to Address",
        }
    }

    /// Set-valued fields are edited as comma-separated lists.
    pub fn is_list(self) -> bool {
        matches!(self, SnapshotField::Skills | SnapshotField::Gaps)
    }
}

impl FromStr for SnapshotField {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "education" => Ok(SnapshotField::Education),
            "skills" => Ok(SnapshotField::Skills),
            "goal" => Ok(SnapshotField::Goal),
            "stage" => Ok(SnapshotField::Stage),
            "gaps" => Ok(SnapshotField::Gaps),
            other => Err(format!("unknown snapshot field '{other}'")),
        }
    }
}

/// Partial snapshot: `Some` fields replace the current value when merged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotUpdate {
    pub education: Option<String>,
    pub skills: Option<Vec<String>>,
    pub goal: Option<String>,
    pub stage: Option<Stage>,
    pub gaps: Option<Vec<String>>,
}

impl SnapshotUpdate {
    /// An update that overwrites every field with `snapshot`'s values.
    pub fn replace_all(snapshot: CareerSnapshot) -> Self {
        Self {
            education: Some(snapshot.education),
            skills: Some(snapshot.skills),
            goal: Some(snapshot.goal),
            stage: Some(snapshot.stage),
            gaps: Some(snapshot.gaps),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn fields(&self) -> Vec<SnapshotField> {
        let mut fields = Vec::new();
        if self.education.is_some() {
            fields.push(SnapshotField::Education);
        }
        if self.skills.is_some() {
            fields.push(SnapshotField::Skills);
        }
        if self.goal.is_some() {
            fields.push(SnapshotField::Goal);
        }
        if self.stage.is_some() {
            fields.push(SnapshotField::Stage);
        }
        if self.gaps.is_some() {
            fields.push(SnapshotField::Gaps);
        }
        fields
    }
}

/// Which writer produced an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    Quiz,
    Extractor,
    Manual,
}

/// Applies `update` from `source` on top of `prior`. Later scalar values win.
///
/// Set fields written by the extractor only ever grow; quiz answers and
/// manual edits replace them outright. Returns the merged snapshot and the
/// fields whose value actually changed.
pub fn merge(
    prior: CareerSnapshot,
    update: SnapshotUpdate,
    source: UpdateSource,
) -> (CareerSnapshot, Vec<SnapshotField>) {
    let mut next = prior;
    let mut changed = Vec::new();

    if let Some(education) = update.education {
        if next.education != education {
            next.education = education;
            changed.push(SnapshotField::Education);
        }
    }
    if let Some(skills) = update.skills {
        let skills = merge_set(&next.skills, skills, source);
        if next.skills != skills {
            next.skills = skills;
            changed.push(SnapshotField::Skills);
        }
    }
    if let Some(goal) = update.goal {
        if next.goal != goal {
            next.goal = goal;
            changed.push(SnapshotField::Goal);
        }
    }
    if let Some(stage) = update.stage {
        if next.stage != stage {
            next.stage = stage;
            changed.push(SnapshotField::Stage);
        }
    }
    if let Some(gaps) = update.gaps {
        let gaps = merge_set(&next.gaps, gaps, source);
        if next.gaps != gaps {
            next.gaps = gaps;
            changed.push(SnapshotField::Gaps);
        }
    }

    (next, changed)
}

/// Single owner of the running snapshot.
///
/// All writers go through [`SnapshotCell::apply`], which also remembers the
/// source that last wrote each field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotCell {
    snapshot: CareerSnapshot,
    written_by: BTreeMap<SnapshotField, UpdateSource>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &CareerSnapshot {
        &self.snapshot
    }

    pub fn last_writer(&self, field: SnapshotField) -> Option<UpdateSource> {
        self.written_by.get(&field).copied()
    }

    pub fn apply(&mut self, update: SnapshotUpdate, source: UpdateSource) -> Vec<SnapshotField> {
        for field in update.fields() {
            self.written_by.insert(field, source);
        }
        let prior = std::mem::take(&mut self.snapshot);
        let (next, changed) = merge(prior, update, source);
        self.snapshot = next;
        changed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Appends every item not already present (case-sensitive). Returns whether
/// anything was added.
pub(crate) fn union_into<I>(set: &mut Vec<String>, items: I) -> bool
where
    I: IntoIterator<Item = String>,
{
    let before = set.len();
    for item in items {
        if !set.contains(&item) {
            set.push(item);
        }
    }
    set.len() != before
}

fn merge_set(current: &[String], incoming: Vec<String>, source: UpdateSource) -> Vec<String> {
    match source {
        UpdateSource::Extractor => {
            let mut set = current.to_vec();
            union_into(&mut set, incoming);
            set
        }
        UpdateSource::Quiz | UpdateSource::Manual => dedupe(incoming),
    }
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(items.len());
    union_into(&mut unique, items);
    unique
}
