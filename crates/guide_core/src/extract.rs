//! Heuristic conversation-text extractor.
//!
//! Each snapshot field owns an ordered list of independent matchers and a
//! policy deciding how their results combine. Nothing here fails on
//! unmatched input: no match simply leaves the field out of the update.
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::snapshot::{union_into, CareerSnapshot, SnapshotUpdate, Stage};

/// Vocabulary checked by substring containment against lowercased text.
pub const SKILL_KEYWORDS: [&str; 30] = [
    "python",
    "java",
    "javascript",
    "c++",
    "c",
    "sql",
    "react",
    "node",
    "machine learning",
    "ml",
    "ai",
    "data science",
    "web development",
    "android",
    "ios",
    "flutter",
    "django",
    "flask",
    "spring",
    "html",
    "css",
    "typescript",
    "aws",
    "docker",
    "kubernetes",
    "git",
    "linux",
    "excel",
    "power bi",
    "tableau",
];

const EDUCATION_ENROLLED: &str =
    r"(?:studying|pursuing|enrolled in|doing)\s+(?:a\s+)?(.+?)\s+(?:degree|course|program)";
const EDUCATION_YEAR_STUDENT: &str =
    r"(?:i['’]m|i am|currently)\s+(?:a\s+)?(\d+(?:st|nd|rd|th)?\s+year\s+\w+\s+student)";
const EDUCATION_DEGREE: &str =
    r"\b(?:b\.?tech|b\.?e|bca|mca|bsc|msc|ba|ma|mba|phd)\s+(?:in\s+)?(\w+)";
const EDUCATION_DEPARTMENT: &str = r"\b(?:cse|cs|it|ece|eee|mechanical|civil|chemical)\b";

const GOAL_ROLE: &str = r"(?:want to|interested in|goal is to|aspire to|dream of)\s+(?:become|be|work as|pursue)\s+(?:a\s+)?(.+?)(?:\.|,|$)";
const GOAL_FIELD: &str = r"(?:career in|job in|work in)\s+(.+?)(?:\.|,|$)";

const GAP_MISSING: &str = r"(?:don['’]t know|don['’]t have|lack|need to learn|weak in|struggling with)\s+(.+?)(?:\.|,|$)";
const GAP_UNPRACTISED: &str =
    r"(?:no experience in|haven['’]t learned|need to improve)\s+(.+?)(?:\.|,|$)";

static BUILTIN: Lazy<Result<SnapshotExtractor, RuleError>> =
    Lazy::new(SnapshotExtractor::with_builtin_rules);

/// Shared extractor with the built-in rule set, compiled on first use.
pub fn builtin() -> Result<&'static SnapshotExtractor, &'static RuleError> {
    Lazy::force(&BUILTIN).as_ref()
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule '{label}' has an invalid pattern: {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// One independent recognizer.
pub trait Matcher: Send + Sync {
    fn label(&self) -> &str;
    fn try_match(&self, text: &str) -> Option<String>;
}

/// Which part of a regex match becomes the extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    WholeMatch,
    Group(usize),
}

/// Case-insensitive regex rule. The extracted value is trimmed; an empty
/// value counts as no match.
#[derive(Debug)]
pub struct RegexMatcher {
    label: String,
    regex: Regex,
    capture: Capture,
}

impl RegexMatcher {
    pub fn new(label: impl Into<String>, pattern: &str, capture: Capture) -> Result<Self, RuleError> {
        let label = label.into();
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                label: label.clone(),
                source,
            })?;
        Ok(Self {
            label,
            regex,
            capture,
        })
    }
}

impl Matcher for RegexMatcher {
    fn label(&self) -> &str {
        &self.label
    }

    fn try_match(&self, text: &str) -> Option<String> {
        let captures = self.regex.captures(text)?;
        let found = match self.capture {
            Capture::WholeMatch => captures.get(0),
            Capture::Group(index) => captures.get(index),
        }?;
        let value = found.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Substring keyword. Expects already-lowercased text and yields the keyword
/// itself in its canonical form.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: String,
}

impl KeywordMatcher {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
        }
    }
}

impl Matcher for KeywordMatcher {
    fn label(&self) -> &str {
        &self.keyword
    }

    fn try_match(&self, lowered: &str) -> Option<String> {
        lowered
            .contains(self.keyword.as_str())
            .then(|| self.keyword.clone())
    }
}

/// How the matchers of one field combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The first matcher (in order) that matches decides the value.
    FirstMatch,
    /// Every matcher that matches contributes its value.
    UnionAll,
}

pub struct FieldRules {
    policy: FieldPolicy,
    matchers: Vec<Box<dyn Matcher>>,
}

impl FieldRules {
    pub fn new(policy: FieldPolicy, matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { policy, matchers }
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    pub fn evaluate(&self, text: &str) -> Vec<String> {
        match self.policy {
            FieldPolicy::FirstMatch => self
                .matchers
                .iter()
                .find_map(|matcher| matcher.try_match(text))
                .into_iter()
                .collect(),
            FieldPolicy::UnionAll => self
                .matchers
                .iter()
                .filter_map(|matcher| matcher.try_match(text))
                .collect(),
        }
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.matchers.iter().map(|m| m.label()).collect();
        f.debug_struct("FieldRules")
            .field("policy", &self.policy)
            .field("matchers", &labels)
            .finish()
    }
}

#[derive(Debug)]
pub struct SnapshotExtractor {
    education: FieldRules,
    skills: FieldRules,
    goal: FieldRules,
    gaps: FieldRules,
}

impl SnapshotExtractor {
    pub fn new(education: FieldRules, skills: FieldRules, goal: FieldRules, gaps: FieldRules) -> Self {
        Self {
            education,
            skills,
            goal,
            gaps,
        }
    }

    pub fn with_builtin_rules() -> Result<Self, RuleError> {
        let education = FieldRules::new(
            FieldPolicy::FirstMatch,
            vec![
                regex_rule("education.enrolled", EDUCATION_ENROLLED, Capture::WholeMatch)?,
                regex_rule("education.year_student", EDUCATION_YEAR_STUDENT, Capture::WholeMatch)?,
                regex_rule("education.degree", EDUCATION_DEGREE, Capture::WholeMatch)?,
                regex_rule("education.department", EDUCATION_DEPARTMENT, Capture::WholeMatch)?,
            ],
        );
        let skills = FieldRules::new(
            FieldPolicy::UnionAll,
            SKILL_KEYWORDS
                .iter()
                .map(|keyword| Box::new(KeywordMatcher::new(keyword)) as Box<dyn Matcher>)
                .collect(),
        );
        let goal = FieldRules::new(
            FieldPolicy::FirstMatch,
            vec![
                regex_rule("goal.role", GOAL_ROLE, Capture::Group(1))?,
                regex_rule("goal.field", GOAL_FIELD, Capture::Group(1))?,
            ],
        );
        let gaps = FieldRules::new(
            FieldPolicy::UnionAll,
            vec![
                regex_rule("gaps.missing", GAP_MISSING, Capture::Group(1))?,
                regex_rule("gaps.unpractised", GAP_UNPRACTISED, Capture::Group(1))?,
            ],
        );
        Ok(Self::new(education, skills, goal, gaps))
    }

    /// Scans one message and returns the fields it has something to say about.
    ///
    /// Skills and gaps come back as the union with `prior`'s sets, and only
    /// when that union actually grew. A goal match also moves the stage to
    /// `Exploration`.
    pub fn extract(&self, text: &str, prior: &CareerSnapshot) -> SnapshotUpdate {
        let mut update = SnapshotUpdate::default();

        update.education = self.education.evaluate(text).into_iter().next();

        let lowered = text.to_lowercase();
        let mut skills = prior.skills.clone();
        if union_into(&mut skills, self.skills.evaluate(&lowered)) {
            update.skills = Some(skills);
        }

        if let Some(goal) = self.goal.evaluate(text).into_iter().next() {
            update.goal = Some(goal);
            update.stage = Some(Stage::Exploration);
        }

        let mut gaps = prior.gaps.clone();
        if union_into(&mut gaps, self.gaps.evaluate(text)) {
            update.gaps = Some(gaps);
        }

        update
    }
}

fn regex_rule(label: &str, pattern: &str, capture: Capture) -> Result<Box<dyn Matcher>, RuleError> {
    Ok(Box::new(RegexMatcher::new(label, pattern, capture)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_compile() {
        let extractor = builtin().expect("built-in rules compile");
        assert_eq!(extractor.education.policy(), FieldPolicy::FirstMatch);
        assert_eq!(extractor.skills.policy(), FieldPolicy::UnionAll);
        assert_eq!(extractor.goal.policy(), FieldPolicy::FirstMatch);
        assert_eq!(extractor.gaps.policy(), FieldPolicy::UnionAll);
    }

    #[test]
    fn invalid_pattern_names_the_rule() {
        let err = RegexMatcher::new("broken", "(unclosed", Capture::WholeMatch).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn first_match_stops_at_the_earliest_rule() {
        let rules = FieldRules::new(
            FieldPolicy::FirstMatch,
            vec![
                Box::new(KeywordMatcher::new("rust")) as Box<dyn Matcher>,
                Box::new(KeywordMatcher::new("go")),
            ],
        );
        assert_eq!(rules.evaluate("go and rust"), vec!["rust".to_string()]);

        let union = FieldRules::new(
            FieldPolicy::UnionAll,
            vec![
                Box::new(KeywordMatcher::new("rust")) as Box<dyn Matcher>,
                Box::new(KeywordMatcher::new("go")),
            ],
        );
        assert_eq!(
            union.evaluate("go and rust"),
            vec!["rust".to_string(), "go".to_string()]
        );
    }

    #[test]
    fn blank_capture_is_not_a_match() {
        let matcher = RegexMatcher::new("blank", r"goal:(\s*)", Capture::Group(1)).unwrap();
        assert_eq!(matcher.try_match("goal:   "), None);
    }
}
