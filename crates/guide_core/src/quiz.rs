//! Onboarding quiz: question configuration, answers and step navigation.
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::snapshot::{CareerSnapshot, Stage, DEFAULT_EDUCATION, DEFAULT_GOAL};

/// Question ids the snapshot synthesis and the seed message rely on.
pub mod ids {
    pub const EDUCATION: &str = "education";
    pub const DEGREE: &str = "degree";
    pub const SKILLS: &str = "skills";
    pub const INTERESTS: &str = "interests";
    pub const GOAL: &str = "goal";
    pub const EXPERIENCE: &str = "experience";
}

pub const NO_EXPERIENCE: &str = "No experience yet";
pub const INTERNSHIPS_ONLY: &str = "Internships only";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum QuestionKind {
    Text,
    Select,
    Multiselect,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizConfigError {
    #[error("quiz has no questions")]
    Empty,
    #[error("question id '{id}' is used more than once")]
    DuplicateId { id: String },
    #[error("question '{id}' needs at least one option")]
    MissingOptions { id: String },
    #[error("question '{id}' lists option '{option}' more than once")]
    DuplicateOption { id: String, option: String },
    #[error("cannot read quiz file {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid quiz file: {0}")]
    Parse(String),
}

/// Validated, ordered question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    questions: Vec<QuizQuestion>,
}

impl QuizConfig {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizConfigError> {
        if questions.is_empty() {
            return Err(QuizConfigError::Empty);
        }
        let mut seen_ids = HashSet::new();
        for question in &questions {
            if !seen_ids.insert(question.id.as_str()) {
                return Err(QuizConfigError::DuplicateId {
                    id: question.id.clone(),
                });
            }
            if question.kind == QuestionKind::Text {
                continue;
            }
            if question.options.is_empty() {
                return Err(QuizConfigError::MissingOptions {
                    id: question.id.clone(),
                });
            }
            let mut seen_options = HashSet::new();
            for option in &question.options {
                if !seen_options.insert(option.as_str()) {
                    return Err(QuizConfigError::DuplicateOption {
                        id: question.id.clone(),
                        option: option.clone(),
                    });
                }
            }
        }
        Ok(Self { questions })
    }

    /// Parses a RON list of questions.
    pub fn from_ron(text: &str) -> Result<Self, QuizConfigError> {
        let questions: Vec<QuizQuestion> =
            ron::from_str(text).map_err(|err| QuizConfigError::Parse(err.to_string()))?;
        Self::new(questions)
    }

    pub fn load(path: &Path) -> Result<Self, QuizConfigError> {
        let text = fs::read_to_string(path).map_err(|err| QuizConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_ron(&text)
    }

    /// The six-question onboarding set.
    pub fn builtin() -> Self {
        Self {
            questions: builtin_questions(),
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, step: usize) -> Option<&QuizQuestion> {
        self.questions.get(step)
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Choices(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizAnswers {
    values: BTreeMap<String, Answer>,
}

impl QuizAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Answer> {
        self.values.get(id)
    }

    pub fn set(&mut self, id: impl Into<String>, answer: Answer) {
        self.values.insert(id.into(), answer);
    }

    /// Text or single-select answer.
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.values.get(id) {
            Some(Answer::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Multiselect answer; empty when unanswered.
    pub fn choices(&self, id: &str) -> &[String] {
        match self.values.get(id) {
            Some(Answer::Choices(values)) => values,
            _ => &[],
        }
    }

    /// Adds `option` to a multiselect answer, or removes it when present.
    pub fn toggle(&mut self, id: &str, option: &str) {
        let mut current = self.choices(id).to_vec();
        if let Some(pos) = current.iter().position(|o| o == option) {
            current.remove(pos);
        } else {
            current.push(option.to_string());
        }
        self.values.insert(id.to_string(), Answer::Choices(current));
    }

    pub fn is_complete(&self, question: &QuizQuestion) -> bool {
        match (question.kind, self.values.get(&question.id)) {
            (QuestionKind::Text | QuestionKind::Select, Some(Answer::Text(value))) => {
                !value.trim().is_empty()
            }
            (QuestionKind::Multiselect, Some(Answer::Choices(values))) => !values.is_empty(),
            _ => false,
        }
    }
}

/// Result of pressing Next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// The current answer is incomplete; nothing changed.
    Blocked,
    Advanced { step: usize },
    /// The last question was answered; the quiz is over.
    Completed(CareerSnapshot),
}

/// An in-progress quiz. It only exists while a question is being answered;
/// completion hands the answers over and the session is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizSession {
    step: usize,
    answers: QuizAnswers,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn answers(&self) -> &QuizAnswers {
        &self.answers
    }

    pub fn into_answers(self) -> QuizAnswers {
        self.answers
    }

    pub fn current<'a>(&self, config: &'a QuizConfig) -> Option<&'a QuizQuestion> {
        config.question(self.step)
    }

    pub fn is_last_step(&self, config: &QuizConfig) -> bool {
        self.step + 1 >= config.len()
    }

    /// One-based position and completion percentage.
    pub fn progress(&self, config: &QuizConfig) -> (usize, usize, u8) {
        let total = config.len().max(1);
        let position = (self.step + 1).min(total);
        let percent = (position * 100 / total) as u8;
        (position, total, percent)
    }

    pub fn set_text(&mut self, config: &QuizConfig, value: &str) -> bool {
        match self.current(config) {
            Some(question) if question.kind == QuestionKind::Text => {
                self.answers
                    .set(question.id.clone(), Answer::Text(value.to_string()));
                true
            }
            _ => false,
        }
    }

    pub fn select(&mut self, config: &QuizConfig, option: &str) -> bool {
        match self.current(config) {
            Some(question)
                if question.kind == QuestionKind::Select
                    && question.options.iter().any(|o| o == option) =>
            {
                self.answers
                    .set(question.id.clone(), Answer::Text(option.to_string()));
                true
            }
            _ => false,
        }
    }

    pub fn toggle(&mut self, config: &QuizConfig, option: &str) -> bool {
        match self.current(config) {
            Some(question)
                if question.kind == QuestionKind::Multiselect
                    && question.options.iter().any(|o| o == option) =>
            {
                self.answers.toggle(&question.id, option);
                true
            }
            _ => false,
        }
    }

    pub fn can_proceed(&self, config: &QuizConfig) -> bool {
        self.current(config)
            .is_some_and(|question| self.answers.is_complete(question))
    }

    pub fn next(&mut self, config: &QuizConfig) -> NextOutcome {
        if !self.can_proceed(config) {
            return NextOutcome::Blocked;
        }
        if self.is_last_step(config) {
            return NextOutcome::Completed(snapshot_from_answers(&self.answers));
        }
        self.step += 1;
        NextOutcome::Advanced { step: self.step }
    }

    /// Moves one question back, keeping every answer. Returns whether the step changed.
    pub fn back(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }
}

/// Builds the initial snapshot from finished quiz answers.
pub fn snapshot_from_answers(answers: &QuizAnswers) -> CareerSnapshot {
    let education = non_blank(answers.text(ids::EDUCATION))
        .unwrap_or(DEFAULT_EDUCATION)
        .to_string();
    let goal = non_blank(answers.text(ids::GOAL))
        .unwrap_or(DEFAULT_GOAL)
        .to_string();
    let stage = match non_blank(answers.text(ids::EXPERIENCE)) {
        Some(NO_EXPERIENCE) => Stage::Exploration,
        Some(INTERNSHIPS_ONLY) => Stage::Learning,
        Some(_) => Stage::Growing,
        None => Stage::Unknown,
    };

    CareerSnapshot {
        education,
        skills: answers.choices(ids::SKILLS).to_vec(),
        goal,
        stage,
        gaps: Vec::new(),
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn builtin_questions() -> Vec<QuizQuestion> {
    vec![
        text_question(
            ids::EDUCATION,
            "What are you currently studying?",
            "e.g., B.Tech CSE 2nd year, BCA final year, etc.",
        ),
        choice_question(
            ids::DEGREE,
            "What is your degree/field of study?",
            QuestionKind::Select,
            &[
                "Computer Science / IT",
                "Electronics & Communication",
                "Mechanical Engineering",
                "Civil Engineering",
                "Business / MBA",
                "Arts & Humanities",
                "Science (Physics/Chemistry/Math)",
                "Medicine / Healthcare",
                "Other",
            ],
        ),
        choice_question(
            ids::SKILLS,
            "What skills do you have? (Select all that apply)",
            QuestionKind::Multiselect,
            &[
                "Python",
                "Java",
                "JavaScript",
                "C/C++",
                "SQL",
                "Machine Learning",
                "Web Development",
                "Mobile Development",
                "Data Analysis",
                "Cloud Computing",
                "UI/UX Design",
                "Project Management",
                "Communication",
                "Problem Solving",
            ],
        ),
        choice_question(
            ids::INTERESTS,
            "What areas interest you the most?",
            QuestionKind::Multiselect,
            &[
                "Software Development",
                "Data Science & AI",
                "Cybersecurity",
                "Product Management",
                "Entrepreneurship",
                "Research & Academia",
                "Finance & Fintech",
                "Healthcare Tech",
                "Gaming Industry",
                "Content Creation",
            ],
        ),
        text_question(
            ids::GOAL,
            "What's your career goal?",
            "e.g., Become a software engineer at a top tech company",
        ),
        choice_question(
            ids::EXPERIENCE,
            "Do you have any work experience?",
            QuestionKind::Select,
            &[NO_EXPERIENCE, INTERNSHIPS_ONLY, "1-2 years", "2-5 years", "5+ years"],
        ),
    ]
}

fn text_question(id: &str, question: &str, placeholder: &str) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        question: question.to_string(),
        kind: QuestionKind::Text,
        options: Vec::new(),
        placeholder: Some(placeholder.to_string()),
    }
}

fn choice_question(id: &str, question: &str, kind: QuestionKind, options: &[&str]) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        question: question.to_string(),
        kind,
        options: options.iter().map(|o| o.to_string()).collect(),
        placeholder: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_questions_pass_validation() {
        let builtin = QuizConfig::builtin();
        let validated = QuizConfig::new(builtin.questions().to_vec()).expect("valid builtin quiz");
        assert_eq!(validated.len(), 6);
        assert_eq!(validated.questions()[5].id, ids::EXPERIENCE);
    }

    #[test]
    fn progress_counts_from_one() {
        let config = QuizConfig::builtin();
        let session = QuizSession::new();
        assert_eq!(session.progress(&config), (1, 6, 16));
    }
}
