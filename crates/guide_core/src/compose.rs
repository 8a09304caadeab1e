use crate::quiz::{ids, non_blank, QuizAnswers};

/// Closing request appended to every seed message.
pub const CLOSING_REQUEST: &str =
    "Based on my profile, what career path would you recommend, and what should I focus on next?";

const LISTED_SKILLS: usize = 3;
const LISTED_INTERESTS: usize = 2;

/// Renders quiz answers into the first message sent to the counsellor.
pub fn compose_seed_message(answers: &QuizAnswers) -> String {
    let education = non_blank(answers.text(ids::EDUCATION)).unwrap_or("student");
    let mut message = format!("I'm a {education}");
    if let Some(degree) = non_blank(answers.text(ids::DEGREE)) {
        message.push_str(&format!(" studying {degree}"));
    }
    message.push('.');

    let skills = answers.choices(ids::SKILLS);
    if !skills.is_empty() {
        let listed = skills
            .iter()
            .take(LISTED_SKILLS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        message.push_str(&format!(" I have skills in {listed}"));
        if skills.len() > LISTED_SKILLS {
            message.push_str(&format!(" and {} more", skills.len() - LISTED_SKILLS));
        }
        message.push('.');
    }

    let interests = answers.choices(ids::INTERESTS);
    if !interests.is_empty() {
        let listed = interests
            .iter()
            .take(LISTED_INTERESTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" and ");
        message.push_str(&format!(" I'm interested in {listed}."));
    }

    if let Some(goal) = non_blank(answers.text(ids::GOAL)) {
        message.push_str(&format!(" My goal is to {goal}."));
    }

    message.push(' ');
    message.push_str(CLOSING_REQUEST);
    message
}
