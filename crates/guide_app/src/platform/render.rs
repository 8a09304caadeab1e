//! Incremental terminal renderer for the view model.
//!
//! The terminal is append-only, so the renderer remembers what it already
//! printed and only writes what changed: new questions, new messages, the
//! growing tail of a streaming reply, feedback acknowledgements and the
//! snapshot panel.

use std::collections::BTreeMap;
use std::io::{self, Write};

use guide_core::{
    AppViewModel, ChatView, Feedback, MessageView, QuestionKind, QuizView, Role, ScreenView,
    SnapshotView, Tab,
};

use super::commands::HELP;

pub struct Renderer<W: Write> {
    out: W,
    quiz: Option<QuizView>,
    in_chat: bool,
    tab: Tab,
    /// Messages printed in full.
    printed: usize,
    /// Index and printed length of the reply still streaming.
    open: Option<(usize, usize)>,
    feedback: BTreeMap<usize, Feedback>,
    snapshot: Option<SnapshotView>,
    suggestions_shown: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            quiz: None,
            in_chat: false,
            tab: Tab::Conversation,
            printed: 0,
            open: None,
            feedback: BTreeMap::new(),
            snapshot: None,
            suggestions_shown: false,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        match &view.screen {
            ScreenView::Quiz(quiz) => {
                if self.in_chat {
                    self.reset_chat();
                }
                if self.quiz.as_ref() != Some(quiz) {
                    self.write_quiz(quiz)?;
                    self.quiz = Some(quiz.clone());
                }
            }
            ScreenView::Chat(chat) => self.render_chat(chat, &view.snapshot)?,
        }
        self.out.flush()
    }

    pub fn help(&mut self) -> io::Result<()> {
        writeln!(self.out, "{HELP}")?;
        self.out.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        if self.open.is_some() {
            writeln!(self.out)?;
            self.open = None;
        }
        writeln!(self.out, "! {text}")?;
        self.out.flush()
    }

    fn reset_chat(&mut self) {
        self.in_chat = false;
        self.tab = Tab::Conversation;
        self.printed = 0;
        self.open = None;
        self.feedback.clear();
        self.snapshot = None;
        self.suggestions_shown = false;
    }

    fn write_quiz(&mut self, quiz: &QuizView) -> io::Result<()> {
        writeln!(
            self.out,
            "\nQuestion {} of {} ({}%)",
            quiz.position, quiz.total, quiz.percent
        )?;
        writeln!(self.out, "{}", quiz.question)?;
        match quiz.kind {
            QuestionKind::Text => {
                if let Some(placeholder) = &quiz.placeholder {
                    writeln!(self.out, "  ({placeholder})")?;
                }
                if !quiz.text_value.is_empty() {
                    writeln!(self.out, "  Current answer: {}", quiz.text_value)?;
                }
            }
            QuestionKind::Select | QuestionKind::Multiselect => {
                for (number, option) in quiz.options.iter().enumerate() {
                    let mark = if option.selected { "x" } else { " " };
                    writeln!(self.out, "  {:>2}. [{mark}] {}", number + 1, option.label)?;
                }
            }
        }
        let action = if quiz.is_last_step { "Get Started" } else { "Next" };
        let back = if quiz.can_go_back { ", :back" } else { "" };
        writeln!(self.out, "  [Enter: {action}{back}, :skip]")
    }

    fn render_chat(&mut self, chat: &ChatView, snapshot: &SnapshotView) -> io::Result<()> {
        if !self.in_chat {
            self.in_chat = true;
            self.quiz = None;
            writeln!(self.out, "\n=== Career guide chat === (:help for commands)")?;
        }

        let tab_changed = chat.tab != self.tab;
        self.tab = chat.tab;
        match chat.tab {
            Tab::Snapshot => {
                if tab_changed || self.snapshot.as_ref() != Some(snapshot) {
                    if self.open.is_some() {
                        writeln!(self.out)?;
                        self.open = None;
                    }
                    self.write_snapshot(snapshot)?;
                }
            }
            Tab::Conversation => {
                if tab_changed {
                    writeln!(self.out, "\n--- Conversation ---")?;
                    // A reply interrupted by the panel is printed again in full.
                    self.open = None;
                }
                self.write_messages(chat)?;
                let snapshot_changed = self
                    .snapshot
                    .as_ref()
                    .is_some_and(|shown| shown != snapshot);
                if snapshot_changed && self.open.is_none() {
                    writeln!(self.out, "  (career snapshot updated, :tab to view)")?;
                }
            }
        }
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn write_messages(&mut self, chat: &ChatView) -> io::Result<()> {
        if chat.messages.is_empty() && !chat.suggestions.is_empty() && !self.suggestions_shown {
            writeln!(self.out, "Try one of these (:suggest N):")?;
            for (number, suggestion) in chat.suggestions.iter().enumerate() {
                writeln!(self.out, "  {}. {suggestion}", number + 1)?;
            }
            self.suggestions_shown = true;
        }

        for message in chat.messages.iter().skip(self.printed) {
            let start = match self.open.take() {
                Some((index, len)) if index == message.index => len,
                _ => {
                    write!(self.out, "\n{}: ", speaker(message.role))?;
                    0
                }
            };
            if let Some(rest) = message.content.get(start..) {
                write!(self.out, "{rest}")?;
            }
            if message.is_streaming {
                self.open = Some((message.index, message.content.len()));
                break;
            }
            writeln!(self.out)?;
            if message.accepts_feedback {
                writeln!(
                    self.out,
                    "  [#{n}  :good {n} / :bad {n}]",
                    n = message.index + 1
                )?;
            }
            self.printed = message.index + 1;
        }

        self.write_feedback(&chat.messages)
    }

    fn write_feedback(&mut self, messages: &[MessageView]) -> io::Result<()> {
        for message in messages.iter().take(self.printed) {
            let Some(feedback) = message.feedback else {
                continue;
            };
            if self.feedback.get(&message.index) != Some(&feedback) {
                let verdict = match feedback {
                    Feedback::Helpful => "helpful",
                    Feedback::NotHelpful => "not helpful",
                };
                writeln!(
                    self.out,
                    "  Thanks! Reply #{} marked as {verdict}.",
                    message.index + 1
                )?;
                self.feedback.insert(message.index, feedback);
            }
        }
        Ok(())
    }

    fn write_snapshot(&mut self, snapshot: &SnapshotView) -> io::Result<()> {
        writeln!(self.out, "\n--- Career Snapshot ---")?;
        let mut editing = None;
        for row in &snapshot.rows {
            writeln!(self.out, "  {:<16} {}", row.label, row.value)?;
            if let Some(staged) = &row.editing {
                editing = Some((row.label, row.field.is_list(), staged));
            }
        }
        match editing {
            Some((label, is_list, staged)) => {
                let shape = if is_list { " (comma-separated)" } else { "" };
                writeln!(
                    self.out,
                    "Editing {label}{shape}. Current: \"{staged}\"\n\
                     Type a new value, Enter to keep it, :cancel to discard."
                )
            }
            None => writeln!(self.out, "  [:edit <field> to change, :tab to return]"),
        }
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Guide",
    }
}

#[cfg(test)]
mod tests {
    use guide_core::{update, AppState, Msg, SnapshotField};

    use super::*;

    fn text(renderer: &Renderer<Vec<u8>>) -> String {
        String::from_utf8_lossy(renderer.output()).into_owned()
    }

    fn step(state: AppState, msg: Msg) -> AppState {
        update(state, msg).0
    }

    #[test]
    fn quiz_question_is_printed_once() {
        let state = AppState::new();
        let mut renderer = Renderer::new(Vec::new());
        renderer.render(&state.view()).unwrap();
        renderer.render(&state.view()).unwrap();

        let out = text(&renderer);
        assert_eq!(out.matches("What are you currently studying?").count(), 1);
        assert!(out.contains("Question 1 of 6 (16%)"));
        assert!(!out.contains(":back"));
    }

    #[test]
    fn streaming_reply_is_appended_in_place() {
        let mut renderer = Renderer::new(Vec::new());
        let state = step(AppState::new(), Msg::QuizSkipClicked);
        renderer.render(&state.view()).unwrap();

        let state = step(state, Msg::InputChanged("Hi".to_string()));
        let state = step(state, Msg::MessageSubmitted);
        renderer.render(&state.view()).unwrap();
        let state = step(
            state,
            Msg::ReplyDelta {
                reply_id: 1,
                text: "Hello ".to_string(),
            },
        );
        renderer.render(&state.view()).unwrap();
        let state = step(
            state,
            Msg::ReplyDelta {
                reply_id: 1,
                text: "there".to_string(),
            },
        );
        renderer.render(&state.view()).unwrap();
        let state = step(state, Msg::ReplyDone { reply_id: 1 });
        renderer.render(&state.view()).unwrap();

        let out = text(&renderer);
        assert!(out.contains("Try one of these"));
        assert!(out.contains("You: Hi\n"));
        assert!(out.contains("Guide: Hello there\n"));
        assert_eq!(out.matches("Guide:").count(), 1);
        assert!(out.contains(":good 2"));
    }

    #[test]
    fn snapshot_tab_shows_panel_and_edit_prompt() {
        let mut renderer = Renderer::new(Vec::new());
        let state = step(AppState::new(), Msg::QuizSkipClicked);
        renderer.render(&state.view()).unwrap();
        let state = step(state, Msg::TabSelected(Tab::Snapshot));
        renderer.render(&state.view()).unwrap();
        let state = step(state, Msg::EditStarted(SnapshotField::Gaps));
        renderer.render(&state.view()).unwrap();

        let out = text(&renderer);
        assert!(out.contains("--- Career Snapshot ---"));
        assert!(out.contains("Gaps to Address"));
        assert!(out.contains("None identified yet"));
        assert!(out.contains("Editing Gaps to Address (comma-separated)"));
    }

    #[test]
    fn feedback_is_acknowledged() {
        let mut renderer = Renderer::new(Vec::new());
        let mut state = step(AppState::new(), Msg::QuizSkipClicked);
        for msg in [
            Msg::SuggestionChosen(0),
            Msg::ReplyDelta {
                reply_id: 1,
                text: "Start with what you enjoy.".to_string(),
            },
            Msg::ReplyDone { reply_id: 1 },
            Msg::FeedbackGiven {
                index: 1,
                feedback: Feedback::Helpful,
            },
        ] {
            state = step(state, msg);
            renderer.render(&state.view()).unwrap();
        }

        assert!(text(&renderer).contains("Reply #2 marked as helpful."));
    }
}
