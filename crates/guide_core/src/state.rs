use crate::chat::{ReplyId, Transcript};
use crate::panel::PanelEdit;
use crate::quiz::{QuizConfig, QuizSession};
use crate::snapshot::{CareerSnapshot, SnapshotCell};
use crate::view_model::{self, AppViewModel};

/// Which surface the page shows. Quiz input is only accepted on the quiz
/// screen and chat input only on the chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Quiz(QuizSession),
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Conversation,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    quiz: QuizConfig,
    screen: Screen,
    tab: Tab,
    snapshot: SnapshotCell,
    transcript: Transcript,
    input: String,
    panel_edit: Option<PanelEdit>,
    next_reply_id: ReplyId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_quiz(QuizConfig::builtin())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiz(quiz: QuizConfig) -> Self {
        Self {
            quiz,
            screen: Screen::Quiz(QuizSession::new()),
            tab: Tab::default(),
            snapshot: SnapshotCell::new(),
            transcript: Transcript::default(),
            input: String::new(),
            panel_edit: None,
            next_reply_id: 1,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn quiz(&self) -> &QuizConfig {
        &self.quiz
    }

    pub fn snapshot(&self) -> &CareerSnapshot {
        self.snapshot.get()
    }

    pub fn snapshot_cell(&self) -> &SnapshotCell {
        &self.snapshot
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn panel_edit(&self) -> Option<&PanelEdit> {
        self.panel_edit.as_ref()
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn parts_mut(&mut self) -> (&QuizConfig, &mut Screen) {
        (&self.quiz, &mut self.screen)
    }

    pub(crate) fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.mark_dirty();
    }

    pub(crate) fn replace_screen(&mut self, screen: Screen) -> Screen {
        self.mark_dirty();
        std::mem::replace(&mut self.screen, screen)
    }

    pub(crate) fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.mark_dirty();
    }

    pub(crate) fn snapshot_cell_mut(&mut self) -> &mut SnapshotCell {
        &mut self.snapshot
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
        self.mark_dirty();
    }

    pub(crate) fn set_panel_edit(&mut self, edit: Option<PanelEdit>) {
        self.panel_edit = edit;
        self.mark_dirty();
    }

    pub(crate) fn take_panel_edit(&mut self) -> Option<PanelEdit> {
        let edit = self.panel_edit.take();
        if edit.is_some() {
            self.mark_dirty();
        }
        edit
    }

    pub(crate) fn panel_edit_mut(&mut self) -> Option<&mut PanelEdit> {
        self.panel_edit.as_mut()
    }

    pub(crate) fn allocate_reply_id(&mut self) -> ReplyId {
        let id = self.next_reply_id;
        self.next_reply_id += 1;
        id
    }

    /// Back to a fresh quiz with an empty conversation and default snapshot.
    /// Reply ids keep counting so late events from an old reply stay stale.
    pub(crate) fn restart(&mut self) {
        self.screen = Screen::Quiz(QuizSession::new());
        self.tab = Tab::default();
        self.snapshot.reset();
        self.transcript.clear();
        self.input.clear();
        self.panel_edit = None;
        self.mark_dirty();
    }
}
