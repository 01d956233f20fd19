//! Edit coordinator for one open document.
//!
//! Edits are applied to the text buffer right away, while the syntax tree is
//! brought up to date by a [`ReparseTask`] that may run on another thread.
//! Every edit bumps a generation counter; a task remembers the generation it
//! was started for and its result is only installed while that generation is
//! still current, so the last edit always wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use verdant_errors::Diagnostic;
use verdant_yellow::SyntaxTree;

use crate::reparsing::{ReparseKind, reparse};
use crate::{EditError, TextEdit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    /// The tree matches the text.
    Clean,
    /// The text has edits the tree does not reflect yet.
    Edited,
    /// A reparse has been handed out and not installed yet.
    Reparsing,
}

#[derive(Debug)]
pub struct Document {
    text: String,
    tree: Arc<SyntaxTree>,
    diagnostics: Arc<[Diagnostic]>,
    pending: Vec<TextEdit>,
    state: DocumentState,
    generation: Arc<AtomicU64>,
}

/// A reparse was outdated by a newer edit or already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reparse for generation {reparsed} is stale, the document is at generation {current}")]
pub struct StaleReparse {
    pub reparsed: u64,
    pub current: u64,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let parse = crate::parse(&text);
        let tree = Arc::new(parse.syntax_tree(&text));

        Self {
            text,
            tree,
            diagnostics: parse.diagnostics().into(),
            pending: Vec::new(),
            state: DocumentState::Clean,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current text, including edits the tree does not reflect yet.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last installed tree. Lags behind [`Document::text`] unless the
    /// document is clean.
    pub fn syntax_tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn shared_tree(&self) -> Arc<SyntaxTree> {
        Arc::clone(&self.tree)
    }

    /// Diagnostics of the last installed tree.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn pending_edits(&self) -> &[TextEdit] {
        &self.pending
    }

    /// Applies `edit` to the text. Any reparse in flight becomes stale.
    pub fn apply_edit(&mut self, edit: TextEdit) -> Result<(), EditError> {
        edit.validate(&self.text)?;
        edit.apply(&mut self.text);
        self.pending.push(edit);

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if self.state == DocumentState::Reparsing {
            tracing::debug!(generation, "edit supersedes the reparse in flight");
        }
        self.state = DocumentState::Edited;
        Ok(())
    }

    /// Hands out a task bringing the tree up to date with the current text,
    /// or `None` when the document is clean.
    pub fn begin_reparse(&mut self) -> Option<ReparseTask> {
        if self.state == DocumentState::Clean {
            return None;
        }

        self.state = DocumentState::Reparsing;
        Some(ReparseTask {
            generation: self.generation(),
            latest: Arc::clone(&self.generation),
            tree: Arc::clone(&self.tree),
            diagnostics: Arc::clone(&self.diagnostics),
            edits: self.pending.clone(),
            text: self.text.clone(),
        })
    }

    /// Installs the result of a task started for the current generation.
    pub fn install(&mut self, outcome: ReparseOutcome) -> Result<(), StaleReparse> {
        let current = self.generation();
        if outcome.generation != current || self.state == DocumentState::Clean {
            return Err(StaleReparse { reparsed: outcome.generation, current });
        }

        self.tree = outcome.tree;
        self.diagnostics = outcome.diagnostics;
        self.pending.clear();
        self.state = DocumentState::Clean;
        Ok(())
    }

    /// Reparses on the calling thread if needed.
    pub fn sync(&mut self) -> &SyntaxTree {
        if let Some(outcome) = self.begin_reparse().and_then(ReparseTask::run) {
            let installed = self.install(outcome);
            debug_assert!(installed.is_ok(), "{installed:?}");
        }
        &self.tree
    }
}

/// A self-contained reparse job. It can be sent to another thread; the
/// document keeps accepting edits meanwhile.
#[derive(Debug)]
pub struct ReparseTask {
    generation: u64,
    latest: Arc<AtomicU64>,
    tree: Arc<SyntaxTree>,
    diagnostics: Arc<[Diagnostic]>,
    edits: Vec<TextEdit>,
    text: String,
}

#[derive(Debug, Clone)]
pub struct ReparseOutcome {
    generation: u64,
    tree: Arc<SyntaxTree>,
    diagnostics: Arc<[Diagnostic]>,
    kind: ReparseKind,
}

impl ReparseOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn kind(&self) -> ReparseKind {
        self.kind
    }
}

impl ReparseTask {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer edit has arrived since the task was created.
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }

    /// Runs the reparse. Returns `None` if the task was cancelled, checking
    /// before and after the expensive part.
    pub fn run(self) -> Option<ReparseOutcome> {
        let _span = tracing::debug_span!("reparse", generation = self.generation).entered();
        if self.is_cancelled() {
            tracing::debug!("cancelled before starting");
            return None;
        }

        let (parse, kind) = match self.edits.as_slice() {
            [edit] => {
                let reparsed = reparse(&self.tree, &self.diagnostics, edit);
                debug_assert_eq!(reparsed.text, self.text);
                (reparsed.parse, reparsed.kind)
            }
            edits => {
                tracing::debug!(edits = edits.len(), "coalescing edits into a full parse");
                (crate::parse(&self.text), ReparseKind::Full)
            }
        };

        if self.is_cancelled() {
            tracing::debug!("cancelled while parsing");
            return None;
        }

        let tree = Arc::new(parse.syntax_tree(&self.text));
        Some(ReparseOutcome {
            generation: self.generation,
            tree,
            diagnostics: parse.diagnostics().into(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use text_size::{TextRange, TextSize};

    use super::{Document, DocumentState, StaleReparse};
    use crate::{ReparseKind, TextEdit};

    fn insert(offset: u32, text: &str) -> TextEdit {
        TextEdit::insert(TextSize::new(offset), text)
    }

    #[test]
    fn sync_brings_the_tree_up_to_date() {
        let mut document = Document::new("var x = 1;");
        assert_eq!(document.state(), DocumentState::Clean);

        document.apply_edit(insert(9, "0")).unwrap();
        assert_eq!(document.state(), DocumentState::Edited);
        assert_eq!(document.syntax_tree().text(), "var x = 1;");

        assert_eq!(document.sync().text(), "var x = 10;");
        assert_eq!(document.state(), DocumentState::Clean);
        assert!(document.pending_edits().is_empty());
    }

    #[test]
    fn last_edit_wins() {
        let mut document = Document::new("var x = 1;");
        document.apply_edit(insert(9, "0")).unwrap();
        let first = document.begin_reparse().unwrap();

        document.apply_edit(insert(10, "0")).unwrap();
        assert!(first.is_cancelled());
        assert!(first.run().is_none());

        let second = document.begin_reparse().unwrap();
        let outcome = thread::spawn(move || second.run()).join().unwrap().unwrap();
        assert_eq!(outcome.kind(), ReparseKind::Full);
        document.install(outcome).unwrap();

        assert_eq!(document.syntax_tree().text(), "var x = 100;");
        assert_eq!(document.state(), DocumentState::Clean);
    }

    #[test]
    fn stale_outcome_is_rejected() {
        let mut document = Document::new("var x = 1;");
        document.apply_edit(insert(9, "0")).unwrap();
        let outcome = document.begin_reparse().unwrap().run().unwrap();
        assert_eq!(outcome.kind(), ReparseKind::Token);

        document.apply_edit(insert(0, " ")).unwrap();
        assert_eq!(document.install(outcome), Err(StaleReparse { reparsed: 1, current: 2 }));
        assert_eq!(document.syntax_tree().text(), "var x = 1;");

        document.sync();
        assert_eq!(document.syntax_tree().text(), " var x = 10;");
    }

    #[test]
    fn invalid_edit_leaves_the_document_alone() {
        let mut document = Document::new("var x;");
        let edit = TextEdit::delete(TextRange::new(4.into(), 40.into()));
        assert!(document.apply_edit(edit).is_err());
        assert_eq!(document.state(), DocumentState::Clean);
        assert_eq!(document.generation(), 0);
    }
}
