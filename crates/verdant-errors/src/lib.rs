use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;
use text_size::TextSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
    severity: Severity,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range, severity: Severity::Error }
    }

    pub fn warning(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range, severity: Severity::Warning }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Moves the diagnostic by `offset` bytes, used when the text before it
    /// grows.
    pub fn shifted_forward(mut self, offset: TextSize) -> Self {
        self.range += offset;
        self
    }

    /// Moves the diagnostic back by `offset` bytes.
    pub fn shifted_back(mut self, offset: TextSize) -> Self {
        self.range -= offset;
        self
    }

    fn level(&self) -> Level {
        match self.severity {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
        }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = self.level().title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(self.level().span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use text_size::{TextRange, TextSize};

    use super::{Diagnostic, Renderer, Severity};

    #[test]
    fn render_points_at_range() {
        let text = "var x = ;\n";
        let diagnostic =
            Diagnostic::error("expected expression", TextRange::new(8.into(), 9.into()));

        let rendered = diagnostic.render(&Renderer::plain(), "main.vd", text).to_string();

        assert!(rendered.contains("error: expected expression"), "{rendered}");
        assert!(rendered.contains("main.vd"), "{rendered}");
        assert_eq!(diagnostic.severity(), Severity::Error);
    }

    #[test]
    fn shifting_keeps_length() {
        let diagnostic = Diagnostic::warning("unused", TextRange::new(2.into(), 5.into()));
        let moved = diagnostic.clone().shifted_forward(TextSize::new(3));

        assert_eq!(moved.range(), TextRange::new(5.into(), 8.into()));
        assert_eq!(moved.shifted_back(TextSize::new(3)), diagnostic);
    }
}
