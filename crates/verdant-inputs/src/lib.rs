//! Salsa inputs: the source files the rest of the pipeline derives from.

pub use line_index::{LineCol, LineIndex};
use text_size::TextSize;

/// A source file known to the database.
#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: camino::Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl File {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn salsa::Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }
}

impl File {
    /// Zero-based line and byte column of `offset`.
    pub fn line_col(self, db: &dyn salsa::Database, offset: TextSize) -> LineCol {
        self.line_index(db).line_col(offset)
    }

    /// Byte offset of a zero-based line and column, clamped to the line's end.
    pub fn offset(self, db: &dyn salsa::Database, line_col: LineCol) -> Option<TextSize> {
        let line = self.line_index(db).line(line_col.line)?;
        Some((line.start() + TextSize::new(line_col.col)).min(line.end()))
    }
}
