use text_size::{TextRange, TextSize};

/// Replaces `delete` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub delete: TextRange,
    pub insert: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {range:?} is out of bounds for a text of length {len:?}")]
    OutOfBounds { range: TextRange, len: TextSize },
    #[error("edit boundary {offset:?} is not on a char boundary")]
    NotCharBoundary { offset: TextSize },
}

impl TextEdit {
    pub fn replace(delete: TextRange, insert: impl Into<String>) -> Self {
        Self { delete, insert: insert.into() }
    }

    pub fn insert(offset: TextSize, insert: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), insert)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    pub fn insert_len(&self) -> TextSize {
        TextSize::of(self.insert.as_str())
    }

    /// Range the inserted text occupies after the edit.
    pub fn inserted_range(&self) -> TextRange {
        TextRange::at(self.delete.start(), self.insert_len())
    }

    /// Checks that the edit can be applied to `text`.
    pub fn validate(&self, text: &str) -> Result<(), EditError> {
        let len = TextSize::of(text);
        if self.delete.end() > len {
            return Err(EditError::OutOfBounds { range: self.delete, len });
        }

        for offset in [self.delete.start(), self.delete.end()] {
            if !text.is_char_boundary(offset.into()) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        Ok(())
    }

    /// Applies a validated edit in place.
    pub fn apply(&self, text: &mut String) {
        text.replace_range(std::ops::Range::<usize>::from(self.delete), &self.insert);
    }

    /// Maps an offset at or after the deleted range into the edited text.
    pub(crate) fn shift(&self, offset: TextSize) -> TextSize {
        debug_assert!(offset >= self.delete.end());
        offset - self.delete.end() + self.delete.start() + self.insert_len()
    }
}

#[cfg(test)]
mod tests {
    use text_size::{TextRange, TextSize};

    use super::{EditError, TextEdit};

    #[test]
    fn apply_replaces_range() {
        let mut text = String::from("var x = 1;");
        let edit = TextEdit::replace(TextRange::new(8.into(), 9.into()), "42");
        edit.validate(&text).unwrap();
        edit.apply(&mut text);
        assert_eq!(text, "var x = 42;");
        assert_eq!(edit.inserted_range(), TextRange::new(8.into(), 10.into()));
        assert_eq!(edit.shift(TextSize::new(9)), TextSize::new(10));
    }

    #[test]
    fn rejects_bad_ranges() {
        let text = "é";
        assert_eq!(
            TextEdit::delete(TextRange::new(0.into(), 5.into())).validate(text),
            Err(EditError::OutOfBounds { range: TextRange::new(0.into(), 5.into()), len: 2.into() })
        );
        assert_eq!(
            TextEdit::insert(1.into(), "x").validate(text),
            Err(EditError::NotCharBoundary { offset: 1.into() })
        );
    }
}
