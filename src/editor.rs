//! Cell editors and the per-column registry that creates them

use std::collections::HashMap;
use std::fmt;

use crate::table::CellValue;

/// Keys an editor understands while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// What the view needs from an editor: load a value, read it back, and
/// tell whether the current content can be committed.
pub trait CellEditor {
    fn get_value(&self) -> CellValue;
    fn set_value(&mut self, value: CellValue);
    fn is_valid(&self) -> bool {
        true
    }
    fn input(&mut self, _key: EditKey) {}
}

/// Single-line text editor. An empty buffer reads back as null.
/// Note: cursor is a character index, not a byte index
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    buffer: String,
    cursor: usize,
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl TextEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }
}

impl CellEditor for TextEditor {
    fn get_value(&self) -> CellValue {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.clone())
        }
    }

    fn set_value(&mut self, value: CellValue) {
        self.buffer = value.unwrap_or_default();
        self.cursor = self.char_count();
    }

    fn input(&mut self, key: EditKey) {
        match key {
            EditKey::Char(c) => {
                let at = byte_offset(&self.buffer, self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            }
            EditKey::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = byte_offset(&self.buffer, self.cursor);
                    self.buffer.remove(at);
                }
            }
            EditKey::Delete => {
                if self.cursor < self.char_count() {
                    let at = byte_offset(&self.buffer, self.cursor);
                    self.buffer.remove(at);
                }
            }
            EditKey::Left => self.cursor = self.cursor.saturating_sub(1),
            EditKey::Right => self.cursor = (self.cursor + 1).min(self.char_count()),
            EditKey::Home => self.cursor = 0,
            EditKey::End => self.cursor = self.char_count(),
        }
    }
}

/// Text editor that only commits numbers (or nothing)
#[derive(Debug, Clone, Default)]
pub struct NumberEditor {
    text: TextEditor,
}

impl NumberEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        self.text.text()
    }
}

impl CellEditor for NumberEditor {
    fn get_value(&self) -> CellValue {
        self.text.get_value().map(|s| s.trim().to_string())
    }

    fn set_value(&mut self, value: CellValue) {
        self.text.set_value(value);
    }

    fn is_valid(&self) -> bool {
        let text = self.text.text().trim();
        text.is_empty() || text.parse::<f64>().is_ok()
    }

    fn input(&mut self, key: EditKey) {
        self.text.input(key);
    }
}

pub type EditorFactory = Box<dyn Fn() -> Box<dyn CellEditor>>;

/// Chooses the editor for a column index. Columns without an entry get the
/// default factory, a [`TextEditor`] unless replaced.
pub struct EditorRegistry {
    columns: HashMap<usize, EditorFactory>,
    fallback: EditorFactory,
}

impl fmt::Debug for EditorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut columns: Vec<&usize> = self.columns.keys().collect();
        columns.sort();
        f.debug_struct("EditorRegistry")
            .field("columns", &columns)
            .finish()
    }
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            fallback: Box::new(|| Box::new(TextEditor::new()) as Box<dyn CellEditor>),
        }
    }

    pub fn set_default(&mut self, factory: impl Fn() -> Box<dyn CellEditor> + 'static) {
        self.fallback = Box::new(factory);
    }

    pub fn register(&mut self, col: usize, factory: impl Fn() -> Box<dyn CellEditor> + 'static) {
        self.columns.insert(col, Box::new(factory));
    }

    pub fn unregister(&mut self, col: usize) -> bool {
        self.columns.remove(&col).is_some()
    }

    pub fn has_editor(&self, col: usize) -> bool {
        self.columns.contains_key(&col)
    }

    pub fn create(&self, col: usize) -> Box<dyn CellEditor> {
        match self.columns.get(&col) {
            Some(factory) => factory(),
            None => (self.fallback)(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut dyn CellEditor, s: &str) {
        for c in s.chars() {
            editor.input(EditKey::Char(c));
        }
    }

    #[test]
    fn text_editor_edits_at_cursor() {
        let mut editor = TextEditor::new();
        editor.set_value(Some("héllo".to_string()));
        assert_eq!(editor.cursor(), 5);

        editor.input(EditKey::Home);
        editor.input(EditKey::Right);
        editor.input(EditKey::Delete);
        type_str(&mut editor, "e");
        assert_eq!(editor.text(), "hello");

        editor.input(EditKey::End);
        editor.input(EditKey::Backspace);
        assert_eq!(editor.get_value(), Some("hell".to_string()));
    }

    #[test]
    fn empty_text_is_null() {
        let mut editor = TextEditor::new();
        editor.set_value(Some("x".to_string()));
        editor.input(EditKey::Backspace);
        editor.input(EditKey::Backspace);
        assert_eq!(editor.get_value(), None);
    }

    #[test]
    fn number_editor_validates() {
        let mut editor = NumberEditor::new();
        assert!(editor.is_valid());
        type_str(&mut editor, "12.5");
        assert!(editor.is_valid());
        type_str(&mut editor, "x");
        assert!(!editor.is_valid());
    }

    #[test]
    fn registry_falls_back_to_default() {
        let mut registry = EditorRegistry::new();
        registry.register(2, || Box::new(NumberEditor::new()));

        let mut editor = registry.create(2);
        type_str(editor.as_mut(), "abc");
        assert!(!editor.is_valid());

        let mut editor = registry.create(0);
        type_str(editor.as_mut(), "abc");
        assert!(editor.is_valid());

        assert!(registry.unregister(2));
        assert!(!registry.has_editor(2));
    }
}
