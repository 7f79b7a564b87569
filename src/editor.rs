//! Word resolution from a document and a selection.
//!
//! A [`Document`] is plain text. A [`Selection`] with equal `anchor` and
//! `active` is a bare cursor. The selected text wins; an empty selection
//! falls back to the word under the cursor.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Common editor word definition: a signed decimal number, or a run of
/// anything but whitespace and punctuation.
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(-?\d*\.\d\w*)|([^`~!@#$%^&*()\-=+\[{\]}\\|;:'",.<>/?\s]+)"#)
        .expect("valid regex")
});

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Parses the one-based `LINE:COL` form used on the command line.
impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, column) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected LINE:COL, got '{s}'"))?;
        let line: usize = line
            .trim()
            .parse()
            .map_err(|_| format!("invalid line number: '{line}'"))?;
        let column: usize = column
            .trim()
            .parse()
            .map_err(|_| format!("invalid column number: '{column}'"))?;
        if line == 0 || column == 0 {
            return Err("line and column are 1-based".to_string());
        }
        Ok(Self::new(line - 1, column - 1))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A selection between `anchor` and `active`. `active` is where the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// An empty selection at `position`.
    pub fn cursor(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }
}

/// Parses `LINE:COL-LINE:COL`, or a single `LINE:COL` as a cursor.
impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((anchor, active)) => Ok(Self::new(anchor.parse()?, active.parse()?)),
            None => Ok(Self::cursor(s.parse()?)),
        }
    }
}

/// Text being looked at.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a document from `path`, or from stdin when `path` is `-`.
    pub fn read_from(path: &Path) -> Result<Self> {
        if path.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            return Ok(Self::new(text));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::new(text))
    }

    /// Selection covering the whole document.
    pub fn full_range(&self) -> Selection {
        let last = self.line_count() - 1;
        let columns = self.line(last).map(|l| l.chars().count()).unwrap_or(0);
        Selection::new(Position::default(), Position::new(last, columns))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Line content without its terminator. `None` past the last line.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.text
            .split('\n')
            .nth(index)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    /// Byte offset of `position`, clamped to the document.
    fn offset_of(&self, position: Position) -> usize {
        let mut offset = 0;
        for (index, raw) in self.text.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if index == position.line {
                return offset + byte_index(line, position.column);
            }
            offset += raw.len() + 1;
        }
        self.text.len()
    }

    /// Text covered by `selection`, in document order.
    pub fn text_in(&self, selection: &Selection) -> String {
        let start = self.offset_of(selection.start());
        let end = self.offset_of(selection.end());
        self.text[start..end].to_string()
    }

    /// Range of the word touching `position`, if any.
    ///
    /// A cursor right after a word's last character still counts as on it.
    pub fn word_range_at(&self, position: Position) -> Option<Selection> {
        let line = self.line(position.line)?;
        let cursor = byte_index(line, position.column);

        let found = WORD_PATTERN
            .find_iter(line)
            .find(|m| m.start() <= cursor && cursor <= m.end())?;

        Some(Selection::new(
            Position::new(position.line, line[..found.start()].chars().count()),
            Position::new(position.line, line[..found.end()].chars().count()),
        ))
    }
}

/// Byte index of character `column` in `line`, clamped to its length.
fn byte_index(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

/// The word to look up: the selected text if there is any, otherwise
/// the word under the cursor.
pub fn resolve_word(document: &Document, selection: &Selection) -> Option<String> {
    let selected = document.text_in(selection);
    let selected = selected.trim();
    if !selected.is_empty() {
        return Some(selected.to_string());
    }

    let range = document.word_range_at(selection.active)?;
    let word = document.text_in(&range);
    let word = word.trim();
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

/// What a document lookup resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentWord {
    Word(String),
    /// A position was given into piped input that turned out empty.
    NoDocument,
    NoWord,
}

/// Resolve the word to look up from `document`. Without a `selection`
/// the whole document is selected. `from_stdin` marks piped input, where
/// empty text means there was no document to point into.
pub fn word_from_document(
    document: &Document,
    selection: Option<Selection>,
    from_stdin: bool,
) -> DocumentWord {
    if from_stdin && selection.is_some() && document.text().is_empty() {
        return DocumentWord::NoDocument;
    }
    let selection = selection.unwrap_or_else(|| document.full_range());
    match resolve_word(document, &selection) {
        Some(word) => DocumentWord::Word(word),
        None => DocumentWord::NoWord,
    }
}
