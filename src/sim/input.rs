//! Typing buffer and prefix matching
//!
//! Each appended character is resolved against the live kana first (exact
//! match destroys one) and then against the whole vocabulary (a buffer that
//! cannot grow into any reading is a dead end and gets cleared).

use serde::{Deserialize, Serialize};

use super::state::{EntityId, FallingEntity};
use super::vocabulary::Vocabulary;
use crate::error::{ConfigError, ConfigResult};

/// Keyboard input forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Backspace,
    /// Drop the whole buffer (Escape)
    Clear,
}

/// Outcome of resolving the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Buffer equals this live kana's romaji
    Matched(EntityId),
    /// Buffer cannot become any reading
    DeadEnd,
    /// Keep typing
    Pending,
}

/// Lowercase letters accepted into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    mask: u32,
}

impl Alphabet {
    pub fn new(letters: &str) -> ConfigResult<Self> {
        let mut mask = 0u32;
        for c in letters.chars() {
            if !c.is_ascii_lowercase() {
                return Err(ConfigError::Invalid {
                    field: "alphabet",
                    reason: format!("'{c}' is not a lowercase ASCII letter"),
                });
            }
            mask |= Self::bit(c);
        }
        if mask == 0 {
            return Err(ConfigError::Invalid {
                field: "alphabet",
                reason: "must contain at least one letter".into(),
            });
        }
        Ok(Self { mask })
    }

    #[inline]
    fn bit(c: char) -> u32 {
        1 << (c as u32 - 'a' as u32)
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii_lowercase() && self.mask & Self::bit(c) != 0
    }

    /// Normalize a typed character, or None if it should be ignored
    pub fn accept(&self, c: char) -> Option<char> {
        let c = c.to_ascii_lowercase();
        self.contains(c).then_some(c)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self { mask: (1 << 26) - 1 }
    }
}

/// How a key changed the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEdit {
    Appended,
    Truncated,
    Cleared,
}

/// The player's in-progress reading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Apply a key; None when the key was ignored
    pub fn apply(&mut self, key: Key, alphabet: &Alphabet) -> Option<BufferEdit> {
        match key {
            Key::Char(c) => {
                let c = alphabet.accept(c)?;
                self.text.push(c);
                Some(BufferEdit::Appended)
            }
            Key::Backspace => {
                self.text.pop()?;
                Some(BufferEdit::Truncated)
            }
            Key::Clear => {
                if self.text.is_empty() {
                    return None;
                }
                self.text.clear();
                Some(BufferEdit::Cleared)
            }
        }
    }
}

/// Lowest kana on screen; the first one seen wins on equal y
pub fn most_urgent<'a>(candidates: impl Iterator<Item = &'a FallingEntity>) -> Option<&'a FallingEntity> {
    candidates.fold(None, |best, e| match best {
        Some(b) if b.pos.y >= e.pos.y => Some(b),
        _ => Some(e),
    })
}

/// Resolve `buffer` against the live kana and the vocabulary
pub fn resolve(buffer: &str, live: &[FallingEntity], vocabulary: &Vocabulary) -> Verdict {
    if buffer.is_empty() {
        return Verdict::Pending;
    }

    let target = most_urgent(live.iter().filter(|e| !e.resolved && e.romaji == buffer));

    if let Some(entity) = target {
        Verdict::Matched(entity.id)
    } else if vocabulary.has_prefix(buffer) {
        Verdict::Pending
    } else {
        Verdict::DeadEnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::vocabulary::VocabularyEntry;
    use glam::Vec2;

    fn vocab(words: &[&str]) -> Vocabulary {
        Vocabulary::new(words.iter().map(|w| VocabularyEntry::new(*w, &["・"])).collect()).unwrap()
    }

    fn entity(id: EntityId, romaji: &str, y: f32) -> FallingEntity {
        FallingEntity::new(id, romaji, "・", Vec2::new(100.0, y), 80.0)
    }

    #[test]
    fn test_tie_break_prefers_lowest() {
        let v = vocab(&["a", "ka", "ki"]);
        let live = [entity(1, "ka", 500.0), entity(2, "ka", 800.0)];
        assert_eq!(resolve("ka", &live, &v), Verdict::Matched(2));
    }

    #[test]
    fn test_tie_break_equal_y_keeps_first() {
        let v = vocab(&["ka"]);
        let live = [entity(4, "ka", 300.0), entity(9, "ka", 300.0)];
        assert_eq!(resolve("ka", &live, &v), Verdict::Matched(4));
    }

    #[test]
    fn test_partial_prefix_is_pending() {
        let v = vocab(&["a", "ka", "ki"]);
        assert_eq!(resolve("k", &[], &v), Verdict::Pending);
    }

    #[test]
    fn test_dead_end() {
        let v = vocab(&["a", "ka"]);
        assert_eq!(resolve("z", &[], &v), Verdict::DeadEnd);
        assert_eq!(resolve("kaa", &[], &v), Verdict::DeadEnd);
    }

    #[test]
    fn test_empty_buffer_is_pending() {
        let v = vocab(&["a"]);
        let live = [entity(1, "a", 10.0)];
        assert_eq!(resolve("", &live, &v), Verdict::Pending);
        assert_eq!(resolve("", &[], &v), Verdict::Pending);
    }

    #[test]
    fn test_word_without_live_kana_stays_pending() {
        // Valid reading whose kana is not on screen yet
        let v = vocab(&["a", "ka"]);
        let live = [entity(1, "a", 10.0)];
        assert_eq!(resolve("ka", &live, &v), Verdict::Pending);
    }

    #[test]
    fn test_resolved_entities_are_ignored() {
        let v = vocab(&["ka"]);
        let mut hit = entity(1, "ka", 700.0);
        hit.resolved = true;
        let live = [hit, entity(2, "ka", 100.0)];
        assert_eq!(resolve("ka", &live, &v), Verdict::Matched(2));
    }

    #[test]
    fn test_alphabet_accepts_letters_only() {
        let abc = Alphabet::default();
        assert_eq!(abc.accept('K'), Some('k'));
        assert_eq!(abc.accept('1'), None);
        assert_eq!(abc.accept(' '), None);
        assert_eq!(abc.accept('あ'), None);

        let vowels = Alphabet::new("aeiou").unwrap();
        assert_eq!(vowels.accept('E'), Some('e'));
        assert_eq!(vowels.accept('k'), None);
        assert!(Alphabet::new("").is_err());
        assert!(Alphabet::new("aB").is_err());
    }

    #[test]
    fn test_buffer_edits() {
        let abc = Alphabet::default();
        let mut buf = InputBuffer::default();
        assert_eq!(buf.apply(Key::Backspace, &abc), None);
        assert_eq!(buf.apply(Key::Clear, &abc), None);
        assert_eq!(buf.apply(Key::Char('-'), &abc), None);
        assert_eq!(buf.apply(Key::Char('S'), &abc), Some(BufferEdit::Appended));
        assert_eq!(buf.apply(Key::Char('h'), &abc), Some(BufferEdit::Appended));
        assert_eq!(buf.as_str(), "sh");
        assert_eq!(buf.apply(Key::Backspace, &abc), Some(BufferEdit::Truncated));
        assert_eq!(buf.as_str(), "s");
        assert_eq!(buf.apply(Key::Clear, &abc), Some(BufferEdit::Cleared));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_backspace_to_empty() {
        let abc = Alphabet::default();
        let mut buf = InputBuffer::default();
        buf.apply(Key::Char('k'), &abc);
        assert_eq!(buf.apply(Key::Backspace, &abc), Some(BufferEdit::Truncated));
        assert!(buf.is_empty());
        assert_eq!(buf.apply(Key::Backspace, &abc), None);
        assert!(buf.is_empty());
    }
}
