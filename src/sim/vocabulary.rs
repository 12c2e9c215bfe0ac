//! Kana tables and the active vocabulary
//!
//! A vocabulary is the set of romaji the player may type, each with one or
//! two display glyphs. It is built from one or more kana sets plus optional
//! custom entries, and rejects duplicate romaji.

use std::collections::BTreeSet;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// A row of a built-in kana table: (romaji, hiragana, katakana)
pub type KanaRow = (&'static str, &'static str, &'static str);

/// Gojūon, including ん
pub const BASIC_KANA: &[KanaRow] = &[
    ("a", "あ", "ア"), ("i", "い", "イ"), ("u", "う", "ウ"), ("e", "え", "エ"), ("o", "お", "オ"),
    ("ka", "か", "カ"), ("ki", "き", "キ"), ("ku", "く", "ク"), ("ke", "け", "ケ"), ("ko", "こ", "コ"),
    ("sa", "さ", "サ"), ("shi", "し", "シ"), ("su", "す", "ス"), ("se", "せ", "セ"), ("so", "そ", "ソ"),
    ("ta", "た", "タ"), ("chi", "ち", "チ"), ("tsu", "つ", "ツ"), ("te", "て", "テ"), ("to", "と", "ト"),
    ("na", "な", "ナ"), ("ni", "に", "ニ"), ("nu", "ぬ", "ヌ"), ("ne", "ね", "ネ"), ("no", "の", "ノ"),
    ("ha", "は", "ハ"), ("hi", "ひ", "ヒ"), ("fu", "ふ", "フ"), ("he", "へ", "ヘ"), ("ho", "ほ", "ホ"),
    ("ma", "ま", "マ"), ("mi", "み", "ミ"), ("mu", "む", "ム"), ("me", "め", "メ"), ("mo", "も", "モ"),
    ("ya", "や", "ヤ"), ("yu", "ゆ", "ユ"), ("yo", "よ", "ヨ"),
    ("ra", "ら", "ラ"), ("ri", "り", "リ"), ("ru", "る", "ル"), ("re", "れ", "レ"), ("ro", "ろ", "ロ"),
    ("wa", "わ", "ワ"), ("wo", "を", "ヲ"),
    ("n", "ん", "ン"),
];

/// Voiced and half-voiced kana. ぢ and づ are left out: their Hepburn
/// readings collide with じ and ず.
pub const DAKUTEN_KANA: &[KanaRow] = &[
    ("ga", "が", "ガ"), ("gi", "ぎ", "ギ"), ("gu", "ぐ", "グ"), ("ge", "げ", "ゲ"), ("go", "ご", "ゴ"),
    ("za", "ざ", "ザ"), ("ji", "じ", "ジ"), ("zu", "ず", "ズ"), ("ze", "ぜ", "ゼ"), ("zo", "ぞ", "ゾ"),
    ("da", "だ", "ダ"), ("de", "で", "デ"), ("do", "ど", "ド"),
    ("ba", "ば", "バ"), ("bi", "び", "ビ"), ("bu", "ぶ", "ブ"), ("be", "べ", "ベ"), ("bo", "ぼ", "ボ"),
    ("pa", "ぱ", "パ"), ("pi", "ぴ", "ピ"), ("pu", "ぷ", "プ"), ("pe", "ぺ", "ペ"), ("po", "ぽ", "ポ"),
];

/// Contracted sounds
pub const YOUON_KANA: &[KanaRow] = &[
    ("kya", "きゃ", "キャ"), ("kyu", "きゅ", "キュ"), ("kyo", "きょ", "キョ"),
    ("sha", "しゃ", "シャ"), ("shu", "しゅ", "シュ"), ("sho", "しょ", "ショ"),
    ("cha", "ちゃ", "チャ"), ("chu", "ちゅ", "チュ"), ("cho", "ちょ", "チョ"),
    ("nya", "にゃ", "ニャ"), ("nyu", "にゅ", "ニュ"), ("nyo", "にょ", "ニョ"),
    ("hya", "ひゃ", "ヒャ"), ("hyu", "ひゅ", "ヒュ"), ("hyo", "ひょ", "ヒョ"),
    ("mya", "みゃ", "ミャ"), ("myu", "みゅ", "ミュ"), ("myo", "みょ", "ミョ"),
    ("rya", "りゃ", "リャ"), ("ryu", "りゅ", "リュ"), ("ryo", "りょ", "リョ"),
    ("gya", "ぎゃ", "ギャ"), ("gyu", "ぎゅ", "ギュ"), ("gyo", "ぎょ", "ギョ"),
    ("ja", "じゃ", "ジャ"), ("ju", "じゅ", "ジュ"), ("jo", "じょ", "ジョ"),
    ("bya", "びゃ", "ビャ"), ("byu", "びゅ", "ビュ"), ("byo", "びょ", "ビョ"),
    ("pya", "ぴゃ", "ピャ"), ("pyu", "ぴゅ", "ピュ"), ("pyo", "ぴょ", "ピョ"),
];

/// Built-in kana sets that can be combined into a vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KanaSet {
    Basic,
    Dakuten,
    Youon,
}

impl KanaSet {
    pub fn rows(&self) -> &'static [KanaRow] {
        match self {
            KanaSet::Basic => BASIC_KANA,
            KanaSet::Dakuten => DAKUTEN_KANA,
            KanaSet::Youon => YOUON_KANA,
        }
    }
}

/// Which scripts a vocabulary carries glyphs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptMode {
    Hiragana,
    Katakana,
    #[default]
    Both,
}

impl ScriptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptMode::Hiragana => "hiragana",
            ScriptMode::Katakana => "katakana",
            ScriptMode::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hiragana" | "hira" => Some(ScriptMode::Hiragana),
            "katakana" | "kata" => Some(ScriptMode::Katakana),
            "both" | "mixed" => Some(ScriptMode::Both),
            _ => None,
        }
    }
}

/// Script currently used to draw new kana
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Script {
    Hiragana,
    Katakana,
}

impl Script {
    pub fn toggled(self) -> Self {
        match self {
            Script::Hiragana => Script::Katakana,
            Script::Katakana => Script::Hiragana,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Hiragana => "HIRAGANA",
            Script::Katakana => "KATAKANA",
        }
    }
}

/// A typeable reading and its display forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub romaji: String,
    /// One glyph, or a hiragana/katakana pair
    pub glyphs: Vec<String>,
}

impl VocabularyEntry {
    pub fn new(romaji: impl Into<String>, glyphs: &[&str]) -> Self {
        Self {
            romaji: romaji.into(),
            glyphs: glyphs.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn from_row(row: &KanaRow, mode: ScriptMode) -> Self {
        let (romaji, hira, kata) = *row;
        match mode {
            ScriptMode::Hiragana => Self::new(romaji, &[hira]),
            ScriptMode::Katakana => Self::new(romaji, &[kata]),
            ScriptMode::Both => Self::new(romaji, &[hira, kata]),
        }
    }

    /// Glyph to draw for the active script
    pub fn glyph(&self, script: Script) -> &str {
        let idx = match script {
            Script::Hiragana => 0,
            Script::Katakana => 1,
        };
        self.glyphs
            .get(idx)
            .or_else(|| self.glyphs.first())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Validated set of typeable romaji
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Entries in registration order (spawn selection indexes into this)
    entries: Vec<VocabularyEntry>,
    /// Sorted romaji for prefix queries
    index: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new(entries: Vec<VocabularyEntry>) -> ConfigResult<Self> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }

        let mut index = BTreeSet::new();
        for entry in &entries {
            if entry.romaji.is_empty() || !entry.romaji.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(ConfigError::InvalidRomaji(entry.romaji.clone()));
            }
            if !(1..=2).contains(&entry.glyphs.len()) {
                return Err(ConfigError::GlyphCount {
                    romaji: entry.romaji.clone(),
                    count: entry.glyphs.len(),
                });
            }
            if !index.insert(entry.romaji.clone()) {
                return Err(ConfigError::DuplicateRomaji(entry.romaji.clone()));
            }
        }

        Ok(Self { entries, index })
    }

    /// Concatenate kana sets (in order) followed by custom entries
    pub fn from_sets(sets: &[KanaSet], mode: ScriptMode, extra: &[VocabularyEntry]) -> ConfigResult<Self> {
        let entries = sets
            .iter()
            .flat_map(|set| set.rows().iter())
            .map(|row| VocabularyEntry::from_row(row, mode))
            .chain(extra.iter().cloned())
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, romaji: &str) -> bool {
        self.index.contains(romaji)
    }

    /// True if some romaji starts with `prefix` (including an exact match)
    pub fn has_prefix(&self, prefix: &str) -> bool {
        // The smallest key >= prefix is the only candidate that can start with it
        self.index
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|r| r.starts_with(prefix))
    }
}
