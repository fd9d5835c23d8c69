//! Learning item catalog
//!
//! Static item lists for the five practice categories. Items are identified by
//! their position within a category; nothing here is persisted.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Speech language tag for the English categories
pub const ENGLISH_LANGUAGE: &str = "en-US";

/// Speech language tag for the Bangla categories
pub const BANGLA_LANGUAGE: &str = "bn-BD";

/// One flashcard's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningItem {
    /// Letter or numeral shown on the card
    pub character: &'static str,

    /// Example word (e.g. "Apple" for "A")
    pub word: Option<&'static str>,

    /// Romanized pronunciation hint
    pub english_pronunciation: Option<&'static str>,

    /// Image asset reference
    pub image: &'static str,
}

impl LearningItem {
    /// Text the learner is expected to pronounce
    ///
    /// English numbers are checked against their word ("One"), everything
    /// else against the character itself.
    #[must_use]
    pub fn expected_text(&self, category: Category) -> &'static str {
        match (category, self.word) {
            (Category::EnglishNumbers, Some(word)) => word,
            _ => self.character,
        }
    }
}

/// Practice category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// স্বরবর্ণ
    BanglaVowels,
    /// ব্যঞ্জনবর্ণ
    BanglaConsonants,
    /// English Alphabet
    EnglishAlphabet,
    /// বাংলা সংখ্যা
    BanglaNumbers,
    /// English Numbers
    EnglishNumbers,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Self; 5] = [
        Self::BanglaVowels,
        Self::BanglaConsonants,
        Self::EnglishAlphabet,
        Self::BanglaNumbers,
        Self::EnglishNumbers,
    ];

    /// Display label
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::BanglaVowels => "স্বরবর্ণ",
            Self::BanglaConsonants => "ব্যঞ্জনবর্ণ",
            Self::EnglishAlphabet => "English Alphabet",
            Self::BanglaNumbers => "বাংলা সংখ্যা",
            Self::EnglishNumbers => "English Numbers",
        }
    }

    /// Command-line identifier
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::BanglaVowels => "bangla-vowels",
            Self::BanglaConsonants => "bangla-consonants",
            Self::EnglishAlphabet => "english-alphabet",
            Self::BanglaNumbers => "bangla-numbers",
            Self::EnglishNumbers => "english-numbers",
        }
    }

    /// Whether items in this category are English
    #[must_use]
    pub const fn is_english(self) -> bool {
        matches!(self, Self::EnglishAlphabet | Self::EnglishNumbers)
    }

    /// Language tag used for reference speech
    #[must_use]
    pub const fn language_tag(self) -> &'static str {
        if self.is_english() {
            ENGLISH_LANGUAGE
        } else {
            BANGLA_LANGUAGE
        }
    }

    /// Items in this category
    #[must_use]
    pub const fn items(self) -> &'static [LearningItem] {
        match self {
            Self::BanglaVowels => BANGLA_VOWELS,
            Self::BanglaConsonants => BANGLA_CONSONANTS,
            Self::EnglishAlphabet => ENGLISH_ALPHABET,
            Self::BanglaNumbers => BANGLA_NUMBERS,
            Self::EnglishNumbers => ENGLISH_NUMBERS,
        }
    }

    /// Look up an item by position
    ///
    /// # Errors
    ///
    /// Returns error if the index is past the end of the category
    pub fn item(self, index: usize) -> Result<LearningItem> {
        self.items().get(index).copied().ok_or_else(|| {
            Error::Catalog(format!(
                "{} has {} items, no item at index {index}",
                self.slug(),
                self.items().len()
            ))
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == needle || c.title() == s.trim())
            .ok_or_else(|| Error::Catalog(format!("unknown category: {s}")))
    }
}

macro_rules! item {
    ($dir:literal, $ch:literal, $word:literal) => {
        LearningItem {
            character: $ch,
            word: Some($word),
            english_pronunciation: None,
            image: concat!("images/", $dir, "/", $ch, ".png"),
        }
    };
    ($dir:literal, $ch:literal, $word:literal, $pron:literal) => {
        LearningItem {
            character: $ch,
            word: Some($word),
            english_pronunciation: Some($pron),
            image: concat!("images/", $dir, "/", $ch, ".png"),
        }
    };
}

macro_rules! vowel {
    ($ch:literal, $pron:literal) => {
        LearningItem {
            character: $ch,
            word: None,
            english_pronunciation: Some($pron),
            image: concat!("images/bangla-vowels/", $ch, ".png"),
        }
    };
}

static BANGLA_VOWELS: &[LearningItem] = &[
    vowel!("অ", "o"),
    vowel!("আ", "a"),
    vowel!("ই", "i"),
    vowel!("ঈ", "ee"),
    vowel!("উ", "u"),
    vowel!("ঊ", "oo"),
    vowel!("ঋ", "ri"),
    vowel!("এ", "e"),
    vowel!("ঐ", "oi"),
    vowel!("ও", "o"),
    vowel!("ঔ", "ou"),
];

static BANGLA_CONSONANTS: &[LearningItem] = &[
    item!("bangla-consonants", "ক", "কলা", "ko"),
    item!("bangla-consonants", "খ", "খরগোশ", "kho"),
    item!("bangla-consonants", "গ", "গরু", "go"),
    item!("bangla-consonants", "ঘ", "ঘড়ি", "gho"),
    item!("bangla-consonants", "ঙ", "ব্যাঙ", "umo"),
    item!("bangla-consonants", "চ", "চশমা", "cho"),
    item!("bangla-consonants", "ছ", "ছাতা", "chho"),
    item!("bangla-consonants", "জ", "জাহাজ", "jo"),
    item!("bangla-consonants", "ঝ", "ঝিনুক", "jho"),
    item!("bangla-consonants", "ঞ", "মিঞা", "niyo"),
    item!("bangla-consonants", "ট", "টমেটো", "to"),
    item!("bangla-consonants", "ঠ", "ঠেলাগাড়ি", "tho"),
    item!("bangla-consonants", "ড", "ডাব", "do"),
    item!("bangla-consonants", "ঢ", "ঢোল", "dho"),
    item!("bangla-consonants", "ণ", "হরিণ", "murdhonno no"),
    item!("bangla-consonants", "ত", "তরমুজ", "to"),
    item!("bangla-consonants", "থ", "থালা", "tho"),
    item!("bangla-consonants", "দ", "দরজা", "do"),
    item!("bangla-consonants", "ধ", "ধান", "dho"),
    item!("bangla-consonants", "ন", "নৌকা", "no"),
    item!("bangla-consonants", "প", "পাখি", "po"),
    item!("bangla-consonants", "ফ", "ফুল", "pho"),
    item!("bangla-consonants", "ব", "বই", "bo"),
    item!("bangla-consonants", "ভ", "ভালুক", "bho"),
    item!("bangla-consonants", "ম", "মাছ", "mo"),
    item!("bangla-consonants", "য", "যাঁতা", "jo"),
    item!("bangla-consonants", "র", "রকেট", "ro"),
    item!("bangla-consonants", "ল", "লাটিম", "lo"),
    item!("bangla-consonants", "শ", "শাপলা", "sho"),
    item!("bangla-consonants", "ষ", "ষাঁড়", "sho"),
    item!("bangla-consonants", "স", "সাপ", "so"),
    item!("bangla-consonants", "হ", "হাতি", "ho"),
    item!("bangla-consonants", "ড়", "পাহাড়", "ro"),
    item!("bangla-consonants", "ঢ়", "আষাঢ়", "rho"),
    item!("bangla-consonants", "য়", "ময়ূর", "yo"),
    item!("bangla-consonants", "ৎ", "উৎসব", "khondo to"),
    item!("bangla-consonants", "ং", "রং", "onushar"),
    item!("bangla-consonants", "ঃ", "দুঃখ", "bishorgo"),
    item!("bangla-consonants", "ঁ", "চাঁদ", "chondrobindu"),
];

static ENGLISH_ALPHABET: &[LearningItem] = &[
    item!("english-alphabet", "A", "Apple"),
    item!("english-alphabet", "B", "Ball"),
    item!("english-alphabet", "C", "Cat"),
    item!("english-alphabet", "D", "Dog"),
    item!("english-alphabet", "E", "Elephant"),
    item!("english-alphabet", "F", "Fish"),
    item!("english-alphabet", "G", "Goat"),
    item!("english-alphabet", "H", "Hat"),
    item!("english-alphabet", "I", "Ice cream"),
    item!("english-alphabet", "J", "Jug"),
    item!("english-alphabet", "K", "Kite"),
    item!("english-alphabet", "L", "Lion"),
    item!("english-alphabet", "M", "Mango"),
    item!("english-alphabet", "N", "Nest"),
    item!("english-alphabet", "O", "Orange"),
    item!("english-alphabet", "P", "Parrot"),
    item!("english-alphabet", "Q", "Queen"),
    item!("english-alphabet", "R", "Rabbit"),
    item!("english-alphabet", "S", "Sun"),
    item!("english-alphabet", "T", "Tiger"),
    item!("english-alphabet", "U", "Umbrella"),
    item!("english-alphabet", "V", "Van"),
    item!("english-alphabet", "W", "Watch"),
    item!("english-alphabet", "X", "Xylophone"),
    item!("english-alphabet", "Y", "Yak"),
    item!("english-alphabet", "Z", "Zebra"),
];

static BANGLA_NUMBERS: &[LearningItem] = &[
    item!("bangla-numbers", "০", "শূন্য", "shunno"),
    item!("bangla-numbers", "১", "এক", "ek"),
    item!("bangla-numbers", "২", "দুই", "dui"),
    item!("bangla-numbers", "৩", "তিন", "tin"),
    item!("bangla-numbers", "৪", "চার", "char"),
    item!("bangla-numbers", "৫", "পাঁচ", "pach"),
    item!("bangla-numbers", "৬", "ছয়", "chhoy"),
    item!("bangla-numbers", "৭", "সাত", "shat"),
    item!("bangla-numbers", "৮", "আট", "at"),
    item!("bangla-numbers", "৯", "নয়", "noy"),
    item!("bangla-numbers", "১০", "দশ", "dosh"),
];

static ENGLISH_NUMBERS: &[LearningItem] = &[
    item!("english-numbers", "0", "Zero"),
    item!("english-numbers", "1", "One"),
    item!("english-numbers", "2", "Two"),
    item!("english-numbers", "3", "Three"),
    item!("english-numbers", "4", "Four"),
    item!("english-numbers", "5", "Five"),
    item!("english-numbers", "6", "Six"),
    item!("english-numbers", "7", "Seven"),
    item!("english-numbers", "8", "Eight"),
    item!("english-numbers", "9", "Nine"),
    item!("english-numbers", "10", "Ten"),
];
