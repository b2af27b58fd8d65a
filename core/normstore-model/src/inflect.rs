//! Type name inflection.
//!
//! Collections are keyed by the plural form of an entity type so that
//! `"article"` and `"articles"` address the same collection. The actual
//! singular/plural transform is a strategy ([`Inflector`]) so applications can
//! supply their own dictionary; [`EnglishInflector`] covers common English
//! nouns and takes extra irregulars for domain vocabulary.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A pair of pure string transforms between singular and plural nouns.
pub trait Inflector: Send + Sync {
    /// Plural form of `word`. Should return plural input unchanged.
    fn plural(&self, word: &str) -> String;

    /// Singular form of `word`. Should return singular input unchanged.
    fn singular(&self, word: &str) -> String;
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("datum", "data"),
    ("criterion", "criteria"),
    ("phenomenon", "phenomena"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("quiz", "quizzes"),
    ("crisis", "crises"),
    ("axis", "axes"),
    ("testis", "testes"),
    ("gas", "gases"),
    ("canvas", "canvases"),
    ("thesis", "theses"),
    ("cache", "caches"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("half", "halves"),
    ("wolf", "wolves"),
    ("shelf", "shelves"),
    ("self", "selves"),
    ("leaf", "leaves"),
    ("loaf", "loaves"),
    ("calf", "calves"),
    ("thief", "thieves"),
    ("movie", "movies"),
    ("cookie", "cookies"),
    ("zombie", "zombies"),
    ("echo", "echoes"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
];

const UNCOUNTABLE: &[&str] = &[
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "software",
    "species",
];

/// Rule-based English inflector with an irregular dictionary.
///
/// Compound names keep their head and inflect only the last word:
/// `blog_post` → `blog_posts`, `salesPerson` → `salesPeople`.
#[derive(Debug, Clone)]
pub struct EnglishInflector {
    plurals: HashMap<String, String>,
    singulars: HashMap<String, String>,
    uncountable: HashSet<String>,
}

impl Default for EnglishInflector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishInflector {
    /// An inflector loaded with the built-in dictionary.
    #[must_use]
    pub fn new() -> Self {
        let mut inflector = Self {
            plurals: HashMap::new(),
            singulars: HashMap::new(),
            uncountable: UNCOUNTABLE.iter().map(|w| (*w).to_string()).collect(),
        };
        for (singular, plural) in IRREGULAR {
            inflector.add_irregular(singular, plural);
        }
        inflector
    }

    /// Registers a domain-specific singular/plural pair, replacing any
    /// built-in entry for either word.
    #[must_use]
    pub fn with_irregular(mut self, singular: &str, plural: &str) -> Self {
        self.add_irregular(singular, plural);
        self
    }

    /// Registers a word whose plural equals its singular.
    #[must_use]
    pub fn with_uncountable(mut self, word: &str) -> Self {
        self.uncountable.insert(word.to_ascii_lowercase());
        self
    }

    fn add_irregular(&mut self, singular: &str, plural: &str) {
        let singular = singular.to_ascii_lowercase();
        let plural = plural.to_ascii_lowercase();
        self.plurals.insert(singular.clone(), plural.clone());
        self.singulars.insert(plural, singular);
    }

    fn plural_word(&self, word: &str) -> String {
        let lower = word.to_ascii_lowercase();
        if word.is_empty()
            || self.uncountable.contains(&lower)
            || self.singulars.contains_key(&lower)
        {
            return word.to_string();
        }
        if let Some(plural) = self.plurals.get(&lower) {
            return restore_case(word, plural);
        }
        let singular = self.singular_word(word);
        if singular != word && plural_by_rule(&singular) == word {
            return word.to_string();
        }
        plural_by_rule(word)
    }

    fn singular_word(&self, word: &str) -> String {
        let lower = word.to_ascii_lowercase();
        if word.is_empty()
            || self.uncountable.contains(&lower)
            || self.plurals.contains_key(&lower)
        {
            return word.to_string();
        }
        if let Some(singular) = self.singulars.get(&lower) {
            return restore_case(word, singular);
        }
        singular_by_rule(word)
    }
}

impl Inflector for EnglishInflector {
    fn plural(&self, word: &str) -> String {
        let (head, tail) = split_last_word(word);
        format!("{head}{}", self.plural_word(tail))
    }

    fn singular(&self, word: &str) -> String {
        let (head, tail) = split_last_word(word);
        format!("{head}{}", self.singular_word(tail))
    }
}

/// Splits a compound name before its last word (separator or camel hump).
fn split_last_word(word: &str) -> (&str, &str) {
    let start = word
        .rfind(['_', '-', ' ', '.'])
        .map_or(0, |i| i + 1);
    let tail = &word[start..];
    let hump = tail
        .char_indices()
        .skip(1)
        .filter(|(_, c)| c.is_ascii_uppercase())
        .map(|(i, _)| i)
        .last();
    match hump {
        Some(i) if tail[..i].chars().any(|c| c.is_ascii_lowercase()) => {
            word.split_at(start + i)
        }
        _ => word.split_at(start),
    }
}

fn restore_case(original: &str, replacement: &str) -> String {
    if original.len() > 1 && !original.chars().any(|c| c.is_ascii_lowercase()) {
        return replacement.to_ascii_uppercase();
    }
    if original.starts_with(|c: char| c.is_ascii_uppercase()) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

fn is_vowel(c: u8) -> bool {
    matches!(c.to_ascii_lowercase(), b'a' | b'e' | b'i' | b'o' | b'u')
}

fn ends_with_ci(word: &str, suffix: &str) -> bool {
    word.len() >= suffix.len()
        && word.as_bytes()[word.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

fn suffix_case(word: &str, suffix: &str) -> String {
    if word.chars().any(|c| c.is_ascii_lowercase()) {
        suffix.to_string()
    } else {
        suffix.to_ascii_uppercase()
    }
}

fn plural_by_rule(word: &str) -> String {
    let bytes = word.as_bytes();
    let n = bytes.len();
    if ends_with_ci(word, "sis") {
        return format!("{}{}", &word[..n - 2], suffix_case(word, "es"));
    }
    if n >= 2 && ends_with_ci(word, "y") && !is_vowel(bytes[n - 2]) {
        return format!("{}{}", &word[..n - 1], suffix_case(word, "ies"));
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| ends_with_ci(word, s)) {
        return format!("{word}{}", suffix_case(word, "es"));
    }
    format!("{word}{}", suffix_case(word, "s"))
}

fn singular_by_rule(word: &str) -> String {
    let bytes = word.as_bytes();
    let n = bytes.len();
    if n > 3 && ends_with_ci(word, "ies") && !is_vowel(bytes[n - 4]) {
        return format!("{}{}", &word[..n - 3], suffix_case(word, "y"));
    }
    if ends_with_ci(word, "yses") {
        return format!("{}{}", &word[..n - 2], suffix_case(word, "is"));
    }
    if ["sses", "xes", "ches", "shes", "zzes", "iases", "tlases", "tmases"]
        .iter()
        .any(|s| ends_with_ci(word, s))
    {
        return word[..n - 2].to_string();
    }
    if n > 4
        && ends_with_ci(word, "uses")
        && !matches!(bytes[n - 5].to_ascii_lowercase(), b'a' | b'o' | b'u')
    {
        return word[..n - 2].to_string();
    }
    if ["ss", "us", "is", "ias", "tlas", "tmas"]
        .iter()
        .any(|s| ends_with_ci(word, s))
    {
        return word.to_string();
    }
    if ends_with_ci(word, "s") {
        return word[..n - 1].to_string();
    }
    word.to_string()
}

/// Converts entity type names to canonical collection keys and back.
///
/// `plural_key` is idempotent regardless of the inflector: input the
/// inflector already treats as plural is returned unchanged.
#[derive(Clone)]
pub struct KeyNormalizer {
    inflector: Arc<dyn Inflector>,
}

impl KeyNormalizer {
    pub fn new(inflector: impl Inflector + 'static) -> Self {
        Self {
            inflector: Arc::new(inflector),
        }
    }

    pub fn from_arc(inflector: Arc<dyn Inflector>) -> Self {
        Self { inflector }
    }

    /// Canonical (plural) collection key for a type name.
    #[must_use]
    pub fn plural_key(&self, type_name: &str) -> String {
        let singular = self.inflector.singular(type_name);
        if singular != type_name && self.inflector.plural(&singular) == type_name {
            return type_name.to_string();
        }
        self.inflector.plural(type_name)
    }

    /// Singular form of a type name, used for per-entity command identity.
    #[must_use]
    pub fn singular_key(&self, type_name: &str) -> String {
        self.inflector.singular(type_name)
    }
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(EnglishInflector::new())
    }
}

impl fmt::Debug for KeyNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyNormalizer").finish_non_exhaustive()
    }
}
