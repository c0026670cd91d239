//! Curated word lists behind the noise and promotion heuristics.
//!
//! The lists ship as `lexicon.json` and are embedded at compile time.  A
//! caller that wants different vocabulary (another locale, a site-specific
//! denylist) builds its own [`Lexicon`] with [`Lexicon::from_json`] and puts
//! it into [`crate::ExtractOptions::lexicon`].

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

static DEFAULT_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| {
    serde_json::from_str(include_str!("lexicon.json")).expect("embedded lexicon.json should parse")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Matched at token boundaries of `id`, `class` and `data-*` markers.
    pub noise_attribute_keywords: Vec<String>,
    /// Whole-text, case-insensitive interface phrases ("add to cart").
    pub chrome_phrases: Vec<String>,
    /// Regular expressions for price, measurement, rating and counter tokens.
    pub noise_patterns: Vec<String>,
    pub marketing_verbs: Vec<String>,
    pub marketing_keywords: Vec<String>,
    pub call_to_action_adverbs: Vec<String>,
    pub carousel_phrases: Vec<String>,
    pub primary_nav_labels: Vec<String>,
    pub secondary_nav_labels: Vec<String>,
    pub nav_class_names: Vec<String>,
    /// Lazy-load image attributes in priority order.
    pub lazy_image_attributes: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Lexicon {
        DEFAULT_LEXICON.clone()
    }
}

impl Lexicon {
    /// Parse a lexicon from JSON and make sure every pattern in it compiles.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Lexicon`] when the JSON does not describe a lexicon,
    /// [`crate::Error::Pattern`] when one of `noise_patterns` is not a valid
    /// regular expression.
    pub fn from_json(json: &str) -> Result<Lexicon> {
        let lexicon: Lexicon = serde_json::from_str(json)?;
        TextClassifier::new(&lexicon)?;
        Ok(lexicon)
    }
}

fn lowered_set(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.trim().to_lowercase()).collect()
}

/// Strip punctuation around a word so "Today!" compares equal to "today".
fn bare_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

/// A [`Lexicon`] compiled for matching.  Built once per extraction.
#[derive(Debug)]
pub struct TextClassifier {
    noise_attribute: Option<Regex>,
    noise_patterns: Vec<Regex>,
    chrome_phrases: HashSet<String>,
    marketing_verbs: HashSet<String>,
    marketing_keywords: HashSet<String>,
    cta_adverbs: HashSet<String>,
    carousel_phrases: HashSet<String>,
    primary_nav_labels: HashSet<String>,
    secondary_nav_labels: HashSet<String>,
    nav_class_names: HashSet<String>,
    lazy_image_attributes: Vec<String>,
}

impl TextClassifier {
    pub fn new(lexicon: &Lexicon) -> Result<TextClassifier> {
        let keywords = lexicon
            .noise_attribute_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| regex::escape(k.trim()))
            .collect::<Vec<_>>();
        let noise_attribute = if keywords.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)(?:^|[^a-z0-9])(?:{})s?(?:$|[^a-z0-9])",
                keywords.join("|")
            ))?)
        };
        let noise_patterns = lexicon
            .noise_patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TextClassifier {
            noise_attribute,
            noise_patterns,
            chrome_phrases: lowered_set(&lexicon.chrome_phrases),
            marketing_verbs: lowered_set(&lexicon.marketing_verbs),
            marketing_keywords: lowered_set(&lexicon.marketing_keywords),
            cta_adverbs: lowered_set(&lexicon.call_to_action_adverbs),
            carousel_phrases: lowered_set(&lexicon.carousel_phrases),
            primary_nav_labels: lowered_set(&lexicon.primary_nav_labels),
            secondary_nav_labels: lowered_set(&lexicon.secondary_nav_labels),
            nav_class_names: lowered_set(&lexicon.nav_class_names),
            lazy_image_attributes: lexicon.lazy_image_attributes.clone(),
        })
    }

    /// Price-like, measurement-like or interface-chrome text, or text too
    /// short to carry meaning.
    pub fn is_noise(&self, text: &str) -> bool {
        let text = text.trim();
        if text.chars().count() <= 2 {
            return true;
        }
        let phrase = text
            .trim_matches(|c: char| !c.is_alphanumeric())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if self.chrome_phrases.contains(&phrase) {
            return true;
        }
        self.noise_patterns.iter().any(|re| re.is_match(text))
    }

    /// Marketing micro-copy: imperative sales openers, echoed category
    /// labels, keyword-dense blurbs and calls to action.
    pub fn is_promotional(&self, text: &str) -> bool {
        let words = text.split_whitespace().collect::<Vec<_>>();
        let Some(first) = words.first() else {
            return false;
        };
        if words.len() <= 10 && self.marketing_verbs.contains(&bare_word(first)) {
            return true;
        }
        if words.len() == 1 && first.chars().next().is_some_and(char::is_uppercase) {
            return true;
        }
        if words.len() <= 30 {
            let hits = words
                .iter()
                .filter(|w| self.marketing_keywords.contains(&bare_word(w)))
                .count();
            if hits >= 2 {
                return true;
            }
            if words
                .last()
                .is_some_and(|w| self.cta_adverbs.contains(&bare_word(w)))
            {
                return true;
            }
        }
        false
    }

    /// Both gates at once, for paragraph, link and button text.
    pub fn is_content_text(&self, text: &str) -> bool {
        !self.is_noise(text) && !self.is_promotional(text)
    }

    /// Whether an `id`/`class`/`data-*` marker names page chrome.
    pub fn is_noise_marker(&self, value: &str) -> bool {
        self.noise_attribute
            .as_ref()
            .is_some_and(|re| re.is_match(value))
    }

    pub fn is_carousel_phrase(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        if self.carousel_phrases.contains(&lowered) {
            return true;
        }
        // "Go to slide 3", "Slide 2 of 5"
        lowered
            .split_once(|c: char| c.is_ascii_digit())
            .is_some_and(|(prefix, _)| self.carousel_phrases.contains(prefix.trim()))
    }

    pub fn is_primary_nav_label(&self, label: &str) -> bool {
        label_matches(label, &self.primary_nav_labels)
    }

    pub fn is_secondary_nav_label(&self, label: &str) -> bool {
        label_matches(label, &self.secondary_nav_labels)
    }

    pub fn is_nav_class(&self, class: &str) -> bool {
        class
            .split_whitespace()
            .any(|c| self.nav_class_names.contains(&c.to_lowercase()))
    }

    pub fn lazy_image_attributes(&self) -> &[String] {
        &self.lazy_image_attributes
    }
}

/// A label such as "Main navigation" matches when any of its words is in
/// the set.
fn label_matches(label: &str, words: &HashSet<String>) -> bool {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| words.contains(&w.to_lowercase()))
}
