//! Heading scorer.
//!
//! A block is judged by a small ordered list of weighted rules. The gate
//! (is this a heading at all?) and the score (how much does it look like one?)
//! are computed independently: a block can pass the gate on font size alone
//! and still score zero.

use regex::Regex;

use super::options::HeadingConfig;
use crate::model::TextBlock;

const ROMAN_NUMERAL: &str = r"(?i)^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$";

/// Features of a block that the heading rules look at.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFeatures<'a> {
    /// Raw block text
    pub text: &'a str,
    /// Text with surrounding whitespace removed
    pub trimmed: &'a str,
    /// Length of `trimmed` in characters
    pub char_len: usize,
    /// First-run font size
    pub font_size: f32,
    /// Whether `trimmed` is a Roman numeral
    pub roman: bool,
}

impl<'a> BlockFeatures<'a> {
    fn new(block: &'a TextBlock, roman_re: &Regex) -> Self {
        let trimmed = block.text.trim();
        Self {
            text: &block.text,
            trimmed,
            char_len: trimmed.chars().count(),
            font_size: block.font_size,
            roman: !trimmed.is_empty() && roman_re.is_match(trimmed),
        }
    }

    /// Check if the text has cased characters and none of them is lowercase.
    pub fn is_uppercase(&self) -> bool {
        let mut has_upper = false;
        for c in self.text.chars() {
            if c.is_lowercase() {
                return false;
            }
            if c.is_uppercase() {
                has_upper = true;
            }
        }
        has_upper
    }

    /// Check if the raw text contains any configured keyword.
    pub fn has_keyword(&self, config: &HeadingConfig) -> bool {
        config
            .keywords
            .iter()
            .any(|k| !k.is_empty() && self.text.contains(k.as_str()))
    }
}

/// One weighted signal contributing to a heading score.
#[derive(Clone, Copy)]
pub struct HeadingRule {
    /// Rule name, used in log output
    pub name: &'static str,
    /// Amount added to the score when the rule holds
    pub weight: f64,
    /// Rule test
    pub predicate: fn(&BlockFeatures<'_>, &HeadingConfig) -> bool,
}

impl std::fmt::Debug for HeadingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadingRule")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// The standard rule set, in evaluation order.
pub fn default_rules() -> Vec<HeadingRule> {
    vec![
        HeadingRule {
            name: "keyword",
            weight: 2.0,
            predicate: |f, c| f.has_keyword(c),
        },
        HeadingRule {
            name: "large_font",
            weight: 1.0,
            predicate: |f, c| f.font_size > c.large_font_size,
        },
        HeadingRule {
            name: "uppercase",
            weight: 0.5,
            predicate: |f, _| f.is_uppercase(),
        },
        HeadingRule {
            name: "length",
            weight: 0.5,
            predicate: |f, c| (c.min_heading_len..=c.max_heading_len).contains(&f.char_len),
        },
        HeadingRule {
            name: "roman_numeral",
            weight: 2.5,
            predicate: |f, _| f.roman,
        },
    ]
}

/// Decides whether a text block is a heading and scores it.
#[derive(Debug, Clone)]
pub struct HeadingScorer {
    config: HeadingConfig,
    rules: Vec<HeadingRule>,
    roman_re: Regex,
}

impl HeadingScorer {
    /// Create a scorer with the standard rules.
    pub fn new(config: HeadingConfig) -> Self {
        Self {
            config,
            rules: default_rules(),
            roman_re: Regex::new(ROMAN_NUMERAL).unwrap(),
        }
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: Vec<HeadingRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Heading options in use.
    pub fn config(&self) -> &HeadingConfig {
        &self.config
    }

    /// Extract the rule features of a block.
    pub fn features<'a>(&self, block: &'a TextBlock) -> BlockFeatures<'a> {
        BlockFeatures::new(block, &self.roman_re)
    }

    /// Evaluate a block, returning `(is_heading, score)`.
    ///
    /// Empty or whitespace-only blocks are never headings. The score is
    /// reported regardless of the gate.
    pub fn evaluate(&self, block: &TextBlock) -> (bool, f64) {
        let features = self.features(block);
        let score = self
            .rules
            .iter()
            .filter(|rule| (rule.predicate)(&features, &self.config))
            .map(|rule| rule.weight)
            .sum::<f64>();

        (self.passes_gate(&features), score)
    }

    fn passes_gate(&self, features: &BlockFeatures<'_>) -> bool {
        if features.trimmed.is_empty() {
            return false;
        }
        features.roman
            || features.has_keyword(&self.config)
            || features.font_size > self.config.gate_font_size
    }

    /// Names of the rules that hold for a block.
    pub fn matched_rules(&self, block: &TextBlock) -> Vec<&'static str> {
        let features = self.features(block);
        self.rules
            .iter()
            .filter(|rule| (rule.predicate)(&features, &self.config))
            .map(|rule| rule.name)
            .collect()
    }
}

impl Default for HeadingScorer {
    fn default() -> Self {
        Self::new(HeadingConfig::default())
    }
}

/// Check if a string is a non-empty Roman numeral (case-insensitive, whole string).
pub fn is_roman_numeral(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    Regex::new(ROMAN_NUMERAL).unwrap().is_match(text)
}
