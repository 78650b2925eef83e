use crate::corpus::{Document, Query};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\p{N}+").expect("valid regex");
    static ref PUNCT: Regex = Regex::new(r"[\p{P}\p{S}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref DEFAULT_STOPWORDS: HashSet<String> = {
        let words: &[&str] = &[
            "a","able","about","across","after","all","almost","also","am","among","an","and","any","are","as","at",
            "be","because","been","but","by","can","cannot","could","dear","did","do","does","either","else","ever","every",
            "for","from","get","got","had","has","have","he","her","hers","him","his","how","however",
            "i","if","in","into","is","it","its","just","least","let","like","likely",
            "may","me","might","most","must","my","neither","no","nor","not","of","off","often","on","only","or","other","our","own",
            "rather","said","say","says","she","should","since","so","some","than","that","the","their","them","then","there","these","they","this","tis","to","too","twas",
            "us","wants","was","we","were","what","when","where","which","while","who","whom","why","will","with","would",
            "yet","you","your"
        ];
        words.iter().map(|w| w.to_string()).collect()
    };
}

/// Shortest term kept is `MIN_TERM_LEN + 1` characters.
pub const MIN_TERM_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokens {
    /// Kept terms in text order.
    pub terms: Vec<String>,
    /// All whitespace-separated tokens, before any filtering.
    pub raw_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// `None` uses the built-in English list.
    stopwords: Option<HashSet<String>>,
}

impl Tokenizer {
    pub fn new() -> Self { Self::default() }

    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { stopwords: Some(stopwords) }
    }

    /// Comma-separated stopword list, as in `common-english-words.txt`.
    pub fn from_stopword_list(text: &str) -> Self { Self::with_stopwords(text.split(',')) }

    fn stopwords(&self) -> &HashSet<String> { self.stopwords.as_ref().unwrap_or(&*DEFAULT_STOPWORDS) }

    pub fn is_stopword(&self, word: &str) -> bool { self.stopwords().contains(word) }

    pub fn num_stopwords(&self) -> usize { self.stopwords().len() }

    /// NFKC-normalise, drop digits, turn punctuation into spaces, then lowercase,
    /// stem and filter short words and stopwords.
    ///
    /// A token is dropped when either its lower-cased form or its stem is a
    /// stopword, so "does" goes even though its stem "doe" is not listed.
    pub fn tokenize(&self, text: &str) -> Tokens {
        let normalized = text.nfkc().collect::<String>();
        let no_digits = DIGITS.replace_all(&normalized, "");
        let cleaned = PUNCT.replace_all(&no_digits, " ");
        let mut out = Tokens::default();
        for word in cleaned.split_whitespace() {
            out.raw_count += 1;
            let lower = word.to_lowercase();
            if self.is_stopword(&lower) {
                continue;
            }
            let stem = STEMMER.stem(&lower).to_string();
            if stem.chars().count() <= MIN_TERM_LEN || self.is_stopword(&stem) {
                continue;
            }
            out.terms.push(stem);
        }
        out
    }

    /// Adds the terms of `text` to `doc` and grows its length by every raw token.
    pub fn feed_document(&self, doc: &mut Document, text: &str) {
        let tokens = self.tokenize(text);
        doc.doc_len += tokens.raw_count;
        for term in tokens.terms {
            doc.add_term(term);
        }
    }

    pub fn feed_query(&self, query: &mut Query, text: &str) {
        for term in self.tokenize(text).terms {
            query.add_term(term);
        }
    }
}

/// Tokenize with the built-in English stopword list.
pub fn tokenize(text: &str) -> Vec<String> { Tokenizer::default().tokenize(text).terms }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn surface_form_stopwords_are_dropped_before_stemming() {
        let t = Tokenizer::default().tokenize("Who does the drilling");
        assert_eq!(t.raw_count, 4);
        assert_eq!(t.terms, vec!["drill"]);
    }

    #[test]
    fn default_list_is_shared_not_owned() {
        let tok = Tokenizer::default();
        assert!(tok.stopwords.is_none());
        assert!(tok.is_stopword("the"));
        assert_eq!(tok.num_stopwords(), DEFAULT_STOPWORDS.len());
        assert_eq!(tokenize("the oil"), vec!["oil"]);
    }

    #[test]
    fn counts_filtered_tokens_in_raw_count() {
        let t = Tokenizer::default().tokenize("The 1996 oil spill, in Alaska");
        // "the", "oil", "spill", "in", "alaska"; digits vanish entirely
        assert_eq!(t.raw_count, 5);
        assert_eq!(t.terms, vec!["oil", "spill", "alaska"]);
    }
}
