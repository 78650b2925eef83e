use topicrank_core::tokenizer::{tokenize, Tokenizer};
use topicrank_core::Document;

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The ＭＥＮＵ's 2nd item.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC folds fullwidth letters
    assert!(words.contains(&"menu".to_string()));
    assert!(!words.iter().any(|w| w.chars().any(|c| c.is_ascii_digit())));
}

#[test]
fn it_filters_stopwords_and_short_words() {
    let words = tokenize("The quick brown fox and the lazy dog is on TV");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(!words.contains(&"tv".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn custom_stopword_list_replaces_default() {
    let tok = Tokenizer::from_stopword_list("fox, dog ,lazy");
    assert_eq!(tok.num_stopwords(), 3);
    let words = tok.tokenize("the lazy fox and the dog").terms;
    assert_eq!(words, vec!["the", "and", "the"]);
}

#[test]
fn document_length_counts_every_token() {
    let tok = Tokenizer::default();
    let mut doc = Document::new("86968");
    tok.feed_document(&mut doc, "Oil prices rose; the oil market is up.");
    tok.feed_document(&mut doc, "Oil!");
    assert_eq!(doc.doc_len, 9);
    assert_eq!(doc.term_count("oil"), 3);
    assert_eq!(doc.term_count("the"), 0);
}
