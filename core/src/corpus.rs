use crate::error::RankError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type Term = String;
pub type DocId = String;
pub type TopicId = u32;

/// Bag-of-words view of one news item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: DocId,
    pub terms: HashMap<Term, u32>,
    /// Every token seen while parsing, including the ones later filtered out.
    pub doc_len: u32,
}

impl Document {
    pub fn new(doc_id: impl Into<DocId>) -> Self {
        Self { doc_id: doc_id.into(), ..Self::default() }
    }

    pub fn add_term(&mut self, term: impl Into<Term>) {
        *self.terms.entry(term.into()).or_insert(0) += 1;
    }

    pub fn term_count(&self, term: &str) -> u32 { self.terms.get(term).copied().unwrap_or(0) }

    pub fn contains(&self, term: &str) -> bool { self.terms.contains_key(term) }

    /// Sorted term list, for deterministic iteration.
    pub fn term_list(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.terms.keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }
}

/// Candidate pool for one topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    docs: BTreeMap<DocId, Document>,
}

impl Collection {
    pub fn new() -> Self { Self::default() }

    /// Inserts a document, replacing any earlier one with the same id.
    pub fn add_doc(&mut self, doc: Document) -> Option<Document> {
        self.docs.insert(doc.doc_id.clone(), doc)
    }

    pub fn get(&self, doc_id: &str) -> Option<&Document> { self.docs.get(doc_id) }

    /// Documents in docid order.
    pub fn docs(&self) -> impl Iterator<Item = &Document> { self.docs.values() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn total_doc_len(&self) -> u64 { self.docs.values().map(|d| d.doc_len as u64).sum() }

    /// Mean `doc_len`; 0 for an empty collection.
    pub fn avg_doc_len(&self) -> f64 {
        if self.docs.is_empty() {
            return 0.0;
        }
        self.total_doc_len() as f64 / self.docs.len() as f64
    }

    /// Total occurrences of each term across the collection.
    pub fn collection_term_freq(&self) -> HashMap<Term, u64> {
        let mut cf: HashMap<Term, u64> = HashMap::new();
        for doc in self.docs.values() {
            for (term, count) in &doc.terms {
                *cf.entry(term.clone()).or_insert(0) += *count as u64;
            }
        }
        cf
    }

    /// Number of documents containing each term.
    pub fn document_freq(&self) -> HashMap<Term, u32> {
        let mut df: HashMap<Term, u32> = HashMap::new();
        for doc in self.docs.values() {
            for term in doc.terms.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
        }
        df
    }

    pub fn stats(&self) -> CollectionStats { CollectionStats::from_collection(self) }
}

/// Read-only aggregates derived once per collection and shared by the scorers.
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    pub num_docs: usize,
    pub avg_doc_len: f64,
    pub doc_freq: HashMap<Term, u32>,
    pub coll_freq: HashMap<Term, u64>,
    /// Sum of all kept term occurrences.
    pub total_tokens: u64,
}

impl CollectionStats {
    pub fn from_collection(coll: &Collection) -> Self {
        let coll_freq = coll.collection_term_freq();
        let total_tokens = coll_freq.values().sum();
        Self {
            num_docs: coll.num_docs(),
            avg_doc_len: coll.avg_doc_len(),
            doc_freq: coll.document_freq(),
            coll_freq,
            total_tokens,
        }
    }

    pub fn df(&self, term: &str) -> u32 { self.doc_freq.get(term).copied().unwrap_or(0) }

    pub fn cf(&self, term: &str) -> u64 { self.coll_freq.get(term).copied().unwrap_or(0) }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub topic: TopicId,
    pub terms: HashMap<Term, u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub narrative: Option<String>,
}

impl Query {
    pub fn new(topic: TopicId) -> Self {
        Self { topic, ..Self::default() }
    }

    pub fn add_term(&mut self, term: impl Into<Term>) {
        *self.terms.entry(term.into()).or_insert(0) += 1;
    }

    pub fn term_count(&self, term: &str) -> u32 { self.terms.get(term).copied().unwrap_or(0) }

    /// (term, query frequency) pairs in term order.
    pub fn sorted_terms(&self) -> Vec<(&str, u32)> {
        let mut terms: Vec<(&str, u32)> = self.terms.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySet {
    queries: BTreeMap<TopicId, Query>,
}

impl QuerySet {
    pub fn new() -> Self { Self::default() }

    pub fn add_query(&mut self, query: Query) -> Option<Query> { self.queries.insert(query.topic, query) }

    pub fn get(&self, topic: TopicId) -> Option<&Query> { self.queries.get(&topic) }

    /// Queries in ascending topic order.
    pub fn iter(&self) -> impl Iterator<Item = &Query> { self.queries.values() }

    pub fn topics(&self) -> impl Iterator<Item = TopicId> + '_ { self.queries.keys().copied() }

    pub fn len(&self) -> usize { self.queries.len() }

    pub fn is_empty(&self) -> bool { self.queries.is_empty() }
}

/// Collections keyed by the topic whose candidate pool they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataCollection {
    collections: BTreeMap<TopicId, Collection>,
}

impl DataCollection {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, topic: TopicId, coll: Collection) -> Option<Collection> {
        self.collections.insert(topic, coll)
    }

    /// Pairs the i-th topic with the i-th collection. Both lists must be the same length.
    pub fn from_positional(topics: &[TopicId], collections: Vec<Collection>) -> Result<Self, RankError> {
        if topics.len() != collections.len() {
            return Err(RankError::PositionalMismatch { topics: topics.len(), collections: collections.len() });
        }
        let mut data = Self::new();
        for (topic, coll) in topics.iter().copied().zip(collections) {
            if data.insert(topic, coll).is_some() {
                return Err(RankError::DuplicateTopic(topic));
            }
        }
        Ok(data)
    }

    pub fn get(&self, topic: TopicId) -> Option<&Collection> { self.collections.get(&topic) }

    /// Collection for `topic`, or an `IndexMismatch` error.
    pub fn collection_for(&self, topic: TopicId) -> Result<&Collection, RankError> {
        self.collections.get(&topic).ok_or(RankError::IndexMismatch(topic))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TopicId, &Collection)> {
        self.collections.iter().map(|(t, c)| (*t, c))
    }

    pub fn len(&self) -> usize { self.collections.len() }

    pub fn is_empty(&self) -> bool { self.collections.is_empty() }
}

/// Everything the indexer produces: one query set plus its candidate pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub queries: QuerySet,
    pub data: DataCollection,
}

impl Corpus {
    /// Each query paired with its collection, in topic order.
    pub fn pairs(&self) -> Result<Vec<(&Query, &Collection)>, RankError> {
        self.queries
            .iter()
            .map(|q| self.data.collection_for(q.topic).map(|c| (q, c)))
            .collect()
    }
}
