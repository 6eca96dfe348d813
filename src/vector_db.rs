use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHasher};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use unicode_normalization::UnicodeNormalization;

/// Number of hash buckets a term can land in. Collisions are accepted.
pub const BUCKETS: u32 = 2048;

/// Sparse bucket -> weight map. Ordered so dot products sum in key order.
pub type TermVector = BTreeMap<u32, f64>;

#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub id: String,
    pub content: String,
    pub score: f64,
}

/// In-memory document store scored with hashed bag-of-words cosine similarity.
///
/// Documents keep their insertion order, which is what breaks ties between
/// equal scores. Overwriting an id keeps its original position.
#[derive(Default)]
pub struct VectorDB {
    documents: Vec<Document>,
    positions: FxHashMap<String, usize>,
}

impl VectorDB {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn add_document(&mut self, id: impl Into<String>, content: impl Into<String>) {
        let id = id.into();
        let content = content.into();

        if let Some(&pos) = self.positions.get(&id) {
            self.documents[pos].content = content;
            return;
        }

        self.positions.insert(id.clone(), self.documents.len());
        self.documents.push(Document { id, content });
    }

    pub fn search_similar(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> {
        let query_vector = vectorize(query);

        let mut similarities: Vec<(f64, &Document)> = self
            .documents
            .iter()
            .map(|doc| (cosine_similarity(&query_vector, &vectorize(&doc.content)), doc))
            .collect();

        // sort_by is stable: equal scores stay in insertion order
        similarities.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        similarities
            .into_iter()
            .take(top_k)
            .map(|(score, doc)| ScoredDocument {
                id: doc.id.clone(),
                content: doc.content.clone(),
                score,
            })
            .collect()
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    lazy_static! {
        static ref SEPARATORS: Regex = Regex::new(r#"[\s.,;:!?()"'\-_]+"#).unwrap();
    }

    let text = text.nfc().collect::<String>().to_lowercase();

    SEPARATORS
        .split(&text)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

pub fn term_bucket(token: &str) -> u32 {
    let mut hasher = FxHasher::default();
    token.hash(&mut hasher);
    (hasher.finish() % u64::from(BUCKETS)) as u32
}

/// Term frequencies over hashed buckets, L2-normalized. A vector with zero
/// norm (no tokens) is returned empty.
pub fn vectorize(text: &str) -> TermVector {
    let mut vector = TermVector::new();
    for token in tokenize(text) {
        *vector.entry(term_bucket(&token)).or_insert(0.0) += 1.0;
    }

    let norm = vector.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }

    vector
}

/// Both inputs are already normalized, so this is just the dot product.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    small
        .iter()
        .filter_map(|(bucket, weight)| large.get(bucket).map(|other| weight * other))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        let tokens = tokenize("Hello, World! (RAG)-based \"agents\"; it's snake_case: ok?");
        assert_eq!(
            tokens,
            vec![
                "hello", "world", "rag", "based", "agents", "it", "s", "snake", "case", "ok"
            ]
        );
    }

    #[test]
    fn test_tokenize_empty_and_separators_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ...,;-- _ ").is_empty());
    }

    #[test]
    fn test_term_bucket_is_bounded_and_stable() {
        for token in ["rag", "retrieval", "a", "", "ünïcödé"] {
            let bucket = term_bucket(token);
            assert!(bucket < BUCKETS);
            assert_eq!(bucket, term_bucket(token));
        }
    }

    #[test]
    fn test_vectorize_is_normalized() {
        let vector = vectorize("rag rag retrieval grounding");
        let norm: f64 = vector.values().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(vectorize("   ").is_empty());
    }

    #[test]
    fn test_cosine_similarity_is_symmetric() {
        let pairs = [
            ("RAG retrieves relevant context", "rag"),
            ("the quick brown fox", "jumps over the lazy dog"),
            ("", "anything at all"),
            ("same words here", "here words same"),
            ("a b c d e f g", "g f e d c b a a"),
        ];
        for (a, b) in pairs {
            let (va, vb) = (vectorize(a), vectorize(b));
            assert_eq!(cosine_similarity(&va, &vb), cosine_similarity(&vb, &va));
        }
    }

    #[test]
    fn test_identical_text_scores_one() {
        let v = vectorize("tool use and instruction following");
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_empty_store() {
        let db = VectorDB::new();
        assert!(db.search_similar("anything", 5).is_empty());
    }

    #[test]
    fn test_search_ranks_and_truncates() {
        let mut db = VectorDB::new();
        db.add_document("cats", "cats purr and cats sleep");
        db.add_document("rag", "RAG retrieves context for grounding");
        db.add_document("dogs", "dogs bark loudly");

        let hits = db.search_similar("how does rag retrieve context", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "rag");
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));

        assert_eq!(db.search_similar("rag", 10).len(), 3);
    }

    #[test]
    fn test_zero_scores_keep_insertion_order() {
        let mut db = VectorDB::new();
        db.add_document("first", "alpha");
        db.add_document("second", "beta");
        db.add_document("third", "gamma");

        // an empty query vector scores every document 0
        let hits = db.search_similar("", 3);
        assert!(hits.iter().all(|hit| hit.score == 0.0));
        let order: Vec<_> = hits.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_add_document_overwrites_in_place() {
        let mut db = VectorDB::new();
        db.add_document("doc", "old text about tigers");
        db.add_document("other", "unrelated body");
        db.add_document("doc", "new text about lions");

        assert_eq!(db.len(), 2);
        let hits = db.search_similar("lions", 5);
        assert_eq!(hits.len(), 2);
        let doc = hits.iter().find(|hit| hit.id == "doc").unwrap();
        assert_eq!(doc.content, "new text about lions");
        assert!(doc.score > 0.0);
        assert!(hits.iter().all(|hit| !hit.content.contains("tigers")));
    }
}
