use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Rerank, RerankScore, RerankerError};

type ScoreFn = Arc<dyn Fn(&str, &str) -> f64 + Send + Sync>;
type DelayFn = Arc<dyn Fn(&[String]) -> Duration + Send + Sync>;

/// In-process reranker for tests.
///
/// Scores each document with a configurable function (word overlap by default) and returns
/// the scores sorted by relevance, the way real rerank APIs do, so callers must rely on
/// `index` rather than position.
pub struct MockReranker {
    model: String,
    score_fn: ScoreFn,
    delay_fn: Option<DelayFn>,
    fail_all: bool,
    fail_on_call: Option<usize>,
    started: AtomicUsize,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockReranker {
    pub fn new() -> Self {
        Self {
            model: "mock-reranker".to_string(),
            score_fn: Arc::new(word_overlap),
            delay_fn: None,
            fail_all: false,
            fail_on_call: None,
            started: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A reranker whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    pub fn with_scores<F>(mut self, score_fn: F) -> Self
    where
        F: Fn(&str, &str) -> f64 + Send + Sync + 'static,
    {
        self.score_fn = Arc::new(score_fn);
        self
    }

    /// Delays each call by `delay_fn(documents)` before answering.
    pub fn with_delay<F>(mut self, delay_fn: F) -> Self
    where
        F: Fn(&[String]) -> Duration + Send + Sync + 'static,
    {
        self.delay_fn = Some(Arc::new(delay_fn));
        self
    }

    /// Fails only the `n`-th call (0-based, in start order).
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Documents of every call received so far, in start order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockReranker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rerank for MockReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankScore>, RerankerError> {
        let call = self.started.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(documents.to_vec());

        if let Some(delay_fn) = &self.delay_fn {
            tokio::time::sleep(delay_fn(documents)).await;
        }

        if self.fail_all || self.fail_on_call == Some(call) {
            return Err(RerankerError::RequestFailed {
                reason: format!("mock failure on call {call}"),
            });
        }

        let mut scores: Vec<RerankScore> = documents
            .iter()
            .enumerate()
            .map(|(index, document)| RerankScore {
                index,
                relevance_score: (self.score_fn)(query, document),
            })
            .collect();
        scores.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        Ok(scores)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Fraction of query words present in the document.
fn word_overlap(query: &str, document: &str) -> f64 {
    let words = |text: &str| -> HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    };

    let query_words = words(query);
    if query_words.is_empty() {
        return 0.0;
    }
    let document_words = words(document);

    query_words.intersection(&document_words).count() as f64 / query_words.len() as f64
}
