use async_trait::async_trait;
use slugmap::{Provider, SlugError, SlugOptimizer, SlugResult};
use std::sync::Mutex;

pub(crate) struct StubOptimizer {
    proposed_slug: String,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<(Vec<String>, i64)>>,
}

impl StubOptimizer {
    pub fn new(proposed_slug: &str) -> Self {
        StubOptimizer {
            proposed_slug: proposed_slug.to_owned(),
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes the `call`-th batch (counting from 1) fail with a credential error.
    #[allow(dead_code)]
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// URLs and id base of every batch received so far.
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<(Vec<String>, i64)> {
        self.calls.lock().expect("Stub mutex poisoned").clone()
    }
}

#[async_trait]
impl SlugOptimizer for StubOptimizer {
    async fn optimize_batch(
        &self,
        urls: &[String],
        _geo_target: &str,
        id_base: i64,
    ) -> slugmap::error::Result<Vec<SlugResult>> {
        let call = {
            let mut calls = self.calls.lock().expect("Stub mutex poisoned");
            calls.push((urls.to_vec(), id_base));
            calls.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(SlugError::InvalidCredential(Provider::OpenAi));
        }

        Ok(urls
            .iter()
            .zip(id_base..)
            .map(|(url, id)| SlugResult::new(id, url.as_str(), Some(&self.proposed_slug)))
            .collect())
    }
}

/// Page URLs `https://x.com/page-1` .. `https://x.com/page-{count}`.
#[allow(dead_code)]
pub fn pages(count: usize) -> Vec<String> {
    (1..=count)
        .map(|page| format!("https://x.com/page-{page}"))
        .collect()
}
