//! In-memory [`DataSource`] for tests.
//!
//! Answers each `Get` call from rows registered per type name, unless a
//! scripted response is queued, in which case the next scripted response is
//! returned verbatim. Every batch it receives is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::models::ApiCall;
use crate::source::DataSource;

#[derive(Debug, Default)]
pub struct MockDataSource {
    rows: HashMap<String, Vec<Value>>,
    scripted: Mutex<VecDeque<Result<Vec<Option<Value>>>>>,
    batches: Mutex<Vec<Vec<ApiCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `rows` (a JSON array) for every `Get` of `type_name`.
    ///
    /// # Panics
    /// If `rows` is not an array.
    pub fn with_rows(mut self, type_name: &str, rows: Value) -> Self {
        let Value::Array(rows) = rows else {
            panic!("rows for {type_name} must be a JSON array");
        };
        self.rows.insert(type_name.to_string(), rows);
        self
    }

    /// Queue a verbatim response for the next batch.
    pub fn push_response(&self, slots: Vec<Option<Value>>) {
        lock(&self.scripted).push_back(Ok(slots));
    }

    /// Make the next batch fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        lock(&self.scripted).push_back(Err(error));
    }

    /// Number of batches received so far.
    pub fn round_trips(&self) -> usize {
        lock(&self.batches).len()
    }

    /// Every batch received so far, in order.
    pub fn batches(&self) -> Vec<Vec<ApiCall>> {
        lock(&self.batches).clone()
    }

    /// The most recent batch, if any.
    pub fn last_batch(&self) -> Option<Vec<ApiCall>> {
        lock(&self.batches).last().cloned()
    }

    fn answer(&self, call: &ApiCall) -> Option<Value> {
        let rows = self.rows.get(call.type_name())?;
        let limit = call.params.results_limit as usize;
        Some(Value::Array(rows.iter().take(limit).cloned().collect()))
    }
}

impl DataSource for MockDataSource {
    async fn batch_fetch(&self, calls: &[ApiCall]) -> Result<Vec<Option<Value>>> {
        lock(&self.batches).push(calls.to_vec());

        if let Some(scripted) = lock(&self.scripted).pop_front() {
            return scripted;
        }

        Ok(calls.iter().map(|call| self.answer(call)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GetParams, SearchFilter};
    use serde_json::json;

    fn get(type_name: &str, limit: u32) -> ApiCall {
        ApiCall::get(GetParams {
            type_name: type_name.to_string(),
            search: SearchFilter::default(),
            results_limit: limit,
        })
    }

    #[tokio::test]
    async fn test_answers_by_type_and_honors_limit() {
        let source = MockDataSource::new().with_rows("Zone", json!([{"id": "z1"}, {"id": "z2"}]));

        let slots = source
            .batch_fetch(&[get("Zone", 1), get("Rule", 10)])
            .await
            .unwrap();

        assert_eq!(slots, vec![Some(json!([{"id": "z1"}])), None]);
        assert_eq!(source.round_trips(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure_is_returned_once() {
        let source = MockDataSource::new();
        source.fail_next(ClientError::InvalidResponse("boom".to_string()));

        assert!(source.batch_fetch(&[get("Zone", 1)]).await.is_err());
        assert!(source.batch_fetch(&[get("Zone", 1)]).await.is_ok());
        assert_eq!(source.round_trips(), 2);
    }
}
