//! 批量并发执行
//!
//! 每个币种独立执行，单个失败被记录下来和成功结果一起返回，不会中断整批。

use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AppError;

/// 批量中单个币种的失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub coin_id: String,
    pub status: u16,
    pub error: String,
}

impl BatchFailure {
    pub fn new(coin_id: &str, err: &AppError) -> Self {
        let response = err.to_response();
        Self {
            coin_id: coin_id.to_string(),
            status: response.status,
            error: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub successes: Vec<T>,
    pub failures: Vec<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn successful(&self) -> usize {
        self.successes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// 对每个币种并发执行 `task`，等待全部完成；结果保持输入顺序
pub async fn run_batch<T, F, Fut>(coin_ids: &[String], task: F) -> BatchOutcome<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let tasks = coin_ids.iter().map(|coin_id| {
        let fut = task(coin_id.clone());
        async move { (coin_id, fut.await) }
    });

    let mut outcome = BatchOutcome {
        successes: Vec::new(),
        failures: Vec::new(),
    };
    for (coin_id, result) in join_all(tasks).await {
        match result {
            Ok(value) => outcome.successes.push(value),
            Err(e) => {
                error!("batch task failed, coin: {}, err: {}", coin_id, e);
                outcome.failures.push(BatchFailure::new(coin_id, &e));
            }
        }
    }
    outcome
}
