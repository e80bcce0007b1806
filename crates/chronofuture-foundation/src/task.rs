//! The user-supplied computation bound to a schedule, and the tagged
//! result type used throughout the handle in place of nullable
//! result/error pairs (spec §9 "Tagged variants for `last()`").

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A computation invoked once per tick.
#[async_trait]
pub trait Task<R, E>: Send + Sync {
    async fn call(&self) -> Result<R, E>;
}

#[async_trait]
impl<R, E, F, Fut> Task<R, E> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Send,
    E: Send,
{
    async fn call(&self) -> Result<R, E> {
        (self)().await
    }
}

/// `(res, err)` represented as a sum type rather than two nullable fields,
/// per spec §9.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Outcome<R, E> {
    /// No tick has completed yet.
    Pending,
    Ok(R),
    Err(E),
}

impl<R, E> Outcome<R, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    /// Convert into a `Result`, yielding `into_err()` if still pending.
    pub fn into_result(self, on_pending: impl FnOnce() -> E) -> Result<R, E> {
        match self {
            Outcome::Pending => Err(on_pending()),
            Outcome::Ok(r) => Ok(r),
            Outcome::Err(e) => Err(e),
        }
    }
}

impl<R, E> From<Result<R, E>> for Outcome<R, E> {
    fn from(r: Result<R, E>) -> Self {
        match r {
            Ok(v) => Outcome::Ok(v),
            Err(e) => Outcome::Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closures_returning_futures_satisfy_task() {
        let task = || async { Ok::<_, String>(42) };
        let result = Task::call(&task).await;
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn outcome_pending_converts_with_supplied_error() {
        let o: Outcome<i32, &'static str> = Outcome::Pending;
        assert_eq!(o.into_result(|| "no tick yet"), Err("no tick yet"));
    }

    #[test]
    fn outcome_from_result_round_trips() {
        let o: Outcome<i32, String> = Ok(7).into();
        assert!(matches!(o, Outcome::Ok(7)));
        let o: Outcome<i32, String> = Err("bad".to_string()).into();
        assert!(matches!(o, Outcome::Err(ref e) if e == "bad"));
    }
}
