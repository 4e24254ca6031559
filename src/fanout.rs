//! Fan-out/fan-in over independent requests.

use futures_util::future::join_all;
use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Awaits every future concurrently and returns all outcomes in input order.
///
/// Never short-circuits: a failing future does not cancel or hide the others.
pub async fn settle_all<K, T, E, Fut>(tasks: Vec<(K, Fut)>) -> Vec<(K, Result<T, E>)>
where
    Fut: Future<Output = Result<T, E>>,
{
    let (keys, futures): (Vec<K>, Vec<Fut>) = tasks.into_iter().unzip();
    keys.into_iter().zip(join_all(futures).await).collect()
}

/// Returns the value, or logs the failure and returns `default`.
pub fn value_or_default<T, E: Display>(key: impl Display, result: Result<T, E>, default: T) -> T {
    result.unwrap_or_else(|e| {
        warn!("Failed to fetch {key}: {e}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_settle_all_keeps_every_outcome_in_order() {
        let tasks: Vec<(&str, BoxFuture<'static, Result<u64, String>>)> = vec![
            ("skills", async { Ok(12) }.boxed()),
            (
                "certifications",
                async {
                    tokio::time::sleep(Duration::from_secs(31)).await;
                    Err("timed out".to_string())
                }
                .boxed(),
            ),
            ("projects", async { Ok(5) }.boxed()),
            ("messages", async { Ok(3) }.boxed()),
        ];

        let settled = settle_all(tasks).await;

        let keys: Vec<_> = settled.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["skills", "certifications", "projects", "messages"]);
        assert_eq!(settled[0].1, Ok(12));
        assert!(settled[1].1.is_err());
        assert_eq!(settled[3].1, Ok(3));
    }

    #[tokio::test]
    async fn test_settle_all_empty() {
        let tasks: Vec<(u8, std::future::Ready<Result<(), ()>>)> = Vec::new();
        assert!(settle_all(tasks).await.is_empty());
    }

    #[test]
    fn test_value_or_default() {
        assert_eq!(value_or_default("skills", Ok::<_, String>(4), 0), 4);
        assert_eq!(value_or_default("skills", Err("boom"), 0), 0);
    }
}
