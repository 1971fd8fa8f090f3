//! Correlation id for one inbound request.
//!
//! The trace middleware opens a scope per request, and everything awaited
//! inside it (handlers, services, outbound clients) can read the id back
//! through [`TraceId::current`]. Error payloads and log lines pick it up
//! from there. Spawned tasks start outside the scope and must re-enter it
//! with [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static REQUEST_TRACE: TraceId;
}

/// UUID echoed in the `trace-id` response header.
///
/// # Examples
/// ```
/// use site_backend::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "7d3c6a0e-2f1b-4a55-9d0e-3b9c1f4e8a21".parse().expect("uuid");
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of the request being served, or `None` outside a request.
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST_TRACE.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<F>(trace_id: Self, fut: F) -> F::Output
    where
        F: Future,
    {
        REQUEST_TRACE.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let (seen_inner, seen_outer) = TraceId::scope(outer, async move {
            let seen_inner = TraceId::scope(inner, async { TraceId::current() }).await;
            (seen_inner, TraceId::current())
        })
        .await;
        assert_eq!(seen_inner, Some(inner));
        assert_eq!(seen_outer, Some(outer));
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_tasks_leave_the_scope() {
        let id = TraceId::generate();
        let spawned = TraceId::scope(id, async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task joins")
        })
        .await;
        assert_eq!(spawned, None);
    }

    #[rstest]
    #[case("00000000-0000-0000-0000-000000000000", true)]
    #[case(" 7d3c6a0e-2f1b-4a55-9d0e-3b9c1f4e8a21 ", true)]
    #[case("not-a-trace", false)]
    #[case("", false)]
    fn header_values_parse(#[case] raw: &str, #[case] ok: bool) {
        let parsed = raw.parse::<TraceId>();
        assert_eq!(parsed.is_ok(), ok);
        if let Ok(id) = parsed {
            assert_eq!(id.to_string(), raw.trim());
        }
    }
}
