//! Parallel execution of one command across several accounts.

use std::{future::Future, panic::AssertUnwindSafe};

use {
    fleet_common::BotHandle,
    futures::{FutureExt, future::join_all},
    tracing::warn,
};

/// Run `run` for every target concurrently and aggregate the replies.
///
/// Waits for all targets before returning. A target that returns `Err` is
/// logged and counted as having nothing to say; the rest of the batch is
/// unaffected. If any target panics, the panic is resumed once every other
/// target has settled.
pub async fn run_all<'a, F, Fut>(targets: &'a [BotHandle], run: F) -> Option<String>
where
    F: Fn(&'a BotHandle) -> Fut,
    Fut: Future<Output = anyhow::Result<Option<String>>>,
{
    let futures = targets.iter().map(|bot| {
        let fut = run(bot);
        async move { (bot, AssertUnwindSafe(fut).catch_unwind().await) }
    });
    let settled = join_all(futures).await;

    let mut replies = Vec::with_capacity(settled.len());
    let mut panic = None;
    for (bot, outcome) in settled {
        match outcome {
            Ok(Ok(reply)) => replies.push(reply),
            Ok(Err(e)) => {
                warn!(bot = %bot, error = %e, "command failed for target");
                replies.push(None);
            },
            Err(payload) => {
                warn!(bot = %bot, "command panicked for target");
                panic.get_or_insert(payload);
            },
        }
    }
    if let Some(payload) = panic {
        std::panic::resume_unwind(payload);
    }
    aggregate(replies)
}

/// Join the non-blank replies with newlines, in order. `None` when nothing
/// is left.
pub fn aggregate<I>(replies: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let kept: Vec<String> = replies
        .into_iter()
        .flatten()
        .filter(|r| !r.trim().is_empty())
        .collect();
    (!kept.is_empty()).then(|| kept.join("\n"))
}
