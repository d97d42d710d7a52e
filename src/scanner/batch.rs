use crate::errors::EngineResult;
use futures_util::future::join_all;
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

/// Run `process` over `items` in consecutive batches of `batch_size`.
///
/// Each batch runs concurrently and is settled with `join_all`: every future
/// resolves before the batch is reported, a failure never cancels its
/// siblings. Batch n completes before batch n+1 starts, and `delay` is
/// awaited between batches (not after the last).
///
/// `on_batch` receives `(done_so_far, results_in_item_order)` and may stop
/// the run early with `ControlFlow::Break`, which is passed through.
pub async fn settle_in_batches<'a, T, R, F, Fut, B>(
    items: &'a [T],
    batch_size: usize,
    delay: Duration,
    process: F,
    mut on_batch: B,
) -> ControlFlow<()>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = EngineResult<R>>,
    B: FnMut(usize, Vec<EngineResult<R>>) -> ControlFlow<()>,
{
    let batch_size = batch_size.max(1);
    let batches = items.len().div_ceil(batch_size);
    let mut done = 0;

    for (idx, chunk) in items.chunks(batch_size).enumerate() {
        let results = join_all(chunk.iter().map(&process)).await;
        done += chunk.len();

        if on_batch(done, results).is_break() {
            return ControlFlow::Break(());
        }

        if idx + 1 < batches && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    ControlFlow::Continue(())
}
