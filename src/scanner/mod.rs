pub mod batch;

use crate::analysis::opportunities::{analyze_match, ScanResult};
use crate::analysis::run_models;
use crate::analysis::thresholds::AnalysisConfig;
use crate::backend::StatsSource;
use crate::config::AppConfig;
use crate::errors::{EngineError, EngineResult};
use crate::state::PerfCounters;
use crate::stats::StatsQuery;
use batch::settle_in_batches;
use chrono::NaiveDate;
use portable_atomic::{AtomicU64, Ordering};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

// ── Scan state machine ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub done: usize,
    pub total: usize,
    pub percent: u8,
}

impl ScanProgress {
    pub fn new(done: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (100.0 * done.min(total) as f64 / total as f64).round() as u8
        };
        Self { done, total, percent }
    }
}

/// Idle -> Loading -> Analyzing -> Done | Error. Reset returns to Idle from anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Loading {
        scan_id: Uuid,
        date: NaiveDate,
    },
    Analyzing {
        scan_id: Uuid,
        date: NaiveDate,
        progress: ScanProgress,
    },
    Done {
        result: Box<ScanResult>,
    },
    Error {
        scan_id: Uuid,
        date: NaiveDate,
        message: String,
    },
}

impl ScanState {
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Loading { .. } | Self::Analyzing { .. })
    }
}

// ── Scanner ──

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub query: StatsQuery,
    /// Cap on the ranked list; aggregate counts are not affected.
    pub limit: Option<usize>,
}

impl ScanOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.scan_batch_size,
            batch_delay: config.scan_batch_delay,
            query: StatsQuery {
                period: config.scan_period,
                ..StatsQuery::default()
            },
            limit: None,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay: Duration::from_millis(100),
            query: StatsQuery::default(),
            limit: None,
        }
    }
}

/// Day-wide opportunity scanner.
///
/// Every scan (and every reset) bumps `epoch`. State commits compare the
/// epoch they were started under with the current one inside the watch
/// channel's write lock, so a superseded scan can never overwrite newer
/// state. In-flight requests of a superseded scan are left to finish and
/// their results are dropped.
pub struct Scanner<S: StatsSource> {
    source: Arc<S>,
    options: ScanOptions,
    epoch: AtomicU64,
    state_tx: watch::Sender<ScanState>,
    counters: Arc<PerfCounters>,
}

impl<S: StatsSource> Scanner<S> {
    pub fn new(source: Arc<S>, options: ScanOptions, counters: Arc<PerfCounters>) -> Self {
        let (state_tx, _) = watch::channel(ScanState::Idle);
        Self {
            source,
            options,
            epoch: AtomicU64::new(0),
            state_tx,
            counters,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ScanState {
        self.state_tx.borrow().clone()
    }

    /// Invalidate any running scan and return to `Idle`.
    pub fn reset(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_replace(ScanState::Idle);
        tracing::info!(epoch, "scan reset");
    }

    /// Scan every fixture of `date`. Resolves with the final result, or
    /// `ScanCancelled` if a reset or newer scan superseded this one.
    pub async fn scan(&self, date: NaiveDate, config: &AnalysisConfig) -> EngineResult<ScanResult> {
        config.validate()?;

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let scan_id = Uuid::new_v4();
        self.counters.scans_started.fetch_add(1, Ordering::Relaxed);
        tracing::info!(%scan_id, %date, "scan started");

        self.publish(epoch, ScanState::Loading { scan_id, date })?;

        let fixtures = match self.source.fetch_fixtures(date).await {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(%scan_id, %date, error = %e, "fixture list fetch failed");
                self.publish(
                    epoch,
                    ScanState::Error {
                        scan_id,
                        date,
                        message: e.to_string(),
                    },
                )?;
                return Err(e);
            }
        };

        if fixtures.is_empty() {
            tracing::info!(%scan_id, %date, "no fixtures, scan finished");
            let result = ScanResult::empty(scan_id, date);
            self.publish(epoch, ScanState::Done { result: Box::new(result.clone()) })?;
            return Ok(result);
        }

        let total = fixtures.len();
        self.publish(
            epoch,
            ScanState::Analyzing {
                scan_id,
                date,
                progress: ScanProgress::new(0, total),
            },
        )?;

        let source = &self.source;
        let query = &self.options.query;
        let counters = &self.counters;
        let mut analyzed = 0usize;
        let mut opportunities = Vec::new();

        let flow = settle_in_batches(
            &fixtures,
            self.options.batch_size,
            self.options.batch_delay,
            |fixture| async move {
                match source.fetch_match_stats(&fixture.id, query).await {
                    Ok(stats) => Ok((fixture, stats)),
                    Err(e) => {
                        tracing::warn!(%scan_id, match_id = %fixture.id, error = %e, "match skipped");
                        Err(e)
                    }
                }
            },
            |done, results| {
                for r in results {
                    match r {
                        Ok((fixture, stats)) => {
                            analyzed += 1;
                            counters.matches_fetched.fetch_add(1, Ordering::Relaxed);
                            let (_, over_under, _) = run_models(&stats, query);
                            opportunities.extend(analyze_match(fixture, &over_under, config));
                        }
                        Err(_) => {
                            counters.match_fetch_failures.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }

                let progress = ScanProgress::new(done, total);
                tracing::debug!(%scan_id, done, total, "batch settled");
                match self.publish(epoch, ScanState::Analyzing { scan_id, date, progress }) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(_) => ControlFlow::Break(()),
                }
            },
        )
        .await;

        if flow.is_break() {
            tracing::info!(%scan_id, "scan superseded, discarding results");
            return Err(EngineError::ScanCancelled);
        }

        let result = ScanResult::from_opportunities(scan_id, date, analyzed, opportunities, self.options.limit);
        self.counters
            .opportunities_found
            .fetch_add(result.total_opportunities as u64, Ordering::Relaxed);
        self.publish(epoch, ScanState::Done { result: Box::new(result.clone()) })?;

        tracing::info!(
            %scan_id,
            analyzed = result.matches_analyzed,
            failed = total - result.matches_analyzed,
            opportunities = result.total_opportunities,
            "scan finished"
        );
        Ok(result)
    }

    /// Commit `state` only if `epoch` is still current.
    fn publish(&self, epoch: u64, state: ScanState) -> EngineResult<()> {
        let mut current = true;
        self.state_tx.send_if_modified(|s| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                current = false;
                return false;
            }
            *s = state;
            true
        });
        if current {
            Ok(())
        } else {
            Err(EngineError::ScanCancelled)
        }
    }
}
