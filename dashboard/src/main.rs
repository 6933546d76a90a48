//! Headless dashboard runner.
//!
//! Evaluates every resource once, in demo mode or for `DASHBOARD_WALLET`, and
//! prints where each value came from.

use dashboard::app::{DashboardContext, EventSink, EVENT_CHANNEL_CAPACITY};
use dashboard::config::DashboardConfig;
use dashboard::core::service::{ApiService, SessionStore};
use dashboard::debug::{self, spawn_tracked};
use dashboard::services::{ApiClient, FileSessionStore, LocalWalletProvider, MemorySessionStore};
use dashboard::{QueryResult, Result, SyncStatus};
use shared::dto::{AnalyticsFilter, TradeQuery};
use shared::short_wallet;
use std::sync::Arc;

const HEATMAP_YEAR: i32 = 2025;
const HEATMAP_MONTH: u32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DashboardConfig::from_env()?;
    debug::init();
    config.validate()?;

    tracing::info!(
        api_url = %config.api_url,
        timeout_secs = config.request_timeout_secs,
        demo = config.wallet.is_none(),
        "Starting dashboard"
    );

    let api: Arc<dyn ApiService> = Arc::new(ApiClient::with_timeout(
        config.api_url.clone(),
        config.request_timeout(),
    ));
    let store: Arc<dyn SessionStore> = match &config.session_file {
        Some(path) => Arc::new(FileSessionStore::open(path)?),
        None => Arc::new(MemorySessionStore::new()),
    };

    let (events, event_rx) = EventSink::channel(EVENT_CHANNEL_CAPACITY);
    let ctx = DashboardContext::new(api, store, config.demo_latency(), events);

    let event_log = spawn_tracked("events", async move {
        while let Ok(event) = event_rx.recv().await {
            tracing::debug!(event = ?event, "Dashboard event");
        }
    });

    if let Some(wallet) = &config.wallet {
        let provider = LocalWalletProvider::new(wallet.clone());
        ctx.connect(&provider).await?;

        evaluate(&ctx);
        match ctx.wait_for_sync().await {
            Some(SyncStatus::Failed) => {
                let error = ctx
                    .coordinator()
                    .record(wallet)
                    .and_then(|r| r.last_error)
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                tracing::warn!(wallet = %short_wallet(wallet), error = %error, "Sync failed, showing demo data");
            }
            status => tracing::info!(wallet = %short_wallet(wallet), status = ?status, "Sync settled"),
        }
    }

    evaluate(&ctx);
    ctx.cache().settled().await;
    print_snapshot(&ctx);

    event_log.abort();
    tracing::debug!(active_tasks = debug::active_task_count(), "Shutting down");
    Ok(())
}

/// Evaluate every resource once so each entry exists and, when enabled, fetches.
fn evaluate(ctx: &DashboardContext) {
    let _ = ctx.positions();
    let _ = ctx.analytics(&AnalyticsFilter::default());
    let _ = ctx.trades(&TradeQuery::default());
    let _ = ctx.historical_pnl();
    let _ = ctx.drawdown();
    let _ = ctx.heatmap(HEATMAP_YEAR, HEATMAP_MONTH);
    let _ = ctx.composition();
    let _ = ctx.leaderboard();
}

fn print_snapshot(ctx: &DashboardContext) {
    let mode = match ctx.tracker().wallet_id() {
        Some(wallet) => format!(
            "live {} (sync: {})",
            short_wallet(&wallet),
            ctx.coordinator().status(&wallet)
        ),
        None => "demo".to_string(),
    };
    println!("Dashboard snapshot [{}]", mode);

    line("positions", &ctx.positions(), |v| format!("{} open", v.len()));
    line("analytics", &ctx.analytics(&AnalyticsFilter::default()), |v| {
        format!("pnl {:.2}, win rate {:.1}%", v.total_pnl, v.win_rate)
    });
    line("trades", &ctx.trades(&TradeQuery::default()), |v| {
        format!("{} of {}", v.data.len(), v.pagination.total)
    });
    line("historicalPnl", &ctx.historical_pnl(), |v| format!("{} days", v.len()));
    line("drawdown", &ctx.drawdown(), |v| {
        let max = v.iter().map(|p| p.drawdown).fold(0.0_f64, f64::min);
        format!("max {:.2}", max)
    });
    line("heatmap", &ctx.heatmap(HEATMAP_YEAR, HEATMAP_MONTH), |v| format!("{} days", v.len()));
    line("composition", &ctx.composition(), |v| format!("{} markets", v.len()));
    line("leaderboard", &ctx.leaderboard(), |v| format!("{} traders", v.len()));
}

fn line<T>(name: &str, result: &QueryResult<T>, describe: impl Fn(&T) -> String) {
    let source = match result.source {
        Some(source) => format!("{:?}", source),
        None => "-".to_string(),
    };
    let value = match &result.data {
        Some(data) => describe(data.as_ref()),
        None => "no data".to_string(),
    };
    let error = result
        .error
        .as_ref()
        .map(|e| format!(" [error: {}]", e))
        .unwrap_or_default();
    println!("  {:<14} {:<7} {:?} {}{}", name, source, result.status, value, error);
}
