//! One-shot analysis of every transcript, for warming the cache ahead of
//! serving and for comparing episodes side by side.

use tracing::info;

use crate::analysis::BatchReport;
use crate::config::Config;
use crate::shared_state::AppState;

/// Analyze everything for `user_id` and write the summary to
/// `<data_dir>/batch_summary.json`. `force` ignores cached results.
pub async fn run_batch(cfg: Config, user_id: &str, force: bool) -> anyhow::Result<BatchReport> {
    crate::metrics::init_metrics();
    cfg.print_config();

    let summary_path = cfg.batch_summary_path();
    let state = AppState::from_config(cfg)?;
    let report = state.analysis.analyze_all(user_id, force).await?;
    report.write_to(&summary_path).await?;

    info!(
        "Batch finished: {} of {} analyzed ({} failed)",
        report.succeeded, report.total, report.failed
    );
    if let (Some(freshness), Some(insight)) = (report.average_freshness, report.average_insight) {
        info!("Average scores: freshness {:.1}/10, insight {:.1}/10", freshness, insight);
    }
    for (rank, entry) in report.entries.iter().filter(|e| e.success).take(10).enumerate() {
        info!(
            "{:>2}. {} (insight {}, freshness {})",
            rank + 1,
            entry.title,
            entry.insight_score.unwrap_or_default(),
            entry.freshness_score.unwrap_or_default()
        );
    }

    Ok(report)
}
