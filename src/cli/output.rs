// Plain-text rendering for CLI output

use crate::cascade::{CascadeResult, ResyncReport};
use crate::models::{Deal, DealType, Stage, Task};
use crate::utils::format_date;

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "-".to_string())
}

/// One-line summary of a cascade result
pub fn format_cascade_result(label: &str, result: &CascadeResult) -> String {
    let mut line = format!(
        "{}: stage={} deal={}",
        label,
        if result.stage_completed { "yes" } else { "no" },
        if result.deal_completed { "yes" } else { "no" },
    );
    if let (Some(deal_type), Some(stage_id), Some(deal_id)) =
        (result.deal_type, result.stage_id.as_ref(), result.deal_id.as_ref())
    {
        line.push_str(&format!(" ({} stage {} in deal {})", deal_type, stage_id, deal_id));
    }
    line
}

pub fn format_resync_report(report: &ResyncReport) -> String {
    format!(
        "Resynced {} of {} completed tasks ({} failed): {} stage updates, {} deal updates",
        report.synced, report.scanned, report.failed, report.stages_updated, report.deals_updated
    )
}

/// Deal header followed by its stages in pipeline order
pub fn format_deal(deal_type: DealType, deal: &Deal, stages: &[(Stage, usize)]) -> String {
    let mut out = format!(
        "{} deal {} \"{}\"\n  status: {}  ended: {}\n",
        deal_type,
        deal.id,
        deal.title,
        deal.status.as_str(),
        date_or_dash(deal.actual_end_date)
    );
    if stages.is_empty() {
        out.push_str("  (no stages)\n");
    }
    for (stage, task_count) in stages {
        out.push_str(&format!(
            "  {:>3}. {:<24} {:<12} ended: {:<10} tasks: {}  [{}]\n",
            stage.stage_order,
            stage.name,
            stage.status.as_str(),
            date_or_dash(stage.actual_end_date),
            task_count,
            stage.id
        ));
    }
    out
}

pub fn format_task_line(task: &Task) -> String {
    format!(
        "{}  {:<12} {:<7} due: {:<10} {}",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        date_or_dash(task.due_date),
        task.title
    )
}
