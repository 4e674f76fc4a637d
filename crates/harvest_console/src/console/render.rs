use std::fmt::Write;

use harvest_core::{
    AgronomistList, AppViewModel, AssignDialogView, NoticeLevel, RejectionNotice, RequestRowView,
    Statistics,
};

pub fn notice_line(view: &AppViewModel) -> Option<String> {
    view.notice.as_ref().map(|notice| match notice.level {
        NoticeLevel::Success => format!("OK: {}", notice.message),
        NoticeLevel::Error => format!("ERROR: {}", notice.message),
    })
}

pub fn summary(view: &AppViewModel) -> String {
    let mut out = String::new();
    if let Some(rejection) = &view.rejection {
        out.push_str(&rejection_banner(rejection));
        out.push('\n');
    }
    out.push_str(&statistics(&view.statistics));
    out
}

fn rejection_banner(notice: &RejectionNotice) -> String {
    let mut line = format!(
        "Assignment rejected: {} ({}) for {} by {}. Reason: {}",
        notice.request_id,
        notice.crop.as_deref().unwrap_or("-"),
        notice.farmer_name.as_deref().unwrap_or("unknown farmer"),
        notice.agronomist_name,
        notice.reason
    );
    if notice.is_old_data {
        line.push_str(" [incomplete record]");
    }
    line
}

fn statistics(stats: &Statistics) -> String {
    let status = &stats.status;
    let mut out = String::new();
    let _ = writeln!(out, "Requests: {}", status.total);
    let _ = writeln!(
        out,
        "  pending          {:>4} ({:.1}%)",
        status.pending, status.pending_pct
    );
    let _ = writeln!(
        out,
        "  assigned/ongoing {:>4} ({:.1}%)",
        status.ongoing, status.ongoing_pct
    );
    let _ = writeln!(out, "  completed        {:>4}", status.completed);
    let _ = writeln!(out, "  cancelled        {:>4}", status.cancelled);

    out.push_str("Crops:\n");
    for share in &stats.crops {
        let _ = writeln!(
            out,
            "  {:<16} {:>4} ({:.1}%)",
            share.crop, share.count, share.percentage
        );
    }

    out.push_str("Monthly submissions:\n");
    for bucket in &stats.monthly {
        let _ = writeln!(out, "  {:<16} {:>4}", bucket.label, bucket.count);
    }
    out
}

pub fn rows(view: &AppViewModel) -> String {
    let mut out = String::new();
    for row in &view.rows {
        out.push_str(&row_line(row));
        out.push('\n');
    }
    let _ = writeln!(out, "{} of {} requests", view.rows.len(), view.total_requests);
    out
}

pub fn row_line(row: &RequestRowView) -> String {
    let mut line = format!(
        "{:<12} {:<16} {:<20} {:<12}",
        row.request_id,
        row.status.as_wire(),
        row.farmer_name,
        row.crop
    );
    if let Some(variety) = &row.variety {
        let _ = write!(line, " variety={variety}");
    }
    if let Some(location) = &row.location {
        let _ = write!(line, " location={location}");
    }
    if let Some(expert) = &row.assigned_expert_name {
        let _ = write!(line, " expert={expert}");
    }
    line
}

pub fn dialog(dialog: &AssignDialogView) -> String {
    let mut out = format!("Available agronomists for {}:\n", dialog.request_id);
    match &dialog.agronomists {
        AgronomistList::Loading => out.push_str("  (still loading)\n"),
        AgronomistList::Failed(message) => {
            let _ = writeln!(out, "  could not load: {message}");
        }
        AgronomistList::Loaded(list) if list.is_empty() => out.push_str("  (none)\n"),
        AgronomistList::Loaded(list) => {
            for agronomist in list {
                let name = match agronomist.full_name.trim() {
                    "" => "(unnamed)",
                    name => name,
                };
                let _ = writeln!(
                    out,
                    "  {:<12} {:<24} {}",
                    agronomist.id,
                    name,
                    agronomist.expertise.as_deref().unwrap_or("")
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::{Agronomist, HarvestRequest, Notice, RequestStatus};

    #[test]
    fn summary_includes_rejection_and_shares() {
        let requests = vec![
            HarvestRequest {
                crop: Some("Tomato".to_string()),
                created_at: Some("2024-05-01".to_string()),
                ..HarvestRequest::pending("R1")
            },
            HarvestRequest {
                status: RequestStatus::Assigned,
                ..HarvestRequest::pending("R2")
            },
        ];
        let view = AppViewModel {
            statistics: Statistics::compute(&requests),
            rejection: Some(RejectionNotice {
                request_id: "R1".to_string(),
                farmer_name: None,
                crop: Some("Tomato".to_string()),
                reason: "No reason provided".to_string(),
                agronomist_name: "Unknown agronomist".to_string(),
                is_old_data: true,
            }),
            ..AppViewModel::default()
        };

        let text = summary(&view);
        assert!(text.starts_with("Assignment rejected: R1 (Tomato)"));
        assert!(text.contains("[incomplete record]"));
        assert!(text.contains("pending             1 (50.0%)"));
        assert!(text.contains("May 2024"));
        assert!(text.contains("Unknown"));
    }

    #[test]
    fn notice_line_marks_errors() {
        let view = AppViewModel {
            notice: Some(Notice::error("Request is no longer pending")),
            ..AppViewModel::default()
        };
        assert_eq!(
            notice_line(&view).as_deref(),
            Some("ERROR: Request is no longer pending")
        );
    }

    #[test]
    fn dialog_lists_agronomists() {
        let view = AssignDialogView {
            request_id: "R1".to_string(),
            agronomists: AgronomistList::Loaded(vec![Agronomist {
                id: "A1".to_string(),
                full_name: "Jane Doe".to_string(),
                expertise: Some("Tomatoes".to_string()),
                availability: true,
            }]),
            submitting: false,
            can_submit: true,
        };
        let text = dialog(&view);
        assert!(text.contains("A1"));
        assert!(text.contains("Jane Doe"));
    }
}
