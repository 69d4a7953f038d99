use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{FileRecord, Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRow {
    pub id: Uuid,
    pub name: String,
    pub status: OrderStatus,
    pub status_label: String,
    pub final_price: f64,
    pub file_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Order-history page: headline counts plus one row per job, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub active_jobs: usize,
    pub awaiting_approval: usize,
    pub in_production: usize,
    pub waiting_for_files: usize,
    pub jobs: Vec<JobRow>,
}

impl DashboardView {
    pub fn build(mut orders: Vec<Order>, files: &[FileRecord]) -> Self {
        let mut file_counts: HashMap<Uuid, usize> = HashMap::new();
        for file in files {
            *file_counts.entry(file.job_id).or_default() += 1;
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let jobs: Vec<JobRow> = orders
            .iter()
            .map(|order| JobRow {
                id: order.id,
                name: order.display_name().to_string(),
                status: order.status,
                status_label: order.status.to_string(),
                final_price: order.final_price,
                file_count: file_counts.get(&order.id).copied().unwrap_or(0),
                created_at: order.created_at,
            })
            .collect();

        let active = || jobs.iter().filter(|job| job.status.is_active());
        Self {
            active_jobs: active().count(),
            awaiting_approval: active()
                .filter(|job| matches!(job.status, OrderStatus::Quote | OrderStatus::Submitted))
                .count(),
            in_production: active()
                .filter(|job| job.status == OrderStatus::InProduction)
                .count(),
            waiting_for_files: active().filter(|job| job.file_count == 0).count(),
            jobs,
        }
    }

    /// Plain-text rendering for terminals.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Active jobs: {}   Awaiting approval: {}   In production: {}   Waiting for files: {}",
            self.active_jobs, self.awaiting_approval, self.in_production, self.waiting_for_files
        );
        if self.jobs.is_empty() {
            out.push_str("No jobs yet.\n");
            return out;
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<36}  {:<28}  {:<14}  {:>10}  {:>5}  {:<10}",
            "JOB", "NAME", "STATUS", "PRICE", "FILES", "CREATED"
        );
        for job in &self.jobs {
            let _ = writeln!(
                out,
                "{:<36}  {:<28}  {:<14}  {:>10.2}  {:>5}  {:<10}",
                job.id,
                truncate(&job.name, 28),
                job.status_label,
                job.final_price,
                job.file_count,
                job.created_at.format("%Y-%m-%d")
            );
        }
        out
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Turnaround;
    use chrono::TimeZone;

    fn order(title: Option<&str>, status: OrderStatus, day: u32) -> Order {
        Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::nil(),
            title: title.map(str::to_string),
            product_type: "postcard".to_string(),
            quantity: 5000,
            paper_type: "14pt C2S".to_string(),
            finishing: vec![],
            turnaround: Turnaround::Standard,
            location: None,
            notes: None,
            standard_price: 1250.0,
            rush_price: 1875.0,
            final_price: 1250.0,
            status,
            created_at: Utc.with_ymd_and_hms(2025, 12, day, 9, 0, 0).unwrap(),
        }
    }

    fn file_for(order: &Order) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            bucket: "art-files".to_string(),
            path: format!("job-{}/1-art.pdf", order.id),
            job_id: order.id,
            user_id: Uuid::nil(),
            file_name: "art.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            size: 4,
            created_at: order.created_at,
        }
    }

    #[test]
    fn test_counts_and_newest_first() {
        let in_production = order(Some("INS CARD – FRONT"), OrderStatus::InProduction, 1);
        let submitted = order(Some("Postcard Mailing – Q1 Promo"), OrderStatus::Submitted, 3);
        let shipped = order(None, OrderStatus::Shipped, 2);
        let files = vec![file_for(&in_production), file_for(&in_production), file_for(&shipped)];

        let view = DashboardView::build(vec![in_production.clone(), submitted.clone(), shipped.clone()], &files);

        assert_eq!(view.active_jobs, 2);
        assert_eq!(view.awaiting_approval, 1);
        assert_eq!(view.in_production, 1);
        assert_eq!(view.waiting_for_files, 1);
        let ids: Vec<Uuid> = view.jobs.iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![submitted.id, shipped.id, in_production.id]);
        assert_eq!(view.jobs[2].file_count, 2);
        assert_eq!(view.jobs[1].name, "postcard");
        assert_eq!(view.jobs[0].status_label, "Submitted");
    }

    #[test]
    fn test_render_lists_jobs() {
        let job = order(Some("Brochure – New Product Line"), OrderStatus::InProduction, 5);
        let rendered = DashboardView::build(vec![job.clone()], &[]).render();
        assert!(rendered.contains("Active jobs: 1"));
        assert!(rendered.contains("Waiting for files: 1"));
        assert!(rendered.contains(&job.id.to_string()));
        assert!(rendered.contains("In Production"));
        assert!(rendered.contains("1250.00"));
        assert!(rendered.contains("2025-12-05"));
    }

    #[test]
    fn test_render_empty_history() {
        let rendered = DashboardView::build(vec![], &[]).render();
        assert!(rendered.contains("No jobs yet."));
    }

    #[test]
    fn test_truncate_marks_cut_names() {
        assert_eq!(truncate("short", 28), "short");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
