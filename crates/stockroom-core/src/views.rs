//! Read-only projections over the collections: table filtering and
//! ordering, and the dashboard counts.

use std::cmp::Ordering;

use stockroom_model::{DatabaseState, EntityId, Material, Request, RequestStatus};

/// Materials with stock below this count as "running low" on the dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Per-column substring filters for the material table. Name and unit match
/// case-insensitively; stock matches against its decimal rendering.
#[derive(Debug, Clone, Default)]
pub struct MaterialFilter {
    pub name: Option<String>,
    pub stock: Option<String>,
    pub unit: Option<String>,
}

impl MaterialFilter {
    pub fn matches(&self, material: &Material) -> bool {
        let name_ok = self.name.as_ref().is_none_or(|needle| {
            material
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let stock_ok = self
            .stock
            .as_ref()
            .is_none_or(|needle| material.stock.to_string().contains(needle));
        let unit_ok = self.unit.as_ref().is_none_or(|needle| {
            material
                .unit
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        name_ok && stock_ok && unit_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSortKey {
    Id,
    Name,
    Stock,
    Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Filter, then optionally sort, the material table.
pub fn filter_and_sort_materials<'a>(
    materials: &'a [Material],
    filter: &MaterialFilter,
    sort: Option<(MaterialSortKey, SortDirection)>,
) -> Vec<&'a Material> {
    let mut rows: Vec<&Material> = materials.iter().filter(|m| filter.matches(m)).collect();
    if let Some((key, direction)) = sort {
        rows.sort_by(|a, b| {
            let ordering = match key {
                MaterialSortKey::Id => a.id.cmp(&b.id),
                MaterialSortKey::Name => a.name.cmp(&b.name),
                MaterialSortKey::Stock => a.stock.cmp(&b.stock),
                MaterialSortKey::Unit => a.unit.cmp(&b.unit),
            };
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
    rows
}

/// Queue order for the admin request view: pending requests first, newest
/// request date first within each group.
pub fn queue_order(requests: &[Request]) -> Vec<&Request> {
    let mut rows: Vec<&Request> = requests.iter().collect();
    rows.sort_by(|a, b| {
        let a_pending = a.status == RequestStatus::Pending;
        let b_pending = b.status == RequestStatus::Pending;
        match (a_pending, b_pending) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => b.request_date.cmp(&a.request_date),
        }
    });
    rows
}

/// One user's requests, newest first.
pub fn requests_for_user(requests: &[Request], user_id: EntityId) -> Vec<&Request> {
    let mut rows: Vec<&Request> = requests.iter().filter(|r| r.user_id == user_id).collect();
    rows.sort_by(|a, b| b.request_date.cmp(&a.request_date));
    rows
}

/// Overview counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub material_count: usize,
    pub pending_requests: usize,
    pub low_stock_materials: usize,
}

pub fn dashboard_stats(state: &DatabaseState) -> DashboardStats {
    DashboardStats {
        material_count: state.materials.len(),
        pending_requests: state
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count(),
        low_stock_materials: state
            .materials
            .iter()
            .filter(|m| m.stock < LOW_STOCK_THRESHOLD)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn material(id: u64, name: &str, stock: u32, unit: &str) -> Material {
        Material {
            id: EntityId(id),
            name: name.to_string(),
            stock,
            unit: unit.to_string(),
        }
    }

    fn request(id: u64, user: u64, days_ago: i64, status: RequestStatus) -> Request {
        Request {
            id: EntityId(id),
            user_id: EntityId(user),
            material_id: EntityId(1),
            quantity: 1,
            request_date: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
                - Duration::days(days_ago),
            status,
        }
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let materials = vec![material(1, "A4 paper", 50, "ream"), material(2, "Stapler", 10, "piece")];
        let filter = MaterialFilter {
            name: Some("PAP".to_string()),
            ..MaterialFilter::default()
        };
        let rows = filter_and_sort_materials(&materials, &filter, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "A4 paper");
    }

    #[test]
    fn stock_filter_matches_decimal_rendering() {
        let materials = vec![material(1, "Pen", 105, "piece"), material(2, "Clip", 42, "box")];
        let filter = MaterialFilter {
            stock: Some("05".to_string()),
            ..MaterialFilter::default()
        };
        let rows = filter_and_sort_materials(&materials, &filter, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock, 105);
    }

    #[test]
    fn sorting_descending_by_stock() {
        let materials = vec![material(1, "Pen", 10, "piece"), material(2, "Clip", 42, "box")];
        let rows = filter_and_sort_materials(
            &materials,
            &MaterialFilter::default(),
            Some((MaterialSortKey::Stock, SortDirection::Descending)),
        );
        let stocks: Vec<u32> = rows.iter().map(|m| m.stock).collect();
        assert_eq!(stocks, vec![42, 10]);
    }

    #[test]
    fn queue_puts_pending_first_then_newest() {
        let requests = vec![
            request(1, 2, 5, RequestStatus::Issued),
            request(2, 2, 1, RequestStatus::Pending),
            request(3, 3, 0, RequestStatus::Rejected),
            request(4, 3, 3, RequestStatus::Pending),
        ];
        let ids: Vec<u64> = queue_order(&requests).iter().map(|r| r.id.0).collect();
        // Pending (newest first), then the rest by date descending.
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn user_requests_are_newest_first() {
        let requests = vec![
            request(1, 2, 5, RequestStatus::Issued),
            request(2, 3, 1, RequestStatus::Pending),
            request(3, 2, 0, RequestStatus::Pending),
        ];
        let ids: Vec<u64> = requests_for_user(&requests, EntityId(2))
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn dashboard_counts_low_stock_below_threshold() {
        let state = DatabaseState {
            materials: vec![
                material(1, "Pen", 9, "piece"),
                material(2, "Paper", 10, "ream"),
                material(3, "Clip", 0, "box"),
            ],
            users: vec![],
            requests: vec![
                request(1, 2, 0, RequestStatus::Pending),
                request(2, 2, 0, RequestStatus::Issued),
            ],
        };
        let stats = dashboard_stats(&state);
        assert_eq!(stats.material_count, 3);
        assert_eq!(stats.pending_requests, 1);
        assert_eq!(stats.low_stock_materials, 2);
    }
}
