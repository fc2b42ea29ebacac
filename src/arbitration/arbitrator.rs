//! Approval arbitration across the three resource kinds
//!
//! Given one candidate loan request and a snapshot of the currently
//! approved details, decide approvability and enumerate every conflict.
//! The result is data, not an error: callers render the full list to the
//! approver and refuse approval when it is non-empty.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::interval::spans_overlap;
use crate::models::enums::ResourceKind;
use crate::models::loan::{DetailPayload, LoanDetail};

/// An approved loan detail together with the request that owns it, so the
/// candidate's own details can be excluded from the comparison set.
#[derive(Debug, Clone)]
pub struct ApprovedDetail {
    pub request_id: i32,
    pub detail: LoanDetail,
}

#[derive(Debug, Clone)]
struct ItemStock {
    name: String,
    total_stock: i32,
}

/// Read-only snapshot of the catalog resources referenced by the details
/// under evaluation. A resource missing from the snapshot has been deleted
/// since submission and arbitrates as a conflict, never a silent pass.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    items: HashMap<i32, ItemStock>,
    rooms: HashMap<i32, String>,
    attendance_slots: HashMap<i32, String>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, id: i32, name: impl Into<String>, total_stock: i32) {
        self.items.insert(
            id,
            ItemStock {
                name: name.into(),
                total_stock,
            },
        );
    }

    pub fn add_room(&mut self, id: i32, name: impl Into<String>) {
        self.rooms.insert(id, name.into());
    }

    pub fn add_attendance_slot(&mut self, id: i32, name: impl Into<String>) {
        self.attendance_slots.insert(id, name.into());
    }
}

/// One reason an approval is blocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Approving would overdraw the item's stock
    Item {
        resource_id: i32,
        resource_name: String,
        /// Units left once other approved requests are accounted for
        available: i32,
        requested: i32,
    },
    /// The room is already booked for an overlapping window
    Room {
        resource_id: i32,
        resource_name: String,
    },
    /// The attendance slot is already owned by an approved request
    AttendanceSlot {
        resource_id: i32,
        resource_name: String,
    },
    /// The referenced resource no longer exists
    MissingResource {
        resource_kind: ResourceKind,
        resource_id: i32,
    },
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::Item {
                resource_name,
                available,
                requested,
                ..
            } => write!(
                f,
                "{}: insufficient stock (available: {}, requested: {})",
                resource_name, available, requested
            ),
            Conflict::Room { resource_name, .. } => write!(
                f,
                "{}: time window conflicts with another approved booking",
                resource_name
            ),
            Conflict::AttendanceSlot { resource_name, .. } => {
                write!(f, "{}: already claimed by another request", resource_name)
            }
            Conflict::MissingResource {
                resource_kind,
                resource_id,
            } => write!(f, "{} {} no longer exists", resource_kind, resource_id),
        }
    }
}

/// Evaluate every detail of the candidate request against the approved
/// set and catalog snapshot, collecting every conflict found.
///
/// Pure function of its inputs: same snapshot, same verdict. The caller
/// owns re-running it against fresh data immediately before commit, since
/// the snapshot can go stale during human approval latency.
pub fn evaluate_request(
    candidate_id: i32,
    details: &[LoanDetail],
    approved: &[ApprovedDetail],
    catalog: &CatalogSnapshot,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for detail in details {
        // Approved details of the candidate itself never compete with it
        let mut others = approved
            .iter()
            .filter(|a| a.request_id != candidate_id)
            .map(|a| &a.detail);

        match &detail.payload {
            DetailPayload::Item { quantity } => {
                let Some(stock) = catalog.items.get(&detail.resource_id) else {
                    conflicts.push(Conflict::MissingResource {
                        resource_kind: ResourceKind::Item,
                        resource_id: detail.resource_id,
                    });
                    continue;
                };

                let consumed: i32 = others
                    .filter(|d| d.resource_id == detail.resource_id)
                    .filter_map(|d| match d.payload {
                        DetailPayload::Item { quantity } => Some(quantity),
                        _ => None,
                    })
                    .sum();

                let available = stock.total_stock - consumed;
                if *quantity > available {
                    conflicts.push(Conflict::Item {
                        resource_id: detail.resource_id,
                        resource_name: stock.name.clone(),
                        available,
                        requested: *quantity,
                    });
                }
            }

            DetailPayload::Room { starts_at, ends_at } => {
                let Some(name) = catalog.rooms.get(&detail.resource_id) else {
                    conflicts.push(Conflict::MissingResource {
                        resource_kind: ResourceKind::Room,
                        resource_id: detail.resource_id,
                    });
                    continue;
                };

                let overlapping = others
                    .filter(|d| d.resource_id == detail.resource_id)
                    .any(|d| match d.payload {
                        DetailPayload::Room {
                            starts_at: other_start,
                            ends_at: other_end,
                        } => spans_overlap(*starts_at, *ends_at, other_start, other_end),
                        _ => false,
                    });

                if overlapping {
                    conflicts.push(Conflict::Room {
                        resource_id: detail.resource_id,
                        resource_name: name.clone(),
                    });
                }
            }

            DetailPayload::AttendanceSlot => {
                let Some(name) = catalog.attendance_slots.get(&detail.resource_id) else {
                    conflicts.push(Conflict::MissingResource {
                        resource_kind: ResourceKind::AttendanceSlot,
                        resource_id: detail.resource_id,
                    });
                    continue;
                };

                let claimed = others.any(|d| {
                    d.resource_id == detail.resource_id
                        && d.payload == DetailPayload::AttendanceSlot
                });

                if claimed {
                    conflicts.push(Conflict::AttendanceSlot {
                        resource_id: detail.resource_id,
                        resource_name: name.clone(),
                    });
                }
            }
        }
    }

    conflicts
}
