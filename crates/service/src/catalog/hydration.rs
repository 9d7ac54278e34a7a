use std::collections::HashMap;

use uuid::Uuid;

use super::domain::{Service, ServiceVersion};

/// Distribute one batch of versions across a page of services.
///
/// Page order is preserved. Versions keep the order they arrived in, so the
/// batch must already be newest first within each owner. Services with no
/// matching rows get an empty list; rows for services outside the page are
/// dropped.
pub fn attach_versions(mut services: Vec<Service>, versions: Vec<ServiceVersion>) -> Vec<Service> {
    let mut by_owner: HashMap<Uuid, Vec<ServiceVersion>> = HashMap::with_capacity(services.len());
    for v in versions {
        by_owner.entry(v.service_id).or_default().push(v);
    }
    for s in services.iter_mut() {
        s.versions = by_owner.remove(&s.id).unwrap_or_default();
    }
    services
}

/// Ids of a page, in page order.
pub fn service_ids(services: &[Service]) -> Vec<Uuid> {
    services.iter().map(|s| s.id).collect()
}
