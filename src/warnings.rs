//! Warning filtering, deduplication and message building.

use crate::assets::AssetLocator;
use crate::formatters::{format_warning, pretty_timestamp, severity_label, WarningText};
use crate::models::{Notification, WarningRecord};
use dashmap::DashSet;
use std::fmt;

/// Identity of a warning event: area, type and raw start time.
///
/// Records sharing these three fields are the same event, whatever their text
/// or end time says.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WarningIdentity(String);

impl WarningIdentity {
    pub fn of(record: &WarningRecord) -> Self {
        Self(format!(
            "{}|{}|{}",
            record.area_id, record.type_name, record.start_time
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WarningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identities already handed to dispatch during this process lifetime.
///
/// Never pruned: IPMA publishes a handful of warnings per area per day, so the
/// set stays small for any realistic uptime.
#[derive(Debug, Default)]
pub struct SentWarnings {
    seen: DashSet<WarningIdentity>,
}

impl SentWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `identity`; returns `false` if it was already present.
    pub fn insert(&self, identity: WarningIdentity) -> bool {
        self.seen.insert(identity)
    }

    pub fn contains(&self, identity: &WarningIdentity) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// True for warnings in the monitored area above the green tier.
pub fn is_relevant(record: &WarningRecord, area_id: &str) -> bool {
    record.area_id == area_id && !record.level.eq_ignore_ascii_case("green")
}

/// Builds one notification per relevant warning not seen before, in feed order.
///
/// Each identity is marked as seen as soon as its notification is built, so a
/// warning is attempted at most once even if its delivery later fails.
pub fn build_new_warning_notifications(
    records: &[WarningRecord],
    area_id: &str,
    location_name: &str,
    assets: &AssetLocator,
    seen: &SentWarnings,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    for record in records.iter().filter(|r| is_relevant(r, area_id)) {
        let identity = WarningIdentity::of(record);
        if !seen.insert(identity.clone()) {
            tracing::info!("Warning already sent: {}", identity);
            continue;
        }

        let start = pretty_timestamp(&record.start_time);
        let end = pretty_timestamp(&record.end_time);
        let severity = severity_label(&record.level);
        let text = format_warning(&WarningText {
            location: location_name,
            type_name: &record.type_name,
            severity: &severity,
            start: &start,
            end: &end,
            body: &record.text,
        });

        notifications.push(Notification {
            subject: identity.to_string(),
            text,
            asset: assets.locate_warning_asset(&record.type_name),
        });
    }

    notifications
}
