// ABOUTME: Health probe for adapters, reading one known item and one known channel.
// ABOUTME: Converts every failure into a HealthReport instead of returning an error.

use serde::Serialize;

use crate::adapter::Adapter;
use crate::models::{Channel, Item};

/// What a health report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum HealthSubject {
    Item(Box<Item>),
    Channel(Box<Channel>),
}

/// Outcome of [`adapter_is_working`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthReport {
    Ok,
    /// Data came back but optional fields are missing.
    Warning {
        message: String,
        subject: Option<HealthSubject>,
    },
    /// A read failed or a required field is missing.
    Error {
        message: String,
        subject: Option<HealthSubject>,
    },
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthReport::Ok)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, HealthReport::Warning { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HealthReport::Error { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            HealthReport::Ok => None,
            HealthReport::Warning { message, .. } | HealthReport::Error { message, .. } => Some(message),
        }
    }

    fn error(message: impl Into<String>, subject: Option<HealthSubject>) -> Self {
        HealthReport::Error {
            message: message.into(),
            subject,
        }
    }
}

/// Checks that an adapter can read its test item and test channel.
///
/// A missing item title or channel name is an error. Missing secondary fields
/// are warnings; the channel is still checked after an item warning, and the
/// first warning found is reported if nothing worse turns up.
pub fn adapter_is_working(adapter: &dyn Adapter) -> HealthReport {
    let item = match adapter.test_item_id().and_then(|id| adapter.read_item_by_id(&id)) {
        Ok(item) => item,
        Err(e) => return HealthReport::error(format!("Could not read item. {}", e), None),
    };

    if item.title.trim().is_empty() {
        return HealthReport::error("Item title is missing.", Some(HealthSubject::Item(Box::new(item))));
    }

    let item_warning = missing_item_field(&item).map(|field| HealthReport::Warning {
        message: format!("Field \"{}\" is missing in item.", field),
        subject: Some(HealthSubject::Item(Box::new(item))),
    });

    let channel = match adapter.test_channel_id().and_then(|id| adapter.read_channel(&id)) {
        Ok(channel) => channel,
        Err(e) => return HealthReport::error(format!("Could not read channel. {}", e), None),
    };

    if channel.name.trim().is_empty() {
        return HealthReport::error(
            "Channel name is missing.",
            Some(HealthSubject::Channel(Box::new(channel))),
        );
    }

    if let Some(warning) = item_warning {
        return warning;
    }

    match missing_channel_field(&channel) {
        Some(field) => HealthReport::Warning {
            message: format!("Field \"{}\" is missing in channel.", field),
            subject: Some(HealthSubject::Channel(Box::new(channel))),
        },
        None => HealthReport::Ok,
    }
}

fn missing_item_field(item: &Item) -> Option<&'static str> {
    let checks = [
        ("id", !item.id.is_empty()),
        ("description", !item.description.is_empty()),
        ("duration", item.duration.unwrap_or(0) > 0),
        ("airtime", item.airtime.is_some()),
        ("channel", !item.channel.is_empty()),
        ("image", !item.image.is_empty()),
        ("contributor", !item.contributor.is_empty()),
    ];
    checks.into_iter().find(|(_, present)| !present).map(|(field, _)| field)
}

fn missing_channel_field(channel: &Channel) -> Option<&'static str> {
    let checks = [
        ("id", !channel.id.is_empty()),
        ("description", channel.description.as_deref().is_some_and(|d| !d.is_empty())),
        ("publisher", !channel.publisher.is_empty()),
    ];
    checks.into_iter().find(|(_, present)| !present).map(|(field, _)| field)
}
