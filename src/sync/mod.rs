mod container;
mod provider;
mod reader;

pub(crate) use container::{SharedContainer, SnapshotSink};
pub(crate) use provider::WidgetEntry;
pub(crate) use reader::WidgetReader;

pub(crate) const SNAPSHOT_FILE: &str = "widget_snapshot.json";
pub(crate) const REFRESH_FILE: &str = "refresh.request";
