pub(crate) mod amount;
mod appearance;
mod jar;
mod snapshot;
mod transaction;

pub(crate) use appearance::{JarColor, JarIcon};
pub(crate) use jar::{
    ratio, saturating_sum, total_progress, total_saved, total_target, Jar, JarUpdate, NewJar,
};
pub(crate) use snapshot::{JarSummary, WidgetSnapshot};
pub(crate) use transaction::Transaction;
