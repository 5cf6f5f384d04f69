use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::path::Path;
use uuid::Uuid;

use crate::format::{format_amount, format_percent, progress_bar, short_id, truncate};
use crate::models::JarSummary;
use crate::sync::{WidgetEntry, WidgetReader};

const BAR_WIDTH: usize = 16;

/// Read-only view of the shared container, the way the home-screen widget
/// sees it. Never touches the jar store.
pub(crate) fn as_widget(args: &[String], shared_dir: &Path) -> Result<()> {
    let reader = WidgetReader::new(shared_dir);
    match args.first().map(String::as_str) {
        None | Some("entry") => widget_entry(&reader),
        Some("list") => widget_list(&reader),
        Some("show") => widget_show(&args[1..], &reader),
        Some("refresh") => {
            reader
                .request_refresh()
                .context("Failed to request a widget refresh")?;
            println!("Refresh requested; the app will republish on its next run");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown widget command: {other} (expected list, show, refresh)"),
    }
}

fn widget_entry(reader: &WidgetReader) -> Result<()> {
    let entry = WidgetEntry::from_snapshot(reader.read_snapshot().as_ref(), Utc::now());

    match &entry.featured {
        Some(jar) => print_summary(jar),
        None => {
            println!("No savings jars yet");
            println!("Open the app to create your first jar");
        }
    }
    if entry.jar_count > 1 {
        println!();
        println!(
            "All {} jars: {} of {} ({})",
            entry.jar_count,
            format_amount(entry.total_saved),
            format_amount(entry.total_target),
            format_percent(entry.total_progress)
        );
    }
    println!();
    match entry.age() {
        Some(age) => println!("Updated {}", describe_age(age)),
        None => println!("Never updated"),
    }
    println!("Next refresh {}", entry.next_refresh.format("%H:%M UTC"));
    Ok(())
}

fn widget_list(reader: &WidgetReader) -> Result<()> {
    let jars = reader.all_jars();
    if jars.is_empty() {
        println!("No jars published");
        return Ok(());
    }
    let featured = reader.featured_jar().map(|j| j.id);
    for jar in &jars {
        let marker = if Some(jar.id) == featured { '*' } else { ' ' };
        println!(
            "{marker} {:<8} {:<20} {} {:>6}",
            short_id(&jar.id),
            truncate(&jar.name, 20),
            progress_bar(jar.progress_percentage, BAR_WIDTH),
            format_percent(jar.progress_percentage)
        );
    }
    Ok(())
}

fn widget_show(args: &[String], reader: &WidgetReader) -> Result<()> {
    let raw = args.first().context("Usage: savings-jars widget show <id>")?;
    let id = Uuid::parse_str(raw).with_context(|| format!("'{raw}' is not a jar id"))?;
    let jar = reader
        .jar_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("No published jar with id {id}"))?;
    print_summary(&jar);
    Ok(())
}

fn print_summary(jar: &JarSummary) {
    println!("{}  [{} {}]", jar.name, jar.icon, jar.color);
    println!(
        "{} {}",
        progress_bar(jar.progress_percentage, BAR_WIDTH),
        format_percent(jar.progress_percentage)
    );
    println!(
        "{} of {}",
        format_amount(jar.current_amount),
        format_amount(jar.target_amount)
    );
}

fn describe_age(age: Duration) -> String {
    let minutes = age.num_minutes();
    match minutes {
        i64::MIN..=0 => "just now".to_string(),
        1..=59 => format!("{minutes} min ago"),
        60..=1439 => format!("{} h ago", minutes / 60),
        _ => format!("{} days ago", minutes / 1440),
    }
}
