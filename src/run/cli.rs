use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use super::{flag_value, has_flag, positionals, shellexpand};
use crate::book::JarBook;
use crate::format::{format_amount, format_percent, progress_bar, short_id, truncate};
use crate::import::{ExportFormat, ImportStrategy};
use crate::models::{Jar, JarColor, JarIcon, JarUpdate, NewJar, Transaction};
use crate::store::legacy;

const BAR_WIDTH: usize = 20;

pub(crate) fn as_cli(args: &[String], book: &mut JarBook) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_list(book);
    };
    let rest = &args[2..];
    match command.as_str() {
        "list" | "ls" => cli_list(book),
        "show" => cli_show(rest, book),
        "new" => cli_new(rest, book),
        "deposit" | "d" => cli_deposit(rest, book),
        "withdraw" | "w" => cli_withdraw(rest, book),
        "add" => cli_add(rest, book),
        "edit" => cli_edit(rest, book),
        "delete" | "rm" => cli_delete(rest, book),
        "feature" => cli_feature(rest, book),
        "summary" | "s" => cli_summary(book),
        "export" => cli_export(rest, book),
        "import" => cli_import(rest, book),
        "sync" => cli_sync(book),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("savings-jars {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("savings-jars: track savings goals, one jar at a time");
    println!();
    println!("Usage: savings-jars [command]");
    println!();
    println!("Commands:");
    println!("  (none), list                  List all jars");
    println!("  show <jar>                    Show a jar and its history");
    println!("  new <name> <target>           Create a jar");
    println!("    --color <tag> --icon <tag>  Appearance (default: blue, banknote)");
    println!("  deposit <jar> <amount>        Add money to a jar");
    println!("  withdraw <jar> <amount>       Take money out of a jar");
    println!("    --note <text>               Note stored with the transaction");
    println!("  add <jar> <±amount>           Record a signed transaction as-is");
    println!("    --date <YYYY-MM-DD>         Backdate it (default: now)");
    println!("  edit <jar>                    Change a jar's details");
    println!("    --name --target --color --icon");
    println!("  delete <jar>                  Delete a jar and its history");
    println!("  feature <jar> | --clear       Choose the jar the widget shows");
    println!("  summary                       Totals across all jars");
    println!("  export [path]                 Export every jar (default: JSON in $HOME)");
    println!("    --format <json|csv>         Output format; path '-' writes to stdout");
    println!("  import <file>                 Import jars from a JSON or CSV export");
    println!("    --replace                   Replace existing jars instead of appending");
    println!("  sync                          Save and republish the widget snapshot");
    println!("  widget [list|show <id>|refresh]  Read what the widget sees");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("<jar> is a name, a full id, or the first 4+ characters of an id.");
}

// ── Queries ───────────────────────────────────────────────────

fn cli_list(book: &JarBook) -> Result<()> {
    if book.jars().is_empty() {
        println!("No jars yet. Create one with: savings-jars new <name> <target>");
        return Ok(());
    }

    let featured = book.featured().map(|j| j.id);
    println!(
        "  {:<8} {:<22} {:>12} {:>12}  {:<w$} {:>6}",
        "ID",
        "Name",
        "Saved",
        "Target",
        "Progress",
        "",
        w = BAR_WIDTH
    );
    println!("{}", "─".repeat(70 + BAR_WIDTH - 8));
    for jar in book.jars() {
        let marker = if Some(jar.id) == featured { '*' } else { ' ' };
        println!(
            "{marker} {:<8} {:<22} {:>12} {:>12}  {} {:>6}",
            short_id(&jar.id),
            truncate(&jar.name, 22),
            format_amount(jar.current_amount),
            format_amount(jar.target_amount),
            progress_bar(jar.progress_percentage(), BAR_WIDTH),
            format_percent(jar.progress_percentage()),
        );
    }
    Ok(())
}

fn cli_show(args: &[String], book: &JarBook) -> Result<()> {
    let query = args
        .first()
        .context("Usage: savings-jars show <jar>")?;
    let jar = resolve(book, query)?;

    println!("{}  ({})", jar.name, jar.id);
    println!("{}", "─".repeat(50));
    println!("  Saved:     {}", format_amount(jar.current_amount));
    println!("  Target:    {}", format_amount(jar.target_amount));
    println!("  Remaining: {}", format_amount(jar.remaining()));
    println!(
        "  Progress:  {} {}{}",
        progress_bar(jar.progress_percentage(), BAR_WIDTH),
        format_percent(jar.progress_percentage()),
        if jar.is_complete() { "  (goal reached)" } else { "" }
    );
    println!("  Look:      {} {}", jar.color, jar.icon);
    println!("  Created:   {}", jar.creation_date.format("%Y-%m-%d"));
    if book.featured().map(|j| j.id) == Some(jar.id) {
        println!("  Featured in widget");
    }

    if jar.transactions.is_empty() {
        println!();
        println!("No transactions");
        return Ok(());
    }

    println!();
    println!("{:<12} {:>12}  Note", "Date", "Amount");
    println!("{}", "─".repeat(50));
    for tx in jar.transactions.iter().rev() {
        let sign = if tx.is_deposit() {
            "+"
        } else if tx.is_withdrawal() {
            "-"
        } else {
            " "
        };
        println!(
            "{:<12} {:>12}  {}",
            tx.date.format("%Y-%m-%d"),
            format!("{sign}{}", format_amount(tx.abs_amount())),
            tx.note
        );
    }
    if !jar.is_balanced() {
        let total = jar
            .transaction_total()
            .map_or_else(|| "(overflow)".to_string(), format_amount);
        eprintln!(
            "Warning: balance {} does not match transaction total {total}",
            format_amount(jar.current_amount),
        );
    }
    Ok(())
}

fn cli_summary(book: &JarBook) -> Result<()> {
    let jars = book.jars();
    let complete = jars.iter().filter(|j| j.is_complete()).count();

    println!("Savings jars");
    println!("{}", "─".repeat(40));
    println!("  Jars:         {} ({complete} complete)", jars.len());
    println!("  Total saved:  {}", format_amount(book.total_saved()));
    println!("  Total target: {}", format_amount(book.total_target()));
    println!(
        "  Progress:     {} {}",
        progress_bar(book.total_progress(), BAR_WIDTH),
        format_percent(book.total_progress())
    );
    match (book.featured(), book.selected()) {
        (Some(jar), Some(_)) => println!("  Featured:     {}", jar.name),
        (Some(jar), None) => println!("  Featured:     {} (first jar, none chosen)", jar.name),
        (None, _) => {}
    }
    Ok(())
}

// ── Mutations ─────────────────────────────────────────────────

fn cli_new(args: &[String], book: &mut JarBook) -> Result<()> {
    let pos = positionals(args, &["--color", "--icon"]);
    let [name, target] = pos.as_slice() else {
        anyhow::bail!("Usage: savings-jars new <name> <target> [--color <tag>] [--icon <tag>]");
    };
    let new_jar = NewJar {
        name: name.to_string(),
        target_amount: parse_amount(target)?,
        color: flag_value(args, "--color").map(parse_color).transpose()?.unwrap_or_default(),
        icon: flag_value(args, "--icon").map(parse_icon).transpose()?.unwrap_or_default(),
    };
    let jar = book.create_jar(new_jar)?;
    println!(
        "Created '{}' ({}) with target {}",
        jar.name,
        short_id(&jar.id),
        format_amount(jar.target_amount)
    );
    Ok(())
}

fn cli_deposit(args: &[String], book: &mut JarBook) -> Result<()> {
    let (id, amount) = jar_and_amount(args, book, "deposit")?;
    let note = flag_value(args, "--note").unwrap_or("Deposit");
    let jar = book.deposit(id, amount, note)?;
    print_balance(jar);
    Ok(())
}

fn cli_withdraw(args: &[String], book: &mut JarBook) -> Result<()> {
    let (id, amount) = jar_and_amount(args, book, "withdraw")?;
    let note = flag_value(args, "--note").unwrap_or("Withdrawal");
    let jar = book.withdraw(id, amount, note)?;
    print_balance(jar);
    Ok(())
}

fn cli_add(args: &[String], book: &mut JarBook) -> Result<()> {
    let (id, amount) = jar_and_amount(args, book, "add")?;
    let note = flag_value(args, "--note").unwrap_or_default();
    let transaction = match flag_value(args, "--date") {
        Some(raw) => {
            let date = legacy::parse_date(raw)
                .with_context(|| format!("'{raw}' is not a date (expected YYYY-MM-DD)"))?;
            Transaction::at(amount, date, note)
        }
        None => Transaction::new(amount, note),
    };
    let jar = book.add_transaction(id, transaction)?;
    print_balance(jar);
    Ok(())
}

fn cli_edit(args: &[String], book: &mut JarBook) -> Result<()> {
    let pos = positionals(args, &["--name", "--target", "--color", "--icon"]);
    let query = pos
        .first()
        .context("Usage: savings-jars edit <jar> [--name] [--target] [--color] [--icon]")?;
    let id = resolve(book, query)?.id;

    let update = JarUpdate {
        name: flag_value(args, "--name").map(str::to_string),
        target_amount: flag_value(args, "--target").map(parse_amount).transpose()?,
        color: flag_value(args, "--color").map(parse_color).transpose()?,
        icon: flag_value(args, "--icon").map(parse_icon).transpose()?,
    };
    if update.name.is_none()
        && update.target_amount.is_none()
        && update.color.is_none()
        && update.icon.is_none()
    {
        anyhow::bail!("Nothing to change. Pass at least one of --name, --target, --color, --icon");
    }

    let jar = book.update_jar_metadata(id, update)?;
    println!("Updated '{}'", jar.name);
    Ok(())
}

fn cli_delete(args: &[String], book: &mut JarBook) -> Result<()> {
    let query = args.first().context("Usage: savings-jars delete <jar>")?;
    let id = resolve(book, query)?.id;
    let removed = book.delete_jar(id)?;
    println!(
        "Deleted '{}' ({} transactions)",
        removed.name,
        removed.transactions.len()
    );
    Ok(())
}

fn cli_feature(args: &[String], book: &mut JarBook) -> Result<()> {
    if has_flag(args, "--clear") {
        book.select_jar(None)?;
        println!("Widget will show the first jar");
        return Ok(());
    }
    let query = args
        .first()
        .context("Usage: savings-jars feature <jar> | --clear")?;
    let jar = resolve(book, query)?;
    let (id, name) = (jar.id, jar.name.clone());
    book.select_jar(Some(id))?;
    println!("Widget now features '{name}'");
    Ok(())
}

// ── Import / export ───────────────────────────────────────────

fn cli_export(args: &[String], book: &JarBook) -> Result<()> {
    let format = match flag_value(args, "--format") {
        Some(raw) => ExportFormat::parse(raw)
            .with_context(|| format!("Unknown export format '{raw}' (expected json or csv)"))?,
        None => ExportFormat::Json,
    };
    let bytes = book.export_all(format)?;

    let output = positionals(args, &["--format"]).first().map(|p| shellexpand(p));
    if output.as_deref() == Some("-") {
        use std::io::Write;
        std::io::stdout()
            .write_all(&bytes)
            .context("Failed to write export to stdout")?;
        return Ok(());
    }

    let output_path = output.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let day = chrono::Local::now().format("%Y-%m-%d");
        format!("{home}/savings-jars-export-{day}.{}", format.extension())
    });
    std::fs::write(&output_path, &bytes)
        .with_context(|| format!("Failed to write {output_path}"))?;
    println!("Exported {} jars to {output_path}", book.jars().len());
    Ok(())
}

fn cli_import(args: &[String], book: &mut JarBook) -> Result<()> {
    let Some(file_path) = positionals(args, &[]).first().map(|p| shellexpand(p)) else {
        anyhow::bail!("Usage: savings-jars import <file> [--replace]");
    };
    let path = Path::new(&file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {file_path}"))?;

    let strategy = if has_flag(args, "--replace") {
        ImportStrategy::Replace
    } else {
        ImportStrategy::Append
    };
    let summary = book.import_all(&bytes, strategy)?;
    println!(
        "Imported {} jars ({} skipped)",
        summary.imported, summary.skipped
    );
    Ok(())
}

fn cli_sync(book: &JarBook) -> Result<()> {
    book.suspend()?;
    println!("Saved {} jars and refreshed the widget snapshot", book.jars().len());
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

fn resolve<'a>(book: &'a JarBook, query: &str) -> Result<&'a Jar> {
    book.find_jar(query)
        .ok_or_else(|| anyhow::anyhow!("No jar matches '{query}'"))
}

fn jar_and_amount(args: &[String], book: &JarBook, verb: &str) -> Result<(Uuid, Decimal)> {
    let pos = positionals(args, &["--note", "--date"]);
    let [query, amount] = pos.as_slice() else {
        anyhow::bail!("Usage: savings-jars {verb} <jar> <amount> [--note <text>]");
    };
    Ok((resolve(book, query)?.id, parse_amount(amount)?))
}

fn print_balance(jar: &Jar) {
    println!(
        "{}: {} of {} ({})",
        jar.name,
        format_amount(jar.current_amount),
        format_amount(jar.target_amount),
        format_percent(jar.progress_percentage())
    );
}

/// Accepts `1234.5`, `$1,234.50` and signed values.
fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().replace(['$', ','], "");
    Decimal::from_str(&cleaned).with_context(|| format!("'{raw}' is not a valid amount"))
}

fn parse_color(raw: &str) -> Result<JarColor> {
    let color = JarColor::parse(&raw.trim().to_lowercase());
    if !color.is_known() {
        let names: Vec<&str> = JarColor::all().iter().map(JarColor::as_str).collect();
        anyhow::bail!("Unknown color '{raw}'. Choose one of: {}", names.join(", "));
    }
    Ok(color)
}

fn parse_icon(raw: &str) -> Result<JarIcon> {
    let icon = JarIcon::parse(&raw.trim().to_lowercase());
    if !icon.is_known() {
        let names: Vec<&str> = JarIcon::all().iter().map(JarIcon::as_str).collect();
        anyhow::bail!("Unknown icon '{raw}'. Choose one of: {}", names.join(", "));
    }
    Ok(icon)
}
