// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::Path;

use expense_tracker::config::{data_dir, Config, LOG_FILE};
use expense_tracker::{
    format_list_amount, format_summary_amount, import_csv, logging, parse_category_filter,
    ExpenseBook, ExpenseRepository, FilterCriteria, SqliteStore,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && matches!(args[1].as_str(), "--help" | "-h" | "help") {
        print_help();
        return Ok(());
    }

    let config = Config::load()?;
    if let Err(e) = logging::init(&data_dir()?.join(LOG_FILE), config.level_filter()) {
        eprintln!("⚠️  Logging disabled: {:#}", e);
    }
    log::info!("expense-tracker v{} starting", expense_tracker::VERSION);

    let mut book = open_book(&config)?;

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let path = args.get(2).ok_or_else(|| anyhow!("Usage: expense-tracker import <file.csv>"))?;
            run_import(&mut book, Path::new(path))
        }
        Some("list") => {
            book.set_criteria(parse_filter_flags(&args[2..])?);
            run_list(&book);
            Ok(())
        }
        Some("summary") => {
            book.set_criteria(parse_filter_flags(&args[2..])?);
            run_summary(&book);
            Ok(())
        }
        Some(other) => Err(anyhow!("Unknown command: {} (try --help)", other)),
        None => run_ui_mode(book),
    }
}

fn open_book(config: &Config) -> Result<ExpenseBook<SqliteStore>> {
    let db_path = config.database_path()?;
    let store = SqliteStore::open(&db_path)?;
    log::info!("Using database {}", db_path.display());

    let repository = ExpenseRepository::with_key(store, config.storage_key.clone());
    Ok(ExpenseBook::open(repository, config.id_strategy.generator()))
}

/// `--category C --from YYYY-MM-DD --to YYYY-MM-DD`, all optional
fn parse_filter_flags(args: &[String]) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("Missing value for {}", flag))?;
        match flag.as_str() {
            "--category" => {
                criteria.category = parse_category_filter(value)
                    .with_context(|| "Expected All, Food, Travel, Bills or Other")?;
            }
            "--from" => criteria.date_from = value.clone(),
            "--to" => criteria.date_to = value.clone(),
            other => return Err(anyhow!("Unknown option: {}", other)),
        }
    }

    Ok(criteria)
}

fn run_import(book: &mut ExpenseBook<SqliteStore>, path: &Path) -> Result<()> {
    println!("📂 Importing {}...", path.display());

    let report = import_csv(path)?;
    for rejected in &report.rejected {
        println!("  ✗ line {}: {}", rejected.line, rejected.errors);
    }

    let accepted = book.import(report.accepted);
    println!("✓ Imported {} of {} rows", accepted, accepted + report.rejected.len());
    Ok(())
}

fn run_list(book: &ExpenseBook<SqliteStore>) {
    let visible = book.visible();
    if visible.is_empty() {
        println!("No expenses.");
        return;
    }

    println!("{:>14}  {:<10}  {:<8}  {}", "Amount", "Date", "Category", "Note");
    for e in &visible {
        println!(
            "{:>14}  {:<10}  {:<8}  {}",
            format_list_amount(e.amount),
            e.date,
            e.category.as_str(),
            if e.note.is_empty() { "-" } else { e.note.as_str() },
        );
    }
}

fn run_summary(book: &ExpenseBook<SqliteStore>) {
    let summary = book.summary();

    println!("Total Spent: {}", format_summary_amount(summary.total));
    for item in &summary.per_category {
        println!(
            "  {:<8} {:>4}%  {}",
            item.category.as_str(),
            item.percentage,
            format_summary_amount(item.total)
        );
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(book: ExpenseBook<SqliteStore>) -> Result<()> {
    let mut app = ui::App::new(book);
    ui::run_ui(&mut app)?;
    log::info!("UI closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_book: ExpenseBook<SqliteStore>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: expense-tracker list | summary | import <file.csv>");
    std::process::exit(1);
}

fn print_help() {
    println!("Expense Tracker v{}", expense_tracker::VERSION);
    println!();
    println!("USAGE:");
    println!("    expense-tracker                      Start interactive TUI");
    println!("    expense-tracker list [FILTERS]       Print expenses");
    println!("    expense-tracker summary [FILTERS]    Print totals per category");
    println!("    expense-tracker import <file.csv>    Import rows (amount,date,note,category)");
    println!("    expense-tracker --help               Show this help message");
    println!();
    println!("FILTERS:");
    println!("    --category <All|Food|Travel|Bills|Other>");
    println!("    --from <YYYY-MM-DD>    inclusive");
    println!("    --to <YYYY-MM-DD>      inclusive");
}
