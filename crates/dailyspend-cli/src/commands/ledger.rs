//! Ledger command implementations (add, remove, history)

use anyhow::{bail, Context, Result};
use dailyspend_core::models::local_noon;
use dailyspend_core::{
    AddOutcome, DuplicateReason, Expense, ExpenseCategory, Income, IncomeType, Ledger, MonthKey,
};
use uuid::Uuid;

use super::core::parse_date;
use super::truncate;

pub fn cmd_add_expense(
    ledger: &Ledger,
    name: &str,
    amount: f64,
    category: &str,
    date: Option<&str>,
    note: &str,
) -> Result<()> {
    let category: ExpenseCategory = category.parse().map_err(anyhow::Error::msg)?;
    let day = parse_date(date)?;
    let expense = Expense::new(
        local_noon(day),
        name.trim(),
        category,
        amount,
        note,
    )?;
    let id = expense.id;

    match ledger.add_expense(expense).context("Failed to save expense")? {
        AddOutcome::Added => {
            println!("✅ Added expense {} ${:.2} ({}) on {}", name.trim(), amount, category, day);
            println!("   id: {}", id);
        }
        AddOutcome::Duplicate(reason) => report_duplicate("expense", reason),
    }
    Ok(())
}

pub fn cmd_add_income(
    ledger: &Ledger,
    source: &str,
    amount: f64,
    income_type: &str,
    date: Option<&str>,
    note: &str,
) -> Result<()> {
    let income_type: IncomeType = income_type.parse().map_err(anyhow::Error::msg)?;
    let day = parse_date(date)?;
    let income = Income::new(
        local_noon(day),
        source.trim(),
        income_type,
        amount,
        note,
    )?;
    let id = income.id;

    match ledger.add_income(income).context("Failed to save income")? {
        AddOutcome::Added => {
            println!("✅ Added income {} ${:.2} ({}) on {}", source.trim(), amount, income_type, day);
            println!("   id: {}", id);
        }
        AddOutcome::Duplicate(reason) => report_duplicate("income", reason),
    }
    Ok(())
}

fn report_duplicate(kind: &str, reason: DuplicateReason) {
    match reason {
        DuplicateReason::SameId => println!("⚠️  Skipped: an {} with this id already exists", kind),
        DuplicateReason::SameContent => {
            println!("⚠️  Skipped: an identical {} is already recorded for that day", kind)
        }
    }
}

pub fn cmd_remove(ledger: &Ledger, id: Uuid) -> Result<()> {
    if !ledger.remove(id).context("Failed to save ledger")? {
        bail!("No transaction with id {}", id);
    }
    println!("🗑️  Removed {}", id);
    Ok(())
}

pub fn cmd_history(ledger: &Ledger, month: Option<MonthKey>, limit: usize) -> Result<()> {
    let transactions: Vec<_> = ledger
        .history()?
        .into_iter()
        .filter(|t| {
            month.map_or(true, |m| {
                let d = t.date().date_naive();
                MonthKey::of(d) == m
            })
        })
        .collect();

    let title = match month {
        Some(m) => format!("📜 History for {}", m.label()),
        None => "📜 History".to_string(),
    };
    println!("{} ({} transactions)", title, transactions.len());
    println!();

    if transactions.is_empty() {
        println!("   No transactions recorded.");
        return Ok(());
    }

    println!("{}", history_row("Date", "Category", "Label", "Amount", "Id"));
    println!("   {}", "─".repeat(102));
    for tx in transactions.iter().take(limit) {
        let sign = if tx.is_expense() { "-" } else { "+" };
        println!(
            "{}",
            history_row(
                &tx.date().format("%Y-%m-%d").to_string(),
                tx.kind_label(),
                &truncate(tx.label(), 24),
                &format!("{}${:.2}", sign, tx.amount()),
                &tx.id().to_string(),
            )
        );
    }
    if transactions.len() > limit {
        println!("   ... and {} more", transactions.len() - limit);
    }

    Ok(())
}

/// One line of the history table
pub fn history_row(date: &str, category: &str, label: &str, amount: &str, id: &str) -> String {
    format!(
        "   {:<10}  {:<14}  {:<24}  {:>10}  {}",
        date, category, label, amount, id
    )
}
