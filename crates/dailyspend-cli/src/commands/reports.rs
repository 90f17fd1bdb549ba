//! Report command implementations (monthly summary, trend)

use anyhow::Result;
use chrono::NaiveDate;
use dailyspend_core::{monthly_summary, trend_series, Ledger, MonthKey, MAX_TREND_MONTHS};

pub fn cmd_summary(ledger: &Ledger, month: MonthKey) -> Result<()> {
    let snapshot = ledger.snapshot()?;
    let summary = monthly_summary(&snapshot.expenses, &snapshot.incomes, month.month, month.year);

    println!();
    println!("📊 {}", month.label());
    println!("   ─────────────────────────────────────────────");
    println!("   Income:    ${:>10.2}", summary.total_income);
    println!("   Expenses:  ${:>10.2}", summary.total_expenses);
    let net = summary.net_income();
    let marker = if net < 0.0 { "🔴" } else { "🟢" };
    println!("   Net:       ${:>10.2} {}", net, marker);

    let shares = summary.category_shares();
    if shares.is_empty() {
        println!();
        println!("   No expenses recorded this month.");
        return Ok(());
    }

    println!();
    println!("   By category:");
    for share in shares {
        println!(
            "     {:<16} ${:>10.2}  {:>5.1}%",
            share.category.as_str(),
            share.total,
            share.percentage
        );
    }
    println!();

    Ok(())
}

pub fn cmd_trend(ledger: &Ledger, months: usize, today: NaiveDate) -> Result<()> {
    if months == 0 || months > MAX_TREND_MONTHS {
        anyhow::bail!("--months must be between 1 and {}", MAX_TREND_MONTHS);
    }
    let snapshot = ledger.snapshot()?;
    let series = trend_series(&snapshot.expenses, &snapshot.incomes, months, today);

    println!();
    println!("📈 Last {} months", months);
    println!("   {:<16}  {:>12}  {:>12}", "Month", "Expenses", "Income");
    println!("   {}", "─".repeat(44));
    for point in &series {
        println!(
            "   {:<16}  {:>12}  {:>12}",
            point.label,
            format!("${:.2}", point.total_expense),
            format!("${:.2}", point.total_income)
        );
    }
    println!();

    Ok(())
}
