//! Aggregation over ledger collections
//!
//! Pure functions: monthly totals, category breakdowns and trend series.
//! Dates are bucketed by the calendar day recorded with each entry, not
//! by a UTC-normalized instant.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Expense, ExpenseCategory, Income, MonthKey, MonthlySummary, TrendPoint};

/// Totals for a single calendar month
pub fn monthly_summary(
    expenses: &[Expense],
    incomes: &[Income],
    month: u32,
    year: i32,
) -> MonthlySummary {
    let monthly_expenses: Vec<&Expense> =
        expenses.iter().filter(|e| e.falls_in(month, year)).collect();

    let total_expenses = monthly_expenses.iter().map(|e| e.cost).sum();
    let total_income = incomes
        .iter()
        .filter(|i| i.falls_in(month, year))
        .map(|i| i.amount)
        .sum();

    MonthlySummary {
        month,
        year,
        total_expenses,
        total_income,
        category_breakdown: category_breakdown(monthly_expenses.into_iter()),
    }
}

/// Sum expense amounts by category
///
/// A category appears only if at least one expense carries it, even when
/// that expense's amount is zero.
pub fn category_breakdown<'a>(
    expenses: impl Iterator<Item = &'a Expense>,
) -> BTreeMap<ExpenseCategory, f64> {
    let mut breakdown = BTreeMap::new();
    for expense in expenses {
        *breakdown.entry(expense.category).or_insert(0.0) += expense.cost;
    }
    breakdown
}

/// Expense and income totals for the `window_months` months ending at `today`
///
/// Returned oldest first. Months without entries are present with zero totals.
pub fn trend_series(
    expenses: &[Expense],
    incomes: &[Income],
    window_months: usize,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    MonthKey::of(today)
        .trailing(window_months)
        .into_iter()
        .map(|key| {
            let total_expense = expenses
                .iter()
                .filter(|e| e.falls_in(key.month, key.year))
                .map(|e| e.cost)
                .sum();
            let total_income = incomes
                .iter()
                .filter(|i| i.falls_in(key.month, key.year))
                .map(|i| i.amount)
                .sum();
            TrendPoint {
                month: key,
                label: key.label(),
                total_expense,
                total_income,
            }
        })
        .collect()
}

/// Spending totals per month for the trailing window ending at `today`
pub fn spending_by_month(
    expenses: &[Expense],
    window_months: usize,
    today: NaiveDate,
) -> BTreeMap<MonthKey, f64> {
    trend_series(expenses, &[], window_months, today)
        .into_iter()
        .map(|point| (point.month, point.total_expense))
        .collect()
}
