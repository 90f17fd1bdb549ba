//! Financial profile construction
//!
//! Reduces a monthly summary plus raw transactions into the normalized
//! `FinancialProfile` handed to insight backends.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::aggregate::spending_by_month;
use crate::models::{CategoryTotal, Expense, ExpenseCategory, FinancialProfile, Income, MonthlySummary};

/// Number of categories kept in `top_spending_categories`
pub const TOP_CATEGORY_COUNT: usize = 5;

/// Months covered by `spending_trends`, ending at the current month
pub const SPENDING_TREND_MONTHS: usize = 3;

/// Build a profile for the summary's month
///
/// Top categories are computed from the expenses dated in the summary's
/// month, so percentages derived from them stay consistent with
/// `total_monthly_expenses`. The spending trend covers the three months
/// ending at `today`, keyed by (year, month).
pub fn build_profile(
    expenses: &[Expense],
    _incomes: &[Income],
    summary: &MonthlySummary,
    today: NaiveDate,
) -> FinancialProfile {
    let in_period = expenses
        .iter()
        .filter(|e| e.falls_in(summary.month, summary.year));

    FinancialProfile {
        period: summary.key(),
        total_monthly_income: summary.total_income,
        total_monthly_expenses: summary.total_expenses,
        net_income: summary.net_income(),
        top_spending_categories: top_categories(in_period, TOP_CATEGORY_COUNT),
        spending_trends: spending_by_month(expenses, SPENDING_TREND_MONTHS, today),
        income_trends: BTreeMap::new(),
        user_goals: Vec::new(),
    }
}

/// Rank categories by summed cost, largest first
///
/// Ties keep category enumeration order (the sort is stable and the
/// input is walked in that order).
pub fn top_categories<'a>(
    expenses: impl Iterator<Item = &'a Expense>,
    limit: usize,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<ExpenseCategory, f64> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.category).or_insert(0.0) += expense.cost;
    }

    let mut ranked: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    ranked.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    ranked.truncate(limit);
    ranked
}
