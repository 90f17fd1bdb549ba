//! Domain models for dailyspend

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Expense categories
///
/// Declaration order is the enumeration order used to break ties when
/// ranking categories by amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Gas,
    Food,
    Drink,
    Market,
    Entertainment,
    Transportation,
    Healthcare,
    Education,
    Shopping,
    Utilities,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gas => "Gas",
            Self::Food => "Food",
            Self::Drink => "Drink",
            Self::Market => "Market",
            Self::Entertainment => "Entertainment",
            Self::Transportation => "Transportation",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::Other => "Other",
        }
    }

    /// All categories in enumeration order
    pub fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Gas,
            Self::Food,
            Self::Drink,
            Self::Market,
            Self::Entertainment,
            Self::Transportation,
            Self::Healthcare,
            Self::Education,
            Self::Shopping,
            Self::Utilities,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown expense category: {}", s))
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Income types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeType {
    Salary,
    Freelance,
    Investment,
    Business,
    Gift,
    Bonus,
    Other,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::Freelance => "Freelance",
            Self::Investment => "Investment",
            Self::Business => "Business",
            Self::Gift => "Gift",
            Self::Bonus => "Bonus",
            Self::Other => "Other",
        }
    }

    pub fn all() -> &'static [IncomeType] {
        &[
            Self::Salary,
            Self::Freelance,
            Self::Investment,
            Self::Business,
            Self::Gift,
            Self::Bonus,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown income type: {}", s))
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timestamp for a calendar day at local noon
///
/// Noon avoids DST gaps at midnight. The offset in effect is kept so the
/// calendar day survives serialization regardless of the reader's zone.
pub fn local_noon(date: NaiveDate) -> DateTime<FixedOffset> {
    let naive = date
        .and_hms_opt(12, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::default()));
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => {
            let offset = *dt.offset();
            dt.with_timezone(&offset)
        }
        None => DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)),
    }
}

fn validate_amount(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidData(format!(
            "Amount must be a non-negative number, got {}",
            amount
        )))
    }
}

/// A single expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: DateTime<FixedOffset>,
    pub name: String,
    pub category: ExpenseCategory,
    pub cost: f64,
    #[serde(default)]
    pub note: String,
}

impl Expense {
    /// Create an expense with a fresh id
    pub fn new(
        date: DateTime<FixedOffset>,
        name: impl Into<String>,
        category: ExpenseCategory,
        cost: f64,
        note: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            name: name.into(),
            category,
            cost: validate_amount(cost)?,
            note: note.into(),
        })
    }

    /// Create an expense dated at local noon on `day`
    pub fn on(
        day: NaiveDate,
        name: impl Into<String>,
        category: ExpenseCategory,
        cost: f64,
    ) -> Result<Self> {
        Self::new(local_noon(day), name, category, cost, "")
    }

    /// Calendar day in the offset the entry was recorded with
    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn falls_in(&self, month: u32, year: i32) -> bool {
        let day = self.calendar_date();
        day.month() == month && day.year() == year
    }
}

/// A single income entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub date: DateTime<FixedOffset>,
    pub source: String,
    #[serde(rename = "type")]
    pub income_type: IncomeType,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

impl Income {
    pub fn new(
        date: DateTime<FixedOffset>,
        source: impl Into<String>,
        income_type: IncomeType,
        amount: f64,
        note: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            source: source.into(),
            income_type,
            amount: validate_amount(amount)?,
            note: note.into(),
        })
    }

    pub fn on(
        day: NaiveDate,
        source: impl Into<String>,
        income_type: IncomeType,
        amount: f64,
    ) -> Result<Self> {
        Self::new(local_noon(day), source, income_type, amount, "")
    }

    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn falls_in(&self, month: u32, year: i32) -> bool {
        let day = self.calendar_date();
        day.month() == month && day.year() == year
    }
}

/// Either side of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transaction {
    Expense(Expense),
    Income(Income),
}

impl Transaction {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Expense(e) => e.id,
            Self::Income(i) => i.id,
        }
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Expense(e) => e.date,
            Self::Income(i) => i.date,
        }
    }

    /// Expense name or income source
    pub fn label(&self) -> &str {
        match self {
            Self::Expense(e) => &e.name,
            Self::Income(i) => &i.source,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Self::Expense(e) => e.cost,
            Self::Income(i) => i.amount,
        }
    }

    /// Category or income type, as displayed
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Expense(e) => e.category.as_str(),
            Self::Income(i) => i.income_type.as_str(),
        }
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense(_))
    }
}

/// Longest trend window, in months
pub const MAX_TREND_MONTHS: usize = 1200;

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(Error::InvalidData(format!("Invalid month: {}", month)))
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Month name without the year (e.g. "October")
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month.clamp(1, 12) - 1) as usize]
    }

    /// Human-readable label including the year (e.g. "October 2026")
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// The `n` months ending at `self`, oldest first
    ///
    /// `n` is clamped to [`MAX_TREND_MONTHS`].
    pub fn trailing(&self, n: usize) -> Vec<MonthKey> {
        let mut keys: Vec<MonthKey> = std::iter::successors(Some(*self), |k| Some(k.previous()))
            .take(n.min(MAX_TREND_MONTHS))
            .collect();
        keys.reverse();
        keys
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Derived totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub total_expenses: f64,
    pub total_income: f64,
    pub category_breakdown: BTreeMap<ExpenseCategory, f64>,
}

impl MonthlySummary {
    pub fn net_income(&self) -> f64 {
        self.total_income - self.total_expenses
    }

    pub fn key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }

    /// Category rows with their share of the month's spending, largest first
    pub fn category_shares(&self) -> Vec<CategoryShare> {
        let mut rows: Vec<CategoryShare> = self
            .category_breakdown
            .iter()
            .map(|(category, total)| CategoryShare {
                category: *category,
                total: *total,
                percentage: if self.total_expenses > 0.0 {
                    total / self.total_expenses * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        rows.sort_by(|a, b| b.total.total_cmp(&a.total));
        rows
    }
}

/// One row of the monthly category summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub total: f64,
    pub percentage: f64,
}

/// Expense and income totals for one month of a trend window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub label: String,
    pub total_expense: f64,
    pub total_income: f64,
}

/// Summed spending for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub amount: f64,
}

/// Normalized input to insight generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialProfile {
    /// Month the income/expense totals refer to
    pub period: MonthKey,
    pub total_monthly_income: f64,
    pub total_monthly_expenses: f64,
    pub net_income: f64,
    /// Largest categories first; ties keep enumeration order
    pub top_spending_categories: Vec<CategoryTotal>,
    /// Trailing spending totals keyed by (year, month)
    pub spending_trends: BTreeMap<MonthKey, f64>,
    pub income_trends: BTreeMap<MonthKey, f64>,
    pub user_goals: Vec<String>,
}

impl FinancialProfile {
    pub fn top_category(&self) -> Option<&CategoryTotal> {
        self.top_spending_categories.first()
    }

    /// Savings rate as a percentage of income, if there is income
    pub fn savings_rate(&self) -> Option<f64> {
        if self.total_monthly_income > 0.0 {
            Some(self.net_income / self.total_monthly_income * 100.0)
        } else {
            None
        }
    }

    pub fn with_goals(mut self, goals: Vec<String>) -> Self {
        self.user_goals = goals;
        self
    }
}

/// Kind of financial observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Spending,
    Saving,
    Income,
    Budget,
    Warning,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spending => "spending",
            Self::Saving => "saving",
            Self::Income => "income",
            Self::Budget => "budget",
            Self::Warning => "warning",
        }
    }

    /// Lenient parse used for model output: unknown values become `Budget`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "spending" => Self::Spending,
            "saving" => Self::Saving,
            "income" => Self::Income,
            "budget" => Self::Budget,
            "warning" => Self::Warning,
            _ => Self::Budget,
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Lenient parse used for model output: unknown values become `Medium`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured financial observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub priority: Priority,
    pub action_items: Vec<String>,
}
