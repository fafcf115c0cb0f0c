//! Expense splitting entity models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::user::UserBasic;

/// How an expense is split among debtors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "split_type", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitType {
    /// Even split across all debtors.
    Equal,
    /// Each debtor owes a percentage of the total.
    Percentage,
    /// Each debtor owes an explicit amount.
    Custom,
}

/// A shared expense attached to a trip.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense id.
    pub id: i64,
    /// Trip this expense belongs to.
    pub trip_id: i64,
    /// Short description.
    pub name: String,
    /// Total amount.
    pub amount: f64,
    /// Date the expense occurred.
    pub date: NaiveDate,
    /// Free-form category label.
    pub category: String,
    /// User who fronted the payment.
    pub paid_by_user_id: i64,
    /// Payment method label.
    pub payment_method: String,
    /// Split strategy.
    pub split_type: SplitType,
    /// Optional notes.
    pub notes: Option<String>,
    /// Whether everyone has settled up.
    pub is_completed: bool,
}

/// A debtor's share of an expense.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDebtor {
    /// Debtor row id.
    pub id: i64,
    /// Owing user's id.
    pub user_id: i64,
    /// Computed amount owed.
    pub amount: f64,
    /// The raw split input (percentage or explicit amount; equals `amount`
    /// for an even split).
    pub split_value: f64,
    /// Whether this debtor has paid their share.
    pub has_paid: bool,
}

/// Expense with its debtors and payer identity resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithDebtors {
    /// The expense row.
    #[serde(flatten)]
    pub expense: Expense,
    /// Every debtor share.
    pub debtors: Vec<ExpenseDebtor>,
    /// The paying user, when resolvable.
    pub paid_by: Option<UserBasic>,
}

/// Per-trip aggregate used by the expense summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// Sum of all expense amounts.
    pub total_spent: f64,
    /// Number of expenses.
    pub expense_count: i64,
    /// Net balance per user (positive = is owed money).
    pub balances: Vec<UserBalance>,
}

/// A single user's net balance within a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    /// User id.
    pub user_id: i64,
    /// Total fronted minus total owed.
    pub balance: f64,
}
