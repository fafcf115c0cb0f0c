//! Expense repository implementation.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;

use itinero_core::error::{AppError, ErrorKind};
use itinero_core::result::AppResult;
use itinero_entity::expense::{
    Expense, ExpenseDebtor, ExpenseSummary, ExpenseWithDebtors, SplitType, UserBalance,
};
use itinero_entity::user::UserBasic;

/// A debtor share as submitted by the client.
#[derive(Debug, Clone)]
pub struct NewDebtor {
    /// User carrying this share.
    pub user_id: i64,
    /// Split value: ignored for equal splits, a percentage for percentage
    /// splits, an absolute amount for custom splits.
    pub split_value: f64,
}

/// Fields required to create an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Trip the expense belongs to.
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
    /// How the amount is divided.
    pub split_type: SplitType,
    /// Optional notes.
    pub notes: Option<String>,
    /// Participants and their shares.
    pub debtors: Vec<NewDebtor>,
}

/// Repository for trip expenses and debtor shares.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    /// Create a new expense repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an expense with its debtor rows in one transaction. The payer's
    /// own share is marked paid immediately.
    pub async fn create(&self, new_expense: &NewExpense) -> AppResult<Expense> {
        if new_expense.debtors.is_empty() {
            return Err(AppError::validation("An expense needs at least one debtor"));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let expense = sqlx::query_as::<_, Expense>(
            "INSERT INTO expenses (trip_id, name, amount, date, category, paid_by_user_id, \
             payment_method, split_type, notes, is_completed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE) RETURNING *",
        )
        .bind(new_expense.trip_id)
        .bind(&new_expense.name)
        .bind(new_expense.amount)
        .bind(new_expense.date)
        .bind(&new_expense.category)
        .bind(new_expense.paid_by_user_id)
        .bind(&new_expense.payment_method)
        .bind(new_expense.split_type)
        .bind(&new_expense.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create expense", e))?;

        let share_count = new_expense.debtors.len() as f64;
        for debtor in &new_expense.debtors {
            let owed = compute_share(new_expense.split_type, new_expense.amount, share_count, debtor.split_value);
            let has_paid = debtor.user_id == new_expense.paid_by_user_id;
            sqlx::query(
                "INSERT INTO expense_debtors (expense_id, user_id, amount, split_value, has_paid) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(expense.id)
            .bind(debtor.user_id)
            .bind(owed)
            .bind(debtor.split_value)
            .bind(has_paid)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create debtor share", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit expense", e)
        })?;

        Ok(expense)
    }

    /// All expenses of a trip with their debtor rows and payer identity,
    /// newest first.
    pub async fn list_for_trip(&self, trip_id: i64) -> AppResult<Vec<ExpenseWithDebtors>> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE trip_id = $1 ORDER BY date DESC, id DESC",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list expenses", e))?;

        let mut enriched = Vec::with_capacity(expenses.len());
        for expense in expenses {
            let debtors = sqlx::query_as::<_, ExpenseDebtor>(
                "SELECT id, user_id, amount, split_value, has_paid \
                 FROM expense_debtors WHERE expense_id = $1 ORDER BY id",
            )
            .bind(expense.id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load debtor shares", e)
            })?;

            let paid_by = sqlx::query_as::<_, UserBasic>(
                "SELECT id, name, surname FROM users WHERE id = $1",
            )
            .bind(expense.paid_by_user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load expense payer", e)
            })?;

            enriched.push(ExpenseWithDebtors {
                expense,
                debtors,
                paid_by,
            });
        }
        Ok(enriched)
    }

    /// Totals and per-user balances for a trip. A positive balance means the
    /// user is owed money, a negative one that they owe.
    pub async fn summary(&self, trip_id: i64) -> AppResult<ExpenseSummary> {
        let expenses = self.list_for_trip(trip_id).await?;

        let mut total_spent = 0.0;
        let mut balances: HashMap<i64, f64> = HashMap::new();
        for item in &expenses {
            total_spent += item.expense.amount;
            *balances.entry(item.expense.paid_by_user_id).or_default() += item.expense.amount;
            for debtor in &item.debtors {
                *balances.entry(debtor.user_id).or_default() -= debtor.amount;
            }
        }

        let mut balances: Vec<UserBalance> = balances
            .into_iter()
            .map(|(user_id, balance)| UserBalance { user_id, balance })
            .collect();
        balances.sort_by_key(|b| b.user_id);

        Ok(ExpenseSummary {
            total_spent,
            expense_count: expenses.len() as i64,
            balances,
        })
    }

    /// Look up an expense by id.
    pub async fn find_by_id(&self, expense_id: i64) -> AppResult<Option<Expense>> {
        sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1")
            .bind(expense_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find expense", e))
    }

    /// Mark an expense as fully settled.
    pub async fn complete(&self, expense_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE expenses SET is_completed = TRUE WHERE id = $1",
        )
        .bind(expense_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete expense", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a debtor share as settled.
    pub async fn settle_share(&self, expense_id: i64, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE expense_debtors SET has_paid = TRUE \
             WHERE expense_id = $1 AND user_id = $2",
        )
        .bind(expense_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to settle share", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an expense and its debtor rows (cascades in the schema).
    pub async fn delete(&self, expense_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(expense_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expense", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

/// Computes the amount one debtor owes under a split strategy.
fn compute_share(split_type: SplitType, total: f64, share_count: f64, split_value: f64) -> f64 {
    match split_type {
        SplitType::Equal => total / share_count,
        SplitType::Percentage => total * split_value / 100.0,
        SplitType::Custom => split_value,
    }
}
