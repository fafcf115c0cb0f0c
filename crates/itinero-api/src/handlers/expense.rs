//! Expense endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use itinero_core::error::AppError;
use itinero_database::repositories::expense::{NewDebtor, NewExpense};
use itinero_entity::expense::{Expense, ExpenseSummary, ExpenseWithDebtors};

use crate::dto::request::CreateExpenseRequest;
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /expenses
pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_trip_member(&state, user.id, request.trip_id).await?;

    let expense = state
        .expense_repo
        .create(&NewExpense {
            trip_id: request.trip_id,
            name: request.name,
            amount: request.amount,
            date: request.date,
            category: request.category,
            paid_by_user_id: request.paid_by_user_id,
            payment_method: request.payment_method,
            split_type: request.split_type,
            notes: request.notes,
            debtors: request
                .debtors
                .into_iter()
                .map(|d| NewDebtor {
                    user_id: d.user_id,
                    split_value: d.split_value,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /trips/{groupCode}/expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<Vec<ExpenseWithDebtors>>> {
    let trip = super::require_trip_access(&state, user.id, &group_code).await?;
    Ok(Json(state.expense_repo.list_for_trip(trip.id).await?))
}

/// GET /trips/{groupCode}/expenses/summary
pub async fn expense_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<ExpenseSummary>> {
    let trip = super::require_trip_access(&state, user.id, &group_code).await?;
    Ok(Json(state.expense_repo.summary(trip.id).await?))
}

/// POST /expenses/{id}/complete
pub async fn complete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let expense = state
        .expense_repo
        .find_by_id(expense_id)
        .await?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    require_trip_member(&state, user.id, expense.trip_id).await?;

    state.expense_repo.complete(expense_id).await?;
    Ok(Json(MessageResponse::new("Expense completed")))
}

/// DELETE /expenses/{id}
pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(expense_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let expense = state
        .expense_repo
        .find_by_id(expense_id)
        .await?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    require_trip_member(&state, user.id, expense.trip_id).await?;

    state.expense_repo.delete(expense_id).await?;
    Ok(Json(MessageResponse::new("Expense deleted")))
}

/// Expenses are member-scoped rather than owner-scoped.
async fn require_trip_member(state: &AppState, user_id: i64, trip_id: i64) -> ApiResult<()> {
    let allowed = state.trip_repo.is_member(user_id, trip_id).await?
        || state.trip_repo.is_owner(user_id, trip_id).await?;
    if !allowed {
        return Err(AppError::authorization("Access denied to trip").into());
    }
    Ok(())
}
