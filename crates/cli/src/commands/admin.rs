//! Back-office commands. They share the admin server's filtering and order
//! rules, so a status change refused in the web UI is refused here too.

use respawn_admin::services::OrderDesk;
use respawn_admin::services::filter::{filter_orders, filter_users};
use respawn_core::account::User;
use respawn_core::{AccountStatus, ModerationAction, OrderId, OrderStatus, Price, UserId};

use super::orders::order_rows;
use super::{CliError, Context};
use crate::output::table;

/// Table rows for a user list.
pub fn user_rows(users: &[User]) -> Vec<Vec<String>> {
    users
        .iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.username.clone(),
                user.email.clone(),
                user.display_name(),
                user.role.to_string(),
                user.status.as_str().to_lowercase(),
            ]
        })
        .collect()
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn users(
    ctx: &Context,
    search: Option<&str>,
    status: Option<AccountStatus>,
) -> Result<(), CliError> {
    let all = ctx.client.users(ctx.token()?).await?;
    let users = filter_users(&all, search, status);

    ctx.out.emit(&users, || {
        let mut lines = table(
            &["ID", "USERNAME", "EMAIL", "NAME", "ROLE", "STATUS"],
            &user_rows(&users),
        );
        lines.push(format!("{} of {} users", users.len(), all.len()));
        lines
    })
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn moderate(
    ctx: &Context,
    user: UserId,
    action: ModerationAction,
) -> Result<(), CliError> {
    ctx.client.moderate_user(ctx.token()?, user, action).await?;

    let status = action.resulting_status();
    tracing::info!(user_id = %user, action = action.path_segment(), "User moderated");
    ctx.out.emit(
        &serde_json::json!({ "id": user, "status": status }),
        || vec![format!("User {user} is now {}", status.as_str().to_lowercase())],
    )
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn orders(
    ctx: &Context,
    search: Option<&str>,
    status: Option<OrderStatus>,
) -> Result<(), CliError> {
    let all = ctx.client.all_orders(ctx.token()?).await?;
    let orders = filter_orders(&all, search, status);

    ctx.out.emit(&orders, || {
        let mut lines = table(&["ORDER", "DATE", "STATUS", "ITEMS", "TOTAL"], &order_rows(&orders));
        lines.push(format!("{} of {} orders", orders.len(), all.len()));
        lines
    })
}

/// Change an order's status through the same rules as the admin server.
///
/// # Errors
///
/// Returns `Admin(Conflict)` for a delivered or cancelled order, otherwise the
/// backend error.
pub async fn set_status(ctx: &Context, order: OrderId, status: OrderStatus) -> Result<(), CliError> {
    let desk = OrderDesk::new(ctx.client.clone());
    let updated = desk.update_status(ctx.token()?, order, status).await?;

    ctx.out.emit(&updated, || {
        vec![format!(
            "Order #{} is {}",
            updated.id,
            updated.status.label().to_lowercase()
        )]
    })
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn profit(ctx: &Context) -> Result<(), CliError> {
    let weekly = ctx.client.weekly_profit(ctx.token()?).await?;
    ctx.out.emit(&weekly, || {
        vec![format!(
            "Last 7 days: {} from {} orders",
            Price::usd(weekly.profit).display(),
            weekly.orders
        )]
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_rows() {
        let users: Vec<User> = serde_json::from_value(json!([{
            "id": 7,
            "username": "ada",
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "ADMIN",
            "status": "SUSPENDED"
        }]))
        .unwrap();

        assert_eq!(
            user_rows(&users),
            vec![vec!["7", "ada", "ada@example.com", "Ada Lovelace", "admin", "suspended"]]
        );
    }
}
