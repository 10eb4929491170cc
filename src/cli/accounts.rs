use std::sync::Arc;

use tabled::Table;

use crate::{
    config::AppConfig,
    error,
    management::AccountManager,
    store::SqliteAccountStore,
    types::AccountTableRow,
    warning,
};

/// Lists accounts ordered by id, keeping those whose email or username
/// contains `search` (case-insensitive).
pub async fn accounts(search: Option<String>) {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let store = match SqliteAccountStore::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => error!(
            "Cannot open account database {}. Err: {}",
            config.database_path.display(),
            e
        ),
    };

    let mut accounts = match AccountManager::new(Arc::new(store)).list() {
        Ok(accounts) => accounts,
        Err(e) => error!("Failed to load accounts. Err: {}", e),
    };

    if let Some(term) = search {
        let term = term.to_lowercase();
        accounts.retain(|a| {
            a.email.contains(&term) || a.username.to_lowercase().contains(&term)
        });
    }

    if accounts.is_empty() {
        warning!("No accounts found.");
        return;
    }

    let table_rows: Vec<AccountTableRow> = accounts
        .into_iter()
        .map(|a| AccountTableRow {
            email: a.email,
            username: a.username,
            date_joined: a.date_joined.format("%Y-%m-%d %H:%M").to_string(),
            is_admin: a.is_admin,
        })
        .collect();

    println!("{}", Table::new(table_rows));
}
