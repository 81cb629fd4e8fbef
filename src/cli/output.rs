//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::models::{AccountInfo, Role};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a table of accounts
pub fn print_accounts_table(accounts: &[AccountInfo]) {
    if accounts.is_empty() {
        info("No accounts found. Create one with 'dealerdesk create-admin --name <name> --email <email>'");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Email").fg(Color::Cyan),
            Cell::new("Role").fg(Color::Cyan),
            Cell::new("Active").fg(Color::Cyan),
            Cell::new("Created").fg(Color::Cyan),
        ]);

    for account in accounts {
        let role_color = match account.role {
            Role::Admin => Color::Yellow,
            Role::User => Color::Green,
            Role::ReadOnly => Color::Blue,
        };

        let active = if account.active {
            Cell::new("✓").fg(Color::Green)
        } else {
            Cell::new("✗").fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(&account.id),
            Cell::new(&account.name),
            Cell::new(&account.email),
            Cell::new(account.role.to_string()).fg(role_color),
            active,
            Cell::new(account.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    println!("{table}");
}
