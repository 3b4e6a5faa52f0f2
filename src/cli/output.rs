//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use dialoguer::{theme::ColorfulTheme, Password};

use crate::models::UserResponse;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Account state label and table color
fn account_state(user: &UserResponse) -> (&'static str, Color) {
    if user.disabled {
        ("disabled", Color::Red)
    } else if user.login_denied {
        ("login denied", Color::Yellow)
    } else {
        ("active", Color::Green)
    }
}

/// Account state as a colored label
pub fn format_state(user: &UserResponse) -> String {
    match account_state(user) {
        (label, Color::Red) => label.red().to_string(),
        (label, Color::Yellow) => label.yellow().to_string(),
        (label, _) => label.green().to_string(),
    }
}

/// Print a table of users
pub fn print_user_table(users: &[UserResponse]) {
    if users.is_empty() {
        info("No users found. Create one with 'staffdesk user add'");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Username").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Email").fg(Color::Cyan),
            Cell::new("Roles").fg(Color::Cyan),
            Cell::new("State").fg(Color::Cyan),
            Cell::new("Created").fg(Color::Cyan),
        ]);

    for user in users {
        let (state, state_color) = account_state(user);

        table.add_row(vec![
            Cell::new(user.id),
            Cell::new(&user.username),
            Cell::new(format!("{} {}", user.first_name, user.last_name)),
            Cell::new(&user.email),
            Cell::new(user.role.join(", ")),
            Cell::new(state).fg(state_color),
            Cell::new(&user.created),
        ]);
    }

    println!("{table}");
}

/// Print a single user
pub fn print_user_detail(user: &UserResponse) {
    println!("{}", "User Details".bold().underline());
    println!();
    println!("  {} {}", "ID:".bold(), user.id);
    println!("  {} {}", "Username:".bold(), user.username);
    println!(
        "  {} {} {}",
        "Name:".bold(),
        user.first_name,
        user.last_name
    );
    println!("  {} {}", "Email:".bold(), user.email.cyan());
    println!("  {} {}", "Phone:".bold(), user.phone);
    println!("  {} {}", "Roles:".bold(), user.role.join(", "));
    println!("  {} {}", "State:".bold(), format_state(user));
}

/// Ask for a password twice on the terminal
pub fn prompt_password(prompt: &str) -> dialoguer::Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
}
