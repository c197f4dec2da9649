//! Bank account display formatting
//!
//! Formats bank accounts and their balance snapshots for terminal output.

use crate::models::{BankAccount, BankAccountInstance};

/// Format a list of accounts as a table
pub fn format_account_list(accounts: &[BankAccount]) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = accounts
        .iter()
        .map(|a| a.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<name_width$}  {:<10}  {}\n",
        "ID",
        "Name",
        "Color",
        "URL",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->4}  {:-<name_width$}  {:-<10}  {:-<3}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for account in accounts {
        output.push_str(&format!(
            "{:>4}  {:<name_width$}  {:<10}  {}\n",
            account.id.map(|id| id.to_string()).unwrap_or_default(),
            account.name,
            account.font_color,
            account.url,
            name_width = name_width,
        ));
    }

    output
}

/// Format the balance snapshots of one account
pub fn format_balance_list(
    account: &BankAccount,
    balances: &[BankAccountInstance],
    currency_symbol: &str,
) -> String {
    let mut output = format!("Balances for {}\n", account.name);

    if balances.is_empty() {
        output.push_str("  No balances recorded.\n");
        return output;
    }

    output.push_str(&format!(
        "  {:>4}  {:<10}  {:>14}  {:<10}\n",
        "ID", "Due", "Balance", "Paid"
    ));
    for balance in balances {
        output.push_str(&format!(
            "  {:>4}  {:<10}  {:>14}  {:<10}\n",
            balance.id.map(|id| id.to_string()).unwrap_or_default(),
            balance.due_date.format("%Y-%m-%d"),
            balance.balance.format_with_symbol(currency_symbol),
            balance
                .pay_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BankAccountId, Money, UserId};
    use chrono::NaiveDate;

    #[test]
    fn test_format_account_list() {
        let mut checking = BankAccount::new(UserId::new(1), "Checking", "green");
        checking.id = Some(BankAccountId::new(1));

        let output = format_account_list(&[checking]);
        assert!(output.contains("Checking"));
        assert!(output.contains("green"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_account_list(&[]), "No accounts found.");
    }

    #[test]
    fn test_format_balance_list() {
        let account = BankAccount::new(UserId::new(1), "Checking", "green");
        let balance = BankAccountInstance::new(
            BankAccountId::new(1),
            Money::parse("2500.75").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );

        let output = format_balance_list(&account, &[balance], "€");
        assert!(output.contains("Balances for Checking"));
        assert!(output.contains("€2500.75"));
        assert!(output.contains("2025-01-31"));
    }
}
