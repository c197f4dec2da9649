//! Bill display formatting

use std::collections::HashMap;

use crate::models::{Bill, BillId, DueBill};

/// Format a list of bills as a table
pub fn format_bill_list(bills: &[Bill], currency_symbol: &str) -> String {
    if bills.is_empty() {
        return "No bills found.".to_string();
    }

    let name_width = bills
        .iter()
        .map(|b| b.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<name_width$}  {:>12}  {:>8}\n",
        "ID",
        "Name",
        "Amount",
        "Priority",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->4}  {:-<name_width$}  {:->12}  {:->8}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for bill in bills {
        output.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>12}  {:>8}\n",
            bill.id.map(|id| id.to_string()).unwrap_or_default(),
            bill.name,
            bill.default_amount_due.format_with_symbol(currency_symbol),
            bill.priority,
            name_width = name_width,
        ));
    }

    output
}

/// Format due bills, labelled with their bill's name
pub fn format_due_bill_list(due: &[DueBill], bills: &[Bill], currency_symbol: &str) -> String {
    if due.is_empty() {
        return "No due bills found.".to_string();
    }

    let names: HashMap<BillId, &str> = bills
        .iter()
        .filter_map(|b| b.id.map(|id| (id, b.name.as_str())))
        .collect();

    let name_width = names.values().map(|n| n.len()).max().unwrap_or(4).max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<name_width$}  {:<10}  {:>12}  {:<10}\n",
        "ID",
        "Bill",
        "Due",
        "Amount",
        "Paid",
        name_width = name_width,
    ));

    for occurrence in due {
        let paid = occurrence
            .pay_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());

        output.push_str(&format!(
            "{:>4}  {:<name_width$}  {:<10}  {:>12}  {:<10}\n",
            occurrence.id.map(|id| id.to_string()).unwrap_or_default(),
            names.get(&occurrence.bill).copied().unwrap_or("?"),
            occurrence.due_date.format("%Y-%m-%d").to_string(),
            occurrence.amount_due.format_with_symbol(currency_symbol),
            paid,
            name_width = name_width,
        ));
    }

    output
}
