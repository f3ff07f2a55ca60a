// =====================================================
// SQL UTILITIES MODULE
// Identifier quoting and statement helpers for the sinks
// =====================================================

use crate::db_types::DatabaseType;

pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn quote_identifier_ansi(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_identifier(db_type: &DatabaseType, name: &str) -> String {
    match db_type {
        DatabaseType::MySQL => quote_identifier_mysql(name),
        _ => quote_identifier_ansi(name),
    }
}

/// Quotes `table` or `database.table` part by part.
pub fn qualified_table_name(db_type: &DatabaseType, table: &str) -> String {
    table
        .trim()
        .split('.')
        .map(|part| quote_identifier(db_type, part.trim()))
        .collect::<Vec<_>>()
        .join(".")
}

/// `?, ?, ?` for `count` values.
pub fn placeholder_list(count: usize) -> String {
    vec!["?"; count].join(", ")
}
