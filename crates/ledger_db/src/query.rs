//! Read query composition
//!
//! Each present filter field becomes one [`Predicate`]; predicates are joined
//! with AND and rendered through `sqlx::QueryBuilder` so every value is a bind
//! parameter. Results are ordered newest first by default.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use ledger_kernel::{ReadAccountFilter, ReadEntryFilter, ReadTransactionFilter};

pub const ACCOUNT_COLUMNS: &str =
    "id, external_id, name, normal_side, balance, metadata, version, created_at, updated_at, deleted_at";

pub const TRANSACTION_COLUMNS: &str = "id, external_id, description, metadata, created_at";

pub const ENTRY_COLUMNS: &str =
    "id, transaction_id, account_id, entry_side, account_side, amount, currency, created_at";

/// Table a query reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Accounts,
    Transactions,
    Entries,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Accounts => "accounts",
            Table::Transactions => "transactions",
            Table::Entries => "entries",
        }
    }

    pub fn columns(&self) -> &'static str {
        match self {
            Table::Accounts => ACCOUNT_COLUMNS,
            Table::Transactions => TRANSACTION_COLUMNS,
            Table::Entries => ENTRY_COLUMNS,
        }
    }
}

/// One condition of a read query
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `created_at >= from`
    CreatedFrom(DateTime<Utc>),
    /// `created_at <= to`
    CreatedTo(DateTime<Utc>),
    /// `column = ANY(ids)`; an empty set matches nothing
    UuidIn { column: &'static str, ids: Vec<Uuid> },
    /// `column = ANY(values)`; an empty set matches nothing
    TextIn { column: &'static str, values: Vec<String> },
    /// The transaction has at least one entry against one of the accounts
    HasEntryForAccount(Vec<Uuid>),
}

/// Result ordering on `(created_at, id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    NewestFirst,
    OldestFirst,
}

impl Order {
    fn keyword(&self) -> &'static str {
        match self {
            Order::NewestFirst => "DESC",
            Order::OldestFirst => "ASC",
        }
    }
}

/// A filtered, ordered SELECT over one table
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: Table,
    predicates: Vec<Predicate>,
    order: Order,
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

fn date_bounds(
    predicates: &mut Vec<Predicate>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) {
    if let Some(from) = from {
        predicates.push(Predicate::CreatedFrom(from));
    }
    if let Some(to) = to {
        predicates.push(Predicate::CreatedTo(to));
    }
}

impl SelectQuery {
    /// A query with no predicates
    pub fn new(table: Table) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            order: Order::NewestFirst,
        }
    }

    /// Orders results by creation time ascending
    pub fn oldest_first(mut self) -> Self {
        self.order = Order::OldestFirst;
        self
    }

    /// Adds a predicate
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn accounts(filter: &ReadAccountFilter) -> Self {
        let mut predicates = Vec::new();
        date_bounds(&mut predicates, filter.from_date, filter.to_date);
        if let Some(ids) = &filter.account_ids {
            predicates.push(Predicate::UuidIn { column: "id", ids: uuids(ids) });
        }
        if let Some(values) = &filter.external_ids {
            predicates.push(Predicate::TextIn { column: "external_id", values: values.clone() });
        }
        Self { table: Table::Accounts, predicates, order: Order::NewestFirst }
    }

    pub fn transactions(filter: &ReadTransactionFilter) -> Self {
        let mut predicates = Vec::new();
        date_bounds(&mut predicates, filter.from_date, filter.to_date);
        if let Some(ids) = &filter.transaction_ids {
            predicates.push(Predicate::UuidIn { column: "id", ids: uuids(ids) });
        }
        if let Some(values) = &filter.external_ids {
            predicates.push(Predicate::TextIn { column: "external_id", values: values.clone() });
        }
        if let Some(ids) = &filter.account_ids {
            predicates.push(Predicate::HasEntryForAccount(uuids(ids)));
        }
        Self { table: Table::Transactions, predicates, order: Order::NewestFirst }
    }

    pub fn entries(filter: &ReadEntryFilter) -> Self {
        let mut predicates = Vec::new();
        date_bounds(&mut predicates, filter.from_date, filter.to_date);
        if let Some(ids) = &filter.account_ids {
            predicates.push(Predicate::UuidIn { column: "account_id", ids: uuids(ids) });
        }
        if let Some(ids) = &filter.transaction_ids {
            predicates.push(Predicate::UuidIn { column: "transaction_id", ids: uuids(ids) });
        }
        Self { table: Table::Entries, predicates, order: Order::NewestFirst }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Renders the query with its bind parameters
    pub fn into_builder(self) -> QueryBuilder<'static, Postgres> {
        let table = self.table.name();
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM {}", self.table.columns(), table));

        for (i, predicate) in self.predicates.into_iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::CreatedFrom(from) => {
                    builder.push(format!("{}.created_at >= ", table)).push_bind(from);
                }
                Predicate::CreatedTo(to) => {
                    builder.push(format!("{}.created_at <= ", table)).push_bind(to);
                }
                Predicate::UuidIn { column, ids } => {
                    builder.push(format!("{}.{} = ANY(", table, column)).push_bind(ids).push(")");
                }
                Predicate::TextIn { column, values } => {
                    builder.push(format!("{}.{} = ANY(", table, column)).push_bind(values).push(")");
                }
                Predicate::HasEntryForAccount(ids) => {
                    builder
                        .push(format!(
                            "EXISTS (SELECT 1 FROM entries WHERE entries.transaction_id = {}.id AND entries.account_id = ANY(",
                            table
                        ))
                        .push_bind(ids)
                        .push("))");
                }
            }
        }

        builder.push(format!(
            " ORDER BY {0}.created_at {1}, {0}.id {1}",
            table,
            self.order.keyword()
        ));
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ledger_kernel::{AccountId, TransactionId};

    #[test]
    fn test_unfiltered_accounts_query_orders_newest_first() {
        let query = SelectQuery::accounts(&ReadAccountFilter::all());
        assert!(query.predicates().is_empty());

        let builder = query.into_builder();
        assert_eq!(
            builder.sql(),
            format!(
                "SELECT {} FROM accounts ORDER BY accounts.created_at DESC, accounts.id DESC",
                ACCOUNT_COLUMNS
            )
        );
    }

    #[test]
    fn test_account_predicates_are_anded_in_order() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = ReadAccountFilter::all()
            .from_date(from)
            .external_ids(["a", "b"]);
        let builder = SelectQuery::accounts(&filter).into_builder();

        assert_eq!(
            builder.sql(),
            format!(
                "SELECT {} FROM accounts WHERE accounts.created_at >= $1 AND accounts.external_id = ANY($2) \
                 ORDER BY accounts.created_at DESC, accounts.id DESC",
                ACCOUNT_COLUMNS
            )
        );
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let query = SelectQuery::entries(&ReadEntryFilter::all().from_date(from).to_date(to));

        assert_eq!(
            query.predicates(),
            &[Predicate::CreatedFrom(from), Predicate::CreatedTo(to)]
        );
        let builder = query.into_builder();
        assert!(builder.sql().contains("entries.created_at >= $1 AND entries.created_at <= $2"));
    }

    #[test]
    fn test_empty_set_still_renders_a_predicate() {
        let query = SelectQuery::accounts(&ReadAccountFilter::all().account_ids(Vec::new()));
        assert_eq!(
            query.predicates(),
            &[Predicate::UuidIn { column: "id", ids: Vec::new() }]
        );
        assert!(query.into_builder().sql().contains("WHERE accounts.id = ANY($1)"));
    }

    #[test]
    fn test_transactions_by_account_use_exists() {
        let account = AccountId::new();
        let tx = TransactionId::new();
        let filter = ReadTransactionFilter::all()
            .transaction_ids([tx])
            .account_ids([account]);
        let builder = SelectQuery::transactions(&filter).into_builder();
        let sql = builder.sql();

        assert!(sql.contains("transactions.id = ANY($1)"));
        assert!(sql.contains(
            "EXISTS (SELECT 1 FROM entries WHERE entries.transaction_id = transactions.id \
             AND entries.account_id = ANY($2))"
        ));
        assert!(!sql.contains("JOIN"));
    }

    #[test]
    fn test_oldest_first_reverses_ordering() {
        let tx = TransactionId::new();
        let builder = SelectQuery::new(Table::Entries)
            .and(Predicate::UuidIn { column: "transaction_id", ids: vec![*tx.as_uuid()] })
            .oldest_first()
            .into_builder();

        assert!(builder
            .sql()
            .ends_with("WHERE entries.transaction_id = ANY($1) ORDER BY entries.created_at ASC, entries.id ASC"));
    }

    #[test]
    fn test_entry_filters_target_foreign_keys() {
        let account = AccountId::new();
        let query = SelectQuery::entries(&ReadEntryFilter::all().account_ids([account]));
        assert_eq!(
            query.predicates(),
            &[Predicate::UuidIn { column: "account_id", ids: vec![*account.as_uuid()] }]
        );
    }
}
