//! Storage representation of ledger entities
//!
//! Rows mirror the table layout one column per field. Conversions into rows
//! are infallible; conversions back into domain entities fail only when a
//! stored amount cannot be parsed.
//!
//! Amounts are stored as base-10 strings so no precision is lost, and a
//! balance is stored as a JSON object of currency code to amount string:
//!
//! ```text
//! entries.amount    '10020'
//! accounts.balance  {"BRL": "10020", "USD": "-5"}
//! ```
//!
//! Metadata is stored as given: `None` is SQL NULL and `Some(Value::Null)` is
//! the JSON document `null`.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::Num;
use serde_json::{Map, Value};
use uuid::Uuid;

use ledger_kernel::{Account, Balance, Currency, Entry, Side, Transaction};

use crate::error::DatabaseError;

/// Database representation of [`Side`], stored as the `ledger_side` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ledger_side", rename_all = "snake_case")]
pub enum DbSide {
    Debit,
    Credit,
}

impl From<Side> for DbSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Debit => DbSide::Debit,
            Side::Credit => DbSide::Credit,
        }
    }
}

impl From<DbSide> for Side {
    fn from(side: DbSide) -> Self {
        match side {
            DbSide::Debit => Side::Debit,
            DbSide::Credit => Side::Credit,
        }
    }
}

/// Encodes an optional amount as its decimal string
pub fn encode_amount(amount: Option<&BigInt>) -> Option<String> {
    amount.map(BigInt::to_string)
}

/// Decodes a stored amount
///
/// `None` stays `None`; it is never turned into zero.
///
/// # Errors
///
/// `DatabaseError::MalformedAmount` if the text is not a base-10 integer
pub fn decode_amount(raw: Option<&str>) -> Result<Option<BigInt>, DatabaseError> {
    raw.map(parse_amount).transpose()
}

fn parse_amount(raw: &str) -> Result<BigInt, DatabaseError> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DatabaseError::MalformedAmount(raw.to_string()));
    }
    BigInt::from_str_radix(raw, 10).map_err(|_| DatabaseError::MalformedAmount(raw.to_string()))
}

/// Encodes a balance as a JSON object of decimal strings
///
/// An absent balance is stored as SQL NULL, never as `{}`.
pub fn encode_balance(balance: Option<&Balance>) -> Option<Value> {
    balance.map(|balance| {
        let object: Map<String, Value> = balance
            .iter()
            .map(|(currency, amount)| (currency.code().to_string(), Value::String(amount.to_string())))
            .collect();
        Value::Object(object)
    })
}

/// Decodes a stored balance
///
/// Amounts may be decimal strings or JSON integers of any size. SQL NULL and
/// JSON `null` both decode to no balance.
///
/// # Errors
///
/// `DatabaseError::MalformedAmount` if the document is not an object or an
/// amount is neither an integer string nor an integer number
pub fn decode_balance(raw: Option<&Value>) -> Result<Option<Balance>, DatabaseError> {
    let object = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(object)) => object,
        Some(other) => return Err(DatabaseError::MalformedAmount(other.to_string())),
    };

    let balance = object
        .iter()
        .map(|(code, amount)| {
            let amount = match amount {
                Value::String(text) => parse_amount(text)?,
                Value::Number(number) => parse_amount(&number.to_string())?,
                other => return Err(DatabaseError::MalformedAmount(other.to_string())),
            };
            Ok((Currency::new(code.as_str()), amount))
        })
        .collect::<Result<Balance, DatabaseError>>()?;

    Ok(Some(balance))
}

/// Row of the `accounts` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub normal_side: DbSide,
    pub balance: Option<Value>,
    pub metadata: Option<Value>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: *account.id.as_uuid(),
            external_id: account.external_id.clone(),
            name: account.name.clone(),
            normal_side: account.normal_side.into(),
            balance: encode_balance(account.balance.as_ref()),
            metadata: account.metadata.clone(),
            version: account.version,
            created_at: account.created_at,
            updated_at: account.updated_at,
            deleted_at: account.deleted_at,
        }
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = DatabaseError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id.into(),
            external_id: row.external_id,
            name: row.name,
            normal_side: row.normal_side.into(),
            balance: decode_balance(row.balance.as_ref())?,
            metadata: row.metadata,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Row of the `transactions` table
///
/// Entries live in their own table and are attached with
/// [`TransactionRow::into_transaction`].
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub external_id: String,
    pub description: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRow {
    /// Builds the domain transaction owning `entries`
    pub fn into_transaction(self, entries: Vec<Entry>) -> Transaction {
        Transaction {
            id: self.id.into(),
            external_id: self.external_id,
            description: self.description,
            metadata: self.metadata,
            created_at: self.created_at,
            entries,
        }
    }
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: *transaction.id.as_uuid(),
            external_id: transaction.external_id.clone(),
            description: transaction.description.clone(),
            metadata: transaction.metadata.clone(),
            created_at: transaction.created_at,
        }
    }
}

/// Row of the `entries` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub entry_side: DbSide,
    pub account_side: DbSide,
    pub amount: Option<String>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Entry> for EntryRow {
    fn from(entry: &Entry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            transaction_id: *entry.transaction_id.as_uuid(),
            account_id: *entry.account_id.as_uuid(),
            entry_side: entry.entry_side.into(),
            account_side: entry.account_side.into(),
            amount: encode_amount(entry.amount.as_ref()),
            currency: entry.currency.code().to_string(),
            created_at: entry.created_at,
        }
    }
}

impl TryFrom<EntryRow> for Entry {
    type Error = DatabaseError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Entry {
            id: row.id.into(),
            transaction_id: row.transaction_id.into(),
            account_id: row.account_id.into(),
            entry_side: row.entry_side.into(),
            account_side: row.account_side.into(),
            amount: decode_amount(row.amount.as_deref())?,
            currency: Currency::new(row.currency),
            created_at: row.created_at,
        })
    }
}

/// Decodes a batch of rows, failing the whole batch on the first bad row
pub fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DatabaseError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}
