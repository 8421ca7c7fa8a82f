//! Common datatypes supporting functions throughout the inventory ledger

use std::{
    collections::HashMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{config::LedgerConfig, errors::Error, ops};

/// Column names of the backing store, in field order
pub const HEADER: [&str; 5] = ["ID", "Name", "Type", "Quantity", "Date"];

/// Sequential identifier for a transaction, starting at 1
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl From<u64> for TransactionId {
    fn from(transaction_id: u64) -> Self {
        Self(transaction_id)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a stock movement
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Stock came in from a supplier
    Received,
    /// Stock went out to a customer
    Sold,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Received => f.write_str("Received"),
            TransactionKind::Sold => f.write_str("Sold"),
        }
    }
}

/// A single row of the ledger. Records are never changed once written.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Position of this record in write order
    #[serde(rename = "ID")]
    pub(crate) id: TransactionId,
    /// Free-text product name
    #[serde(rename = "Name")]
    pub(crate) name: String,
    /// Whether stock was received or sold (see [`TransactionKind`])
    #[serde(rename = "Type")]
    pub(crate) kind: TransactionKind,
    /// Number of units moved; always positive for records written by this crate
    #[serde(rename = "Quantity")]
    pub(crate) quantity: u32,
    /// Local calendar date the record was written
    #[serde(rename = "Date")]
    pub(crate) date: NaiveDate,
}

impl Transaction {
    /// Returns the record's identifier
    #[must_use]
    #[inline]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the product name
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether this was a receipt or a sale
    #[must_use]
    #[inline]
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Returns the number of units moved
    #[must_use]
    #[inline]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the date the record was written
    #[must_use]
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Stock totals for one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock {
    pub(crate) name: String,
    pub(crate) received: u64,
    pub(crate) sold: u64,
}

impl ProductStock {
    /// Creates totals for a product with no movements yet
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: 0,
            sold: 0,
        }
    }

    /// Returns the product name
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the total quantity received
    #[must_use]
    #[inline]
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Returns the total quantity sold
    #[must_use]
    #[inline]
    pub fn sold(&self) -> u64 {
        self.sold
    }

    /// Returns received minus sold.
    ///
    /// Overselling is not rejected anywhere, so this goes negative when more
    /// units were sold than received.
    #[must_use]
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.received as i64 - self.sold as i64
    }
}

impl Display for ProductStock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} → Received: {}, Sold: {}, Remaining: {}",
            self.name,
            self.received,
            self.sold,
            self.remaining()
        )
    }
}

/// Per-product totals, kept in the order each product first appears in the ledger
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StockSummary {
    pub(crate) products: Vec<ProductStock>,
    /// Position of each product in `products`
    pub(crate) index: HashMap<String, usize>,
}

impl StockSummary {
    /// Creates an empty summary
    #[must_use]
    pub fn new() -> Self {
        StockSummary::default()
    }

    /// Looks up the totals for a product
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProductStock> {
        self.index.get(name).map(|&position| &self.products[position])
    }

    /// Number of distinct products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the ledger held no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterates products in first-appearance order
    pub fn iter(&self) -> std::slice::Iter<'_, ProductStock> {
        self.products.iter()
    }
}

impl<'a> IntoIterator for &'a StockSummary {
    type Item = &'a ProductStock;
    type IntoIter = std::slice::Iter<'a, ProductStock>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// An interface to an append-only ledger of transactions
pub trait LedgerStore {
    /// Makes sure the backing store exists, creating an empty one if needed.
    /// Calling this repeatedly never alters existing records.
    fn initialize(&mut self) -> Result<(), Error>;

    /// Counts records currently in the store. A missing store holds no records.
    fn record_count(&self) -> Result<usize, Error>;

    /// Returns every record, in write order
    fn read_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Writes an already-built record to the end of the store, without validation
    fn write_record(&mut self, transaction: &Transaction) -> Result<(), Error>;

    /// Derives the identifier for the next record from the current record count
    fn next_id(&self) -> Result<TransactionId, Error> {
        ops::next_id(self)
    }

    /// Validates and appends a new transaction stamped with today's local date.
    ///
    /// # Errors
    /// [`Error::Validation`] if `name` is empty or `quantity` is zero, before anything
    /// is written. [`Error::Storage`] if the record could not be written.
    fn append(
        &mut self,
        name: &str,
        kind: TransactionKind,
        quantity: u32,
    ) -> Result<Transaction, Error> {
        let today = chrono::Local::now().date_naive();
        ops::append_transaction(self, name, kind, quantity, today)
    }

    /// Reads the whole ledger and totals it per product
    fn summarize(&self) -> Result<StockSummary, Error> {
        Ok(StockSummary::from_transactions(self.read_all()?.iter()))
    }
}

/// Ledger persisted as a CSV file.
///
/// The file is opened and closed within each operation; no handle is held
/// between calls.
///
/// # Limitations
/// Only a single process may use a store file at a time. Identifiers are derived
/// from the row count, so concurrent writers produce duplicate identifiers.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    pub(crate) path: PathBuf,
}

impl CsvLedger {
    /// Creates a ledger backed by the file at `path`. Nothing is touched on disk until
    /// an operation is called.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a ledger using the store location from `config`
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.store_path())
    }

    /// Returns the location of the backing file
    #[must_use]
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Holds all transactions in an in-memory structure.
///
/// # Limitations
/// No persistence.
#[derive(Default, Debug)]
pub struct MemoryLedger {
    pub(crate) transactions: Vec<Transaction>,
}

impl MemoryLedger {
    /// Creates a new, empty [`MemoryLedger`]
    #[must_use]
    pub fn new() -> Self {
        MemoryLedger::default()
    }
}
