//! Helpers for reading and writing the CSV ledger format and rendering reports

use std::io::{Read, Write};

use crate::{
    errors::{Error, ValidationError},
    types::{StockSummary, Transaction, HEADER},
};

/// Writes the header line that starts every ledger file.
///
/// ```csv
/// ID,Name,Type,Quantity,Date
/// ```
pub fn write_header<W>(writer: &mut W) -> Result<(), Error>
where
    W: Write,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    csv_writer.flush()?;
    Ok(())
}

/// Writes a single record, with no header, to the end of a ledger stream.
///
/// Names containing commas, quotes or newlines are quoted.
pub fn append_transaction_to_csv<W>(writer: &mut W, transaction: &Transaction) -> Result<(), Error>
where
    W: Write,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.serialize(transaction)?;
    csv_writer.flush()?;
    Ok(())
}

/// Loads every transaction from a CSV-formatted ledger stream.
///
/// Expects input data in this format (including header):
/// ```csv
/// ID,Name,Type,Quantity,Date
/// 1,Cotton Fabric,Received,100,2024-03-01
/// 2,Cotton Fabric,Sold,30,2024-03-02
/// ```
pub fn read_transactions_from_csv<R>(reader: &mut R) -> Result<Vec<Transaction>, Error>
where
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let mut transactions = Vec::new();
    for record in csv_reader.deserialize() {
        let transaction: Transaction = record?;
        transactions.push(transaction);
    }
    Ok(transactions)
}

/// Counts the rows following the header, without interpreting them
pub fn count_records_in_csv<R>(reader: &mut R) -> Result<usize, Error>
where
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let mut count = 0;
    for record in csv_reader.byte_records() {
        record?;
        count += 1;
    }
    Ok(count)
}

/// Outputs a header followed by the supplied records.
///
/// The header is written even when there are no records.
pub fn write_transactions_to_csv<'a, W, I>(writer: &mut W, transactions: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for transaction in transactions {
        csv_writer.serialize(transaction)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Outputs a human-readable stock report, one line per product:
///
/// ```text
/// Product Summary:
///
/// Cotton Fabric → Received: 100, Sold: 30, Remaining: 70
/// Silk → Received: 50, Sold: 0, Remaining: 50
/// ```
pub fn write_summary_report<W>(writer: &mut W, summary: &StockSummary) -> Result<(), Error>
where
    W: Write,
{
    writeln!(writer, "Product Summary:")?;
    writeln!(writer)?;
    for product in summary {
        writeln!(writer, "{product}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Parses a quantity typed by a user.
///
/// Only plain ASCII digits denoting a number above zero are accepted; signs, decimal
/// points and surrounding whitespace are rejected.
pub fn parse_quantity(input: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidQuantity(input.to_string());
    if input.is_empty() || !input.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }
    match input.parse::<u32>() {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(invalid()),
    }
}
