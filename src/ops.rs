use std::{
    fs::{File, OpenOptions},
    io::{BufReader, ErrorKind},
};

use chrono::NaiveDate;

use crate::{
    errors::{Error, ValidationError},
    io,
    types::{
        CsvLedger, LedgerStore, MemoryLedger, ProductStock, StockSummary, Transaction,
        TransactionId, TransactionKind,
    },
};

impl StockSummary {
    /// Totals quantities per product name.
    ///
    /// Products are listed in the order their first record appears.
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = StockSummary::new();
        for transaction in transactions {
            summary.record(transaction);
        }
        summary
    }

    /// Adds one transaction's quantity to its product's running totals
    fn record(&mut self, transaction: &Transaction) {
        let position = match self.index.get(&transaction.name) {
            Some(&position) => position,
            None => {
                let position = self.products.len();
                self.products.push(ProductStock::new(transaction.name.clone()));
                self.index.insert(transaction.name.clone(), position);
                position
            }
        };
        let product = &mut self.products[position];
        let quantity = u64::from(transaction.quantity);
        match transaction.kind {
            TransactionKind::Received => product.received += quantity,
            TransactionKind::Sold => product.sold += quantity,
        }
    }
}

/// Identifier for the next record: one more than the number of records stored.
///
/// Nothing is cached, so records removed from the store outside this crate lead to
/// identifiers being handed out again.
pub(crate) fn next_id<S>(store: &S) -> Result<TransactionId, Error>
where
    S: LedgerStore + ?Sized,
{
    let count = store.record_count()?;
    Ok(TransactionId::from(count as u64 + 1))
}

/// Checks caller input, then writes a new record dated `date`.
///
/// # Errors
/// [`ValidationError`] before anything is written; storage errors from the store.
pub(crate) fn append_transaction<S>(
    store: &mut S,
    name: &str,
    kind: TransactionKind,
    quantity: u32,
    date: NaiveDate,
) -> Result<Transaction, Error>
where
    S: LedgerStore + ?Sized,
{
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    if quantity == 0 {
        return Err(ValidationError::InvalidQuantity(quantity.to_string()).into());
    }
    let transaction = Transaction {
        id: store.next_id()?,
        name: name.to_string(),
        kind,
        quantity,
        date,
    };
    store.write_record(&transaction)?;
    log::debug!(
        "Appended transaction {} ({} {} x{})",
        transaction.id,
        transaction.kind,
        transaction.name,
        transaction.quantity
    );
    Ok(transaction)
}

impl LedgerStore for CsvLedger {
    fn initialize(&mut self) -> Result<(), Error> {
        if self.path.try_exists()? {
            log::debug!("Using existing ledger store at {}", self.path.display());
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        io::write_header(&mut file)?;
        log::info!("Created ledger store at {}", self.path.display());
        Ok(())
    }

    fn record_count(&self) -> Result<usize, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        io::count_records_in_csv(&mut BufReader::new(file))
    }

    fn read_all(&self) -> Result<Vec<Transaction>, Error> {
        let file = File::open(&self.path)?;
        let transactions = io::read_transactions_from_csv(&mut BufReader::new(file))?;
        log::debug!(
            "Read {} transactions from {}",
            transactions.len(),
            self.path.display()
        );
        Ok(transactions)
    }

    fn write_record(&mut self, transaction: &Transaction) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // A store that was never initialized still has to start with the header
        if file.metadata()?.len() == 0 {
            io::write_header(&mut file)?;
        }
        io::append_transaction_to_csv(&mut file, transaction)?;
        file.sync_data()?;
        Ok(())
    }
}

impl LedgerStore for MemoryLedger {
    fn initialize(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn record_count(&self) -> Result<usize, Error> {
        Ok(self.transactions.len())
    }

    fn read_all(&self) -> Result<Vec<Transaction>, Error> {
        Ok(self.transactions.clone())
    }

    fn write_record(&mut self, transaction: &Transaction) -> Result<(), Error> {
        self.transactions.push(transaction.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::TempDir;

    use crate::errors::StorageError;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn temp_store() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textile_products.csv");
        (dir, path)
    }

    fn append_scenario<S: LedgerStore>(store: &mut S) {
        append_transaction(store, "Cotton Fabric", TransactionKind::Received, 100, date())
            .unwrap();
        append_transaction(store, "Cotton Fabric", TransactionKind::Sold, 30, date()).unwrap();
        append_transaction(store, "Silk", TransactionKind::Received, 50, date()).unwrap();
    }

    #[test]
    fn test_summarize_empty() {
        let summary = StockSummary::from_transactions(&Vec::<Transaction>::new());
        assert!(summary.is_empty());
        assert_eq!(summary.len(), 0);
        assert!(summary.get("Silk").is_none());
    }

    #[test]
    fn test_summary_keeps_first_appearance_order() {
        let mut ledger = MemoryLedger::new();
        for (name, kind, quantity) in [
            ("Wool", TransactionKind::Received, 5),
            ("Acrylic", TransactionKind::Received, 8),
            ("Wool", TransactionKind::Sold, 2),
            ("Bamboo", TransactionKind::Sold, 1),
        ] {
            append_transaction(&mut ledger, name, kind, quantity, date()).unwrap();
        }
        let summary = ledger.summarize().unwrap();
        let names: Vec<&str> = summary.iter().map(|product| product.name()).collect();
        assert_eq!(names, ["Wool", "Acrylic", "Bamboo"]);
        assert_eq!(summary.get("Wool").unwrap().remaining(), 3);
        assert_eq!(summary.get("Bamboo").unwrap().remaining(), -1);
    }

    #[test]
    fn test_memory_scenario() {
        let mut ledger = MemoryLedger::new();
        assert_eq!(ledger.next_id().unwrap(), TransactionId::from(1));
        append_scenario(&mut ledger);

        let records = ledger.read_all().unwrap();
        let ids: Vec<TransactionId> = records.iter().map(Transaction::id).collect();
        assert_eq!(
            ids,
            [TransactionId::from(1), TransactionId::from(2), TransactionId::from(3)]
        );

        let summary = ledger.summarize().unwrap();
        assert_eq!(summary.len(), 2);
        let cotton = summary.get("Cotton Fabric").unwrap();
        assert_eq!(
            (cotton.received(), cotton.sold(), cotton.remaining()),
            (100, 30, 70)
        );
        let silk = summary.get("Silk").unwrap();
        assert_eq!((silk.received(), silk.sold(), silk.remaining()), (50, 0, 50));
    }

    #[test]
    fn test_oversell_is_not_clamped() {
        let mut ledger = MemoryLedger::new();
        append_transaction(&mut ledger, "Lace", TransactionKind::Received, 10, date()).unwrap();
        append_transaction(&mut ledger, "Lace", TransactionKind::Sold, 15, date()).unwrap();
        let summary = ledger.summarize().unwrap();
        assert_eq!(summary.get("Lace").unwrap().remaining(), -5);
    }

    #[test]
    fn test_validation_writes_nothing() {
        let mut ledger = MemoryLedger::new();
        let err = ledger.append("", TransactionKind::Received, 5).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyName)));
        let err = ledger.append("X", TransactionKind::Sold, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidQuantity(_))
        ));
        assert!(ledger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_stamps_today() {
        let mut ledger = MemoryLedger::new();
        let before = chrono::Local::now().date_naive();
        let transaction = ledger.append("Velvet", TransactionKind::Received, 3).unwrap();
        let after = chrono::Local::now().date_naive();
        assert!(transaction.date() >= before && transaction.date() <= after);
        assert_eq!(transaction.id(), TransactionId::from(1));
    }

    #[test]
    fn test_next_id_missing_store() {
        let (_dir, path) = temp_store();
        let ledger = CsvLedger::new(&path);
        assert_eq!(ledger.next_id().unwrap(), TransactionId::from(1));
        assert!(!path.exists());
    }

    #[test]
    fn test_initialize_creates_header_only() {
        let (_dir, path) = temp_store();
        let mut ledger = CsvLedger::new(&path);
        ledger.initialize().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ID,Name,Type,Quantity,Date\n"
        );
        assert!(ledger.read_all().unwrap().is_empty());
        assert!(ledger.summarize().unwrap().is_empty());
        assert_eq!(ledger.next_id().unwrap(), TransactionId::from(1));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, path) = temp_store();
        let mut ledger = CsvLedger::new(&path);
        ledger.initialize().unwrap();
        append_scenario(&mut ledger);
        let contents = fs::read_to_string(&path).unwrap();
        ledger.initialize().unwrap();
        ledger.initialize().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
        assert_eq!(ledger.read_all().unwrap().len(), 3);
    }

    #[test]
    fn test_csv_scenario() {
        let (_dir, path) = temp_store();
        let mut ledger = CsvLedger::new(&path);
        ledger.initialize().unwrap();
        append_scenario(&mut ledger);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ID,Name,Type,Quantity,Date\n\
             1,Cotton Fabric,Received,100,2024-05-17\n\
             2,Cotton Fabric,Sold,30,2024-05-17\n\
             3,Silk,Received,50,2024-05-17\n"
        );

        // A fresh handle sees the same data; nothing is held between calls
        let reopened = CsvLedger::new(&path);
        let records = reopened.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].id(), TransactionId::from(3));
        assert_eq!(records[2].name(), "Silk");

        let summary = reopened.summarize().unwrap();
        assert_eq!(summary, reopened.summarize().unwrap());
        assert_eq!(summary.get("Cotton Fabric").unwrap().remaining(), 70);
        assert_eq!(summary.get("Silk").unwrap().sold(), 0);
    }

    #[test]
    fn test_append_without_initialize_writes_header() {
        let (_dir, path) = temp_store();
        fs::write(&path, "").unwrap();
        let mut ledger = CsvLedger::new(&path);
        append_transaction(&mut ledger, "Tweed", TransactionKind::Received, 9, date()).unwrap();
        let records = ledger.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), TransactionId::from(1));
        assert!(fs::read_to_string(&path)
            .unwrap()
            .starts_with("ID,Name,Type,Quantity,Date\n"));
    }

    #[test]
    fn test_names_with_delimiters_round_trip() {
        let (_dir, path) = temp_store();
        let mut ledger = CsvLedger::new(&path);
        ledger.initialize().unwrap();
        let name = "Chiffon, \"premium\"\nroll";
        append_transaction(&mut ledger, name, TransactionKind::Received, 2, date()).unwrap();
        append_transaction(&mut ledger, "Jute", TransactionKind::Received, 4, date()).unwrap();
        let records = ledger.read_all().unwrap();
        assert_eq!(records[0].name(), name);
        assert_eq!(records[1].id(), TransactionId::from(2));
    }

    #[test]
    fn test_ids_follow_row_count_after_external_removal() {
        let (_dir, path) = temp_store();
        let mut ledger = CsvLedger::new(&path);
        ledger.initialize().unwrap();
        append_scenario(&mut ledger);

        // Drop the second record by hand
        let contents = fs::read_to_string(&path).unwrap();
        let kept: Vec<&str> = contents
            .lines()
            .enumerate()
            .filter(|(line, _)| *line != 2)
            .map(|(_, text)| text)
            .collect();
        fs::write(&path, kept.join("\n") + "\n").unwrap();

        let transaction =
            append_transaction(&mut ledger, "Satin", TransactionKind::Received, 1, date()).unwrap();
        assert_eq!(transaction.id(), TransactionId::from(3));
        let ids: Vec<TransactionId> = ledger
            .read_all()
            .unwrap()
            .iter()
            .map(Transaction::id)
            .collect();
        assert_eq!(
            ids,
            [TransactionId::from(1), TransactionId::from(3), TransactionId::from(3)]
        );
    }

    #[test]
    fn test_validation_leaves_file_untouched() {
        let (_dir, path) = temp_store();
        let mut ledger = CsvLedger::new(&path);
        ledger.initialize().unwrap();
        assert!(ledger
            .append("", TransactionKind::Received, 5)
            .unwrap_err()
            .is_validation());
        assert!(ledger
            .append("X", TransactionKind::Sold, 0)
            .unwrap_err()
            .is_validation());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ID,Name,Type,Quantity,Date\n"
        );
    }

    #[test]
    fn test_storage_errors() {
        let (dir, _) = temp_store();
        let path = dir.path().join("missing").join("textile_products.csv");
        let mut ledger = CsvLedger::new(&path);
        assert!(matches!(
            ledger.initialize(),
            Err(Error::Storage(StorageError::Io(_)))
        ));
        assert!(matches!(
            ledger.read_all(),
            Err(Error::Storage(StorageError::Io(_)))
        ));
        assert!(matches!(ledger.summarize(), Err(Error::Storage(_))));
        let err = append_transaction(&mut ledger, "Felt", TransactionKind::Sold, 1, date())
            .unwrap_err();
        assert!(!err.is_validation());
    }

    #[test]
    fn test_corrupt_store_is_storage_error() {
        let (_dir, path) = temp_store();
        fs::write(&path, "ID,Name,Type,Quantity,Date\n1,Wool,Borrowed,4,2024-05-17\n").unwrap();
        let ledger = CsvLedger::new(&path);
        assert!(matches!(
            ledger.read_all(),
            Err(Error::Storage(StorageError::Csv(_)))
        ));
        assert_eq!(ledger.next_id().unwrap(), TransactionId::from(2));
    }
}
