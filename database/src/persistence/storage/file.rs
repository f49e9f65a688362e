use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Write},
    path::PathBuf,
};

use crate::consts::consts::TRANSACTION_LOG_FILE_NAME;

use super::{io_to_generic_error, Storage, StorageError, StorageResult};

pub struct FileStorage {
    base_path: PathBuf,
    log_file: Option<File>,
    transaction_file_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        let transaction_file_path = base_path.join(TRANSACTION_LOG_FILE_NAME);

        Self {
            base_path,
            log_file: None,
            transaction_file_path,
        }
    }

    fn log_file(&mut self) -> StorageResult<&mut File> {
        match self.log_file {
            Some(ref mut file) => Ok(file),
            None => Err(StorageError::UnableToWriteTransaction(anyhow::anyhow!(
                "transaction log [{}] has not been opened",
                self.transaction_file_path.display()
            ))),
        }
    }
}

impl Storage for FileStorage {
    // Called on DB Start-up, should be idempotent
    fn init(&mut self) -> StorageResult<()> {
        std::fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        let log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.transaction_file_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        self.log_file = Some(log_file);

        Ok(())
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        // Buffered OS write, is not 'durable' without the fsync
        self.log_file()?
            .write_all(transaction)
            .map_err(|e| StorageError::UnableToWriteTransaction(io_to_generic_error(e)))
    }

    fn transaction_sync(&mut self) -> StorageResult<()> {
        self.log_file()?.sync_all().map_err(|e| {
            StorageError::UnableToSyncTransactionBufferToPersistentStorage(io_to_generic_error(e))
        })
    }

    // File may or may not exist
    fn transaction_load(&mut self) -> StorageResult<String> {
        let mut contents = String::new();

        let mut file = match File::open(&self.transaction_file_path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(contents),
            Err(err) => {
                return Err(StorageError::UnableToLoadPreviousTransactions(
                    io_to_generic_error(err),
                ))
            }
        };

        file.read_to_string(&mut contents)
            .map_err(|e| StorageError::UnableToLoadPreviousTransactions(io_to_generic_error(e)))?;

        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn test_directory() -> PathBuf {
        ["/", "tmp", "peopledb", &Uuid::new_v4().to_string()]
            .iter()
            .collect()
    }

    #[test]
    fn load_before_any_write_is_empty() {
        let mut storage = FileStorage::new(test_directory());

        assert_eq!(storage.transaction_load().unwrap(), "");
    }

    #[test]
    fn write_before_init_is_an_error() {
        let mut storage = FileStorage::new(test_directory());

        assert!(matches!(
            storage.transaction_write(b"{}\n"),
            Err(StorageError::UnableToWriteTransaction(_))
        ));
    }

    #[test]
    fn writes_are_appended_across_reopens() {
        // Given a log with one line
        let directory = test_directory();
        let mut storage = FileStorage::new(directory.clone());

        storage.init().unwrap();
        storage.transaction_write(b"first\n").unwrap();
        storage.transaction_sync().unwrap();

        // When the storage is opened again and another line is written
        let mut reopened = FileStorage::new(directory);

        reopened.init().unwrap();
        reopened.transaction_write(b"second\n").unwrap();

        // Then both lines are kept in order
        assert_eq!(reopened.transaction_load().unwrap(), "first\nsecond\n");
    }
}
