use log::{ debug, info };
use rusqlite::{ params, Connection };

use std::path::Path;

use crate::batch::{ ImageRecord, RecognitionResult };
use crate::error::LprError;

pub const DEFAULT_SOURCE_TABLE: &str = "license_plates";
pub const DEFAULT_RESULT_TABLE: &str = "recognition_results";

/// Read side of the image store
pub trait RecordSource {
    fn fetch_records(&self, table: &str) -> Result<Vec<ImageRecord>, LprError>;
}

/// Write side: appends readings, never updates or deletes
pub trait ResultPersister {
    /// Returns the number of rows written. Either every eligible result is
    /// written or none is.
    fn persist(&mut self, results: &[RecognitionResult]) -> Result<usize, LprError>;
}

// table names are interpolated into sql, keep them to plain identifiers
fn check_identifier(name: &str) -> Result<(), LprError> {
    let mut chars = name.chars();
    let head_ok = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(LprError::config(format!("{:?} is not a valid table name", name)))
    }
}

pub struct SqliteStore {
    conn: Connection,
    source_table: String,
    result_table: String,
}

impl SqliteStore {

    pub fn open(path: impl AsRef<Path>, source_table: &str, result_table: &str) -> Result<Self, LprError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, source_table, result_table)
    }

    pub fn from_connection(conn: Connection, source_table: &str, result_table: &str) -> Result<Self, LprError> {
        check_identifier(source_table)?;
        check_identifier(result_table)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, source_table: source_table.to_string(), result_table: result_table.to_string() })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the photo table if missing, for tooling and tests
    pub fn ensure_source_schema(&self) -> Result<(), LprError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                plate_image BLOB,
                plate_number VARCHAR(20)
            )",
            self.source_table
        ))?;
        Ok(())
    }

    pub fn insert_record(&self, record: &ImageRecord) -> Result<(), LprError> {
        self.conn.execute(
            &format!("INSERT INTO {} (id, plate_image, plate_number) VALUES (?1, ?2, ?3)", self.source_table),
            params![record.id, record.image, record.ground_truth],
        )?;
        Ok(())
    }

    /// Create the result table if missing, a no-op otherwise
    pub fn ensure_result_schema(&self) -> Result<(), LprError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plate_id INTEGER NOT NULL,
                recognized_plate VARCHAR(20),
                is_correct BOOLEAN,
                processing_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (plate_id) REFERENCES {}(id)
            )",
            self.result_table, self.source_table
        ))?;
        Ok(())
    }

    pub fn result_count(&self) -> Result<i64, LprError> {
        let count = self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.result_table), [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RecordSource for SqliteStore {

    fn fetch_records(&self, table: &str) -> Result<Vec<ImageRecord>, LprError> {
        check_identifier(table)?;
        let mut stmt = self.conn.prepare(&format!("SELECT id, plate_image, plate_number FROM {} ORDER BY id", table))?;
        let rows = stmt.query_map([], |row| {
            let image: Option<Vec<u8>> = row.get(1)?;
            Ok(ImageRecord {
                id: row.get(0)?,
                image: image.unwrap_or_default(),
                ground_truth: row.get(2)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        info!("fetched {} records from {}", records.len(), table);
        Ok(records)
    }
}

impl ResultPersister for SqliteStore {

    fn persist(&mut self, results: &[RecognitionResult]) -> Result<usize, LprError> {
        self.ensure_result_schema()?;
        let insert = format!("INSERT INTO {} (plate_id, recognized_plate, is_correct) VALUES (?1, ?2, ?3)", self.result_table);

        // dropping the transaction on an early return rolls everything back
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&insert)?;
            for result in results.iter().filter(|r| r.should_persist()) {
                stmt.execute(params![result.id, result.recognized, result.is_match])?;
                inserted += 1;
            }
        }
        tx.commit()?;
        debug!("persisted {} of {} results", inserted, results.len());
        Ok(inserted)
    }
}
