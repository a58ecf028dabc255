use rusqlite::{Connection, ErrorCode, Row, params};
use std::path::Path;

use super::error::StoreError;
use super::journey::{Journey, StoredJourney};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS journeys (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT,
        start_time TEXT,
        end_time TEXT,
        journey_action TEXT,
        charge REAL,
        credit REAL,
        balance REAL,
        note TEXT,
        processed INTEGER DEFAULT 0,
        UNIQUE(date, start_time, end_time)
    );
"#;

const SELECT_JOURNEY: &str = "SELECT id, date, start_time, end_time, journey_action, charge, credit, balance, note FROM journeys";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    /// A journey with the same date, start time and end time is already stored.
    Duplicate,
}

/// The local journey database. One is opened per command and closed on drop.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).map_err(|source| StoreError::Open {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::bootstrap(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert_journey(&self, journey: &Journey) -> Result<WriteOutcome, StoreError> {
        let result = self.conn.execute(
            "INSERT INTO journeys (date, start_time, end_time, journey_action, charge, credit, balance, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                journey.date,
                journey.start_time,
                journey.end_time,
                journey.journey_action,
                journey.charge,
                journey.credit,
                journey.balance,
                journey.note,
            ],
        );
        match result {
            Ok(_) => Ok(WriteOutcome::Inserted),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(WriteOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All journeys, latest first by date then start time.
    pub fn journeys(&self, limit: Option<usize>) -> Result<Vec<StoredJourney>, StoreError> {
        let mut sql = format!("{SELECT_JOURNEY} ORDER BY date DESC, start_time DESC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        self.query(&sql)
    }

    /// Journeys not yet handed to the topic, oldest insert first.
    pub fn unprocessed(&self) -> Result<Vec<StoredJourney>, StoreError> {
        self.query(&format!("{SELECT_JOURNEY} WHERE processed = 0 ORDER BY id"))
    }

    pub fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("UPDATE journeys SET processed = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM journeys", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query(&self, sql: &str) -> Result<Vec<StoredJourney>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], journey_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn journey_from_row(row: &Row<'_>) -> rusqlite::Result<StoredJourney> {
    Ok(StoredJourney {
        id: row.get(0)?,
        journey: Journey {
            date: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            journey_action: row.get(4)?,
            charge: row.get(5)?,
            credit: row.get(6)?,
            balance: row.get(7)?,
            note: row.get(8)?,
        },
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn journey(date: &str, start: &str, end: &str) -> Journey {
        Journey {
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            journey_action: "Bus journey, route 73".to_string(),
            charge: 1.75,
            credit: 0.0,
            balance: 10.0,
            note: String::new(),
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let store = Store::open_in_memory().unwrap();
        let outcome = store.insert_journey(&journey("2025-01-14", "08:30", "08:50")).unwrap();
        assert_eq!(outcome, WriteOutcome::Inserted);

        let stored = store.journeys(None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].journey, journey("2025-01-14", "08:30", "08:50"));
        assert_eq!(store.unprocessed().unwrap(), stored);
    }

    #[test]
    fn test_duplicate_natural_key() {
        let store = Store::open_in_memory().unwrap();
        store.insert_journey(&journey("2025-01-14", "08:30", "08:50")).unwrap();

        // Other fields differ but the natural key matches
        let mut again = journey("2025-01-14", "08:30", "08:50");
        again.charge = 2.80;
        again.note = "different".to_string();
        assert_eq!(store.insert_journey(&again).unwrap(), WriteOutcome::Duplicate);

        // Any change to the key is a new journey
        let outcome = store.insert_journey(&journey("2025-01-14", "08:30", "")).unwrap();
        assert_eq!(outcome, WriteOutcome::Inserted);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_journeys_latest_first_with_limit() {
        let store = Store::open_in_memory().unwrap();
        for (date, start) in [
            ("2025-01-14", "08:30"),
            ("2025-02-01", "07:10"),
            ("2025-02-01", "18:05"),
            ("2024-12-31", "23:59"),
        ] {
            store.insert_journey(&journey(date, start, "")).unwrap();
        }

        let all = store.journeys(None).unwrap();
        let keys: Vec<_> = all
            .iter()
            .map(|j| (j.journey.date.as_str(), j.journey.start_time.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2025-02-01", "18:05"),
                ("2025-02-01", "07:10"),
                ("2025-01-14", "08:30"),
                ("2024-12-31", "23:59"),
            ]
        );

        let latest = store.journeys(Some(1)).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].journey.start_time, "18:05");
    }

    #[test]
    fn test_mark_processed_removes_from_unprocessed() {
        let store = Store::open_in_memory().unwrap();
        store.insert_journey(&journey("2025-01-14", "08:30", "08:50")).unwrap();
        store.insert_journey(&journey("2025-01-15", "08:30", "08:50")).unwrap();

        let pending = store.unprocessed().unwrap();
        assert_eq!(pending.len(), 2);
        store.mark_processed(pending[0].id).unwrap();

        let pending = store.unprocessed().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].journey.date, "2025-01-15");
    }

    #[test]
    fn test_open_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oyster.db");
        {
            let store = Store::open(&path).unwrap();
            store.insert_journey(&journey("2025-01-14", "08:30", "08:50")).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
