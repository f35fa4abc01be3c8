//! SQLite result store

use crate::detector::{FileFlag, NetFlag, ProcessFlag, Verdict, VerdictLabel};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct Store {
    conn: Connection,
}

/// A process with no visible top-level window, from the latest UI snapshot.
#[derive(Debug, Clone)]
pub struct NoUiProcess {
    pub pid: u32,
    pub process_name: String,
    pub cmdline: String,
}

impl Store {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_default() -> rusqlite::Result<Self> {
        Self::open(&Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "keywatch")
            .map(|dirs| dirs.data_dir().join("results.db"))
            .unwrap_or_else(|| PathBuf::from("results.db"))
    }

    pub fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(include_str!("../schema.sql"))
    }

    /// Add a file flag to the cumulative set. Exact duplicates are dropped;
    /// returns whether the row was new.
    pub fn insert_file_flag(&self, flag: &FileFlag) -> rusqlite::Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO file_flags (filename, current_size_bytes, write_count, reason)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                flag.filename,
                flag.current_size_bytes,
                flag.write_count,
                flag.reason
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_file_flags(&self) -> rusqlite::Result<Vec<FileFlag>> {
        let mut stmt = self.conn.prepare(
            "SELECT filename, current_size_bytes, write_count, reason FROM file_flags",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FileFlag {
                filename: row.get(0)?,
                current_size_bytes: row.get(1)?,
                write_count: row.get(2)?,
                reason: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    pub fn get_file_reasons(&self) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT reason FROM file_flags ORDER BY reason")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    /// Add a network flag to the cumulative set, dropping exact duplicates.
    pub fn insert_net_flag(&self, flag: &NetFlag) -> rusqlite::Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO net_flags (pid, process_name, connection_count, times_exceeded, reason)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                flag.pid,
                flag.process_name,
                flag.connection_count,
                flag.times_exceeded,
                flag.reason
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_net_flags(&self) -> rusqlite::Result<Vec<NetFlag>> {
        let mut stmt = self.conn.prepare(
            "SELECT pid, process_name, connection_count, times_exceeded, reason FROM net_flags",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(NetFlag {
                pid: row.get(0)?,
                process_name: row.get(1)?,
                connection_count: row.get(2)?,
                times_exceeded: row.get(3)?,
                reason: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Replace the process-classifier snapshot wholesale.
    pub fn replace_process_flags(&self, flags: &[ProcessFlag]) -> rusqlite::Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM process_flags", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO process_flags (pid, process_name, runtime, suspicious, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for flag in flags {
                stmt.execute(params![
                    flag.pid,
                    flag.process_name,
                    flag.runtime,
                    flag.suspicious as i32,
                    flag.reason
                ])?;
            }
        }
        tx.commit()
    }

    pub fn get_process_flags(&self) -> rusqlite::Result<Vec<ProcessFlag>> {
        let mut stmt = self.conn.prepare(
            "SELECT pid, process_name, runtime, suspicious, reason FROM process_flags ORDER BY pid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProcessFlag {
                pid: row.get(0)?,
                process_name: row.get(1)?,
                runtime: row.get(2)?,
                suspicious: row.get::<_, i32>(3)? != 0,
                reason: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Replace the UI-absence snapshot wholesale.
    pub fn replace_no_ui(&self, processes: &[NoUiProcess]) -> rusqlite::Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM no_ui_processes", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO no_ui_processes (pid, process_name, cmdline)
                 VALUES (?1, ?2, ?3)",
            )?;
            for process in processes {
                stmt.execute(params![process.pid, process.process_name, process.cmdline])?;
            }
        }
        tx.commit()
    }

    pub fn get_no_ui_pids(&self) -> rusqlite::Result<HashSet<u32>> {
        let mut stmt = self.conn.prepare("SELECT pid FROM no_ui_processes")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    /// Replace the verdict set wholesale; a correlation pass is all or
    /// nothing, never a partial write.
    pub fn replace_verdicts(&self, verdicts: &[Verdict]) -> rusqlite::Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM verdicts", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO verdicts (pid, process_name, verdict, reason)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for verdict in verdicts {
                stmt.execute(params![
                    verdict.pid,
                    verdict.process_name,
                    verdict.verdict.as_str(),
                    verdict.reason
                ])?;
            }
        }
        tx.commit()
    }

    pub fn get_verdicts(&self) -> rusqlite::Result<Vec<Verdict>> {
        let mut stmt = self
            .conn
            .prepare("SELECT pid, process_name, verdict, reason FROM verdicts ORDER BY pid")?;
        let rows = stmt.query_map([], |row| {
            let label: String = row.get(2)?;
            Ok(Verdict {
                pid: row.get(0)?,
                process_name: row.get(1)?,
                verdict: if label == "SUSPICIOUS_KEYLOGGER" {
                    VerdictLabel::SuspiciousKeylogger
                } else {
                    VerdictLabel::Normal
                },
                reason: row.get(3)?,
            })
        })?;
        rows.collect()
    }
}
