//! Persistence for the record store.
//!
//! The store talks to a [`RecordRepository`]; the flat-file implementation
//! rewrites the whole data file on every save.

use super::codec::{self, LineFormat};
use super::record::Record;
use super::StoreResult;
use crate::config::store::StoreConfig;
use crate::error::StoreError;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source and sink of persisted records.
#[cfg_attr(test, mockall::automock)]
pub trait RecordRepository {
    /// Reads every persisted record.
    fn load(&self) -> StoreResult<Vec<Record>>;

    /// Replaces the persisted records with `records`.
    fn save(&self, records: &[Record]) -> StoreResult<()>;

    /// Rejects a record that [`RecordRepository::load`] would not return
    /// unchanged after a [`RecordRepository::save`].
    fn validate(&self, record: &Record) -> StoreResult<()>;
}

/// Line-oriented flat-file repository.
#[derive(Debug, Clone)]
pub struct FlatFileRepository {
    path: PathBuf,
    format: LineFormat,
    write_header: bool,
}

impl FlatFileRepository {
    /// Creates a repository over `path` with the default line format.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            format: LineFormat::default(),
            write_header: true,
        }
    }

    /// Creates a repository from the store configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            path: config.data_file.clone(),
            format: config.line_format(),
            write_header: config.write_header,
        }
    }

    /// Sets the line format.
    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether a commented header line is written on save.
    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Lines that are neither blank nor comments.
    fn is_content(&self, line: &str) -> bool {
        let line = line.trim();
        !line.is_empty() && !line.starts_with(self.format.comment_prefix.as_str())
    }

    fn write_all(&self, target: &Path, records: &[Record]) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(target)?);
        if self.write_header {
            writeln!(writer, "{}", codec::header_line(&self.format))?;
        }
        for record in records {
            writeln!(writer, "{}", codec::format_line(record, &self.format))?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl RecordRepository for FlatFileRepository {
    fn load(&self) -> StoreResult<Vec<Record>> {
        if !self.path.exists() {
            info!(path = ?self.path, "Data file not found, starting empty");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| StoreError::io(&self.path, e))?;
            match codec::parse_line(&line, &self.format) {
                Some(record) => records.push(record),
                None if self.is_content(&line) => {
                    debug!(line = number + 1, "Skipping malformed line");
                    skipped += 1;
                }
                None => {}
            }
        }

        if skipped > 0 {
            warn!(path = ?self.path, skipped, "Skipped malformed lines while loading");
        }
        info!(path = ?self.path, count = records.len(), "Loaded records");
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let temp = self.temp_path();
        self.write_all(&temp, records)
            .and_then(|()| fs::rename(&temp, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp);
                StoreError::io(&self.path, e)
            })?;

        debug!(path = ?self.path, count = records.len(), "Saved records");
        Ok(())
    }

    fn validate(&self, record: &Record) -> StoreResult<()> {
        codec::check_record(record, &self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let repository = FlatFileRepository::new(dir.path().join("absent.csv"));

        assert!(repository.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_skips_unusable_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");
        fs::write(
            &path,
            "# id;name;category;score\n\n12A;Ada;Maths;17.5\nbroken line\n12B;Bo;Art;abc\n13C;Cy;Music;12\n",
        )
        .unwrap();

        let records = FlatFileRepository::new(&path).load().unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["12A", "13C"]);
    }

    #[test]
    fn test_save_rewrites_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("students.csv");
        let repository = FlatFileRepository::new(&path);

        repository
            .save(&[
                Record::new("12A", "Ada", "Maths", 17.5),
                Record::new("12B", "Bo", "Art", 11.0),
            ])
            .unwrap();
        repository
            .save(&[Record::new("13C", "Cy", "Music", 12.0)])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "# id;name;category;score\n13C;Cy;Music;12.00\n");
        assert!(!repository.temp_path().exists());
    }

    #[test]
    fn test_save_without_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");
        let repository = FlatFileRepository::new(&path).with_header(false);

        repository
            .save(&[Record::new("12A", "Ada", "Maths", 17.5)])
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "12A;Ada;Maths;17.50\n");
    }

    #[test]
    fn test_custom_format_round_trip() {
        let dir = tempdir().unwrap();
        let format = LineFormat {
            delimiter: '\t',
            comment_prefix: "--".to_string(),
            score_precision: 0,
        };
        let repository =
            FlatFileRepository::new(dir.path().join("students.tsv")).with_format(format);

        repository
            .save(&[Record::new("12A", "Ada", "Maths", 17.0)])
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("students.tsv")).unwrap(),
            "-- id\tname\tcategory\tscore\n12A\tAda\tMaths\t17\n"
        );
        assert_eq!(
            repository.load().unwrap(),
            vec![Record::new("12A", "Ada", "Maths", 17.0)]
        );
    }

    #[test]
    fn test_validate_uses_repository_format() {
        let repository = FlatFileRepository::new("students.txt").with_format(LineFormat {
            delimiter: '|',
            comment_prefix: "//".to_string(),
            score_precision: 2,
        });

        assert!(repository
            .validate(&Record::new("12A", "Smith; Jr", "X", 2.0))
            .is_ok());
        assert!(matches!(
            repository.validate(&Record::new("12A", "Smith| Jr", "X", 2.0)),
            Err(StoreError::InvalidField { field: "name", .. })
        ));
    }

    #[test]
    fn test_unreadable_path_is_reported() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a data file
        let repository = FlatFileRepository::new(dir.path());

        let err = repository.load().unwrap_err();
        assert!(err.is_io());
    }
}
