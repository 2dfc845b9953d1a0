//! INI file configuration adapter.

use crate::domain::error::ExplorerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExplorerError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| ExplorerError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ExplorerError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ExplorerError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[sqlite]
path = /var/lib/finexplorer/financial_data.db
pool_size = 8

[web]
listen = 0.0.0.0:5000

[api]
default_window = 60

[fred]
base_url = http://localhost:9999/fred/
timeout_secs = 5
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/var/lib/finexplorer/financial_data.db".to_string())
        );
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("0.0.0.0:5000".to_string())
        );
        assert_eq!(adapter.get_int("api", "default_window", 30), 60);
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 8);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string("[api]\n").unwrap();
        assert_eq!(adapter.get_string("api", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("api", "default_window", 30), 30);
    }

    #[test]
    fn non_numeric_int_uses_default() {
        let adapter = FileConfigAdapter::from_string("[api]\ndefault_window = thirty\n").unwrap();
        assert_eq!(adapter.get_int("api", "default_window", 30), 30);
    }

    #[test]
    fn adapter_is_debug_printable() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(format!("{adapter:?}").contains("FileConfigAdapter"));
    }

    #[test]
    fn require_string_reports_missing_key() {
        let adapter = FileConfigAdapter::from_string("[sqlite]\npath =\n").unwrap();
        let err = adapter.require_string("sqlite", "path").unwrap_err();
        assert!(
            matches!(err, ExplorerError::ConfigMissing { section, key } if section == "sqlite" && key == "path")
        );
    }

    #[test]
    fn get_string_or_uses_default_for_blank() {
        let adapter = FileConfigAdapter::from_string("[web]\nlisten =\n").unwrap();
        assert_eq!(adapter.get_string_or("web", "listen", "127.0.0.1:5000"), "127.0.0.1:5000");
    }

    #[test]
    fn get_positive_rejects_negative() {
        let adapter = FileConfigAdapter::from_string("[fred]\nmax_retries = -2\n").unwrap();
        assert!(matches!(
            adapter.get_positive("fred", "max_retries", 4),
            Err(ExplorerError::ConfigInvalid { .. })
        ));
        assert_eq!(adapter.get_positive("fred", "timeout_secs", 15).unwrap(), 15);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("fred", "base_url"),
            Some("http://localhost:9999/fred/".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/finexplorer.ini").unwrap_err();
        assert!(
            matches!(err, ExplorerError::ConfigParse { file, .. } if file.contains("finexplorer.ini"))
        );
    }
}
