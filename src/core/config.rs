//! Configuration management with layered hierarchy

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::Session;
use crate::report::StatusKeywords;

/// Month names used for the report period
pub const MONTHS: [&str; 12] = [
    "JANEIRO",
    "FEVEREIRO",
    "MARÇO",
    "ABRIL",
    "MAIO",
    "JUNHO",
    "JULHO",
    "AGOSTO",
    "SETEMBRO",
    "OUTUBRO",
    "NOVEMBRO",
    "DEZEMBRO",
];

/// RMA configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Report title (row 0 of the RMA sheet)
    pub title: Option<String>,

    /// Month label for the chart title
    pub month: Option<String>,

    /// Year label for the chart title
    pub year: Option<String>,

    /// Directory for exported reports, relative to the session root
    pub export_dir: Option<String>,

    /// Status substring that marks a repair
    pub repair_keyword: Option<String>,

    /// Status substring that marks a refund
    pub refund_keyword: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order.
    /// Without a session only the global file and the environment apply.
    pub fn load_for(session: Option<&Session>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/rma/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Session config (.rma/config.yaml)
        if let Some(session) = session {
            if let Some(local) = Self::read_file(&session.config_path()) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(title) = std::env::var("RMA_TITLE") {
            config.title = Some(title);
        }
        if let Ok(month) = std::env::var("RMA_MONTH") {
            config.month = Some(month);
        }
        if let Ok(year) = std::env::var("RMA_YEAR") {
            config.year = Some(year);
        }
        if let Ok(dir) = std::env::var("RMA_EXPORT_DIR") {
            config.export_dir = Some(dir);
        }

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str::<Config>(&contents).ok()
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rma")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.month.is_some() {
            self.month = other.month;
        }
        if other.year.is_some() {
            self.year = other.year;
        }
        if other.export_dir.is_some() {
            self.export_dir = other.export_dir;
        }
        if other.repair_keyword.is_some() {
            self.repair_keyword = other.repair_keyword;
        }
        if other.refund_keyword.is_some() {
            self.refund_keyword = other.refund_keyword;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Report title, defaulting to one stamped with today's date
    pub fn title(&self) -> String {
        self.title_on(Local::now().date_naive())
    }

    pub fn title_on(&self, today: NaiveDate) -> String {
        non_blank(self.title.as_deref())
            .unwrap_or_else(|| format!("{}(Atualizada) Planilha RMA", today.format("%d/%m/%Y")))
    }

    /// Month label, defaulting to the current month's name
    pub fn month(&self) -> String {
        self.month_on(Local::now().date_naive())
    }

    pub fn month_on(&self, today: NaiveDate) -> String {
        non_blank(self.month.as_deref())
            .unwrap_or_else(|| MONTHS[today.month0() as usize].to_string())
    }

    /// Year label, defaulting to the current year
    pub fn year(&self) -> String {
        self.year_on(Local::now().date_naive())
    }

    pub fn year_on(&self, today: NaiveDate) -> String {
        non_blank(self.year.as_deref()).unwrap_or_else(|| today.year().to_string())
    }

    /// Status keywords, falling back to the built-in ones per keyword
    pub fn status_keywords(&self) -> StatusKeywords {
        let defaults = StatusKeywords::default();
        StatusKeywords::new(
            non_blank(self.repair_keyword.as_deref()).unwrap_or(defaults.repair),
            non_blank(self.refund_keyword.as_deref()).unwrap_or(defaults.refund),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Default file name for an export made on the given day
pub fn default_export_name(today: NaiveDate) -> String {
    format!("Planilha_RMA_{}.xlsx", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_defaults_follow_date() {
        let config = Config::default();
        assert_eq!(config.title_on(day()), "07/03/2024(Atualizada) Planilha RMA");
        assert_eq!(config.month_on(day()), "MARÇO");
        assert_eq!(config.year_on(day()), "2024");
    }

    #[test]
    fn test_explicit_values_win() {
        let config = Config {
            title: Some("Relatório".to_string()),
            month: Some("Jan".to_string()),
            year: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.title_on(day()), "Relatório");
        assert_eq!(config.month_on(day()), "Jan");
        // Blank values fall back to the default
        assert_eq!(config.year_on(day()), "2024");
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base: Config = serde_yml::from_str("title: A\nmonth: MAIO\n").unwrap();
        let other: Config = serde_yml::from_str("title: B\n").unwrap();
        base.merge(other);
        assert_eq!(base.title.as_deref(), Some("B"));
        assert_eq!(base.month.as_deref(), Some("MAIO"));
    }

    #[test]
    fn test_status_keywords_override() {
        let config = Config {
            repair_keyword: Some("Repair".to_string()),
            ..Default::default()
        };
        let keywords = config.status_keywords();
        assert_eq!(keywords.repair, "repair");
        assert_eq!(keywords.refund, "reembolso");
    }

    #[test]
    fn test_default_export_name() {
        assert_eq!(default_export_name(day()), "Planilha_RMA_2024-03-07.xlsx");
    }
}
