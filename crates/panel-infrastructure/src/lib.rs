pub mod config_service;
pub mod paths;
pub mod storage;
pub mod toml_report_repository;

pub use crate::config_service::ConfigService;
pub use crate::paths::PanelPaths;
pub use crate::toml_report_repository::TomlReportRepository;
