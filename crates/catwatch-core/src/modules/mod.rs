//! Configuration and proxy-source loading.

pub mod config;
pub mod proxy_source;

pub use config::{apply_overrides, load_config, save_config, validate_config};
pub use proxy_source::{collect_proxies, load_proxy_file, parse_proxy_list};
