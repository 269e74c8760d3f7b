//! Configuration loading and validation

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{
    ClientSection, Config, CrawlSection, DownloadSection, PagesSection, ProbeSection,
};
pub use validation::validate;
