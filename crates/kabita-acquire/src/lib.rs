pub mod nazrul;
pub mod output;

pub use nazrul::{ScrapeOptions, Scraper, ScraperConfig};
