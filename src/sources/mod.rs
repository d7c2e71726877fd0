pub mod traits;
pub mod types;

pub mod selectors;

pub mod browser;
pub mod coinmarketcap;
pub mod fear_greed;
pub mod portfolio;

#[cfg(test)]
mod coinmarketcap_tests;
