pub mod catalog;
pub mod embargo;
pub mod entries;
pub mod results;
