pub mod sheet;

pub use sheet::{GoogleSheetSource, PositionsSource};
