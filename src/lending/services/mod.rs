pub mod borrow_calculator;

pub use borrow_calculator::{BorrowCapacityCalculator, SafetyMargin};
