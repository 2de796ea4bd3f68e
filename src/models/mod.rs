pub mod decision;
pub mod transaction;
