pub mod account;
pub mod assignments;
pub mod lessons;
pub mod students;
