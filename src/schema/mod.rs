pub mod choice;
pub mod input;
pub mod line;
