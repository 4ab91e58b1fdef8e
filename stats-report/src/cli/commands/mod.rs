pub mod locate;
pub mod summarize;
