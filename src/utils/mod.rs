pub mod formatting;
pub mod password;
