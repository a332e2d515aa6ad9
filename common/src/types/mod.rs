pub mod exportable;
pub mod generation;
pub mod question;
