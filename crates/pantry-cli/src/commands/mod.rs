pub mod changelog;
pub mod coverage;
pub mod export;
pub mod gate;
pub mod governance;
pub mod optimize;
pub mod schema_validate;
