pub mod config;
pub mod run;
pub mod simulate;
pub mod test_alert;
