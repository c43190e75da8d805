pub mod catalog;
pub mod execution_log;
pub mod form;
pub mod notice;
pub mod rule;
pub mod simulation;
pub mod suggestion;
