pub mod api_client;
pub mod catalog_service;
pub mod form_service;
pub mod log_viewer;
pub mod rule_list;
pub mod rule_submitter;
pub mod simulator_service;
pub mod stats_service;
pub mod suggestion_service;
