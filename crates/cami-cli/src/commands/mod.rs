//! Command implementations for cami-cli

pub mod agents;
pub mod backup;
pub mod init;
pub mod location;
pub mod project;
pub mod source;

pub use agents::{run_deploy, run_discover, run_list, run_scan, run_update_docs};
pub use backup::{run_backup_cleanup, run_backup_list, run_backup_restore};
pub use init::{LEGACY_CONFIG_FILE, run_init};
pub use location::{run_location_add, run_location_list, run_location_remove};
pub use project::{run_project_analyze, run_project_normalize};
pub use source::{
    run_source_add, run_source_analyze, run_source_list, run_source_normalize,
    run_source_reconcile, run_source_remove, run_source_status, run_source_update,
};
