pub mod run;

// Re-export command executors
pub use run::execute as run_exporter;
pub use run::RunArgs;
