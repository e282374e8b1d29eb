mod command;
mod get_snapshot;
#[cfg(test)]
#[path = "../../tests/engine/handlers_integration.rs"]
mod integration_tests;
mod open_session;
mod read_device_name;
mod release_session;
mod resume;
mod shutdown;
mod suspend;
mod tick;
mod write;
