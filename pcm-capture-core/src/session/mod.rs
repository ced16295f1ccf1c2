pub mod capture_loop;
pub mod engine;
pub mod events;
