pub mod browse_handlers;
