pub mod healthz;
pub mod swagger_main;
pub mod todo;
