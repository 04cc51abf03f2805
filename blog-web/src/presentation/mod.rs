pub mod http_handlers;
pub mod middleware;
pub mod routes;
pub mod views;
