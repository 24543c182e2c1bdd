mod http_server;

pub use http_server::{TcpListener, run_http_server};
