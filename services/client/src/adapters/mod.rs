pub mod console_redirect;
pub mod file_storage;
pub mod reqwest_transport;

pub use console_redirect::ConsoleRedirect;
pub use file_storage::FileStorage;
pub use reqwest_transport::ReqwestTransport;
