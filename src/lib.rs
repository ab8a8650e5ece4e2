pub mod dictionary;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod server;
pub mod settings;
pub mod tokenize;
