use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::providers::CompletionBackend;
use crate::settings::Settings;

#[derive(Clone)]
pub struct ServerState {
    pub settings: Settings,
    pub dictionary: Arc<Dictionary>,
    pub backend: Arc<dyn CompletionBackend>,
}
