use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use perkladar::dictionary::Dictionary;
use perkladar::providers::{CompletionBackend, OpenAI};
use perkladar::server::{ServerState, run_server};
use perkladar::{logging, settings};

#[derive(Parser, Debug)]
#[command(
    name = "perkladar",
    version,
    about = "HTTP gateway translating Polish into Slovian through an LLM"
)]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Model identifier (overrides OPENAI_MODEL)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// API key (overrides OPENAI_API_KEY)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Dictionary file (overrides DICTIONARY_PATH)
    #[arg(short = 'd', long = "dictionary")]
    dictionary: Option<PathBuf>,

    /// Directory served as the web root (overrides STATIC_ROOT)
    #[arg(long = "static-root")]
    static_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut settings = settings::load_settings()?;
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(key) = cli.key {
        settings.api_key = Some(key);
    }
    if let Some(dictionary) = cli.dictionary {
        settings.dictionary_path = dictionary;
    }
    if let Some(static_root) = cli.static_root {
        settings.static_root = static_root;
    }

    let dictionary = Arc::new(Dictionary::load(&settings.dictionary_path));
    let backend: Arc<dyn CompletionBackend> =
        Arc::new(OpenAI::new(settings.api_key.clone()).with_model(settings.model.clone()));
    let addr = format!("0.0.0.0:{}", settings.port);
    let state = ServerState {
        settings,
        dictionary,
        backend,
    };
    run_server(state, addr).await
}
