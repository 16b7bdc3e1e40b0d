use clap::{ Args as ClapArgs, Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the completion gateway (POST /api/chat)
    Serve(ServeArgs),
    /// Chat in the terminal through a running gateway
    Chat(ChatArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    // --- Chat LLM Provider Args ---
    /// API key for the Google generative-language API
    #[arg(long, env = "GOOGLE_GENERATIVE_AI_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-1.5-pro-latest)
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Base URL of the provider API (e.g., https://generativelanguage.googleapis.com/v1beta)
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// Optional JSON file overriding the persona and generation parameters.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ChatArgs {
    /// Gateway endpoint the conversation is posted to.
    #[arg(long, env = "CHAT_API_URL", default_value = "http://127.0.0.1:3000/api/chat")]
    pub chat_api_url: String,

    /// Optional JSON file overriding the greeting shown after a reset.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    #[command(flatten)]
    pub history: HistoryArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct HistoryArgs {
    /// History store type (redis, memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "redis")]
    pub history_type: String,

    /// History store host endpoint (e.g., redis://127.0.0.1:6379)
    #[arg(long, env = "HISTORY_HOST", default_value = "redis://127.0.0.1:6379")]
    pub history_host: String,

    /// Prefix for Redis message keys.
    #[arg(long, env = "HISTORY_REDIS_PREFIX", default_value = "messages:")]
    pub history_redis_prefix: String,
}
