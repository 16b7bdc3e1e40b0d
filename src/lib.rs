pub mod cli;
pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;

use cli::{ Args, ChatArgs, Command, ServeArgs };
use config::prompt::resolve_prompts;
use conversation::{ client::HttpChatApi, ConversationController };
use gateway::CompletionGateway;
use history::initialize_message_store;
use llm::{ chat::new_client as new_chat_client, LlmConfig };
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve_args) => serve(serve_args).await,
        Command::Chat(chat_args) => chat(chat_args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Gateway Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-----------------------------");

    let prompts = resolve_prompts(args.prompts_path.as_deref())?;
    let chat_config = LlmConfig {
        api_key: Some(args.chat_api_key.clone()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
    };
    let chat_client = new_chat_client(&chat_config)?;
    let gateway = CompletionGateway::new(chat_client, prompts);

    Server::new(gateway, args).run().await
}

async fn chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Chat Configuration ---");
    info!("Gateway URL: {}", args.chat_api_url);
    info!("History Store Type: {}", args.history.history_type);
    info!("History Store Host: {}", args.history.history_host);
    info!("--------------------------");

    let prompts = resolve_prompts(args.prompts_path.as_deref())?;
    let store = initialize_message_store(&args.history)?;
    let api = Arc::new(HttpChatApi::new(args.chat_api_url.clone()));
    let controller = ConversationController::new(store, api, prompts.greeting_text.clone());

    console::run_console(&controller).await
}
