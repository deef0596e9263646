use crate::console::ConsoleTransport;
use anyhow::{Result, bail};
use std::sync::Arc;
use ttrelay_core::config::Settings;
use ttrelay_core::conversation::ConversationStore;
use ttrelay_core::dispatch::{DispatchOptions, Dispatcher};
use ttrelay_core::provider::ProviderClient;
use ttrelay_core::router::Router;
use ttrelay_infrastructure::SettingsStorage;
use ttrelay_interaction::{DeepSeekClient, GroqClient, OpenAiClient};

/// Loads settings, wires the providers into a router/dispatcher pair and
/// runs the console transport loop until stdin closes.
pub async fn run() -> Result<()> {
    let storage = SettingsStorage::new()?;
    let settings = storage.load()?;

    let providers = build_providers(&settings);
    if providers.is_empty() {
        bail!(
            "no provider is configured; add an api_key to {}",
            storage.path().display()
        );
    }

    let store = Arc::new(ConversationStore::new(settings.history_limit));
    let router = Arc::new(Router::new(
        store,
        providers,
        &settings.command_prefix,
    ));

    let transport = Arc::new(ConsoleTransport::new());
    let bot_username = if settings.username.is_empty() {
        "ttrelay".to_string()
    } else {
        settings.username.clone()
    };
    let dispatcher = Arc::new(Dispatcher::new(
        router,
        transport.clone(),
        DispatchOptions {
            bot_username,
            // The console transport has no channels, so the membership
            // restriction never applies locally.
            bot_channel_id: None,
            command_prefix: settings.command_prefix.clone(),
            channel_only: settings.channel_only,
            message_limit: settings.message_limit,
        },
    ));

    tracing::info!("ttrelay running on the console transport; type h for help, Ctrl-D to exit");
    transport.run_receive_loop(dispatcher).await;
    Ok(())
}

/// Builds a client for every provider with a configured key.
fn build_providers(settings: &Settings) -> Vec<Arc<dyn ProviderClient>> {
    let mut providers: Vec<Arc<dyn ProviderClient>> = Vec::new();

    if settings.openai.is_configured() {
        let mut client =
            OpenAiClient::new(&settings.openai.api_key).with_max_tokens(settings.max_tokens);
        if let Some(model) = &settings.openai.model {
            client = client.with_model(model);
        }
        providers.push(Arc::new(client));
    } else {
        tracing::info!("ChatGPT disabled: no api_key configured");
    }

    if settings.deepseek.is_configured() {
        let mut client =
            DeepSeekClient::new(&settings.deepseek.api_key).with_max_tokens(settings.max_tokens);
        if let Some(model) = &settings.deepseek.model {
            client = client.with_model(model);
        }
        providers.push(Arc::new(client));
    } else {
        tracing::info!("DeepSeek disabled: no api_key configured");
    }

    if settings.groq.is_configured() {
        let mut client =
            GroqClient::new(&settings.groq.api_key).with_max_tokens(settings.max_tokens);
        if let Some(model) = &settings.groq.model {
            client = client.with_model(model);
        }
        providers.push(Arc::new(client));
    } else {
        tracing::info!("Groq disabled: no api_key configured");
    }

    providers
}
