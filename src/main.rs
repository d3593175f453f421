use std::sync::Arc;

use mailflow::config::Settings;
use mailflow::llm::ChatCompletionsClient;
use mailflow::monitor::MailboxMonitor;
use mailflow::pipeline::EmailPipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Missing required configuration is fatal before any polling begins.
    let settings = Settings::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  required: MAIL_USERNAME, MAIL_APP_PASSWORD, API_KEY_OPENAI");
        std::process::exit(1);
    });

    eprintln!("mailflow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   IMAP: {}:{}", settings.mail.imap_host, settings.mail.imap_port);
    eprintln!("   Model: {}", settings.llm.model);
    eprintln!(
        "   Raw: {}/ | Evaluated: {}/",
        settings.storage.raw_dir, settings.storage.evaluated_dir
    );
    eprintln!("   Importance scale: low -> medium -> high -> urgent -> critical\n");

    let generator = Arc::new(ChatCompletionsClient::new(settings.llm.clone()));
    let pipeline = EmailPipeline::new(generator);
    let monitor = MailboxMonitor::new(settings.mail, &settings.storage, pipeline);

    tokio::select! {
        result = monitor.run() => {
            // run() only returns on a fatal startup error.
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted; shutting down");
        }
    }

    Ok(())
}
