use clap::Parser;
use tca_admin::app::commands;
use tca_admin::utils::{logger, validation::Validate};
use tca_admin::{AllotmentWorkflow, Cli, ClientConfig, HttpBackend, PromptConfirmer};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI args: {:?}", cli);

    let config = match ClientConfig::load(cli.config.as_deref(), cli.base_url.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(e);
    }
    tracing::debug!("Backend: {}", config.backend.base_url);

    let backend = HttpBackend::new(&config);
    let mut workflow = AllotmentWorkflow::new(backend, PromptConfirmer::new(cli.yes));
    let mut stdout = std::io::stdout();

    if let Err(e) = commands::execute(&cli.command, &mut workflow, cli.format, &mut stdout).await {
        tracing::error!("❌ {} (kind: {:?})", e, e.kind());
        exit_with(e);
    }
}

fn exit_with(e: tca_admin::ClientError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    for attempt in e.attempts() {
        eprintln!("   - {}", attempt);
    }
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
