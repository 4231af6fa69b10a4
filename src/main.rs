use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shortline::app::AppContext;
use shortline::cli::{commands, Cli, Commands};
use shortline::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;
    ctx.bootstrap().await;

    if let Some(route) = cli.command.route_name() {
        commands::check_route(&ctx, route).await?;
    }

    match cli.command {
        Commands::Login { email, password } => {
            commands::login(&ctx, &email, &password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            commands::register(&ctx, &name, &email, &password).await?;
        }
        Commands::Logout => {
            commands::logout(&ctx).await?;
        }
        Commands::Whoami => {
            commands::whoami(&ctx).await?;
        }
        Commands::Feed {
            hashtag,
            channel,
            pages,
        } => {
            commands::feed(&ctx, hashtag, channel, pages).await?;
        }
        Commands::Favorite { video_id } => {
            commands::favorite(&ctx, &video_id).await?;
        }
        Commands::Subscriptions => {
            commands::subscriptions(&ctx).await?;
        }
        Commands::Subscribe { channel_id } => {
            commands::subscribe(&ctx, &channel_id).await?;
        }
        Commands::Categories { search } => {
            commands::list(&ctx.categories, search, 1, |c| c.name.clone()).await?;
        }
        Commands::Channels { search, page } => {
            commands::list(&ctx.channels, search, page, |c| c.name.clone()).await?;
        }
        Commands::Hashtags { search, page } => {
            commands::list(&ctx.hashtags, search, page, |h| format!("#{}", h.name)).await?;
        }
        Commands::Admin { resource, action } => {
            commands::admin(&ctx, resource, action).await?;
        }
    }

    Ok(())
}
