use clap::{Parser, Subcommand};
use kart_app::{
    config::{ClientConfig, observability::LoggingConfig},
    context::AppContext,
    review::CartReviewSession,
};

mod cart;
mod checkout;
mod products;

#[derive(Debug, Parser)]
#[command(name = "kart", about = "Kart shopping cart client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cart and the subtotal
    Show,

    /// List catalog products
    Products,

    /// Add units of a product
    Add(cart::AddArgs),

    /// Remove one unit of a product
    Decrease(cart::ProductArgs),

    /// Remove a product's whole line
    Remove(cart::RemoveArgs),

    /// Remove every line
    Clear(cart::ClearArgs),

    /// Freeze the selected lines for checkout
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::from_config(&self.config).map_err(|error| error.to_string())?;

        let mut session = CartReviewSession::open(
            context.engine.clone(),
            context.token.clone(),
            context.currency,
        );

        match self.command {
            Commands::Show => cart::show(&context, &mut session).await,
            Commands::Products => products::run(&context).await,
            Commands::Add(args) => cart::add(&context, &mut session, args).await,
            Commands::Decrease(args) => cart::decrease(&context, &mut session, args).await,
            Commands::Remove(args) => cart::remove(&context, &mut session, args).await,
            Commands::Clear(args) => cart::clear(&context, &mut session, args).await,
            Commands::Checkout(args) => checkout::run(&context, &mut session, args).await,
        }
    }
}
