use clap::Args;
use kart::{carts::Cart, pricing::line_total, products::ProductId};
use kart_app::{
    context::AppContext,
    messages::Localized,
    review::CartReviewSession,
    sync::IncreaseOutcome,
};
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct ProductArgs {
    /// Product id
    product: String,
}

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Product id
    product: String,

    /// Units to add
    #[arg(long, default_value_t = 1_u32)]
    quantity: u32,

    /// Accept large-quantity and stock-adjustment prompts
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Product id
    product: String,

    /// Confirm removing the whole line
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ClearArgs {
    /// Confirm removing every line
    #[arg(long)]
    yes: bool,
}

pub(crate) async fn show(context: &AppContext, session: &mut CartReviewSession) -> Result<(), String> {
    let cart = session
        .refresh()
        .await
        .map_err(|error| error.localized(context.locale))?;

    print_cart(context, session, &cart)
}

pub(crate) async fn add(
    context: &AppContext,
    session: &mut CartReviewSession,
    args: AddArgs,
) -> Result<(), String> {
    let locale = context.locale;
    let product = ProductId::new(args.product);

    session
        .refresh()
        .await
        .map_err(|error| error.localized(locale))?;

    match context.products.get_product(&product).await {
        Ok(snapshot) => session.engine().remember_products([&snapshot]),
        Err(error) => warn!(%product, "product snapshot unavailable: {error}"),
    }

    let mut outcome = session
        .increase(&product, args.quantity)
        .await
        .map_err(|error| error.localized(locale))?;
    let mut adjusted = false;

    loop {
        println!("{}", outcome.localized(locale));

        let next = match outcome {
            IncreaseOutcome::Applied { cart, .. } => return print_cart(context, session, &cart),
            IncreaseOutcome::NeedsConfirmation(prompt) if args.yes => {
                session.accept_large_quantity(&prompt).await
            }
            IncreaseOutcome::StockExceeded(shortfall)
                if args.yes && !adjusted && shortfall.retry_quantity > 0 =>
            {
                adjusted = true;
                session.accept_stock_adjustment(&shortfall).await
            }
            IncreaseOutcome::NeedsConfirmation(_) | IncreaseOutcome::StockExceeded(_) => {
                println!("no changes were made");
                return Ok(());
            }
        };

        outcome = next.map_err(|error| error.localized(locale))?;
    }
}

pub(crate) async fn decrease(
    context: &AppContext,
    session: &mut CartReviewSession,
    args: ProductArgs,
) -> Result<(), String> {
    let cart = session
        .decrease(&ProductId::new(args.product))
        .await
        .map_err(|error| error.localized(context.locale))?;

    print_cart(context, session, &cart)
}

pub(crate) async fn remove(
    context: &AppContext,
    session: &mut CartReviewSession,
    args: RemoveArgs,
) -> Result<(), String> {
    if !args.yes {
        return Err("pass --yes to remove the whole line".to_string());
    }

    let cart = session
        .remove_line(&ProductId::new(args.product))
        .await
        .map_err(|error| error.localized(context.locale))?;

    print_cart(context, session, &cart)
}

pub(crate) async fn clear(
    context: &AppContext,
    session: &mut CartReviewSession,
    args: ClearArgs,
) -> Result<(), String> {
    if !args.yes {
        return Err("pass --yes to remove every line".to_string());
    }

    let cart = session
        .clear()
        .await
        .map_err(|error| error.localized(context.locale))?;

    print_cart(context, session, &cart)
}

pub(crate) fn print_cart(
    context: &AppContext,
    session: &CartReviewSession,
    cart: &Cart,
) -> Result<(), String> {
    if cart.is_empty() {
        println!("cart is empty");
        return Ok(());
    }

    for line in cart.lines() {
        let total = line_total(line, context.currency).map_err(|error| error.to_string())?;
        let marker = if session.selection().is_selected(&line.id) {
            "[x]"
        } else {
            "[ ]"
        };

        println!(
            "{marker} {} {} ({}) x{} = {total}",
            line.id, line.product.name, line.product.id, line.quantity
        );
    }

    let subtotal = session.subtotal().map_err(|error| error.to_string())?;

    println!("subtotal: {subtotal}");

    Ok(())
}
