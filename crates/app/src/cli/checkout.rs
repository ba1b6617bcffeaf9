use clap::Args;
use kart::{carts::CartLineId, pricing::line_total};
use kart_app::{context::AppContext, messages::Localized, review::CartReviewSession};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Line ids to leave out of the order
    #[arg(long = "exclude")]
    exclude: Vec<String>,
}

pub(crate) async fn run(
    context: &AppContext,
    session: &mut CartReviewSession,
    args: CheckoutArgs,
) -> Result<(), String> {
    let locale = context.locale;

    session
        .refresh()
        .await
        .map_err(|error| error.localized(locale))?;

    for line in args.exclude {
        let line = CartLineId::new(line);

        if session.toggle(&line).is_none() {
            return Err(format!("line {line} is not in the cart"));
        }
    }

    let handoff = session
        .finalize_for_checkout()
        .map_err(|error| error.localized(locale))?;

    for line in handoff.lines() {
        let total = line_total(line, context.currency).map_err(|error| error.to_string())?;

        println!("{} {} x{} = {total}", line.id, line.product.name, line.quantity);
    }

    println!("subtotal: {}", handoff.subtotal());

    Ok(())
}
