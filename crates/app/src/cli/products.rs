use kart::pricing::money;
use kart_app::context::AppContext;

pub(crate) async fn run(context: &AppContext) -> Result<(), String> {
    let products = context
        .products
        .list_products()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    for product in &products {
        let price =
            money(product.effective_price(), context.currency).map_err(|error| error.to_string())?;

        println!("product_id: {}", product.id);
        println!("name: {}", product.name);
        println!("price: {price}");
        println!(
            "stock: {}",
            product
                .stock
                .map_or_else(|| "unknown".to_string(), |stock| stock.to_string())
        );
        println!(
            "status: {}",
            if product.is_active() { "active" } else { "suspended" }
        );
        println!();
    }

    Ok(())
}
