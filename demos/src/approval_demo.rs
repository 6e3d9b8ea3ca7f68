use dotenv::dotenv;
use std::env;
use terramartz_admin::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let client = TerraMartz::from_env()?;
    if !client.session().is_authenticated() {
        let email = env::var("TERRAMARTZ_ADMIN_EMAIL")?;
        let password = env::var("TERRAMARTZ_ADMIN_PASSWORD")?;
        client.auth().login(&email, &password).await?;
    }

    let queue = client.approval_queue();
    queue.refresh().await?;

    println!(
        "{} products waiting for approval, page {} of {}",
        queue.list().total(),
        queue.list().pagination().page,
        queue.list().total_pages()
    );
    for product in queue.pending() {
        println!(
            "  {}  {}  {:?}",
            product.id(),
            product.name.as_deref().unwrap_or("(unnamed)"),
            product.price
        );
    }

    // Usage: approval_demo [approve|reject] <product-id>
    let args: Vec<String> = env::args().collect();
    if let [_, action, id] = args.as_slice() {
        let outcome = match action.as_str() {
            "approve" => queue.approve(id).await?,
            "reject" => queue.reject(id).await?,
            other => return Err(format!("unknown action {}", other).into()),
        };

        println!("Backend replied: {}", outcome.response);
        if let Err(e) = outcome.refreshed {
            println!("Could not reload the queue: {}", e);
        } else {
            println!("{} products still waiting", queue.list().total());
        }
    }

    Ok(())
}
