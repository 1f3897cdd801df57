#[macro_use]
extern crate rocket;

use storefront_core::*;

// Routes are mounted in `storefront::build`
#[launch]
async fn rocket() -> _ {
    let args = args::Args::load();
    env_logger::init();
    let ctx = context::ServerContext::from_args(&args);
    log::info!("{} - storefront is starting up", ctx.release_env.value());
    let store = db::connect(&ctx).await;
    storefront::build(ctx, store)
}
