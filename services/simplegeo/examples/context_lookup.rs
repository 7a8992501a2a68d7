//! Example of looking up the context of a coordinate with a signed client.
//!
//! Run with:
//!
//! ```shell
//! SIMPLEGEO_CONSUMER_KEY=... SIMPLEGEO_CONSUMER_SECRET=... \
//!     cargo run --example context_lookup
//! ```

use geosign_core::{Context, OsEnv, Result};
use geosign_http_send_reqwest::ReqwestHttpSend;
use geosign_simplegeo::{Client, Config, GeoPoint};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // The consumer credential resolves through the default chain, here the
    // SIMPLEGEO_CONSUMER_KEY / SIMPLEGEO_CONSUMER_SECRET env values.
    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let client = Client::new(ctx, Config::new())?;

    let point = GeoPoint::new(49.239, -123.129);
    let context = client.context_coord(point, &[("filter", "features")]).await?;
    println!("context for {},{}:", point.lat, point.lng);
    println!("{}", serde_json::to_string_pretty(&context).unwrap());

    Ok(())
}
