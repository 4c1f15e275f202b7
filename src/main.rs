#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = post_feed::load_config()?;
    post_feed::run(config).await
}
