use scenecraft::tiers::DEFAULT_ANALYSIS_PREMIUM;
use scenecraft::Client;

#[tokio::main]
async fn main() -> scenecraft::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: analyze_scenes <product-image>");
        return Ok(());
    };
    let product = image::open(&path)?;

    let client = Client::from_env()?;
    let scenes = client
        .studio()
        .analyze(DEFAULT_ANALYSIS_PREMIUM, &product)
        .await?;

    for (index, scene) in scenes.iter().enumerate() {
        println!("{}. {}", index + 1, scene.title);
        println!("   prompt: {}", scene.prompt);
        println!("   reason: {}", scene.reason);
    }
    Ok(())
}
