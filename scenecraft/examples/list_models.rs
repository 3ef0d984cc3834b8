use scenecraft::Client;

#[tokio::main]
async fn main() -> scenecraft::Result<()> {
    let client = Client::from_env()?;
    let catalog = client.catalog().list().await?;
    println!("analysis: {:?}", catalog.analysis);
    println!("synthesis: {:?}", catalog.synthesis);
    Ok(())
}
