use std::path::{Path, PathBuf};

use scenecraft::media::upscale;
use scenecraft::tiers::DEFAULT_SYNTHESIS_PREMIUM;
use scenecraft::{Client, SynthesisOptions};

fn output_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SCENECRAFT_OUTPUT_DIR") {
        return PathBuf::from(dir);
    }
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("examples")
        .join("files")
        .join("output")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(scene_prompt)) = (args.next(), args.next()) else {
        eprintln!(
            "usage: synthesize_scene <product-image> <scene-prompt> [requirements] [reference-image]"
        );
        return Ok(());
    };
    let extra_requirements = args.next().filter(|extra| !extra.trim().is_empty());
    let reference_image = args.next().map(image::open).transpose()?;
    let product = image::open(&path)?;

    let client = Client::from_env()?;
    let result = client
        .studio()
        .synthesize(
            DEFAULT_SYNTHESIS_PREMIUM,
            &product,
            &scene_prompt,
            SynthesisOptions {
                extra_requirements,
                reference_image,
            },
        )
        .await;

    let image = match result {
        Ok(image) => image,
        Err(scenecraft::Error::DeclinedSynthesis { model, excerpt }) => {
            eprintln!("{model} replied with text instead of an image: {excerpt}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let dir = output_dir();
    std::fs::create_dir_all(&dir)?;
    let standard = dir.join("scene.png");
    image.save(&standard)?;
    let large = dir.join("scene_2x.png");
    upscale(&image, 2).save(&large)?;
    println!(
        "saved {} and {} (可用 SCENECRAFT_OUTPUT_DIR 覆盖输出目录)",
        standard.display(),
        large.display()
    );
    Ok(())
}
