use clap::Args;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::data::{Database, NewItem};
use crate::core::models::AssetId;
use crate::core::usage::AssetUrlResolver;
use crate::error::Result;
use crate::services::{ContentStore, SimpleServices};

#[derive(Args)]
pub struct InitArgs {
    /// Seed a small sample library (only into an empty database)
    #[arg(long)]
    demo: bool,
}

pub async fn execute(args: InitArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    let db = services.create_database().await?;

    if args.demo {
        if db.summary()?.content_items > 0 {
            warn!("Database already has content; not seeding demo data");
        } else {
            seed_demo(&db, &config).await?;
            info!("Seeded demo content");
        }
    }

    let summary = db.summary()?;

    println!("🗄️  Database ready: {}", config.database_path.display());
    println!("  📄 Content items: {}", summary.content_items);
    println!("  🖼️  Image assets: {}", summary.image_assets);
    println!("  🏷️  With ALT text: {}", summary.labelled_assets);
    println!("\n📋 Next steps:");
    println!("  1. Run 'altfill list' to review assets missing ALT text");
    println!("  2. Run 'altfill apply <FILE>' or 'altfill autofill' to write labels");

    Ok(())
}

async fn seed_demo(db: &Database, config: &Config) -> Result<()> {
    let resolver = AssetUrlResolver::new(&config.site_url, &config.uploads_path)?;

    let banner = db.insert_item(&NewItem::image("2024/06/summer-sale_banner.jpg"))?;
    let team = db.insert_item(&NewItem::image("2024/05/team_photo.png"))?;
    let chart = db.insert_item(&NewItem::image("2024/04/q1-results.png"))?;
    let orphan = db.insert_item(&NewItem::image("2023/11/img_042.jpg"))?;
    let logo = db.insert_item(&NewItem::image("brand/logo.svg"))?;
    db.insert_item(&NewItem::image("docs/price-list.pdf"))?;

    let sale = db.insert_item(&NewItem::page("Summer Sale", "<p>Everything must go.</p>"))?;
    db.set_featured(sale, banner)?;

    db.insert_item(&NewItem::page(
        "Meet the Team",
        &format!("<img class=\"{}{}\">", config.embed_marker_prefix, team),
    ))?;

    let chart_url = resolver
        .public_url("2024/04/q1-results.png")
        .map(|url| url.to_string())
        .unwrap_or_default();
    db.insert_item(
        &NewItem::page("Quarterly Results (draft)", &format!("<img src=\"{}\">", chart_url))
            .with_status("draft"),
    )?;

    db.write_label(AssetId(logo), "Company logo").await?;

    info!("Demo assets: #{} #{} #{} #{} #{}", banner, team, chart, orphan, logo);
    Ok(())
}
