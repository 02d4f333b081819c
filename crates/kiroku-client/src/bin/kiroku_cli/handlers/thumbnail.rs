use std::sync::Arc;

use kiroku_client::{StoragePublicUrl, ThumbnailResolver};
use url::Url;

use crate::args::ThumbnailArgs;
use crate::client::CliError;

pub async fn handle(site: Option<&str>, args: &ThumbnailArgs) -> Result<(), CliError> {
    let base = args
        .storage_url
        .as_deref()
        .or(site)
        .ok_or(CliError::MissingSite)?;
    let source = StoragePublicUrl::new(Url::parse(base)?, args.bucket.clone());
    let resolver = ThumbnailResolver::new(Arc::new(source));

    match resolver.resolve(&args.key).await? {
        Some(url) => println!("{url}"),
        None => println!("(no thumbnail)"),
    }
    Ok(())
}
