use kiroku_api_types::{CategoryListResponse, CategoryResponse};
use kiroku_client::forms::CategoryForm;
use kiroku_client::request::ADMIN_CATEGORIES;
use kiroku_client::{CacheKey, RequestCache};

use crate::args::CategoriesCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: &CategoriesCmd) -> Result<(), CliError> {
    match cmd {
        CategoriesCmd::List => list(ctx).await,
        CategoriesCmd::Show { id } => show(ctx, *id).await,
        CategoriesCmd::Create { name } => create(ctx, name).await,
        CategoriesCmd::Update { id, name } => update(ctx, *id, name).await,
        CategoriesCmd::Delete { id } => delete(ctx, *id).await,
    }
}

async fn list(ctx: &Ctx) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let cache = RequestCache::<CategoryListResponse>::new();
    let key = CacheKey::authorized(Some(ADMIN_CATEGORIES), Some(&token));
    let api = ctx.api.clone();
    let res = cache
        .read(&key, move |endpoint, token| {
            let endpoint = endpoint.to_string();
            let token = token.map(str::to_string);
            async move { api.get(&endpoint, token.as_deref()).await }
        })
        .await?;
    print_json(&res)
}

async fn show(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let res: CategoryResponse = ctx
        .api
        .get(&format!("{ADMIN_CATEGORIES}/{id}"), Some(&token))
        .await?;
    print_json(&res)
}

async fn create(ctx: &Ctx, name: &str) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let mut form = CategoryForm::create();
    form.name = name.to_string();
    let created = form.submit(&ctx.api, Some(&token)).await?;
    print_json(&created)
}

async fn update(ctx: &Ctx, id: i64, name: &str) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let mut form = CategoryForm::edit(id, false);
    form.name = name.to_string();
    form.update(&ctx.api, Some(&token)).await?;
    println!("updated");
    Ok(())
}

async fn delete(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let form = CategoryForm::edit(id, false);
    form.delete(&ctx.api, Some(&token)).await?;
    println!("deleted");
    Ok(())
}
