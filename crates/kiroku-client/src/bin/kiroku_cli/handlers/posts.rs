use kiroku_api_types::{PostListResponse, PostResponse};
use kiroku_client::forms::PostForm;
use kiroku_client::request::ADMIN_POSTS;

use crate::args::{PostFields, PostsCmd};
use crate::client::{CliError, Ctx};
use crate::io::read_opt_value;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: &PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List => list(ctx).await,
        PostsCmd::Show { id } => show(ctx, *id).await,
        PostsCmd::Create { fields } => create(ctx, fields).await,
        PostsCmd::Update { id, fields } => update(ctx, *id, fields).await,
        PostsCmd::Delete { id } => delete(ctx, *id).await,
    }
}

async fn list(ctx: &Ctx) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let res: PostListResponse = ctx.api.get(ADMIN_POSTS, Some(&token)).await?;
    print_json(&res)
}

async fn show(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let res: PostResponse = ctx
        .api
        .get(&format!("{ADMIN_POSTS}/{id}"), Some(&token))
        .await?;
    print_json(&res)
}

fn apply(form: &mut PostForm, fields: &PostFields) -> Result<(), CliError> {
    if let Some(title) = &fields.title {
        form.title.clone_from(title);
    }
    if let Some(content) = read_opt_value(fields.content.clone(), fields.content_file.clone())? {
        form.content = content;
    }
    if let Some(key) = &fields.thumbnail_image_key {
        form.thumbnail_image_key.clone_from(key);
    }
    if fields.no_category {
        form.selected_category = None;
    } else if let Some(category) = fields.category {
        form.selected_category = Some(category);
    }
    Ok(())
}

async fn create(ctx: &Ctx, fields: &PostFields) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let mut form = PostForm::create();
    apply(&mut form, fields)?;
    let created = form.submit(&ctx.api, Some(&token)).await?;
    print_json(&created)
}

async fn update(ctx: &Ctx, id: i64, fields: &PostFields) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let current: PostResponse = ctx
        .api
        .get(&format!("{ADMIN_POSTS}/{id}"), Some(&token))
        .await?;

    let mut form = PostForm::edit(id);
    form.seed(&current.post);
    apply(&mut form, fields)?;
    form.update(&ctx.api, Some(&token)).await?;
    println!("updated");
    Ok(())
}

async fn delete(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let token = ctx.token().await?;
    let form = PostForm::edit(id);
    form.delete(&ctx.api, Some(&token)).await?;
    println!("deleted");
    Ok(())
}
