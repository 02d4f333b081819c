use kiroku_api_types::{PostListResponse, PostResponse};
use kiroku_client::request::PUBLIC_POSTS;

use crate::args::PublicCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: &PublicCmd) -> Result<(), CliError> {
    match cmd {
        PublicCmd::List => {
            let res: PostListResponse = ctx.api.get(PUBLIC_POSTS, None).await?;
            print_json(&res)
        }
        PublicCmd::Show { id } => {
            let res: PostResponse = ctx
                .api
                .get(&format!("{PUBLIC_POSTS}/{id}"), None)
                .await?;
            print_json(&res)
        }
    }
}
