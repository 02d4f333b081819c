use kiroku_client::IdentityClient;
use kiroku_client::forms::CredentialsForm;

use crate::args::{ProviderArgs, SignInArgs, SignUpArgs};
use crate::client::CliError;
use crate::print::print_json;

fn form(provider: &ProviderArgs) -> Result<(IdentityClient, CredentialsForm), CliError> {
    let identity = IdentityClient::new(&provider.auth_url, provider.auth_api_key.clone())?;
    let form = CredentialsForm::new(provider.email.clone(), provider.password.clone());
    Ok((identity, form))
}

pub async fn sign_in(args: &SignInArgs) -> Result<(), CliError> {
    let (identity, mut form) = form(&args.provider)?;
    let session = form.sign_in(&identity).await?;
    print_json(&session)
}

pub async fn sign_up(args: &SignUpArgs) -> Result<(), CliError> {
    let (identity, mut form) = form(&args.provider)?;
    let notice = form.sign_up(&identity, &args.redirect_to).await?;
    println!("{notice}");
    Ok(())
}
