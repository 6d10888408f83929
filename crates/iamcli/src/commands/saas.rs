//! SaaS commands.

use anyhow::{Context as _, Result};
use iamcli_core::ServiceClient;

use super::{print_json, Context};

pub async fn ping(ctx: &Context) -> Result<()> {
    let client = ctx.saas_client()?;
    client
        .ping()
        .await
        .with_context(|| format!("connect to host {} fail", client.host()))?;
    println!("pong");
    Ok(())
}

pub async fn debug_list(ctx: &Context, day: &str) -> Result<()> {
    let data = ctx
        .saas_client()?
        .list_debug(day)
        .await
        .context("debug list fail")?;
    if data.is_empty() {
        println!("no debug list found!");
        return Ok(());
    }
    print_json(&data)
}

pub async fn debug_get(ctx: &Context, request_id: &str) -> Result<()> {
    let data = ctx
        .saas_client()?
        .get_debug(request_id)
        .await
        .context("debug get fail")?;
    print_json(&data)
}
