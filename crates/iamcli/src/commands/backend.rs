//! Backend commands: liveness, queries, cache and policy lookups.

use anyhow::{Context as _, Result};
use iamcli_core::api::{PolicyListQuery, PolicyQuery, SubjectType};
use iamcli_core::ServiceClient;

use super::{print_json, Context};

pub async fn ping(ctx: &Context) -> Result<()> {
    let client = ctx.backend_client()?;
    client
        .ping()
        .await
        .with_context(|| format!("connect to host {} fail", client.host()))?;
    println!("pong");
    Ok(())
}

pub async fn healthz(ctx: &Context) -> Result<()> {
    let client = ctx.backend_client()?;
    client
        .healthz()
        .await
        .with_context(|| format!("healthz check of {} fail", client.host()))?;
    println!("ok");
    Ok(())
}

pub async fn version(ctx: &Context) -> Result<()> {
    let client = ctx.backend_client()?;
    let version = client
        .version()
        .await
        .with_context(|| format!("version check of {} fail", client.host()))?;
    print_json(&version)
}

pub async fn systems(ctx: &Context) -> Result<()> {
    let data = ctx
        .backend_client()?
        .list_systems()
        .await
        .context("list systems fail")?;
    print_json(&data)
}

pub async fn query_model(ctx: &Context) -> Result<()> {
    let system = ctx.selected_system()?;
    let data = ctx
        .backend_client()?
        .query_model(&system)
        .await
        .context("query model fail")?;
    print_json(&data)
}

pub async fn query_action(ctx: &Context) -> Result<()> {
    let system = ctx.selected_system()?;
    let data = ctx
        .backend_client()?
        .query_action(&system)
        .await
        .context("query action fail")?;
    print_json(&data)
}

pub async fn query_subject(
    ctx: &Context,
    subject_type: SubjectType,
    subject_id: &str,
) -> Result<()> {
    let data = ctx
        .backend_client()?
        .query_subject(subject_type, subject_id)
        .await
        .context("query subject fail")?;
    print_json(&data)
}

pub async fn query_policy(
    ctx: &Context,
    subject_type: SubjectType,
    subject_id: String,
    action: String,
    force: bool,
    debug: bool,
) -> Result<()> {
    let query = PolicyQuery {
        system: ctx.selected_system()?,
        subject_type,
        subject_id,
        action,
        force,
        debug,
    };
    let data = ctx
        .backend_client()?
        .query_policy(&query)
        .await
        .context("query policy fail")?;
    print_json(&data)
}

pub async fn cache_policy(
    ctx: &Context,
    subject_type: SubjectType,
    subject_id: &str,
    action: Option<&str>,
) -> Result<()> {
    let system = ctx.selected_system()?;
    let data = ctx
        .backend_client()?
        .query_cache_policy(&system, subject_type, subject_id, action)
        .await
        .context("cache policy fail")?;
    print_json(&data)
}

pub async fn cache_expression(ctx: &Context, pks: &[i64]) -> Result<()> {
    let data = ctx
        .backend_client()?
        .query_cache_expression(pks)
        .await
        .context("cache expression fail")?;
    print_json(&data)
}

pub async fn policy_get(ctx: &Context, policy_id: i64) -> Result<()> {
    let system = ctx.selected_system()?;
    let data = ctx
        .backend_client()?
        .policy_get(&system, policy_id)
        .await
        .with_context(|| format!("get policy {} fail", policy_id))?;
    print_json(&data)
}

pub async fn policy_list(ctx: &Context, query: &PolicyListQuery) -> Result<()> {
    let system = ctx.selected_system()?;
    let data = ctx
        .backend_client()?
        .policy_list(&system, query)
        .await
        .context("list policies fail")?;
    print_json(&data)
}

pub async fn policy_subjects(ctx: &Context, policy_ids: &[i64]) -> Result<()> {
    let system = ctx.selected_system()?;
    let data = ctx
        .backend_client()?
        .policy_subjects(&system, policy_ids)
        .await
        .context("policy subjects fail")?;
    print_json(&data)
}
