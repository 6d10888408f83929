//! login / logout / use

use anyhow::{Context as _, Result};
use chrono::Utc;
use iamcli_core::{AppIdentity, BackendClient, SaasClient, ServiceClient, SessionStore};
use tracing::info;

use super::Context;

/// Add `http://` when the host was given without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

fn resolve_secret(app_secret: Option<String>) -> Result<String> {
    match app_secret {
        Some(secret) => Ok(secret),
        None => rpassword::prompt_password("app_secret: ").context("Failed to read app_secret"),
    }
}

/// Check the host and identity against the live service, then save the session.
async fn login<C: ServiceClient>(
    client: &C,
    store: &SessionStore,
    identity: &AppIdentity,
) -> Result<()> {
    client
        .ping()
        .await
        .with_context(|| format!("connect to host {} fail", client.host()))?;
    client
        .verify_identity()
        .await
        .context("app_code or app_secret invalid")?;

    let credential = store.write(client.host(), identity)?;
    info!(host = %credential.host, app_code = %credential.identity.app_code, "Logged in");
    println!(
        "success, login valid for {} minutes",
        credential.minutes_until_expiry(Utc::now())
    );
    Ok(())
}

pub async fn login_backend(
    ctx: &Context,
    host: &str,
    app_code: &str,
    app_secret: Option<String>,
) -> Result<()> {
    let identity = AppIdentity::new(app_code, resolve_secret(app_secret)?);
    let host = normalize_host(host);
    let client = BackendClient::new(&host, identity.clone(), ctx.config().overrides)?;
    login(&client, &ctx.backend_store(), &identity).await
}

pub async fn login_saas(
    ctx: &Context,
    host: &str,
    app_code: &str,
    app_secret: Option<String>,
) -> Result<()> {
    let identity = AppIdentity::new(app_code, resolve_secret(app_secret)?);
    let host = normalize_host(host);
    let client = SaasClient::new(&host, identity.clone(), ctx.config().overrides)?;
    login(&client, &ctx.saas_store(), &identity).await
}

/// Forget the backend session and the selected system.
pub fn logout_backend(ctx: &Context) -> Result<()> {
    ctx.backend_store().remove()?;
    ctx.selector().remove()?;
    println!("logged out");
    Ok(())
}

pub fn logout_saas(ctx: &Context) -> Result<()> {
    ctx.saas_store().remove()?;
    println!("logged out");
    Ok(())
}

pub fn use_system(ctx: &Context, system: &str) -> Result<()> {
    ctx.selector()
        .write(system.trim())
        .with_context(|| format!("Use system {} fail", system))?;
    println!("success, now using system {}", system.trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iamcli_core::{Config, Overrides};

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("iam.example.com:5001"), "http://iam.example.com:5001");
        assert_eq!(normalize_host("http://iam.example.com/"), "http://iam.example.com");
        assert_eq!(normalize_host("https://iam.example.com"), "https://iam.example.com");
        assert_eq!(normalize_host(" 10.0.0.1 "), "http://10.0.0.1");
    }

    #[test]
    fn test_logout_clears_session_and_selected_system() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = Context::new(Config::new(dir.path(), Overrides::default()));
        ctx.backend_store()
            .write("http://iam", &AppIdentity::new("bk_iam", "s3cret"))
            .unwrap();
        use_system(&ctx, " bk_paas ").unwrap();
        assert_eq!(ctx.selected_system().unwrap(), "bk_paas");

        logout_backend(&ctx).unwrap();
        assert!(!ctx.backend_store().exists());
        assert!(ctx.selected_system().is_err());
        // nothing left to remove
        logout_backend(&ctx).unwrap();
    }

    #[test]
    fn test_given_secret_is_not_prompted() {
        assert_eq!(resolve_secret(Some("s3cret".to_string())).unwrap(), "s3cret");
    }
}
