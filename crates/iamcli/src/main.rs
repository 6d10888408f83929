//! iamcli - a debugging client for the IAM backend and SaaS.
//!
//! Log in once, pick a system with `use`, then query models, actions,
//! subjects, policies and cache contents. Sessions are cached in the state
//! directory for one hour.

mod commands;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use iamcli_core::api::SubjectType;
use iamcli_core::Config;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{backend, saas, session, Context};

#[derive(Parser)]
#[command(name = "iamcli", version)]
#[command(about = "Debugging client for the IAM backend and SaaS", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login via app_code/app_secret of IAM (the session lasts one hour)
    Login(LoginArgs),
    /// Forget the saved backend session
    Logout,
    /// Select the system later queries run against, e.g. `use bk_paas`
    Use { system: String },
    /// List systems registered in IAM
    Systems,
    /// Call /ping to check the backend is reachable
    Ping,
    /// Call /healthz to check the backend is healthy
    Healthz,
    /// Call /version to show the backend version
    Version,
    /// Query data of model/action/subject/policy
    Query {
        #[command(subcommand)]
        target: QueryTarget,
    },
    /// Query policy or expression from the backend cache
    Cache {
        #[command(subcommand)]
        target: CacheTarget,
    },
    /// Read policies the way a policy-consuming system does
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },
    /// IAM SaaS debug API
    Saas {
        #[command(subcommand)]
        command: SaasCommand,
    },
}

#[derive(Args)]
struct LoginArgs {
    /// Host, e.g. http://iam.example.com:5001 (http:// is assumed when omitted)
    host: String,
    app_code: String,
    /// Prompted for when omitted
    app_secret: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SubjectKind {
    User,
    Group,
}

impl From<SubjectKind> for SubjectType {
    fn from(kind: SubjectKind) -> Self {
        match kind {
            SubjectKind::User => SubjectType::User,
            SubjectKind::Group => SubjectType::Group,
        }
    }
}

#[derive(Subcommand)]
enum QueryTarget {
    /// Permission model of the selected system
    Model,
    /// Actions of the selected system
    Action,
    /// A subject with its departments and groups
    Subject { subject_type: SubjectKind, subject_id: String },
    /// Evaluate the policies of a subject for one action
    Policy {
        subject_type: SubjectKind,
        subject_id: String,
        action: String,
        /// Bypass the backend caches for this query
        #[arg(long)]
        force: bool,
        /// Leave out evaluation details (sent by default)
        #[arg(long)]
        no_debug: bool,
    },
}

#[derive(Subcommand)]
enum CacheTarget {
    /// Cached policies of a subject; all actions when `action` is omitted
    Policy {
        subject_type: SubjectKind,
        subject_id: String,
        action: Option<String>,
    },
    /// Cached expressions by primary key
    Expression {
        #[arg(required = true)]
        pks: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// One policy by id
    Get { policy_id: i64 },
    /// Policies of one action
    List {
        action_id: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
        /// Only policies valid at this unix timestamp
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Subjects of the given policies
    Subjects {
        #[arg(required = true)]
        policy_ids: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum SaasCommand {
    /// Login via app_code/app_secret of IAM SaaS
    Login(LoginArgs),
    /// Forget the saved SaaS session
    Logout,
    /// Call /ping to check the SaaS is reachable
    Ping,
    /// Read debug traces recorded by the SaaS
    Debug {
        #[command(subcommand)]
        action: DebugAction,
    },
}

#[derive(Subcommand)]
enum DebugAction {
    /// Debug entries of one day, e.g. 20210501
    List { day: String },
    /// One debug entry by request id or task id
    Get { request_id: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG wins; DEBUG=true is a shorthand for our own debug output
    let default = if std::env::var("DEBUG").as_deref() == Ok("true") {
        "iamcli=debug,iamcli_core=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    debug!(
        state_dir = %config.state_dir().display(),
        overrides = ?config.overrides,
        "Configuration loaded"
    );
    let ctx = Context::new(config);

    match cli.command {
        Commands::Login(args) => {
            session::login_backend(&ctx, &args.host, &args.app_code, args.app_secret).await
        }
        Commands::Logout => session::logout_backend(&ctx),
        Commands::Use { system } => session::use_system(&ctx, &system),
        Commands::Systems => backend::systems(&ctx).await,
        Commands::Ping => backend::ping(&ctx).await,
        Commands::Healthz => backend::healthz(&ctx).await,
        Commands::Version => backend::version(&ctx).await,
        Commands::Query { target } => match target {
            QueryTarget::Model => backend::query_model(&ctx).await,
            QueryTarget::Action => backend::query_action(&ctx).await,
            QueryTarget::Subject { subject_type, subject_id } => {
                backend::query_subject(&ctx, subject_type.into(), &subject_id).await
            }
            QueryTarget::Policy {
                subject_type,
                subject_id,
                action,
                force,
                no_debug,
            } => {
                backend::query_policy(
                    &ctx,
                    subject_type.into(),
                    subject_id,
                    action,
                    force,
                    !no_debug,
                )
                .await
            }
        },
        Commands::Cache { target } => match target {
            CacheTarget::Policy { subject_type, subject_id, action } => {
                backend::cache_policy(&ctx, subject_type.into(), &subject_id, action.as_deref())
                    .await
            }
            CacheTarget::Expression { pks } => backend::cache_expression(&ctx, &pks).await,
        },
        Commands::Policy { action } => match action {
            PolicyAction::Get { policy_id } => backend::policy_get(&ctx, policy_id).await,
            PolicyAction::List { action_id, page, page_size, timestamp } => {
                let query = iamcli_core::api::PolicyListQuery {
                    action_id,
                    page,
                    page_size,
                    timestamp,
                };
                backend::policy_list(&ctx, &query).await
            }
            PolicyAction::Subjects { policy_ids } => {
                backend::policy_subjects(&ctx, &policy_ids).await
            }
        },
        Commands::Saas { command } => match command {
            SaasCommand::Login(args) => {
                session::login_saas(&ctx, &args.host, &args.app_code, args.app_secret).await
            }
            SaasCommand::Logout => session::logout_saas(&ctx),
            SaasCommand::Ping => saas::ping(&ctx).await,
            SaasCommand::Debug { action } => match action {
                DebugAction::List { day } => saas::debug_list(&ctx, &day).await,
                DebugAction::Get { request_id } => saas::debug_get(&ctx, &request_id).await,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_policy_flags() {
        let args = ["iamcli", "query", "policy", "user", "admin", "develop_app", "--force"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Query {
                target:
                    QueryTarget::Policy {
                        subject_id,
                        action,
                        force,
                        no_debug,
                        ..
                    },
            } => {
                assert_eq!(subject_id, "admin");
                assert_eq!(action, "develop_app");
                assert!(force);
                assert!(!no_debug);
            }
            _ => panic!("expected query policy"),
        }
    }

    #[test]
    fn test_query_policy_debug_can_be_turned_off() {
        let args = ["iamcli", "query", "policy", "group", "7", "view", "--no-debug"];
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Query {
                target: QueryTarget::Policy { force, no_debug, .. },
            } => {
                assert!(no_debug);
                assert!(!force);
            }
            _ => panic!("expected query policy"),
        }
    }

    #[test]
    fn test_subject_type_is_restricted() {
        assert!(Cli::try_parse_from(["iamcli", "query", "subject", "department", "1"]).is_err());
    }

    #[test]
    fn test_cache_expression_requires_pks() {
        assert!(Cli::try_parse_from(["iamcli", "cache", "expression"]).is_err());
        assert!(Cli::try_parse_from(["iamcli", "cache", "expression", "1", "2"]).is_ok());
    }

    #[test]
    fn test_login_secret_is_optional() {
        let args = ["iamcli", "saas", "login", "iam.example.com", "bk_iam"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Saas { command: SaasCommand::Login(args) } => {
                assert_eq!(args.host, "iam.example.com");
                assert!(args.app_secret.is_none());
            }
            _ => panic!("expected saas login"),
        }
    }
}
