use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};

use gateway_console::api::{ControlApi, HttpControlClient};
use gateway_console::config::{ConnectionSettings, console_home, load_user_config};
use gateway_console::draft::{Confirmation, ProviderDraft, SettingsForm, open_draft};
use gateway_console::model::{GatewayConfig, ProviderKind};
use gateway_console::modelmap::{advertised_models, build_picker};
use gateway_console::session::ensure_session;
use gateway_console::store::ConfigStore;
use gateway_console::verify::{VerificationService, model_candidates};
use gateway_console::{ConsoleError, logging};

#[derive(Parser)]
#[command(
    name = "gateway-console",
    version,
    about = "Manage a model gateway's providers, model mappings and settings"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Control API root (default http://127.0.0.1:3029).
    #[arg(long, global = true, env = "GATEWAY_CONSOLE_URL")]
    url: Option<String>,

    /// Admin password, used only when the gateway asks for a login.
    #[arg(long, global = true, env = "GATEWAY_CONSOLE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Console home holding config.toml and logs (default ~/.gateway-console).
    #[arg(long, global = true, env = "GATEWAY_CONSOLE_HOME")]
    home: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Provider and model counts, port, and inbound auth state.
    Status,
    /// List configured providers and their mappings.
    Providers,
    /// Print the full configuration as JSON.
    Show,
    /// Add a provider.
    Add(ProviderArgs),
    /// Edit the provider with the given id.
    Edit {
        #[arg(value_name = "ID")]
        target: String,
        #[command(flatten)]
        fields: ProviderArgs,
        /// Drop existing mappings before applying --map.
        #[arg(long)]
        clear_maps: bool,
    },
    /// Delete a provider.
    Delete {
        #[arg(value_name = "ID")]
        target: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Check that a provider's upstream is reachable.
    Test {
        #[arg(value_name = "ID")]
        target: String,
    },
    /// List the models a provider's upstream offers.
    Models {
        #[arg(value_name = "ID")]
        target: String,
        /// Map every listed model that is not mapped yet (name -> same name) and save.
        #[arg(long)]
        add: bool,
    },
    /// Send a one-token request for a mapped model (all mapped models if none given).
    TestModel {
        #[arg(value_name = "ID")]
        target: String,
        model: Option<String>,
    },
    /// Update gateway-wide settings.
    Settings {
        #[arg(long)]
        port: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        admin_password: Option<String>,
    },
}

#[derive(Args)]
struct ProviderArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "type")]
    kind: Option<ProviderKind>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    /// Routing weight; anything unparseable becomes 1.
    #[arg(long)]
    weight: Option<String>,
    /// Request timeout in seconds; anything unparseable becomes 300.
    #[arg(long)]
    timeout: Option<String>,
    /// Model mapping, repeatable.
    #[arg(long = "map", value_name = "FROM=TO[,disabled]")]
    maps: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let home = console_home(cli.home.as_deref());
    let (user_cfg, cfg_error) = match load_user_config(&home) {
        Ok(cfg) => (cfg, None),
        Err(e) => (None, Some(e)),
    };
    logging::init_tracing(&home, user_cfg.as_ref());
    if let Some(e) = cfg_error {
        tracing::warn!("ignoring unreadable console config in {}: {:#}", home.display(), e);
    }

    let conn = ConnectionSettings::resolve(cli.url, cli.password, user_cfg.as_ref());
    match run(cli.command, conn).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let unauthenticated = e
                .downcast_ref::<ConsoleError>()
                .is_some_and(ConsoleError::is_unauthenticated);
            if unauthenticated {
                eprintln!("session expired or login required");
                eprintln!("pass --password or set GATEWAY_CONSOLE_PASSWORD to log in");
                ExitCode::from(2)
            } else {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(command: Command, conn: ConnectionSettings) -> anyhow::Result<()> {
    tracing::info!("control api: {}", conn.url);
    let api: Arc<dyn ControlApi> = Arc::new(HttpControlClient::new(&conn.url, conn.timeout)?);
    ensure_session(api.as_ref(), conn.password.as_deref()).await?;

    let mut store = ConfigStore::new(api.clone());
    store.load().await.context("loading gateway config")?;
    let verifier = VerificationService::new(api);

    match command {
        Command::Status => print_status(store.config()),
        Command::Providers => print_providers(store.config()),
        Command::Show => println!("{}", serde_json::to_string_pretty(store.config())?),
        Command::Add(fields) => {
            let mut draft = ProviderDraft::new();
            apply_fields(&mut draft, &fields)?;
            store.save_draft(&draft).await.context("saving provider")?;
            println!("added provider '{}'", draft.to_provider().id);
        }
        Command::Edit {
            target,
            fields,
            clear_maps,
        } => {
            let index = index_of(store.config(), &target)?;
            let mut draft = open_draft(store.config(), Some(index))?;
            if clear_maps {
                draft.provider.models.clear();
            }
            apply_fields(&mut draft, &fields)?;
            store.save_draft(&draft).await.context("saving provider")?;
            println!("updated provider '{}'", draft.to_provider().id);
        }
        Command::Delete { target, yes } => {
            let index = index_of(store.config(), &target)?;
            let confirmation = if yes {
                Confirmation::Granted
            } else {
                Confirmation::Declined
            };
            if store.delete_provider(index, confirmation).await? {
                println!("deleted provider '{target}'");
            } else {
                println!("provider '{target}' kept; pass --yes to delete it");
            }
        }
        Command::Test { target } => {
            let draft = open_draft(store.config(), Some(index_of(store.config(), &target)?))?;
            let r = verifier.test_connectivity(&draft).await?;
            if r.ok {
                println!("ok: connected (HTTP {})", fmt_status(r.status));
            } else {
                println!(
                    "failed: HTTP {}\n{}",
                    fmt_status(r.status),
                    r.error.unwrap_or_default()
                );
            }
        }
        Command::Models { target, add } => {
            let mut draft = open_draft(store.config(), Some(index_of(store.config(), &target)?))?;
            let listing = verifier.list_models(&draft).await?;
            if let Some(error) = listing.error {
                return Err(anyhow!("listing models failed: {error}"));
            }
            if listing.models.is_empty() {
                println!("no models found");
                return Ok(());
            }
            for entry in build_picker(&listing.models, &draft.provider.models) {
                let mark = if entry.preselected { "x" } else { " " };
                println!("[{mark}] {}", entry.name);
            }
            if add {
                let added = draft.add_picked(&listing.models);
                if added > 0 {
                    store.save_draft(&draft).await.context("saving mappings")?;
                }
                println!("added {added} mapping(s)");
            }
        }
        Command::TestModel { target, model } => {
            let provider = store.config().providers[index_of(store.config(), &target)?].clone();
            let models = match model {
                Some(m) => vec![m],
                None => model_candidates(&provider)?,
            };
            for m in models {
                let r = verifier.test_model(&provider, &m).await?;
                if r.ok {
                    let reply = r.reply.map(|s| format!(" reply: {s}")).unwrap_or_default();
                    println!("ok   {m} (HTTP {}, {}ms){reply}", fmt_status(r.status), r.latency_ms);
                } else {
                    println!(
                        "fail {m} (HTTP {}, {}ms) {}",
                        fmt_status(r.status),
                        r.latency_ms,
                        r.error.unwrap_or_default()
                    );
                }
            }
        }
        Command::Settings {
            port,
            api_key,
            admin_password,
        } => {
            let mut form = SettingsForm::from_config(store.config());
            if let Some(v) = port {
                form.port = v;
            }
            if let Some(v) = api_key {
                form.api_key = v;
            }
            if let Some(v) = admin_password {
                form.admin_password = v;
            }
            let saved = store.save_settings(&form).await.context("saving settings")?;
            println!("settings saved (port {})", saved.port);
        }
    }
    Ok(())
}

fn index_of(config: &GatewayConfig, id: &str) -> anyhow::Result<usize> {
    config
        .provider_index(id)
        .ok_or_else(|| anyhow!("no provider with id '{id}'"))
}

fn apply_fields(draft: &mut ProviderDraft, fields: &ProviderArgs) -> anyhow::Result<()> {
    let p = &mut draft.provider;
    if let Some(v) = &fields.id {
        p.id = v.clone();
    }
    if let Some(v) = &fields.name {
        p.name = v.clone();
    }
    if let Some(v) = &fields.base_url {
        p.base_url = v.clone();
    }
    if let Some(v) = &fields.api_key {
        p.api_key = v.clone();
    }
    if let Some(kind) = fields.kind {
        draft.set_kind(kind);
    }
    if let Some(v) = &fields.weight {
        draft.set_weight(v);
    }
    if let Some(v) = &fields.timeout {
        draft.set_timeout(v);
    }
    for spec in &fields.maps {
        let (from, to, enabled) = parse_map_spec(spec)?;
        draft.add_mapping(from, to, enabled);
    }
    Ok(())
}

/// `FROM=TO` or `FROM=TO,disabled`.
fn parse_map_spec(spec: &str) -> anyhow::Result<(String, String, bool)> {
    let (from, rest) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid --map '{spec}': expected FROM=TO[,disabled]"))?;
    let (to, enabled) = match rest.rsplit_once(',') {
        Some((to, flag)) if flag.trim().eq_ignore_ascii_case("disabled") => (to, false),
        Some((to, flag)) if flag.trim().eq_ignore_ascii_case("enabled") => (to, true),
        _ => (rest, true),
    };
    Ok((from.trim().to_string(), to.trim().to_string(), enabled))
}

fn fmt_status(status: Option<u16>) -> String {
    status.map_or_else(|| "N/A".to_string(), |s| s.to_string())
}

fn print_status(config: &GatewayConfig) {
    let s = config.summary();
    println!("providers: {}", s.provider_count);
    println!("models:    {}", s.model_count);
    println!("port:      {}", s.port);
    println!(
        "auth:      {}",
        if s.auth_enabled { "enabled" } else { "disabled" }
    );
    let advertised = advertised_models(&config.providers);
    if !advertised.is_empty() {
        println!("serving:   {}", advertised.join(", "));
    }
}

fn print_providers(config: &GatewayConfig) {
    if config.providers.is_empty() {
        println!("no providers configured");
        return;
    }
    for p in &config.providers {
        println!(
            "{}  {}  [{}]  {}  weight={} timeout={}s",
            p.id,
            p.label(),
            p.kind,
            p.base_url,
            p.weight,
            p.timeout
        );
        for m in &p.models {
            let state = if m.enabled { "" } else { " (disabled)" };
            println!("    {} -> {}{}", m.from, m.to, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_specs() {
        assert_eq!(
            parse_map_spec("gpt-4o=gpt-4o-mini").unwrap(),
            ("gpt-4o".into(), "gpt-4o-mini".into(), true)
        );
        assert_eq!(
            parse_map_spec("sonnet=claude-sonnet-4-5,disabled").unwrap(),
            ("sonnet".into(), "claude-sonnet-4-5".into(), false)
        );
        assert!(parse_map_spec("no-arrow").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
