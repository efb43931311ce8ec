//! Command implementations

mod read;
mod write;

use std::io::Write;

use vstore_client::{Client, ClientConfig, VcsClient};

use crate::cli::{Commands, GlobalArgs};
use crate::error::{CliError, Result};

pub use read::{run_get, run_has, run_info, run_log, run_ls, run_show};
pub use write::{report, run_branch, run_put, run_rm, run_tag};

/// Resolve the configuration from the optional file and command-line overrides.
pub fn resolve_config(args: &GlobalArgs) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(url) = &args.url {
        config.url = Some(url.clone());
    }
    Ok(config)
}

/// Build the configured client, bind it and select the requested ref.
pub fn open_client(args: &GlobalArgs) -> Result<Client> {
    let config = resolve_config(args)?;
    let url = config
        .url
        .clone()
        .ok_or_else(|| CliError::user("no repository URL; pass --url or set `url` in the config"))?;

    let mut client = Client::from_config(&config);
    client.init(&url)?;
    if let Some(reference) = args.reference.as_deref() {
        client.checkout(Some(reference))?;
    }
    Ok(client)
}

/// Run `command` against a bound client, publishing mutations before
/// reporting them.
pub fn execute<C: VcsClient>(
    client: &mut C,
    command: &Commands,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let change = match command {
        Commands::Info => return run_info(client, json, out),
        Commands::Get { path } => return run_get(client, path, out),
        Commands::Has { path, dir } => return run_has(client, path, *dir, json, out),
        Commands::Ls { path } => return run_ls(client, path, json, out),
        Commands::Log { path, limit } => return run_log(client, path, *limit, json, out),
        Commands::Show { revision, path } => {
            return run_show(client, revision, path.as_deref(), json, out);
        }
        Commands::Put {
            path,
            content,
            file,
            message,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content.clone(),
                (None, Some(file)) => std::fs::read_to_string(file)?,
                (None, None) => return Err(CliError::user("put needs --content or --file")),
            };
            run_put(client, path, &content, message)?
        }
        Commands::Rm { path, message } => run_rm(client, path, message)?,
        Commands::Branch { name, no_switch } => run_branch(client, name, !no_switch)?,
        Commands::Tag { name } => run_tag(client, name)?,
    };

    if command.publishes() {
        client.push()?;
        tracing::info!("Published changes");
    }
    report(&change, json, out)
}
