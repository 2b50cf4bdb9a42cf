use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use mwbot_core::merge::Merge;
use mwbot_core::{BotOptions, MwBot, RequestOptions, UploadSource, load_options};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mwbot", version, about = "MediaWiki bot client")]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", default_value = "mwbot.toml")]
    config: PathBuf,
    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "API endpoint, e.g. https://en.wikipedia.org/w/api.php"
    )]
    api_url: Option<String>,
    #[arg(long, global = true)]
    username: Option<String>,
    #[arg(long, global = true, env = "MWBOT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, global = true, value_name = "TEXT", help = "Default edit summary")]
    summary: Option<String>,
    #[arg(long, global = true, value_name = "MS", help = "Per-request timeout in milliseconds")]
    timeout_ms: Option<u64>,
    #[arg(short, long, global = true, help = "Log session progress")]
    verbose: bool,
    #[arg(long, global = true, help = "Print request counters after the command")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Log in and print the session state")]
    Login,
    #[command(about = "Print general site info")]
    Siteinfo,
    #[command(about = "Log in and print a fresh token")]
    Token(TokenArgs),
    Read(ReadArgs),
    Edit(EditArgs),
    Delete(ReasonArgs),
    Move(MoveArgs),
    Protect(ReasonArgs),
    Upload(UploadArgs),
    #[command(about = "Semantic MediaWiki ask query")]
    Ask(AskArgs),
    Sparql(SparqlArgs),
}

#[derive(Debug, Args)]
struct TokenArgs {
    #[arg(long, help = "Fetch an account creation token instead of a CSRF token")]
    create_account: bool,
}

#[derive(Debug, Args)]
struct ReadArgs {
    title: String,
    #[arg(long, default_value = "content", help = "rvprop list")]
    props: String,
    #[arg(long, help = "Read by page id instead of title")]
    page_id: bool,
    #[arg(long, help = "Do not follow redirects")]
    no_redirect: bool,
}

#[derive(Debug, Args)]
struct EditArgs {
    title: String,
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    #[arg(long, help = "Fail if the page already exists", conflicts_with = "update")]
    create: bool,
    #[arg(long, help = "Fail if the page does not exist")]
    update: bool,
}

#[derive(Debug, Args)]
struct ReasonArgs {
    title: String,
    #[arg(long)]
    reason: Option<String>,
}

#[derive(Debug, Args)]
struct MoveArgs {
    from: String,
    to: String,
    #[arg(long)]
    reason: Option<String>,
}

#[derive(Debug, Args)]
struct UploadArgs {
    path: PathBuf,
    #[arg(long, help = "Remote file name (defaults to the local base name)")]
    title: Option<String>,
    #[arg(long, default_value = "")]
    comment: String,
    #[arg(long, help = "Replace an existing file")]
    overwrite: bool,
}

#[derive(Debug, Args)]
struct AskArgs {
    query: String,
}

#[derive(Debug, Args)]
struct SparqlArgs {
    query: String,
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.as_ref() else {
        let mut command = Cli::command();
        command.print_help()?;
        println!();
        return Ok(());
    };

    let bot = build_bot(&cli)?;
    let output = match command {
        Commands::Login => serde_json::to_value(login(&bot)?)?,
        Commands::Siteinfo => serde_json::to_value(bot.get_site_info()?)?,
        Commands::Token(args) => run_token(&bot, args)?,
        Commands::Read(args) => run_read(&bot, args)?,
        Commands::Edit(args) => run_edit(&bot, args)?,
        Commands::Delete(args) => {
            login(&bot)?;
            bot.delete(&args.title, args.reason.as_deref(), None)?
        }
        Commands::Move(args) => {
            login(&bot)?;
            bot.move_page(&args.from, &args.to, args.reason.as_deref(), None)?
        }
        Commands::Protect(args) => {
            login(&bot)?;
            bot.protect(&args.title, args.reason.as_deref(), None)?
        }
        Commands::Upload(args) => run_upload(&bot, args)?,
        Commands::Ask(args) => bot.ask_query(&args.query, None, None)?,
        Commands::Sparql(args) => {
            bot.sparql_query(&args.query, args.endpoint.as_deref(), None)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    if cli.diagnostics {
        println!(
            "\n[diagnostics]\n{}",
            serde_json::to_string_pretty(&bot.counter())?
        );
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults < config file < `MWBOT_*` environment < flags.
fn build_bot(cli: &Cli) -> Result<MwBot> {
    let file = load_options(&cli.config)?;
    let flags = BotOptions {
        api_url: cli.api_url.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        default_summary: cli.summary.clone(),
        verbose: cli.verbose.then_some(true),
        ..BotOptions::default()
    };
    let options = file.merge_all([BotOptions::from_env(), flags]);
    tracing::debug!(
        config = %cli.config.display(),
        api_url = ?options.api_url,
        user = ?options.username,
        "resolved bot options"
    );
    if options.api_url.is_none() {
        bail!(
            "no API URL configured; pass --api-url, set MWBOT_API_URL, \
             or add api_url to [bot] in {}",
            cli.config.display()
        );
    }

    let mut request_options = RequestOptions::default();
    if let Some(timeout_ms) = cli.timeout_ms {
        request_options = request_options.with_timeout(Duration::from_millis(timeout_ms));
    }
    MwBot::new(options, request_options).context("failed to build MediaWiki client")
}

fn login(bot: &MwBot) -> Result<mwbot_core::SessionState> {
    bot.login(BotOptions::default()).context("MediaWiki login failed")
}

fn run_token(bot: &MwBot, args: &TokenArgs) -> Result<Value> {
    let token = if args.create_account {
        bot.login_then_account_creation_token(BotOptions::default())?
    } else {
        bot.login_then_edit_token(BotOptions::default())?
    };
    Ok(Value::String(token))
}

fn run_read(bot: &MwBot, args: &ReadArgs) -> Result<Value> {
    // Version detection happens at login; anonymous reads go without rvslots.
    if bot.options().username.is_some() {
        login(bot)?;
    }
    let redirect = !args.no_redirect;
    if args.page_id {
        let page_id: u64 = args
            .title
            .parse()
            .with_context(|| format!("invalid page id: {}", args.title))?;
        Ok(bot.read_with_props_from_id(page_id, &args.props, redirect, None)?)
    } else {
        Ok(bot.read_with_props(&args.title, &args.props, redirect, None)?)
    }
}

fn run_edit(bot: &MwBot, args: &EditArgs) -> Result<Value> {
    let content = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("edit requires --text or --file"),
    };
    login(bot)?;
    let response = if args.create {
        bot.create(&args.title, &content, None, None)?
    } else if args.update {
        bot.update(&args.title, &content, None, None)?
    } else {
        bot.edit(&args.title, &content, None, None)?
    };
    Ok(response)
}

fn run_upload(bot: &MwBot, args: &UploadArgs) -> Result<Value> {
    login(bot)?;
    let source = UploadSource::Path(args.path.clone());
    let response = if args.overwrite {
        bot.upload_overwrite(args.title.as_deref(), source, &args.comment, None, None)?
    } else {
        bot.upload(args.title.as_deref(), source, &args.comment, None, None)?
    };
    Ok(response)
}
