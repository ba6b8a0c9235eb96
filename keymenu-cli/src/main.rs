//! keymenu CLI - pick a KeePass entry with rofi and hand it to an output
//!
//! Databases are given with `-f` or `-k`, in the order they should be
//! unlocked. The selected entry's credentials go to the output backend
//! chosen with `-o`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use keymenu_core::database::is_kdbx;
use keymenu_core::{
    AppSettings, BackendError, BackendKind, BackendRegistry, CachePolicy, ConfigError,
    ConfigManager, Credential, KdbxLoader, KeymenuError, MenuSession, SecretCache,
    SessionOutcome, StoreError,
};

/// Select entries from KeePass databases using rofi
#[derive(Debug, Parser)]
#[command(name = "keymenu")]
#[command(author, version, about = "Select entries from KeePass databases using rofi", long_about = None)]
pub struct Cli {
    /// The KeePass database file
    #[arg(
        short = 'f',
        long = "filename",
        value_name = "KEEPASS_DB",
        action = ArgAction::Append,
        help_heading = "Database files"
    )]
    pub filename: Vec<PathBuf>,

    /// The KeePass database file followed by its key file
    #[arg(
        short = 'k',
        long = "filename-keyfile",
        value_names = ["KEEPASS_DB", "KEYFILE"],
        num_args = 2,
        action = ArgAction::Append,
        help_heading = "Database files"
    )]
    pub filename_keyfile: Vec<PathBuf>,

    /// Output the selected username and password with this backend
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Query database passwords using this backend
    #[arg(short = 'p', long = "pw-query", value_name = "NAME")]
    pub pw_query: Option<String>,

    /// Use the keyring for passwords if possible, and store them if absent
    #[arg(
        short = 'r',
        long = "key-ring",
        conflicts_with = "key_ring_delete",
        help_heading = "Keyring options"
    )]
    pub key_ring: bool,

    /// Remove the keyring record of every database given
    #[arg(short = 'd', long = "key-ring-delete", help_heading = "Keyring options")]
    pub key_ring_delete: bool,

    /// Number of lines each entry occupies in the filter
    #[arg(short = 'l', long = "lines-per-entry", value_name = "N", value_parser = parse_lines)]
    pub lines_per_entry: Option<usize>,

    /// Read settings from this file instead of ~/.config/keymenu/config.toml
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the registered backends and exit
    #[arg(long = "list-backends")]
    pub list_backends: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_lines(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(lines) => Ok(lines),
        Err(e) => Err(e.to_string()),
    }
}

/// One database as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseArg {
    pub path: PathBuf,
    pub keyfile: Option<PathBuf>,
}

impl Cli {
    /// Parses `args` and returns the databases in command-line order
    ///
    /// # Errors
    /// Returns the clap error for invalid arguments, `--help` and `--version`
    pub fn parse_ordered<I, T>(args: I) -> Result<(Self, Vec<DatabaseArg>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let cli = Self::from_arg_matches(&matches)?;
        let databases = cli.ordered_databases(&matches);
        Ok((cli, databases))
    }

    /// Interleaves `-f` and `-k` values by their position on the command line
    fn ordered_databases(&self, matches: &ArgMatches) -> Vec<DatabaseArg> {
        let plain = matches
            .indices_of("filename")
            .into_iter()
            .flatten()
            .zip(self.filename.iter())
            .map(|(index, path)| {
                (
                    index,
                    DatabaseArg {
                        path: path.clone(),
                        keyfile: None,
                    },
                )
            });

        // every -k occurrence carries two values; the first index marks it
        let with_keyfile = matches
            .indices_of("filename_keyfile")
            .into_iter()
            .flatten()
            .step_by(2)
            .zip(self.filename_keyfile.chunks_exact(2))
            .map(|(index, pair)| {
                (
                    index,
                    DatabaseArg {
                        path: pair[0].clone(),
                        keyfile: Some(pair[1].clone()),
                    },
                )
            });

        let mut ordered: Vec<_> = plain.chain(with_keyfile).collect();
        ordered.sort_by_key(|(index, _)| *index);
        ordered.into_iter().map(|(_, db)| db).collect()
    }

    /// The keyring policy selected by the flags and settings, if any
    fn cache_policy(&self, settings: &AppSettings) -> Option<CachePolicy> {
        if self.key_ring_delete {
            Some(CachePolicy::delete_only())
        } else if self.key_ring || settings.cache.enabled {
            Some(CachePolicy::read_write())
        } else {
            None
        }
    }
}

/// Exit codes for CLI operations
pub mod exit_codes {
    /// Successful execution
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Invalid arguments or unknown backend
    pub const USAGE_ERROR: i32 = 2;
    /// No password entered or no entry selected
    pub const USER_ABORT: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// Configuration file problems
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend registry problems
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Keyring connection problems
    #[error("Keyring error: {0}")]
    Keyring(#[from] StoreError),

    /// Failures of the menu run itself
    #[error(transparent)]
    Session(#[from] KeymenuError),

    /// The filter was closed without picking an entry
    #[error("No entry was selected. Quitting")]
    NothingSelected,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns the appropriate exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Backend(_) | Self::Session(KeymenuError::Backend(_)) => {
                exit_codes::USAGE_ERROR
            }
            Self::NothingSelected => exit_codes::USER_ABORT,
            Self::Session(e) if e.is_user_abort() => exit_codes::USER_ABORT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// True for aborts that get a plain one-line message
    const fn is_user_abort(&self) -> bool {
        self.exit_code() == exit_codes::USER_ABORT
    }
}

fn main() {
    let (cli, databases) = match Cli::parse_ordered(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };
    init_logging(cli.verbose);

    if let Err(e) = run(&cli, &databases) {
        if e.is_user_abort() {
            println!("{e}");
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

/// Initializes logging to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, databases: &[DatabaseArg]) -> Result<(), CliError> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if cli.lines_per_entry.is_some() {
        settings.filter.lines_per_entry = cli.lines_per_entry;
    }

    let registry = BackendRegistry::with_builtin(&settings)?;
    if cli.list_backends {
        println!("{registry}");
        return Ok(());
    }

    if databases.is_empty() {
        println!("Must give at least one database file path!");
        Cli::command().print_help()?;
        return Err(CliError::Usage("no database given (use -f or -k)".to_string()));
    }

    let output = pick_backend(
        &registry,
        BackendKind::Output,
        cli.output.as_deref(),
        settings.backends.output.as_deref(),
    )?;
    let query = pick_backend(
        &registry,
        BackendKind::Query,
        cli.pw_query.as_deref(),
        settings.backends.query.as_deref(),
    )?;
    let requests: Vec<Credential> = databases.iter().map(to_credential).collect();

    let loader = KdbxLoader::new();
    let cache = match cli.cache_policy(&settings) {
        Some(policy) => Some((SecretCache::secret_service(&settings.cache.collection)?, policy)),
        None => None,
    };

    let mut session = MenuSession::from_settings(&registry, &loader, &settings);
    if let Some((cache, policy)) = &cache {
        session = session.with_cache(cache, *policy);
    }

    match session.run(&query, &output, requests)? {
        SessionOutcome::Delivered { title, backend } => {
            debug!(%title, %backend, "Done");
            Ok(())
        }
        SessionOutcome::NothingSelected => Err(CliError::NothingSelected),
    }
}

fn load_settings(explicit: Option<&Path>) -> Result<AppSettings, CliError> {
    let settings = match explicit {
        Some(path) => ConfigManager::load_file(&expand_path(path))?,
        None => ConfigManager::new()?.load_settings()?,
    };
    Ok(settings)
}

/// Command line first, then the config file, then the first registered
fn pick_backend(
    registry: &BackendRegistry,
    kind: BackendKind,
    cli: Option<&str>,
    configured: Option<&str>,
) -> Result<String, CliError> {
    if let Some(name) = cli.or(configured) {
        return Ok(name.to_string());
    }
    registry
        .default_name(kind)
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::Usage(format!("no {} backend is registered", kind.namespace()))
        })
}

fn to_credential(db: &DatabaseArg) -> Credential {
    let path = absolute_path(&db.path);
    if !is_kdbx(&path) {
        warn!(path = %path.display(), "Database does not have a .kdbx extension");
    }
    let credential = Credential::new(path);
    match &db.keyfile {
        Some(keyfile) => credential.with_keyfile(absolute_path(keyfile)),
        None => credential,
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Expands `~` and makes the path absolute, resolving symlinks if it exists
fn absolute_path(path: &Path) -> PathBuf {
    let expanded = expand_path(path);
    match expanded.canonicalize() {
        Ok(resolved) => resolved,
        Err(_) => std::path::absolute(&expanded).unwrap_or(expanded),
    }
}
