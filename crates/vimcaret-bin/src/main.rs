//! vimcaret entrypoint.
//!
//! Loads a text file into a session, replays a key script through the
//! translator and dispatcher, and prints the resulting mode and cursors.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_actions::{KeyTranslator, Translation, dispatch};
use core_config::load_from;
use core_events::parse_keys;
use core_state::{DEFAULT_VIEWPORT_LINES, Session};
use core_text::{Buffer, TextBuffer};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "vimcaret", version, about = "Replay Vim caret keys against a text file")]
struct Args {
    /// UTF-8 text file to load.
    pub path: PathBuf,
    /// Configuration file path (overrides discovery of `vimcaret.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Replaces the `keymodel` flag list, e.g. `startsel,stopsel`.
    #[arg(long = "keymodel", value_name = "LIST")]
    pub keymodel: Option<String>,
    /// Replaces the `selectmode` flag list, e.g. `key`.
    #[arg(long = "selectmode", value_name = "LIST")]
    pub selectmode: Option<String>,
    /// Option assignment applied last, e.g. `keymodel+=startsel`.
    #[arg(long = "set", value_name = "ASSIGNMENT")]
    pub set: Vec<String>,
    /// Initial caret as `LINE:COL` (0-based) or a char offset. Repeatable; the
    /// first one is primary.
    #[arg(long = "cursor", value_name = "POS")]
    pub cursors: Vec<String>,
    /// Keys in Vim notation, e.g. `v$<S-Home>`.
    #[arg(long = "keys", default_value = "")]
    pub keys: String,
    /// Viewport height used by page motions.
    #[arg(long = "viewport", default_value_t = DEFAULT_VIEWPORT_LINES)]
    pub viewport: usize,
    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self, log_file: Option<&Path>) -> Result<()> {
        let filter = tracing_subscriber::EnvFilter::from_default_env();
        let Some(path) = log_file else {
            // Global subscriber may already be installed.
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            return Ok(());
        };
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .with_context(|| format!("log path `{}` has no file name", path.display()))?;
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Resolve `LINE:COL` or a bare char offset. Columns past the line end clamp
/// to it.
fn parse_position(buffer: &Buffer, pos: &str) -> Result<usize> {
    let Some((line, col)) = pos.split_once(':') else {
        return pos
            .trim()
            .parse::<usize>()
            .with_context(|| format!("invalid cursor offset `{pos}`"));
    };
    let line: usize = line
        .trim()
        .parse()
        .with_context(|| format!("invalid cursor line in `{pos}`"))?;
    let col: usize = col
        .trim()
        .parse()
        .with_context(|| format!("invalid cursor column in `{pos}`"))?;
    if line >= buffer.line_count() {
        bail!("cursor line {line} past last line {}", buffer.line_count().saturating_sub(1));
    }
    Ok(buffer.line_start(line) + col.min(buffer.line_len(line)))
}

fn load_session(args: &Args) -> Result<Session> {
    let content = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading `{}`", args.path.display()))?;
    let text = content.replace("\r\n", "\n");
    let name = args
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    debug!(target: "io", file = %args.path.display(), size_bytes = content.len(), "file_read_ok");
    let buffer = Buffer::from_str(name, &text)?;

    let mut options = load_from(args.config.clone())?.options;
    let lists = [("keymodel", &args.keymodel), ("selectmode", &args.selectmode)];
    let assignments = lists
        .into_iter()
        .filter_map(|(name, list)| list.as_ref().map(|l| format!("{name}={l}")))
        .chain(args.set.iter().cloned());
    for assignment in assignments {
        options
            .set(&assignment)
            .with_context(|| format!("invalid option `{assignment}`"))?;
    }

    let offsets = args
        .cursors
        .iter()
        .map(|p| parse_position(&buffer, p))
        .collect::<Result<Vec<_>>>()?;
    let mut session = Session::new(buffer, options);
    session.viewport_lines = args.viewport.max(1);
    session.place_cursors(&offsets);
    info!(
        target: "runtime.startup",
        buffer = name,
        cursors = session.cursors.len(),
        keymodel = %options.keymodel,
        selectmode = %options.selectmode,
        "bootstrap_complete"
    );
    Ok(session)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ReplayStats {
    keys: usize,
    commands: usize,
    unmapped: usize,
    failed: usize,
}

/// Feed `keys` through a fresh translator, dispatching every command.
fn replay(session: &mut Session, keys: &str) -> Result<ReplayStats> {
    let tokens = parse_keys(keys).with_context(|| format!("invalid key sequence `{keys}`"))?;
    let mut translator = KeyTranslator::new();
    let mut stats = ReplayStats {
        keys: tokens.len(),
        ..ReplayStats::default()
    };
    for key in &tokens {
        match translator.translate(session.current_mode().0, key) {
            Translation::Command(cmd) => {
                stats.commands += 1;
                if !dispatch(&cmd, session).success {
                    stats.failed += 1;
                    warn!(target: "runtime.replay", key = %key, action = ?cmd.action(), "command_failed");
                }
            }
            Translation::Pending => {}
            Translation::Unmapped => {
                stats.unmapped += 1;
                debug!(target: "runtime.replay", key = %key, mode = ?session.current_mode(), "unmapped_key");
            }
        }
    }
    if translator.is_pending() {
        debug!(target: "runtime.replay", "trailing_pending_keys");
    }
    Ok(stats)
}

/// Mode line followed by one line per cursor in offset order.
fn report(session: &Session) -> String {
    let buffer = &session.buffer;
    let (mode, sub) = session.current_mode();
    let mut out = format!("mode: {mode:?} {sub:?}\n");
    let primary = session.cursors.primary_id();
    let mut cursors: Vec<_> = session.cursors.iter().collect();
    cursors.sort_by_key(|c| c.offset);
    for c in cursors {
        let line = buffer.line_of(c.offset);
        let col = buffer.column_of(c.offset);
        let marker = if c.id() == primary { '*' } else { ' ' };
        let _ = write!(out, "{marker} {line}:{col} offset={}", c.offset);
        if let Some(anchor) = c.anchor {
            let _ = write!(out, " anchor={anchor}");
        }
        if let Some(sel) = c.selection {
            let _ = write!(out, " selection={}..{}", sel.start(), sel.end());
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging(args.log_file.as_deref())?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let mut session = load_session(&args)?;
    let stats = replay(&mut session, &args.keys)?;
    info!(
        target: "runtime",
        keys = stats.keys,
        commands = stats.commands,
        unmapped = stats.unmapped,
        failed = stats.failed,
        "replay_complete"
    );
    print!("{}", report(&session));
    Ok(())
}
