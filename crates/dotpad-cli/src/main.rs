mod compiler;
mod session;

use compiler::DotCommand;
use dotpad::host::Host;
use dotpad::raster::ResvgRasterizer;
use dotpad::{
    Artifact, Controls, EngineId, ErrorKind, FormatId, Playground, PlaygroundConfig, RenderStatus,
    StartupLoad,
};
use futures::executor::block_on;
use session::{Address, Buffer, HttpFetcher};
use std::io::{IsTerminal, Read};
use std::rc::Rc;
use url::Url;

const DEFAULT_BASE: &str = "https://dreampuf.github.io/GraphvizOnline/";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Url(url::ParseError),
    Render(String),
    NoSource,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Url(err) => write!(f, "invalid URL: {err}"),
            CliError::Render(msg) => write!(f, "{msg}"),
            CliError::NoSource => write!(f, "URL carries no graph source"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<url::ParseError> for CliError {
    fn from(value: url::ParseError) -> Self {
        Self::Url(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Share,
    Open,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    controls: Controls,
    scale: Option<f32>,
    dot: Option<String>,
    out: Option<String>,
    base: Option<String>,
}

fn usage() -> &'static str {
    "dotpad-cli\n\
\n\
USAGE:\n\
  dotpad-cli [render] [--engine <engine>] [--format svg|png|json|xdot|plain|ps] [--raw] [--scale <n>] [--dot <program>] [--out <path>] [<path>|-]\n\
  dotpad-cli share [--engine <engine>] [--format <format>] [--base <url>] [<path>|-]\n\
  dotpad-cli open <url>\n\
\n\
ENGINES:\n\
  circo, dot, fdp, sfdp, neato, osage, patchwork, twopi\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - render runs Graphviz (`dot` on PATH unless --dot is given) and prints SVG or text to stdout;\n\
    use --out to write a file. --raw prints the SVG markup untouched.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
  - share prints a playground link carrying the compressed source, engine and format.\n\
  - open prints the source a playground link points at (raw, compressed, url= or fragment).\n\
  - Set RUST_LOG (e.g. RUST_LOG=dotpad=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "share" => args.command = Command::Share,
            "open" => args.command = Command::Open,
            "--raw" => args.controls.raw = true,
            "--engine" => {
                let Some(engine) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.controls.engine = engine
                    .parse::<EngineId>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.controls.format = fmt
                    .parse::<FormatId>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.scale = Some(scale);
            }
            "--dot" => {
                let Some(dot) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.dot = Some(dot.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--base" => {
                let Some(base) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.base = Some(base.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Open) && args.input.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
        .from_env_lossy();
    // A second install (e.g. under a test harness) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

fn host(text: String, args: &Args, location: Url) -> Host {
    let compiler = DotCommand::new(args.dot.as_deref().unwrap_or("dot"));
    Host::new(
        Rc::new(Buffer::new(text)),
        Rc::new(compiler),
        Rc::new(Address::new(location)),
    )
    .with_rasterizer(Rc::new(ResvgRasterizer {
        background: Some("white".to_string()),
    }))
}

fn playground(host: Host, args: &Args) -> Playground {
    let mut config = PlaygroundConfig::from_env();
    if let Some(scale) = args.scale {
        config = config.with_pixel_ratio(scale);
    }
    Playground::new(host, config)
}

fn panel_error(pg: &Playground, kind: ErrorKind) -> CliError {
    CliError::Render(pg.panel().text().unwrap_or_else(|| kind.title().to_string()))
}

fn base_url(args: &Args) -> Result<Url, CliError> {
    Ok(Url::parse(args.base.as_deref().unwrap_or(DEFAULT_BASE))?)
}

fn run_render(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let pg = playground(host(text, args, base_url(args)?), args);

    match block_on(pg.set_controls(args.controls)) {
        RenderStatus::Presented(_) => {}
        RenderStatus::Failed(kind) => return Err(panel_error(&pg, kind)),
        RenderStatus::Stale => return Err(CliError::Render("render was superseded".to_string())),
    }

    match pg.artifact() {
        Some(Artifact::Vector(doc)) => write_text(&doc.to_markup(), args.out.as_deref()),
        Some(Artifact::Text(text)) => write_text(&text, args.out.as_deref()),
        Some(Artifact::Raster(raster)) => {
            let out = args
                .out
                .as_deref()
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| default_raster_out_path(args.input.as_deref(), "png"));
            std::fs::write(&out, &raster.image.png)?;
            tracing::info!(path = %out.display(), "wrote PNG");
            Ok(())
        }
        None => Err(CliError::Render("nothing was rendered".to_string())),
    }
}

fn run_share(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let pg = playground(host(text, args, base_url(args)?), args);
    pg.select_controls(args.controls);

    match block_on(pg.share()) {
        Some(link) => {
            println!("{link}");
            Ok(())
        }
        None => Err(panel_error(&pg, ErrorKind::Compression)),
    }
}

fn run_open(args: &Args) -> Result<(), CliError> {
    let Some(link) = args.input.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let host = host(String::new(), args, Url::parse(link)?)
        .with_fetcher(Rc::new(HttpFetcher::default()));
    let pg = playground(host, args);

    // Parameter problems are logged as warnings; the source itself must load.
    match block_on(pg.load_startup()) {
        StartupLoad::Loaded { .. } => {}
        StartupLoad::Existing => return Err(CliError::NoSource),
        StartupLoad::Failed(failure) => return Err(panel_error(&pg, failure.kind)),
    }
    let controls = pg.controls();
    tracing::info!(
        engine = %controls.engine,
        format = %controls.format,
        presentation = pg.presentation_mode(),
        "link opened"
    );
    print!("{}", pg.host().text.text());
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Render => run_render(&args),
        Command::Share => run_share(&args),
        Command::Open => run_open(&args),
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
