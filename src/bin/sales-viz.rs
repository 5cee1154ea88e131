use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sales_viz::config::{
    DEFAULT_ADDR, DEFAULT_DATA_PATH, DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH, RenderOptions,
    ServerConfig,
};
use sales_viz::models::{GroupBy, Measure};
use sales_viz::predict::{PredictionForm, PredictionInput, predict_total};
use sales_viz::{Dataset, Dispatcher, Visualization, explain, stats, storage, web};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "sales-viz",
    version,
    about = "Visualize, summarize & model supermarket sales data"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web application.
    Serve(ServeArgs),
    /// Render one visualization to a file (and optionally export its numbers).
    Render(RenderArgs),
    /// Print grouped summary statistics.
    Stats(StatsArgs),
    /// Predict the total of one sale with the linear model.
    Predict(PredictArgs),
    /// List the available visualizations.
    List,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Sales CSV to load.
    #[arg(long, env = "SALES_VIZ_DATA", default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,
}

#[derive(Args, Debug)]
struct CanvasArgs {
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// Number locale for labels (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
}

impl CanvasArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
            locale: self.locale.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Address to bind.
    #[arg(long, env = "SALES_VIZ_ADDR", default_value = DEFAULT_ADDR)]
    addr: SocketAddr,
    /// Page title.
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,
    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Visualization tag, e.g. `revenue` (see `list`).
    #[arg(short, long, value_parser = parse_kind)]
    kind: Visualization,
    /// Output image (.png or .svg).
    #[arg(short, long)]
    out: PathBuf,
    /// Also save the aggregated numbers (.csv or .json).
    #[arg(long)]
    export: Option<PathBuf>,
    /// Print the HTML explanation to stdout.
    #[arg(long, default_value_t = false)]
    explanation: bool,
    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Grouping dimension.
    #[arg(long, value_enum, default_value_t = GroupBy::ProductLine)]
    by: GroupBy,
    /// Numeric column to summarize.
    #[arg(long, value_enum, default_value_t = Measure::GrossIncome)]
    measure: Measure,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(long)]
    unit_price: String,
    #[arg(long)]
    quantity: String,
    #[arg(long)]
    tax_percent: String,
    #[arg(long)]
    gross_income: String,
}

fn parse_kind(s: &str) -> Result<Visualization, String> {
    Visualization::from_tag(s).ok_or_else(|| {
        let tags: Vec<&str> = Visualization::ALL.iter().map(|v| v.tag()).collect();
        format!("unknown visualization `{}`; expected one of: {}", s, tags.join(", "))
    })
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn load(args: &DataArgs) -> Result<Dataset> {
    Dataset::load(&args.data).with_context(|| format!("loading {}", args.data.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
        Command::Stats(args) => cmd_stats(args),
        Command::Predict(args) => cmd_predict(args),
        Command::List => {
            for v in Visualization::ALL {
                println!("{:<34} {}", v.tag(), v.title());
            }
            Ok(())
        }
    }
}

fn cmd_serve(args: ServeArgs) -> Result<()> {
    // Loaded before binding so a bad file never leaves a half-working server.
    let dataset = Arc::new(load(&args.data)?);
    let config = ServerConfig {
        data_path: args.data.data.clone(),
        addr: args.addr,
        title: args.title,
        render: args.canvas.options(),
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(web::serve(dataset, &config))
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let dataset = Arc::new(load(&args.data)?);
    let dispatcher = Dispatcher::new(dataset, args.canvas.options());

    dispatcher.render_to_file(args.kind, &args.out)?;
    eprintln!("Wrote {} to {}", args.kind, args.out.display());

    if args.export.is_some() || args.explanation {
        let agg = dispatcher.aggregate(args.kind);
        if let Some(path) = args.export.as_ref() {
            storage::save(&agg, path)?;
            eprintln!("Saved {} rows to {}", agg.to_table().rows.len(), path.display());
        }
        if args.explanation {
            println!("{}", explain::explain(args.kind, &agg, dispatcher.options()));
        }
    }
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let dataset = load(&args.data)?;
    let summaries = stats::grouped_summary(dataset.records(), args.by, args.measure);
    for s in summaries {
        println!(
            "{} • {}  count={} missing={}  min={} max={} mean={} median={}",
            s.key,
            args.measure.column_name(),
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn cmd_predict(args: PredictArgs) -> Result<()> {
    let form = PredictionForm {
        unit_price: Some(args.unit_price),
        quantity: Some(args.quantity),
        tax_percent: Some(args.tax_percent),
        gross_income: Some(args.gross_income),
    };
    let input = PredictionInput::from_form(&form)?;
    let dataset = load(&args.data)?;
    let p = predict_total(&dataset, &input)?;
    println!("predicted total: {}", fmt_opt(Some(p.predicted_total)));
    println!(
        "mse: {} ({} train / {} test rows)",
        fmt_opt(Some(p.mse)),
        p.train_rows,
        p.test_rows
    );
    Ok(())
}
