use clap::Parser;
use orion_ai_host::config::{global_dir, log_source, AiConfig};
use orion_ai_host::core::{init_logging, AiError, AiResult};
use orion_ai_host::interface::{GameSnapshot, LocalClient, SharedInterface};
use orion_ai_host::scripting::AiController;
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game snapshot (JSON) the AI plays against
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Config file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the AI script module
    #[arg(long)]
    ai_dir: Option<PathBuf>,

    /// Number of turns to run
    #[arg(short, long, default_value_t = 1)]
    turns: u32,

    /// Exit with an error if any startup step fails
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("orion-ai: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> AiResult<()> {
    // 配置决定日志设置，来源在日志初始化之后再记录
    let (mut config, source) = match &args.config {
        Some(path) => (AiConfig::from_file(path)?, Some(path.clone())),
        None => AiConfig::load_first(&AiConfig::candidate_paths()),
    };
    config.apply_env_overrides();
    if let Some(dir) = args.ai_dir {
        config.ai_dir = dir;
    }
    config.strict_startup |= args.strict;
    config.validate()?;
    init_logging(&config.logging);
    log_source(source.as_deref());

    let snapshot_path = args
        .snapshot
        .unwrap_or_else(|| global_dir().join("default").join("universe.json"));
    tracing::info!(target: "ai", "Loading snapshot {}", snapshot_path.display());
    let client = Rc::new(RefCell::new(LocalClient::new(GameSnapshot::from_json_file(
        &snapshot_path,
    )?)));
    let interface: SharedInterface = client.clone();

    let mut controller = if config.strict_startup {
        AiController::try_new(config, interface)?
    } else {
        AiController::new(config, interface)
    };

    for _ in 0..args.turns {
        let outcome = controller.generate_orders();
        {
            let client = client.borrow();
            let report = serde_json::json!({
                "turn": client.snapshot().current_turn,
                "outcome": format!("{:?}", outcome),
                "done_turn": client.done_turn_count(),
                "orders": client.orders(),
                "chat": client.outbox(),
            });
            let text = serde_json::to_string_pretty(&report)
                .map_err(|e| AiError::Snapshot(e.to_string()))?;
            println!("{}", text);
        }
        client.borrow_mut().advance_turn();
    }

    controller.shutdown();
    Ok(())
}
