//! `psyche-chat` — talk to one NPC from the terminal.
//!
//! ```text
//! psyche-chat <config.toml> [machine.json]
//! ```
//!
//! Each stdin line is one turn. `/state` prints the NPC as JSON, `/quit`
//! (or EOF) exits.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::warn;

use psyche_core::{MachineDescription, PsycheConfig};
use psyche_npc::{DialogueError, DialogueOrchestrator, Npc, telemetry};

const USAGE: &str = "usage: psyche-chat <config.toml> [machine.json]";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = PathBuf::from(args.next().context(USAGE)?);

    let config = PsycheConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate().context("invalid configuration")?;
    telemetry::init_tracing(&config.general.log_level, config.general.log_json);

    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let machine_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => match &config.dialogue.machine_path {
            Some(path) => base.join(path),
            None => bail!("no decision machine: pass one or set dialogue.machine_path\n{USAGE}"),
        },
    };
    let description = MachineDescription::from_file(&machine_path)
        .with_context(|| format!("loading {}", machine_path.display()))?;

    let npc = Npc::from_config(&config, &description, &mut rand::thread_rng())?;
    let oracle = psyche_npc::config::oracle_from_config(&config.llm)?;
    let prompts = psyche_npc::config::prompts_from_config(&config.llm)?;
    let mut orchestrator = DialogueOrchestrator::new(npc, oracle).with_prompts(prompts);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_prompt(&mut stdout, orchestrator.npc())?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        match line {
            "" => {}
            "/quit" => break,
            "/state" => {
                let snapshot = serde_json::to_string_pretty(&orchestrator.npc().snapshot())?;
                writeln!(stdout, "{snapshot}")?;
            }
            utterance => match orchestrator.turn(utterance) {
                Ok(reply) => writeln!(stdout, "{reply}")?,
                Err(DialogueError::OracleUnavailable(err)) => {
                    warn!(error = %err, "Turn skipped");
                    writeln!(stdout, "(no reply: {err})")?;
                }
                Err(err) => return Err(err.into()),
            },
        }
        print_prompt(&mut stdout, orchestrator.npc())?;
    }
    Ok(())
}

fn print_prompt(out: &mut impl Write, npc: &Npc) -> io::Result<()> {
    write!(out, "[{}] > ", npc.state())?;
    out.flush()
}
