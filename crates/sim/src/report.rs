//! Journal and outcome printing.
use std::io::{self, Write};

use anyhow::Result;
use battle_runtime::Battle;

use crate::script::Verdict;

/// Writes the event journal followed by a short summary to stdout.
pub fn print(battle: &Battle, verdict: Verdict, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let journal = battle.journal();
    if json {
        let entries: Vec<_> = journal.iter().collect();
        serde_json::to_writer_pretty(&mut out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in journal.iter() {
        let indent = "  ".repeat(entry.depth);
        writeln!(out, "{:>6} {indent}{}", entry.sequence, entry.event)?;
    }
    let evicted = journal.total_recorded() - journal.len() as u64;
    if evicted > 0 {
        writeln!(out, "({evicted} earlier events evicted)")?;
    }

    writeln!(out)?;
    writeln!(out, "outcome: {verdict} after turn {}", battle.phase().turn)?;
    for combatant in battle.state().roster.iter() {
        writeln!(
            out,
            "  {:<12} {:>3}/{:<3} {:?}",
            combatant.name, combatant.hp, combatant.max_hp, combatant.side
        )?;
    }
    let mut hits: Vec<_> = battle.state().hits.iter().collect();
    hits.sort();
    for (attack, count) in hits {
        writeln!(out, "  {attack} hit {count}x")?;
    }
    if battle.dropped_events() > 0 {
        writeln!(out, "  {} events dropped at depth limit", battle.dropped_events())?;
    }
    Ok(())
}
