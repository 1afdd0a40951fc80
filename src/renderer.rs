// src/renderer.rs

use crate::model::{AnalysisResult, EntityDescriptor};
use std::io::{self, Write};

/// Writes the human-readable change report
pub fn render_report<W: Write>(results: &AnalysisResult, out: &mut W) -> io::Result<()> {
    if results.is_empty() {
        writeln!(out, "No relevant code changes detected.")?;
        return Ok(());
    }

    for change in results.values() {
        writeln!(out)?;
        writeln!(out, "--- Changes in {} [{}] ---", change.path, change.status.code())?;

        if !change.added.is_empty() {
            writeln!(out, "  [+] Added:")?;
            for entity in &change.added {
                writeln!(out, "      - {}", with_span(entity))?;
            }
        }

        if !change.removed.is_empty() {
            writeln!(out, "  [-] Removed:")?;
            for entity in &change.removed {
                writeln!(out, "      - {}: {}", entity.kind, entity.name)?;
            }
        }

        if !change.modified.is_empty() {
            writeln!(out, "  [*] Modified:")?;
            for entity in &change.modified {
                writeln!(out, "      - {}", with_span(entity))?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Summary: Analyzed {} files.", results.len())?;
    Ok(())
}

fn with_span(entity: &EntityDescriptor) -> String {
    format!("{}: {} (lines {}-{})", entity.kind, entity.name, entity.start_line, entity.end_line)
}
