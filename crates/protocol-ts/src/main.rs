//! Exports TypeScript bindings for every `ps-protocol` type.
//!
//! Usage: `ps-protocol-ts [OUT_DIR]` (defaults to `bindings/`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use ts_rs::TS;

use ps_protocol::{
    Catalog, Event, GlobalConfig, Op, ProcessDef, RevealState, SimulationState, StageContent,
    StageDef, StageStatus, TimingConfig,
};

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bindings"));

    let written = export_bindings(&out_dir)?;
    println!("Exported {written} types to {}", out_dir.display());
    Ok(())
}

/// Write one `.ts` file per protocol type (and its dependencies) into `out_dir`.
///
/// Returns the number of root types exported.
fn export_bindings(out_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    macro_rules! export {
        ($($ty:ty),+ $(,)?) => {{
            let mut count = 0usize;
            $(
                <$ty>::export_all_to(out_dir)
                    .with_context(|| format!("Failed to export {}", stringify!($ty)))?;
                count += 1;
            )+
            count
        }};
    }

    Ok(export!(
        StageDef,
        ProcessDef,
        Catalog,
        StageContent,
        TimingConfig,
        GlobalConfig,
        RevealState,
        StageStatus,
        SimulationState,
        Op,
        Event,
    ))
}
