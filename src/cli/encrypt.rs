//! `aegis encrypt`

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::{
    cancel_on_ctrl_c, credential_then_cancel, load_credential, prompt_new_password, BarProgress,
    FileSink,
};
use crate::error::Result;
use crate::stream::{run_batch, BatchReport, Direction, Engine};

pub async fn run(
    engine: &Engine,
    files: &[PathBuf],
    keyfile: Option<&Path>,
    out_dir: Option<PathBuf>,
) -> Result<BatchReport> {
    println!("{}", "=== Encrypt ===".cyan().bold());
    let (credential, cancel) = credential_then_cancel(
        || load_credential(prompt_new_password()?, keyfile),
        cancel_on_ctrl_c,
    )?;
    if credential.has_keyfile() {
        println!("{}", "Keyfile required to decrypt these files.".yellow());
    }

    let progress = BarProgress::new("encrypt");
    let mut sink = FileSink::new(out_dir);
    let report = run_batch(
        engine,
        Direction::Encrypt,
        files,
        &credential,
        &cancel,
        &progress,
        &mut sink,
    )
    .await;
    progress.finish();

    Ok(report)
}
