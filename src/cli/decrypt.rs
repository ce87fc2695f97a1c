//! `aegis decrypt`

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::{
    cancel_on_ctrl_c, credential_then_cancel, load_credential, prompt_password, BarProgress,
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
    println!("{}", "=== Decrypt ===".cyan().bold());
    let (credential, cancel) = credential_then_cancel(
        || load_credential(prompt_password()?, keyfile),
        cancel_on_ctrl_c,
    )?;

    let progress = BarProgress::new("decrypt");
    let mut sink = FileSink::new(out_dir);
    let report = run_batch(
        engine,
        Direction::Decrypt,
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
