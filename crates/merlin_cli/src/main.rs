//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `merlin_core` linkage and the configured database.
//! - Keep output deterministic for quick local sanity checks.

use merlin_core::db::open_db;
use merlin_core::{
    init_logging, CoreConfig, SqliteClienteRepository, SqliteNotaRepository,
    SqliteVeiculoRepository, WorkshopService,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("merlin_core ping={}", merlin_core::ping());
    println!("merlin_core version={}", merlin_core::core_version());

    match run(CoreConfig::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("merlin: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: CoreConfig) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let service = WorkshopService::new(
        SqliteClienteRepository::try_new(&conn)?,
        SqliteVeiculoRepository::try_new(&conn)?,
        SqliteNotaRepository::try_new(&conn)?,
    );

    let clientes = service.list_clientes()?;
    let notas = service.list_notas()?;
    log::info!(
        "event=cli_summary module=cli status=ok clientes={} notas={}",
        clientes.len(),
        notas.len()
    );

    println!("db_path={}", config.db_path.display());
    println!("clientes={}", clientes.len());
    println!("notas={}", notas.len());
    Ok(())
}
