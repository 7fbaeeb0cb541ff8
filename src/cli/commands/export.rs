use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::path::expand_tilde;
use crate::utils::time::resolve_now;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
        now,
    } = cmd
    {
        let now = resolve_now(now.as_ref())?;
        let pool = open_pool(cfg)?;
        let path = expand_tilde(file);

        ExportLogic::export(
            &pool,
            cfg,
            *format,
            &path.to_string_lossy(),
            range.as_deref(),
            *force,
            now,
        )?;
    }
    Ok(())
}
