pub mod complete;
pub mod config;
pub mod export;
pub mod import;
pub mod init;
pub mod log;
pub mod notifications;
pub mod owners;
pub mod sweep;
pub mod timeline;
pub mod watch;

use crate::config::Config;
use crate::db::initialize::open_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};

pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    open_db(cfg)
}

/// `--user`, falling back to the configured default user.
pub(crate) fn resolve_user(arg: &Option<String>, cfg: &Config) -> AppResult<String> {
    arg.as_deref()
        .or(cfg.user.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("no user given: pass --user or set `user` in the config".into()))
}
