/*!
 * External tool invocation.
 *
 * Every training tool is run the same way: resolve the executable, spawn it
 * with its arguments and an optional environment override, capture the
 * combined output, and turn a non-zero exit into a fatal [`PipelineError`].
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::Config;
use crate::errors::PipelineError;

/// One tool call: program name, arguments and environment overrides
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub env: Vec<(String, OsString)>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// `--name=value` style flag
    pub fn flag(self, name: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("{}={}", name, value))
    }

    /// `--name=<path>` style flag
    pub fn path_flag(self, name: &str, value: &Path) -> Self {
        let mut arg = OsString::from(format!("{}=", name));
        arg.push(value.as_os_str());
        self.arg(arg)
    }

    pub fn env(mut self, key: impl Into<String>, value: impl AsRef<OsStr>) -> Self {
        self.env.push((key.into(), value.as_ref().to_os_string()));
        self
    }

    /// Argument list as lossy strings, for logging and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    /// Whether any argument equals `needle`
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs external tools; each call either succeeds or aborts the run
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError>;
}

/// Locates tool executables
#[derive(Debug, Clone)]
pub struct ToolResolver {
    search_dirs: Vec<PathBuf>,
    path_var: Option<OsString>,
}

impl ToolResolver {
    /// Search `search_dirs` in order, then the process search path
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            path_var: std::env::var_os("PATH"),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tool_search_dirs())
    }

    /// Replace the search path, mainly for tests
    pub fn with_path_var(mut self, path_var: Option<OsString>) -> Self {
        self.path_var = path_var;
        self
    }

    /// Full path of `name`, or `ToolNotFound`
    pub fn resolve(&self, name: &str) -> Result<PathBuf, PipelineError> {
        let candidate = Path::new(name);
        if candidate.components().count() > 1 {
            return if is_executable(candidate) {
                Ok(candidate.to_path_buf())
            } else {
                Err(PipelineError::ToolNotFound(name.to_string()))
            };
        }

        let path_dirs = self
            .path_var
            .as_deref()
            .map(|p| std::env::split_paths(p).collect::<Vec<_>>())
            .unwrap_or_default();

        self.search_dirs
            .iter()
            .chain(path_dirs.iter())
            .map(|dir| dir.join(name))
            .find(|path| is_executable(path))
            .ok_or_else(|| PipelineError::ToolNotFound(name.to_string()))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Spawns real processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    resolver: ToolResolver,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(resolver: ToolResolver, timeout: Option<Duration>) -> Self {
        Self { resolver, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ToolResolver::from_config(config),
            config.tool_timeout_secs.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError> {
        let program = self.resolver.resolve(&invocation.program)?;

        debug!("Running {}", program.display());
        for arg in &invocation.args {
            debug!("{}", arg.to_string_lossy());
        }

        let output_future = Command::new(&program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_os_str())))
            .kill_on_drop(true)
            .output();

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    error!("{} did not finish within {}s", invocation.program, limit.as_secs());
                    return Err(PipelineError::ToolTimedOut {
                        tool: invocation.program.clone(),
                        secs: limit.as_secs(),
                    });
                }
            },
            None => output_future.await,
        };

        let output = result.map_err(|e| PipelineError::ToolFailed {
            tool: invocation.program.clone(),
            status: "spawn failure".to_string(),
            output: e.to_string(),
        })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            debug!("{}: {}", invocation.program, captured.trim_end());
            Ok(())
        } else {
            error!("{}: {}", invocation.program, captured.trim_end());
            Err(PipelineError::ToolFailed {
                tool: invocation.program.clone(),
                status: output.status.to_string(),
                output: captured,
            })
        }
    }
}
