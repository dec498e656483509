//! Privilege checks and elevated re-invocation.
//!
//! # Platform Behavior
//! - **Windows**: administrator check via `IsUserAnAdmin`, elevation through
//!   the `runas` verb (`Start-Process -Verb RunAs -Wait`)
//! - **Linux/macOS**: root check via effective uid, elevation through `pkexec`

use crate::error::{Result, TrayError};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Whether the current process runs with administrative rights.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(windows)]
    {
        is_user_admin()
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

#[cfg(windows)]
#[allow(unsafe_code)]
fn is_user_admin() -> bool {
    // SAFETY: IsUserAnAdmin takes no arguments and only reads the token of
    // the calling thread.
    unsafe { windows_sys::Win32::UI::Shell::IsUserAnAdmin() != 0 }
}

/// Run a program with elevated rights and wait for it to finish.
///
/// The user may be prompted by the OS. A refused prompt, a missing
/// elevation helper, or a non-zero exit all surface as errors; the caller
/// decides how to report them.
pub fn run_elevated(program: &Path, args: &[&str]) -> Result<()> {
    let mut cmd = elevation_command(program, args);
    info!("Running elevated: {} {}", program.display(), args.join(" "));

    let output = cmd.output().map_err(|e| {
        TrayError::Other(format!(
            "Failed to launch elevation helper for {}: {}",
            program.display(),
            e
        ))
    })?;

    if output.status.success() {
        debug!("Elevated {} finished", program.display());
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(TrayError::Other(format!(
            "{} {} exited with {}: {}",
            program.display(),
            args.join(" "),
            output.status,
            stderr.trim()
        )))
    }
}

/// `ShellExecute` result for a refused UAC prompt.
#[cfg_attr(not(windows), allow(dead_code))]
const ERROR_CANCELLED: i32 = 1223;

/// PowerShell script running `program` through the `runas` verb.
///
/// A refused prompt or a failed launch exits non-zero; the elevated
/// process's own exit code is passed through otherwise.
#[cfg_attr(not(windows), allow(dead_code))]
fn runas_script(program: &Path, args: &[&str]) -> String {
    // Start-Process rejects an empty -ArgumentList
    let arg_list = if args.is_empty() {
        String::new()
    } else {
        let quoted = args
            .iter()
            .map(|a| format!("'{}'", a.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(",");
        format!(" -ArgumentList {}", quoted)
    };
    format!(
        "$ErrorActionPreference = 'Stop'; \
         try {{ $p = Start-Process -FilePath '{}'{} -Verb RunAs -Wait -PassThru }} \
         catch {{ [Console]::Error.WriteLine($_.Exception.Message); exit {} }}; \
         if (-not $p) {{ exit 1 }}; \
         exit $p.ExitCode",
        program.display().to_string().replace('\'', "''"),
        arg_list,
        ERROR_CANCELLED
    )
}

#[cfg(windows)]
fn elevation_command(program: &Path, args: &[&str]) -> Command {
    let script = runas_script(program, args);
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
    cmd
}

#[cfg(not(windows))]
fn elevation_command(program: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("pkexec");
    cmd.arg(program);
    cmd.args(args);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_elevation_command_uses_pkexec() {
        let cmd = elevation_command(Path::new("/opt/jackett/JackettConsole"), &["--Stop"]);
        assert_eq!(cmd.get_program(), "pkexec");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["/opt/jackett/JackettConsole", "--Stop"]);
    }

    #[test]
    fn test_runas_script_fails_closed() {
        let script = runas_script(Path::new(r"C:\Program Files\Jackett\JackettConsole.exe"), &["--Stop"]);

        assert!(script.starts_with("$ErrorActionPreference = 'Stop';"));
        assert!(script.contains("-ArgumentList '--Stop' -Verb RunAs -Wait -PassThru"));
        assert!(script.contains("catch {"));
        assert!(script.contains("exit 1223"));

        // The exit code is only read after the process object is known to exist
        let guard = script.find("if (-not $p) { exit 1 }").unwrap();
        let passthrough = script.find("exit $p.ExitCode").unwrap();
        assert!(guard < passthrough);
    }

    #[test]
    fn test_runas_script_quotes_paths() {
        let script = runas_script(Path::new(r"C:\Users\O'Brien\JackettConsole.exe"), &[]);
        assert!(script.contains(r"-FilePath 'C:\Users\O''Brien\JackettConsole.exe'"));
        assert!(!script.contains("-ArgumentList"));
    }

    #[cfg(windows)]
    #[test]
    fn test_run_elevated_missing_program_is_error() {
        let result = run_elevated(Path::new(r"C:\does-not-exist\JackettConsole.exe"), &["--Stop"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_elevated_does_not_panic() {
        let _ = is_elevated();
    }
}
