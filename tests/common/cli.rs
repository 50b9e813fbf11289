use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

#[derive(Debug)]
pub struct TbRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl TbRun {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

pub struct TbWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl TbWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

/// Base command with the workspace as cwd and HOME, logging to stderr.
pub fn tailbench_cmd(workspace: &TbWorkspace) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tailbench"));
    cmd.current_dir(&workspace.root);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "tailbench=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);
    cmd.env_remove("TAILBENCH_CONFIG");
    cmd
}

pub fn run_tailbench<I, S>(workspace: &TbWorkspace, args: I, label: &str) -> TbRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_tailbench_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_tailbench_with_env<I, S, E, K, V>(
    workspace: &TbWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> TbRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = tailbench_cmd(workspace);
    cmd.args(args);
    cmd.envs(env_vars);

    let start = Instant::now();
    let output = cmd.output().expect("run tailbench");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let timestamp = SystemTime::now();
    let log_body = format!(
        "label: {label}\nstarted: {:?}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        timestamp,
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    TbRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

pub fn extract_json_payload(stdout: &str) -> String {
    let lines: Vec<&str> = stdout.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    stdout.trim().to_string()
}

/// The structured error document printed on stderr in JSON mode.
pub fn parse_error_json(stderr: &str) -> serde_json::Value {
    let payload = extract_json_payload(stderr);
    serde_json::from_str(&payload).expect("parse error json")
}
