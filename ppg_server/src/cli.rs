use std::env::{self, VarError};

/// Variables shown by `--help`. Secrets (credentials and the mail API key) are left out.
const VISIBLE_ENVS: [&str; 12] = [
    "RUST_LOG",
    "PPG_HOST",
    "PPG_PORT",
    "PPG_DATABASE_URL",
    "PPG_PUBLIC_URL",
    "PPG_DEDUPE_SIDE_EFFECTS",
    "PPG_CORS_ORIGINS",
    "PPG_PESAPAL_ENVIRONMENT",
    "PPG_PESAPAL_API_URL",
    "PPG_PESAPAL_TIMEOUT_SECS",
    "PPG_MAIL_API_URL",
    "PPG_MAIL_FROM",
];

/// The server is configured through the environment only. Any argument at all prints the usage and the current
/// configuration, and returns `true` so that `main` exits without starting the server.
pub fn handle_command_line_args() -> bool {
    if env::args().len() <= 1 {
        return false;
    }
    println!("\n{}\n", include_str!("./cli-help.txt"));
    println!("Current environment (secrets are not shown):");
    for name in VISIBLE_ENVS {
        println!("  {name:<35} {}", env_value(name));
    }
    true
}

fn env_value(name: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
