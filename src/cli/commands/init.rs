use crate::cli::context::{self, Context};
use crate::cli::output;
use crate::core::errors::{Result, WardenError};
use crate::core::models::audit_entry::AuditAction;

/// Execute the `keywarden init` command.
///
/// Creates the state directory with a default `config.toml` and empty
/// user and repository stores. The authorized_keys file is left alone
/// until the first user is created.
pub fn execute(bin_path: &str) -> Result<()> {
    let dir = context::state_dir();

    if dir.join("config.toml").exists() {
        return Err(WardenError::InvalidConfig {
            detail: format!("keywarden is already initialized in {}", dir.display()),
        });
    }
    if bin_path.trim().is_empty() || bin_path.contains(['"', '\n']) {
        return Err(WardenError::InvalidConfig {
            detail: format!("Invalid --bin-path '{bin_path}'"),
        });
    }

    output::header("keywarden — initializing");

    std::fs::create_dir_all(dir)?;
    output::success(&format!("Created {}", dir.display()));

    let config = format!(
        r#"[keywarden]
format_version = 1
bin_path = "{bin_path}"

[storage]
users_file = "users.json"
repositories_file = "repositories.json"

# [authorized_keys]
# path = "~/.ssh/authorized_keys"

[audit]
enabled = true
log_file = "audit.log"
"#
    );
    std::fs::write(dir.join("config.toml"), config)?;
    output::success("Generated config.toml");

    for store in ["users.json", "repositories.json"] {
        let path = dir.join(store);
        if !path.exists() {
            std::fs::write(&path, "[]\n")?;
        }
    }
    output::success("Created empty user and repository stores");

    let ctx = Context::load()?;
    super::audit_helpers::log_audit(
        &ctx,
        AuditAction::Init,
        vec![],
        Some(format!("bin_path {bin_path}")),
    );

    println!("\n  Next: keywarden user create <name> --key \"<public key>\"");
    Ok(())
}
