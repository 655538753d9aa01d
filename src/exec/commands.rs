//! Package Command Construction
//!
//! Builds the xbps command lines dispatched to the supervisor, together
//! with the interactive retry lists replayed inside a terminal window
//! when the user falls back after a failed transaction. The supervised
//! variants run non-interactively (`-y`); the retry lists keep the
//! prompt and pause so the user can read the terminal before it closes.

/// Pause appended to every terminal retry list
pub const PRESS_ANY_KEY: &str = "Press any key to continue...";

fn pause() -> [String; 2] {
    [
        "echo -e;".to_string(),
        format!("read -n 1 -p \"{}\"", PRESS_ANY_KEY),
    ]
}

/// Remove obsolete packages from the cache.
pub fn clean_cache() -> String {
    "xbps-remove -O".to_string()
}

/// Non-interactive install of the given package list.
pub fn install(packages: &str) -> String {
    format!("xbps-install -y {}", packages)
}

/// Interactive install replayed inside a terminal.
pub fn install_retry_list(packages: &str) -> Vec<String> {
    let [echo, read] = pause();
    vec![format!("xbps-install {};", packages), echo, read]
}

/// Non-interactive recursive removal of the given package list.
pub fn remove(packages: &str) -> String {
    format!("xbps-remove -R -y {}", packages)
}

/// Interactive removal replayed inside a terminal.
pub fn remove_retry_list(packages: &str) -> Vec<String> {
    let [echo, read] = pause();
    vec![format!("xbps-remove -R {};", packages), echo, read]
}

/// Remove one package set, then install another, non-interactively.
pub fn remove_and_install(to_remove: &str, to_install: &str) -> String {
    format!("xbps-remove -R -y {}; xbps-install {}", to_remove, to_install)
}

/// Interactive remove-then-install replayed inside a terminal.
pub fn remove_and_install_retry_list(to_remove: &str, to_install: &str) -> Vec<String> {
    let [echo, read] = pause();
    vec![
        format!("xbps-remove -R {};", to_remove),
        format!("xbps-install {};", to_install),
        echo,
        read,
    ]
}

/// Non-interactive full system upgrade.
pub fn system_upgrade() -> String {
    "xbps-install -u -y".to_string()
}

/// Interactive system upgrade replayed inside a terminal.
pub fn system_upgrade_retry_list() -> Vec<String> {
    let [echo, read] = pause();
    vec!["xbps-install -u;".to_string(), echo, read]
}

/// Repository index refresh. A root invocation can use the cheaper
/// single refresh; the file index is rebuilt alongside when xlocate is
/// available.
pub fn sync_database(running_as_root: bool, has_xlocate: bool) -> String {
    let mut command = if running_as_root {
        "xbps-install -Sy".to_string()
    } else {
        "xbps-install -Syy".to_string()
    };
    if has_xlocate && !running_as_root {
        command.push_str("; xlocate -S");
    }
    command
}
