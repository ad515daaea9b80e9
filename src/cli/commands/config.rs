use crate::config::Settings;
use crate::Result;

/// Print the settings file location and the effective settings.
pub fn show(settings: &Settings) -> Result<()> {
    match Settings::config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not present, using defaults)", path.display()),
        None => println!("Config file: unavailable (cannot determine config directory)"),
    }

    println!();
    println!("  default_user:           {}", settings.default_user());
    println!("  ssh_program:            {}", settings.ssh_program());
    println!(
        "  session_manager_plugin: {}",
        settings.session_manager_plugin()
    );
    println!(
        "  proxy_program:          {}",
        settings.proxy_program()?.display()
    );

    println!();
    println!("{}", serde_json::to_string_pretty(settings)?);

    Ok(())
}
