//! OS-level appearance preference, used to pick a default theme when the
//! config does not name one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

/// Best-effort probe of the desktop's light/dark preference. `None` when no
/// hint is available; callers fall back to dark.
pub fn detect_os_appearance() -> Option<Appearance> {
    probe()
}

#[cfg(target_os = "macos")]
fn probe() -> Option<Appearance> {
    use std::process::Command;
    // `defaults read -g AppleInterfaceStyle` prints "Dark" when dark mode is
    // on and exits non-zero when the key is absent (the light default).
    let output = Command::new("/usr/bin/defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    if !output.status.success() {
        return Some(Appearance::Light);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(if stdout.to_ascii_lowercase().contains("dark") {
        Appearance::Dark
    } else {
        Appearance::Light
    })
}

#[cfg(target_os = "windows")]
fn probe() -> Option<Appearance> {
    // HKCU\...\Personalize\AppsUseLightTheme: 1 = light, 0 = dark.
    use winreg::enums::HKEY_CURRENT_USER;
    use winreg::RegKey;
    let personalize = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
        .ok()?;
    let value: u32 = personalize.get_value("AppsUseLightTheme").ok()?;
    Some(if value == 0 {
        Appearance::Dark
    } else {
        Appearance::Light
    })
}

#[cfg(target_os = "linux")]
fn probe() -> Option<Appearance> {
    use std::process::Command;

    let gsetting = |key: &str| -> Option<String> {
        let output = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", key])
            .output()
            .ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).to_ascii_lowercase())
    };

    // GNOME 42+ exposes color-scheme directly.
    if let Some(scheme) = gsetting("color-scheme") {
        if scheme.contains("prefer-dark") {
            return Some(Appearance::Dark);
        }
        if scheme.contains("default") {
            return Some(Appearance::Light);
        }
    }

    // Older setups: dark GTK themes conventionally carry a "-dark" suffix.
    if let Some(gtk_theme) = gsetting("gtk-theme") {
        return Some(if gtk_theme.contains("-dark") {
            Appearance::Dark
        } else {
            Appearance::Light
        });
    }

    None
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
fn probe() -> Option<Appearance> {
    None
}
