use std::path::{Path, PathBuf};
use std::process::Command;

/// Locates a JDK installation directory.
pub fn find_java_home() -> Option<PathBuf> {
    // 1. Try JAVA_HOME environment variable
    if let Ok(home) = std::env::var("JAVA_HOME") {
        let home = PathBuf::from(home);
        if javac_in(&home).is_some() {
            return Some(home);
        }
    }

    // 2. Try macOS specific java_home utility
    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = Command::new("/usr/libexec/java_home").output() {
            if output.status.success() {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() && javac_in(Path::new(&path_str)).is_some() {
                    return Some(PathBuf::from(path_str));
                }
            }
        }
    }

    // 3. Ask the java launcher on PATH
    if let Ok(output) = Command::new("java")
        .arg("-XshowSettings:properties")
        .arg("-version")
        .output()
    {
        // Output is on stderr usually
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            if line.trim().starts_with("java.home = ") {
                let path_str = line.trim().trim_start_matches("java.home = ").trim();
                if javac_in(Path::new(path_str)).is_some() {
                    return Some(PathBuf::from(path_str));
                }
            }
        }
    }

    None
}

/// Locates the `javac` executable: a JDK home first, then whatever `javac`
/// resolves to on `PATH`.
pub fn find_javac() -> Option<PathBuf> {
    if let Some(javac) = find_java_home().and_then(|home| javac_in(&home)) {
        return Some(javac);
    }
    let on_path = PathBuf::from(javac_file_name());
    let responds = Command::new(&on_path)
        .arg("-version")
        .output()
        .is_ok_and(|output| output.status.success());
    responds.then_some(on_path)
}

/// `bin/javac` under a JDK home, if present. Some JRE layouts nest the JDK
/// one level up.
pub fn javac_in(home: &Path) -> Option<PathBuf> {
    let direct = home.join("bin").join(javac_file_name());
    if direct.is_file() {
        return Some(direct);
    }
    let parent = home.parent()?.join("bin").join(javac_file_name());
    parent.is_file().then_some(parent)
}

fn javac_file_name() -> &'static str {
    if cfg!(windows) { "javac.exe" } else { "javac" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_javac_in_fake_home() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(javac_file_name()), b"").unwrap();
        assert_eq!(javac_in(dir.path()), Some(bin.join(javac_file_name())));
    }

    #[test]
    fn finds_javac_from_nested_jre() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(dir.path().join("jre")).unwrap();
        std::fs::write(bin.join(javac_file_name()), b"").unwrap();
        assert_eq!(
            javac_in(&dir.path().join("jre")),
            Some(bin.join(javac_file_name()))
        );
    }

    #[test]
    fn missing_javac_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(javac_in(dir.path()), None);
    }
}
