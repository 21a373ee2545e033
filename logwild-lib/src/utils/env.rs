pub const fn project_name() -> &'static str {
    "logwild"
}

pub const fn project_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Source revision the binary was built from,
/// injected at build time via `LOGWILD_REVISION`.
pub const fn project_revision() -> &'static str {
    match option_env!("LOGWILD_REVISION") {
        Some(revision) => revision,
        None => "unknown",
    }
}

pub const fn network_service_identifier() -> &'static str {
    concat!("logwild/", env!("CARGO_PKG_VERSION"))
}

/// Best effort hostname of the machine running logwild.
pub fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_owned())
}

pub fn available_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_identifier_contains_name_and_version() {
        let id = network_service_identifier();
        assert!(id.starts_with(project_name()));
        assert!(id.ends_with(project_version()));
    }

    #[test]
    fn hostname_is_never_empty() {
        assert!(!hostname().is_empty());
    }
}
