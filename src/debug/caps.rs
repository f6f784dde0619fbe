const CAP_PREFIX: &str = "CAP_";

/// `CAP_SYS_PTRACE` -> `SYS_PTRACE`. Names without the prefix pass through.
pub fn normalize_capabilities(caps: &[String]) -> Vec<String> {
    caps.iter()
        .map(|c| c.strip_prefix(CAP_PREFIX).unwrap_or(c).to_string())
        .collect()
}
