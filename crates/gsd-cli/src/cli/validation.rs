/// Parse and validate a listen address of the form `host:port`.
///
/// The host may be a name (`localhost`), an IPv4 address or a bracketed
/// IPv6 address. The port must be a valid `u16`.
///
/// # Examples
///
/// Valid: localhost:3000, 0.0.0.0:8080, [::1]:9000
/// Invalid: localhost, :3000, localhost:http, localhost:70000
///
/// # Errors
///
/// Returns an error message if the address is malformed.
pub fn parse_addr(s: &str) -> Result<String, String> {
    let Some((host, port)) = s.rsplit_once(':') else {
        return Err(format!("Address must be in host:port form: '{}'", s));
    };

    if host.is_empty() {
        return Err(format!("Address is missing a host: '{}'", s));
    }

    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return Err(format!("IPv6 hosts must be bracketed: '{}'", s));
    }

    port.parse::<u16>()
        .map_err(|_| format!("Invalid port '{}' in address '{}'", port, s))?;

    Ok(s.to_string())
}

/// Parse a debounce window in milliseconds.
///
/// Zero is rejected because every single event would then trigger a rebuild.
pub fn parse_debounce(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .parse()
        .map_err(|_| format!("Debounce must be a number of milliseconds: '{}'", s))?;
    if ms == 0 {
        return Err("Debounce must be at least 1 millisecond".to_string());
    }
    Ok(ms)
}
