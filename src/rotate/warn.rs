fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_ascii_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if ch.is_ascii_graphic() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct WarnEvent<'a> {
    pub code: &'a str,
    pub stage: &'a str,
    pub root: &'a str,
    pub file: &'a str,
    pub archive: &'a str,
    pub retry: &'a str,
    pub err: &'a str,
}

pub fn emit(event: WarnEvent<'_>) {
    eprintln!(
        "REAP_WARN code={} stage={} root={} file={} archive={} retry={} err={}",
        sanitize_value(event.code),
        sanitize_value(event.stage),
        sanitize_value(event.root),
        sanitize_value(event.file),
        sanitize_value(event.archive),
        sanitize_value(event.retry),
        sanitize_value(event.err),
    );
}
