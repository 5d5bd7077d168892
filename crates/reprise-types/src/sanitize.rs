//! Basic XSS scrubbing for text frozen into order snapshots.

/// Strip `<script>` blocks, `javascript:` schemes and inline `on*=` handlers,
/// then trim. Matching is ASCII case-insensitive.
pub fn sanitize_string(value: &str) -> String {
    let without_scripts = strip_script_blocks(value);
    let without_scheme = remove_ci(&without_scripts, "javascript:");
    strip_event_handlers(&without_scheme).trim().to_string()
}

fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() {
        return None;
    }
    (from..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

fn remove_ci(value: &str, needle: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0;
    while let Some(start) = find_ci(value, needle, cursor) {
        out.push_str(&value[cursor..start]);
        cursor = start + needle.len();
    }
    out.push_str(&value[cursor..]);
    out
}

fn strip_script_blocks(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0;
    while let Some(open) = find_ci(value, "<script", cursor) {
        let Some(open_end) = value[open..].find('>').map(|i| open + i + 1) else {
            break;
        };
        let Some(close) = find_ci(value, "</script>", open_end) else {
            break;
        };
        out.push_str(&value[cursor..open]);
        cursor = close + "</script>".len();
    }
    out.push_str(&value[cursor..]);
    out
}

/// Drop `on<word>=` sequences (the handler name and the `=`).
fn strip_event_handlers(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i].eq_ignore_ascii_case(&b'o') && bytes[i + 1].eq_ignore_ascii_case(&b'n') {
            let mut j = i + 2;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            if j > i + 2 && j < bytes.len() && bytes[j] == b'=' {
                out.push_str(&value[cursor..i]);
                cursor = j + 1;
                i = cursor;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&value[cursor..]);
    out
}
