use uuid::Uuid;

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Replace every run of characters outside `[A-Za-z0-9_.-]` with one `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if is_safe(c) {
            safe.push(c);
            in_run = false;
        } else if !in_run {
            safe.push('_');
            in_run = true;
        }
    }
    if safe.is_empty() {
        safe.push_str("file");
    }
    safe
}

/// Storage path of an uploaded file:
/// `job-{job_id}/{unix_millis}-{index}-{safe_name}`.
///
/// `index` is the file's position in its selection, so two files that
/// sanitize to the same name in the same millisecond still get distinct paths.
pub fn object_path(job_id: Uuid, unix_millis: i64, index: usize, file_name: &str) -> String {
    format!(
        "job-{}/{}-{}-{}",
        job_id,
        unix_millis,
        index,
        sanitize_file_name(file_name)
    )
}
