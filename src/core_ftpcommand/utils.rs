use chrono::{DateTime, Local};
use std::fs::Metadata;

/// Quotes a path for a 257 reply. Embedded quotes are doubled and control
/// characters dropped, so a path can never end the reply line early.
pub fn quote_path(path: &str) -> String {
    let cleaned: String = path.chars().filter(|c| !c.is_control()).collect();
    format!("\"{}\"", cleaned.replace('"', "\"\""))
}

/// One `ls -l` style line of a LIST reply.
pub fn format_list_line(name: &str, metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'l'
    } else {
        '-'
    };
    let modified: DateTime<Local> = metadata
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    format!(
        "{}{} 1 owner group {:>12} {} {}",
        kind,
        permissions(metadata),
        metadata.len(),
        modified.format("%b %d %H:%M"),
        name
    )
}

#[cfg(unix)]
fn permissions(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    let mut rendered = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        rendered.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        rendered.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        rendered.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    rendered
}

#[cfg(not(unix))]
fn permissions(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-r--r--".to_string()
    }
}
