//! Process-wide IO buffering defaults.
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Buffer size used until a command configures its own.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

static BUFFER_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_BUFFER_SIZE);

/// Serializes tests that change the process-wide buffer size.
#[cfg(test)]
pub(crate) static TEST_BUFFER_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Current default buffer size in bytes.
#[must_use]
pub fn buffer_size() -> usize {
    BUFFER_SIZE.load(Ordering::Relaxed)
}

/// Set the default buffer size for readers created after this call.
pub fn set_buffer_size(size: usize) {
    BUFFER_SIZE.store(size, Ordering::Relaxed);
}

/// Wrap `inner` in a reader sized by [`buffer_size`].
#[must_use]
pub fn buffered_reader<R: Read>(inner: R) -> BufReader<R> {
    BufReader::with_capacity(buffer_size(), inner)
}

/// Read a whole UTF-8 file through a default-sized buffer.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, read, or is not UTF-8.
pub fn read_to_string(path: &Path) -> std::io::Result<String> {
    let mut content = String::new();
    buffered_reader(fs::File::open(path)?).read_to_string(&mut content)?;
    Ok(content)
}
