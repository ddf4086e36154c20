//! Absolute-path derivation for path-typed options.
use super::option::{OptionId, OptionSet, OptionValue};
use crate::platform::PlatformKind;

/// Options holding filesystem paths that must be absolute once bootstrap ends.
pub const PATH_OPTIONS: [OptionId; 2] = [OptionId::RepoPath, OptionId::TestPath];

/// Make every valid path option absolute relative to `cwd`.
///
/// Relative values are rewritten to `<cwd>/<value>` with the value's original
/// source kept.  The join always uses `/`; on Windows the working directory's
/// own backslashes are converted first, while backslashes inside the option
/// value are left as given.  Already absolute values are untouched, so the
/// rewrite is idempotent.
pub fn normalize(options: &mut OptionSet, cwd: &str, platform: PlatformKind) {
    let cwd = platform.normalize_dir(cwd);

    for id in PATH_OPTIONS {
        let (Ok(path), Some(source)) = (options.str(id), options.source(id)) else {
            continue;
        };
        if platform.is_absolute(path) {
            continue;
        }

        let absolute = format!("{cwd}/{path}");
        tracing::trace!("{id} '{path}' made absolute as '{absolute}'");
        options.set(id, source, Some(OptionValue::Str(absolute)));
    }
}
