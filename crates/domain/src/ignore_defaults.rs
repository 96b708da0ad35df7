//! Built-in default ignore rules.
//!
//! Infrastructure paths (version control, dependency and build output) are
//! excluded through this pattern source rather than special-cased in
//! matcher code, so hosts can override any of it with `!` rules in a
//! discovered ignore file.

/// Name used for the built-in pattern source in diagnostics.
pub const DEFAULT_SOURCE_NAME: &str = "defaults";

/// Default ignore rules in `.gitignore` syntax, applied before any
/// discovered repository rules.
pub const DEFAULT_IGNORE_RULES: &str = "\
# Version control
.git/
.svn/
.hg/

# Dependencies and build output
node_modules/
bower_components/
target/
dist/
build/
out/
vendor/
coverage/
__pycache__/
.venv/
venv/

# Editor and system noise
.idea/
.vscode/
.DS_Store

# Lockfiles and generated artifacts
*.lock
package-lock.json
yarn.lock
pnpm-lock.yaml
*.min.js
*.min.css
*.map
*.pyc
*.class

# Binary and media payloads
*.o
*.so
*.dll
*.exe
*.bin
*.jpg
*.jpeg
*.png
*.gif
*.ico
*.svg
*.pdf
*.zip
*.tar
*.gz

# Environment files
.env
.env.*
";

/// Count of effective (non-blank, non-comment) default rules.
#[must_use]
pub fn default_rule_count() -> usize {
    DEFAULT_IGNORE_RULES
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .count()
}
