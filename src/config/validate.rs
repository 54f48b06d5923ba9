//! Config validation: compile textual settings into run options.
//! Every pattern and the counter format are checked up front so a bad value
//! fails before any directory is touched.

use tracing::debug;

use super::types::Config;
use crate::errors::SmartRenameError;
use crate::rename::SmartRenameOptions;
use crate::transform::{Pattern, TransformOptions};
use crate::unique::CounterTemplate;

impl Config {
    /// Build [`SmartRenameOptions`] from this config.
    ///
    /// `preserve_metadata` is not part of the options; it configures the
    /// filesystem implementation instead.
    pub fn to_options(&self) -> Result<SmartRenameOptions, SmartRenameError> {
        let patterns = self
            .patterns
            .iter()
            .map(|p| Pattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        let transform = TransformOptions::new(patterns).with_remove_spaces(self.remove_spaces);

        let mut options = SmartRenameOptions::new(transform).dry_run(self.dry_run);
        if let Some(fmt) = self.counter_format.as_deref() {
            options.format_counter = Some(CounterTemplate::parse(fmt)?.into_formatter());
        }
        if self.lowercase {
            options = options.post_transform(|s| s.to_lowercase());
        }
        if let Some(out) = &self.output_path {
            options = options.output_path(out.clone());
        }
        debug!(
            patterns = self.patterns.len(),
            remove_spaces = self.remove_spaces,
            lowercase = self.lowercase,
            "compiled rename options"
        );
        Ok(options)
    }
}
