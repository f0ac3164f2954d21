//! Content inspection and automatic tagging.
//!
//! The [`Inspector`] asks a [`Classifier`] (libmagic in production) for a
//! description of a file or directory and turns that description into tags
//! with [`describe_tags`].

mod audio;
mod classifier;
mod rules;

pub use classifier::{Classifier, InspectError, MagicClassifier};
pub use rules::describe_tags;

use std::path::Path;

use tracing::trace;

use crate::tag::TagEntry;

/// Derives tags from file content.
pub struct Inspector {
    classifier: Box<dyn Classifier>,
}

impl Inspector {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Classify `path` and return its automatic tags, ordered by name.
    pub fn inspect(&self, path: &Path) -> Result<Vec<TagEntry>, InspectError> {
        let description = self.classifier.describe(path)?;
        trace!(path = %path.display(), description = %description, "classified");
        Ok(describe_tags(&description, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct FixedClassifier(&'static str);

    impl Classifier for FixedClassifier {
        fn describe(&self, _path: &Path) -> Result<String, InspectError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn describe(&self, path: &Path) -> Result<String, InspectError> {
            Err(InspectError::Classify {
                path: path.to_path_buf(),
                message: "unreadable".to_string(),
            })
        }
    }

    #[test]
    fn test_inspect_uses_classifier() {
        let inspector = Inspector::new(Box::new(FixedClassifier("Python script, ASCII text executable")));
        let tags = inspector.inspect(Path::new("/bin/tool")).unwrap();

        assert!(tags.contains(&TagEntry::bare("code")));
        assert!(tags.contains(&TagEntry::text("language", "python")));
        assert!(tags.contains(&TagEntry::text("type", "python")));
    }

    #[test]
    fn test_inspect_propagates_errors() {
        let inspector = Inspector::new(Box::new(FailingClassifier));
        let err = inspector.inspect(&PathBuf::from("/x")).unwrap_err();
        assert!(matches!(err, InspectError::Classify { .. }));
    }
}
