//! Bundled buggy programs for trying the pipeline without writing one.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sample {
    /// Function definition missing its colon.
    Syntax,
    /// Runs but prints the wrong value.
    Logic,
    /// Divides by zero on the last loop iteration.
    Runtime,
}

impl Sample {
    pub fn source(self) -> &'static str {
        match self {
            Self::Syntax => include_str!("samples/syntax_error.py"),
            Self::Logic => include_str!("samples/logic_error.py"),
            Self::Runtime => include_str!("samples/runtime_error.py"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gate::check_structure;

    #[test]
    fn every_sample_is_non_empty_python() {
        for sample in Sample::value_variants() {
            let source = sample.source();
            assert!(source.contains("def "), "{sample:?}");
            assert!(check_structure(source, source).is_ok());
        }
    }
}
