use serde::{Deserialize, Serialize};

use crate::rex::AggKind;

/// Whether windowed lookups may fall back to a plain aggregate strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowReuse {
    /// Fall back only for kinds that are safe over a sliding frame.
    #[default]
    AllowList,
    /// Windowed lookups never fall back.
    Never,
}

impl WindowReuse {
    pub fn allows(self, kind: AggKind) -> bool {
        match self {
            WindowReuse::AllowList => kind.is_window_reusable(),
            WindowReuse::Never => false,
        }
    }
}

/// Knobs that change what the compiler emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Lets TRIM strip a multi-character set instead of a single character.
    pub allow_extended_trim: bool,
    /// LISTAGG separator when the call does not give one.
    pub default_listagg_separator: String,
    pub window_reuse: WindowReuse,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            allow_extended_trim: false,
            default_listagg_separator: ",".to_string(),
            window_reuse: WindowReuse::default(),
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(allow_extended_trim: bool, default_listagg_separator: &str, window_reuse: WindowReuse) -> Self {
        Self {
            allow_extended_trim,
            default_listagg_separator: default_listagg_separator.to_string(),
            window_reuse,
        }
    }

    /// Lenient conformance: extended TRIM allowed.
    pub fn lenient() -> Self {
        Self { allow_extended_trim: true, ..Self::default() }
    }

    /// No plain-strategy reuse in windows.
    pub fn strict_windows() -> Self {
        Self { window_reuse: WindowReuse::Never, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = CompilerConfig::new();
        assert!(!c.allow_extended_trim);
        assert_eq!(c.default_listagg_separator, ",");
        assert_eq!(c.window_reuse, WindowReuse::AllowList);
    }

    #[test]
    fn window_reuse_allow_list_excludes_counting_kinds() {
        assert!(WindowReuse::AllowList.allows(AggKind::Sum));
        assert!(!WindowReuse::AllowList.allows(AggKind::Count));
        assert!(!WindowReuse::AllowList.allows(AggKind::Grouping));
        assert!(!WindowReuse::Never.allows(AggKind::Sum));
    }
}
